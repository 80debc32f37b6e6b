use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wordlens_core::{ContextQuery, ContextReport, WordCount};
use wordlens_local::{
    default_output_path, find_and_write, occurrence_count, StopWords, TfIdf, WordFrequencies,
};

mod input;

use input::{FetchArgs, TextSourceArgs};

/// Project Gutenberg HTML of *Ulysses*; chapter 1 sits between `#chap01` and `#chap02`.
const ULYSSES_URL: &str = "https://www.gutenberg.org/files/4300/4300-h/4300-h.htm";

#[derive(Parser, Debug)]
#[command(name = "wordlens")]
#[command(about = "TF-IDF scores, word frequencies and word contexts for small texts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// TF, IDF and TF-IDF of one word in one document.
    Tfidf(TfidfCmd),
    /// Most frequent words of a text.
    Frequencies(FrequenciesCmd),
    /// Count whole-word, case-insensitive occurrences of a word.
    Count(CountCmd),
    /// Print the context windows around a word and write them to a file.
    Contexts(ContextsCmd),
    /// Download a page, cut out one section, rank its words and optionally search contexts.
    Scrape(ScrapeCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct TfidfCmd {
    /// Document text (repeatable). Each document needs at least two words.
    #[arg(long)]
    doc: Vec<String>,
    /// File with one document per line (blank lines ignored).
    #[arg(long)]
    docs_file: Vec<PathBuf>,
    /// Word to score.
    #[arg(long)]
    word: String,
    /// Zero-based document index.
    #[arg(long)]
    doc_index: usize,
    /// Score stop words like any other word instead of returning 0.
    #[arg(long)]
    keep_stopwords: bool,
    /// Replace the built-in English + Russian stop words with this list (one per line).
    #[arg(long)]
    stopwords_file: Option<PathBuf>,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct FrequenciesCmd {
    /// How many words to list.
    #[arg(long, default_value_t = 20)]
    top: usize,
    #[command(flatten)]
    source: TextSourceArgs,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct CountCmd {
    /// Word to count.
    #[arg(long)]
    word: String,
    #[command(flatten)]
    source: TextSourceArgs,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug, Clone)]
struct ContextArgs {
    /// Words kept left of each occurrence.
    #[arg(long, default_value_t = 5)]
    left: usize,
    /// Words kept right of each occurrence.
    #[arg(long, default_value_t = 5)]
    right: usize,
    /// Never let a window cross a sentence boundary.
    #[arg(long)]
    cut_length: bool,
    /// Output file (default: <word>_contexts.txt).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ContextsCmd {
    /// Word to search for.
    #[arg(long)]
    word: String,
    #[command(flatten)]
    window: ContextArgs,
    #[command(flatten)]
    source: TextSourceArgs,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct ScrapeCmd {
    /// Page to download.
    #[arg(long, default_value = ULYSSES_URL)]
    url: String,
    /// Id of the element that opens the section.
    #[arg(long, default_value = "chap01")]
    start_anchor: String,
    /// Id of the element that closes the section.
    #[arg(long, default_value = "chap02")]
    end_anchor: String,
    /// How many top words to list.
    #[arg(long, default_value_t = 20)]
    top: usize,
    /// Also count this word and search its contexts.
    #[arg(long)]
    word: Option<String>,
    #[command(flatten)]
    window: ContextArgs,
    #[command(flatten)]
    fetch: FetchArgs,
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn is_json(output: &str) -> bool {
    output.eq_ignore_ascii_case("json")
}

/// Opt-in `KEY=VALUE` file named by `WORDLENS_ENV_FILE`. Never overrides the process env.
fn load_env_file() {
    let Ok(p) = std::env::var("WORDLENS_ENV_FILE") else {
        return;
    };
    let p = p.trim();
    if p.is_empty() {
        return;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return;
    };
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if !k.is_empty() && std::env::var_os(k).is_none() {
            std::env::set_var(k, v.trim());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wordlens_cli=info,wordlens_local=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn context_query(word: &str, w: &ContextArgs) -> (ContextQuery, PathBuf) {
    let q = ContextQuery::new(word.trim(), w.left, w.right).cut_at_sentences(w.cut_length);
    let out = w.out.clone().unwrap_or_else(|| default_output_path(word));
    (q, out)
}

fn print_report(r: &ContextReport) {
    for c in &r.contexts {
        println!("{c}");
    }
    println!(
        "\nFound {} occurrence(s) of '{}'. Contexts written to '{}'.",
        r.count,
        r.word,
        r.path.display()
    );
}

fn print_top(top: &[WordCount]) {
    for wc in top {
        println!("{}: {}", wc.word, wc.count);
    }
}

#[derive(Debug, Serialize)]
struct ScrapeReport {
    url: String,
    text_chars: usize,
    total_words: usize,
    distinct_words: usize,
    top: Vec<WordCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    occurrences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contexts: Option<ContextReport>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tfidf(args) => {
            let docs = input::load_documents(&args.docs_file, &args.doc)?;
            if args.doc_index >= docs.len() {
                anyhow::bail!(
                    "invalid document index {} (have {} documents, indices start at 0)",
                    args.doc_index,
                    docs.len()
                );
            }
            let stopwords = match &args.stopwords_file {
                Some(p) => StopWords::from_file(p)?,
                None => StopWords::english_russian(),
            };
            tracing::debug!(
                documents = docs.len(),
                stopwords = stopwords.len(),
                "tf-idf engine ready"
            );
            let engine = TfIdf::new(&docs, stopwords);
            let score = engine.score(args.word.trim(), args.doc_index, !args.keep_stopwords)?;
            if is_json(&args.output) {
                println!("{}", serde_json::to_string(&score)?);
            } else {
                println!(
                    "Results for '{}' in document {}:",
                    score.word, score.doc_index
                );
                println!("TF: {:.4}", score.tf);
                println!("IDF: {:.4}", score.idf);
                println!("TF-IDF: {:.4}", score.tf_idf);
            }
        }
        Commands::Frequencies(args) => {
            let text = input::load_text(&args.source).await?;
            let freqs = WordFrequencies::from_text(&text);
            let top = freqs.most_common(args.top);
            if is_json(&args.output) {
                let v = serde_json::json!({
                    "total_words": freqs.total(),
                    "distinct_words": freqs.distinct(),
                    "top": top,
                });
                println!("{v}");
            } else {
                print_top(&top);
            }
        }
        Commands::Count(args) => {
            let text = input::load_text(&args.source).await?;
            let word = args.word.trim();
            let n = occurrence_count(&text, word);
            if is_json(&args.output) {
                println!("{}", serde_json::json!({ "word": word, "count": n }));
            } else {
                println!("'{word}' occurs {n} time(s)");
            }
        }
        Commands::Contexts(args) => {
            let text = input::load_text(&args.source).await?;
            let (q, out) = context_query(&args.word, &args.window);
            let report = find_and_write(&text, &q, &out)?;
            if is_json(&args.output) {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Scrape(args) => {
            let text = input::page_text(
                &args.url,
                Some((args.start_anchor.as_str(), args.end_anchor.as_str())),
                &args.fetch,
            )
            .await
            .with_context(|| {
                format!(
                    "extract #{}..#{} from {}",
                    args.start_anchor, args.end_anchor, args.url
                )
            })?;
            tracing::info!(chars = text.chars().count(), "section text extracted");

            let freqs = WordFrequencies::from_text(&text);
            let mut report = ScrapeReport {
                url: args.url.clone(),
                text_chars: text.chars().count(),
                total_words: freqs.total(),
                distinct_words: freqs.distinct(),
                top: freqs.most_common(args.top),
                occurrences: None,
                contexts: None,
            };
            if let Some(word) = args.word.as_deref().filter(|w| !w.trim().is_empty()) {
                report.occurrences = Some(occurrence_count(&text, word.trim()));
                let (q, out) = context_query(word, &args.window);
                report.contexts = Some(find_and_write(&text, &q, &out)?);
            }

            if is_json(&args.output) {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("Top {} words:", args.top);
                print_top(&report.top);
                if let (Some(n), Some(ctx)) = (report.occurrences, &report.contexts) {
                    println!("\n'{}' occurs {n} time(s)\n", ctx.word);
                    print_report(ctx);
                }
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "wordlens",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("wordlens {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }

    Ok(())
}
