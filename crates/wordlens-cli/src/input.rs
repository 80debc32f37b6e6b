use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wordlens_core::{FetchCachePolicy, FetchRequest};
use wordlens_local::extract::{extract_section, html_to_text};
use wordlens_local::LocalFetcher;

/// Network and cache knobs shared by every command that can fetch a page.
#[derive(clap::Args, Debug, Clone)]
pub struct FetchArgs {
    /// Directory for cached page bodies (default: <user cache dir>/wordlens).
    #[arg(long, env = "WORDLENS_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
    /// Always hit the network and never write the cache.
    #[arg(long)]
    pub no_cache: bool,
    /// User-Agent header sent with every request.
    #[arg(long, env = "WORDLENS_USER_AGENT", default_value = wordlens_local::DEFAULT_USER_AGENT)]
    pub user_agent: String,
    /// Request timeout (ms).
    #[arg(long, env = "WORDLENS_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,
}

/// Where the analysed text comes from: a file, a URL, or stdin.
#[derive(clap::Args, Debug, Clone)]
pub struct TextSourceArgs {
    /// Read the text from this file.
    #[arg(long, conflicts_with = "url")]
    pub text_file: Option<PathBuf>,
    /// Fetch the text from this URL.
    #[arg(long)]
    pub url: Option<String>,
    /// With --url: keep only the text after the element with this id.
    #[arg(long)]
    pub start_anchor: Option<String>,
    /// With --url: stop at the element with this id.
    #[arg(long)]
    pub end_anchor: Option<String>,
    #[command(flatten)]
    pub fetch: FetchArgs,
}

pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wordlens")
}

pub fn fetcher(args: &FetchArgs) -> Result<LocalFetcher> {
    let cache_dir = if args.no_cache {
        None
    } else {
        Some(args.cache_dir.clone().unwrap_or_else(default_cache_dir))
    };
    Ok(LocalFetcher::with_options(
        cache_dir,
        &args.user_agent,
        Duration::from_millis(args.timeout_ms),
    )?)
}

pub fn fetch_request(url: &str, args: &FetchArgs) -> FetchRequest {
    let mut req = FetchRequest::new(url);
    req.timeout_ms = Some(args.timeout_ms);
    if args.no_cache {
        req.cache = FetchCachePolicy::disabled();
    }
    req
}

/// Fetch `url` and reduce it to plain text: the anchored section when both anchors are given,
/// otherwise the whole page.
pub async fn page_text(
    url: &str,
    anchors: Option<(&str, &str)>,
    args: &FetchArgs,
) -> Result<String> {
    let html = fetcher(args)?
        .fetch_text(&fetch_request(url, args))
        .await
        .with_context(|| format!("download {url}"))?;
    match anchors {
        Some((start, end)) => Ok(extract_section(&html, start, end)?),
        None => Ok(html_to_text(&html)),
    }
}

pub async fn load_text(src: &TextSourceArgs) -> Result<String> {
    let anchors = match (&src.start_anchor, &src.end_anchor) {
        (Some(s), Some(e)) => Some((s.as_str(), e.as_str())),
        (None, None) => None,
        _ => anyhow::bail!("--start-anchor and --end-anchor must be given together"),
    };
    if let Some(p) = &src.text_file {
        if anchors.is_some() {
            anyhow::bail!("--start-anchor/--end-anchor only apply to --url");
        }
        return fs::read_to_string(p).with_context(|| format!("read {}", p.display()));
    }
    if let Some(url) = &src.url {
        return page_text(url, anchors, &src.fetch).await;
    }
    if anchors.is_some() {
        anyhow::bail!("--start-anchor/--end-anchor only apply to --url");
    }
    let mut s = String::new();
    std::io::stdin()
        .read_to_string(&mut s)
        .context("read text from stdin")?;
    Ok(s)
}

/// Validate TF-IDF input documents: at least one, each with at least two words.
pub fn check_documents(docs: Vec<String>) -> Result<Vec<String>> {
    if docs.is_empty() {
        anyhow::bail!("no documents given (use --doc, --docs-file, or one document per stdin line)");
    }
    for (i, d) in docs.iter().enumerate() {
        if d.split_whitespace().count() < 2 {
            anyhow::bail!("document {i} must contain at least two words: {d:?}");
        }
    }
    Ok(docs)
}

/// Non-blank lines of a documents file, trimmed.
fn read_doc_lines(path: &Path) -> Result<Vec<String>> {
    let txt = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(txt
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Lines up to the first blank line or EOF.
pub fn read_docs_until_blank(r: impl BufRead) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in r.lines() {
        let line = line.context("read documents from stdin")?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        out.push(line.to_string());
    }
    Ok(out)
}

pub fn load_documents(files: &[PathBuf], inline: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for p in files {
        out.extend(read_doc_lines(p)?);
    }
    out.extend(inline.iter().map(|d| d.trim().to_string()));
    if files.is_empty() && inline.is_empty() {
        out = read_docs_until_blank(std::io::stdin().lock())?;
    }
    check_documents(out)
}
