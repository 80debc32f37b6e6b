//! Context windows around a target word.
//!
//! A context is the run of word tokens `[i - left_len, i + right_len]` around each token `i`
//! equal to the target, clipped to the token sequence it was found in. With
//! [`ContextQuery::cut_length`] that sequence is one sentence; otherwise it is the whole text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use wordlens_core::{ContextQuery, ContextReport, Error, Result};

use crate::textprep::{sentences, words};

fn windows_in(
    tokens: &[String],
    target: &str,
    left_len: usize,
    right_len: usize,
    out: &mut Vec<String>,
) {
    for (i, t) in tokens.iter().enumerate() {
        if t != target {
            continue;
        }
        let start = i.saturating_sub(left_len);
        let end = tokens.len().min(i.saturating_add(right_len).saturating_add(1));
        out.push(tokens[start..end].join(" "));
    }
}

/// Every context of `query.word` in `text`, in occurrence order.
pub fn find_contexts(text: &str, query: &ContextQuery) -> Vec<String> {
    let target = query.word.to_lowercase();
    let mut out = Vec::new();
    if query.cut_length {
        for sentence in sentences(text) {
            let tokens = words(sentence);
            windows_in(&tokens, &target, query.left_len, query.right_len, &mut out);
        }
    } else {
        windows_in(&words(text), &target, query.left_len, query.right_len, &mut out);
    }
    out
}

/// `<word>_contexts.txt` in the working directory.
pub fn default_output_path(word: &str) -> PathBuf {
    PathBuf::from(format!("{}_contexts.txt", word.trim()))
}

/// Create or truncate `path` and write one context per line.
pub fn write_contexts(path: &Path, contexts: &[String]) -> Result<()> {
    let out_err = |e: std::io::Error| Error::Output(format!("{}: {e}", path.display()));
    let mut w = BufWriter::new(File::create(path).map_err(out_err)?);
    for c in contexts {
        w.write_all(c.as_bytes()).map_err(out_err)?;
        w.write_all(b"\n").map_err(out_err)?;
    }
    w.flush().map_err(out_err)?;
    Ok(())
}

/// [`find_contexts`] followed by [`write_contexts`].
pub fn find_and_write(text: &str, query: &ContextQuery, path: &Path) -> Result<ContextReport> {
    let contexts = find_contexts(text, query);
    write_contexts(path, &contexts)?;
    tracing::info!(
        word = %query.word,
        count = contexts.len(),
        path = %path.display(),
        cut_length = query.cut_length,
        "contexts written"
    );
    Ok(ContextReport {
        word: query.word.to_lowercase(),
        count: contexts.len(),
        contexts,
        path: path.to_path_buf(),
    })
}
