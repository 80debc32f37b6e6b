use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("extract failed: {0}")]
    Extract(String),
    #[error("document index {index} out of range (collection has {len} documents)")]
    DocumentIndexOutOfRange { index: usize, len: usize },
    #[error("stop words: {0}")]
    StopWords(String),
    #[error("output failed: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// TF, IDF and their product for one word/document pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    /// Lower-cased query word.
    pub word: String,
    pub doc_index: usize,
    pub tf: f64,
    pub idf: f64,
    /// Zero when the word is a stop word and stop words were ignored.
    pub tf_idf: f64,
}

/// One entry of a word-frequency ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Parameters of a context-window search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextQuery {
    pub word: String,
    /// Words kept to the left of each occurrence.
    pub left_len: usize,
    /// Words kept to the right of each occurrence.
    pub right_len: usize,
    /// If true, windows never cross a sentence boundary.
    pub cut_length: bool,
}

impl ContextQuery {
    pub fn new(word: impl Into<String>, left_len: usize, right_len: usize) -> Self {
        Self {
            word: word.into(),
            left_len,
            right_len,
            cut_length: false,
        }
    }

    pub fn cut_at_sentences(mut self, cut_length: bool) -> Self {
        self.cut_length = cut_length;
        self
    }
}

/// Result of a context search that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextReport {
    /// Lower-cased target word.
    pub word: String,
    pub count: usize,
    pub contexts: Vec<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchCachePolicy {
    /// If true, allow reading from cache.
    pub read: bool,
    /// If true, allow writing to cache.
    pub write: bool,
    /// If set, cached entries older than this are treated as a miss.
    pub ttl_s: Option<u64>,
}

impl Default for FetchCachePolicy {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            ttl_s: None,
        }
    }
}

impl FetchCachePolicy {
    pub fn disabled() -> Self {
        Self {
            read: false,
            write: false,
            ttl_s: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Overrides the client-wide timeout when set.
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
    pub cache: FetchCachePolicy,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
            cache: FetchCachePolicy::default(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn parsed_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.url)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub source: FetchSource,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}
