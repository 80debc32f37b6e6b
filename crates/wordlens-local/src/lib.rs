use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wordlens_core::{Error, FetchBackend, FetchRequest, FetchResponse, FetchSource, Result};

pub mod contexts;
pub mod extract;
pub mod frequency;
pub mod stopwords;
pub mod textprep;
pub mod tfidf;

pub use contexts::{default_output_path, find_and_write, find_contexts, write_contexts};
pub use frequency::{occurrence_count, WordFrequencies};
pub use stopwords::StopWords;
pub use tfidf::{IdfOptions, TfIdf};

/// User agent sent unless the caller picks another one. Some hosts refuse library defaults.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn now_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    schema_version: u32,
    fetched_at_epoch_s: u64,
    url: String,
    final_url: String,
    status: u16,
    content_type: Option<String>,
    truncated: bool,
}

/// Response bodies on disk, keyed by url + body cap.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_for_fetch(req: &FetchRequest) -> String {
        let mut h = Sha256::new();
        h.update(b"url:");
        h.update(req.url.as_bytes());
        h.update(b"\nmax_bytes:");
        match req.max_bytes {
            Some(n) => h.update(n.to_string().as_bytes()),
            None => h.update(b"none"),
        }
        hex::encode(h.finalize())
    }

    fn paths(&self, key: &str) -> (PathBuf, PathBuf) {
        let dir = self.root.join(&key[0..2]);
        (dir.join(format!("{key}.json")), dir.join(format!("{key}.bin")))
    }

    pub fn get(&self, req: &FetchRequest) -> Result<Option<FetchResponse>> {
        if !req.cache.read {
            return Ok(None);
        }
        let (meta_p, body_p) = self.paths(&Self::key_for_fetch(req));
        if !meta_p.exists() || !body_p.exists() {
            return Ok(None);
        }
        let meta_bytes = fs::read(&meta_p).map_err(|e| Error::Cache(e.to_string()))?;
        let meta: CacheMeta =
            serde_json::from_slice(&meta_bytes).map_err(|e| Error::Cache(e.to_string()))?;
        if let Some(ttl_s) = req.cache.ttl_s {
            if now_epoch_s().saturating_sub(meta.fetched_at_epoch_s) > ttl_s {
                tracing::debug!(url = %req.url, "cache entry expired");
                return Ok(None);
            }
        }
        let bytes = fs::read(&body_p).map_err(|e| Error::Cache(e.to_string()))?;
        Ok(Some(FetchResponse {
            url: meta.url,
            final_url: meta.final_url,
            status: meta.status,
            content_type: meta.content_type,
            bytes,
            truncated: meta.truncated,
            source: FetchSource::Cache,
        }))
    }

    pub fn put(&self, req: &FetchRequest, resp: &FetchResponse) -> Result<()> {
        if !req.cache.write {
            return Ok(());
        }
        let (meta_p, body_p) = self.paths(&Self::key_for_fetch(req));
        if let Some(parent) = meta_p.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Cache(e.to_string()))?;
        }
        let meta = CacheMeta {
            schema_version: 1,
            fetched_at_epoch_s: now_epoch_s(),
            url: resp.url.clone(),
            final_url: resp.final_url.clone(),
            status: resp.status,
            content_type: resp.content_type.clone(),
            truncated: resp.truncated,
        };
        // Body first: a meta file without its body is never observed as a hit.
        fs::write(&body_p, &resp.bytes).map_err(|e| Error::Cache(e.to_string()))?;
        fs::write(
            &meta_p,
            serde_json::to_vec(&meta).map_err(|e| Error::Cache(e.to_string()))?,
        )
        .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
    cache: Option<FsCache>,
}

impl LocalFetcher {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        Self::with_options(cache_dir, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        cache_dir: Option<PathBuf>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        let cache = cache_dir.map(FsCache::new);
        Ok(Self { client, cache })
    }

    /// Fetch `url` and decode the body as (lossy) UTF-8.
    pub async fn fetch_text(&self, req: &FetchRequest) -> Result<String> {
        Ok(self.fetch(req).await?.text_lossy())
    }
}

impl LocalFetcher {
    /// Cached copy of `req`, looked up off the async runtime.
    async fn lookup(&self, req: &FetchRequest) -> Result<Option<FetchResponse>> {
        let Some(cache) = self.cache.clone() else {
            return Ok(None);
        };
        let req = req.clone();
        tokio::task::spawn_blocking(move || cache.get(&req))
            .await
            .map_err(|e| Error::Cache(format!("cache lookup task failed: {e}")))?
    }

    async fn store(&self, req: &FetchRequest, resp: &FetchResponse) -> Result<()> {
        let Some(cache) = self.cache.clone() else {
            return Ok(());
        };
        let (req, resp) = (req.clone(), resp.clone());
        tokio::task::spawn_blocking(move || cache.put(&req, &resp))
            .await
            .map_err(|e| Error::Cache(format!("cache store task failed: {e}")))?
    }

    /// GET `req.url`, failing on non-2xx and keeping at most `req.max_bytes` of the body.
    async fn download(&self, req: &FetchRequest) -> Result<FetchResponse> {
        use futures_util::StreamExt;

        let url = req.parsed_url()?;
        tracing::info!(url = %url, "fetching");
        let mut rb = self.client.get(url);
        if let Some(to) = req.timeout() {
            rb = rb.timeout(to);
        }
        let resp = rb.send().await.map_err(|e| Error::Fetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "http status {} for {}",
                status.as_u16(),
                req.url
            )));
        }
        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let cap = req.max_bytes.map_or(usize::MAX, |n| n as usize);
        let mut body = Vec::new();
        let mut truncated = false;
        let mut chunks = resp.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(e.to_string()))?;
            let room = cap - body.len();
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }
        if truncated {
            tracing::warn!(url = %req.url, cap, "response body truncated");
        }

        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            bytes: body,
            truncated,
            source: FetchSource::Network,
        })
    }
}

#[async_trait::async_trait]
impl FetchBackend for LocalFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        if let Some(hit) = self.lookup(req).await? {
            tracing::info!(url = %req.url, "served from cache");
            return Ok(hit);
        }
        let resp = self.download(req).await?;
        self.store(req, &resp).await?;
        Ok(resp)
    }
}
