//! Dataset loading with a fetch-once, in-memory cache.
//!
//! The first successful `ensure_loaded` call fetches the document with caching
//! disabled and stores it; every later call returns the stored dataset. A failed
//! fetch leaves the cache empty so the next call tries again.

use crate::dataset::Dataset;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Request timeout for HTTP dataset sources.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to obtain the dataset. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Unable to load student data (server responded with status {status}).")]
    Status { status: u16 },

    #[error("Unable to load student data: {message}")]
    Transport { message: String },

    #[error("Unable to read student data from {path}: {message}")]
    Read { path: String, message: String },

    #[error("Student data is not in the expected format: {message}")]
    Parse { message: String },
}

/// Something that can produce the raw dataset document.
pub trait DatasetFetcher: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, LoadError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// GET over HTTP(S), bypassing any intermediate caches.
pub struct HttpFetcher {
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl DatasetFetcher for HttpFetcher {
    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        // Built per fetch: the blocking client must live on the calling thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Transport {
                message: e.to_string(),
            })?;

        let resp = client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .map_err(|e| LoadError::Transport {
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| LoadError::Transport {
                message: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from a local file.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetFetcher for FileFetcher {
    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        std::fs::read(&self.path).map_err(|e| LoadError::Read {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Where the dataset document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Http(String),
    File(PathBuf),
}

impl DatasetSource {
    /// `http://` and `https://` locations are fetched; anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Http(trimmed.to_string())
        } else {
            DatasetSource::File(Path::new(trimmed).to_path_buf())
        }
    }

    pub fn into_fetcher(self) -> Box<dyn DatasetFetcher> {
        match self {
            DatasetSource::Http(url) => Box::new(HttpFetcher::new(url)),
            DatasetSource::File(path) => Box::new(FileFetcher::new(path)),
        }
    }
}

/// Session cache: created empty, filled at most once, read thereafter.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slot: Option<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.slot.clone()
    }

    fn fill(&mut self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        self.slot = Some(dataset.clone());
        dataset
    }
}

/// Whether `ensure_loaded` performed the fetch or reused the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This call fetched and cached the dataset. Render the leaderboard.
    Fresh,
    Cached,
}

/// A resolved dataset plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Arc<Dataset>,
    pub outcome: LoadOutcome,
}

/// Owns the fetcher and the session cache.
pub struct DatasetLoader {
    fetcher: Box<dyn DatasetFetcher>,
    cache: Mutex<DatasetCache>,
}

impl DatasetLoader {
    pub fn new(fetcher: Box<dyn DatasetFetcher>) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(DatasetCache::default()),
        }
    }

    pub fn from_source(source: DatasetSource) -> Self {
        Self::new(source.into_fetcher())
    }

    /// Return the cached dataset, fetching it first if this session has none.
    ///
    /// The cache lock is held across the fetch, so concurrent first callers
    /// wait for one shared fetch instead of issuing their own.
    pub fn ensure_loaded(&self) -> Result<Loaded, LoadError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(dataset) = cache.get() {
            return Ok(Loaded {
                dataset,
                outcome: LoadOutcome::Cached,
            });
        }

        log::info!("Loading student data from {}", self.fetcher.describe());
        let bytes = self.fetcher.fetch().map_err(|e| {
            log::warn!("Student data load failed: {}", e);
            e
        })?;
        let dataset = Dataset::from_json(&bytes).map_err(|e| {
            log::warn!("Student data parse failed: {}", e);
            LoadError::Parse {
                message: e.to_string(),
            }
        })?;
        log::info!("Loaded {} student records", dataset.len());

        Ok(Loaded {
            dataset: cache.fill(dataset),
            outcome: LoadOutcome::Fresh,
        })
    }

    /// The cached dataset, if any, without triggering a fetch.
    #[cfg(test)]
    fn cached(&self) -> Option<Arc<Dataset>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).get()
    }
}

/// Run `ensure_loaded` on a worker thread and resolve with its result.
///
/// Keeps the blocking fetch off the async executor driving the UI.
pub fn load_in_background(
    loader: Arc<DatasetLoader>,
) -> impl std::future::Future<Output = Result<Loaded, LoadError>> {
    let (tx, rx) = futures::channel::oneshot::channel();

    std::thread::spawn(move || {
        let _ = tx.send(loader.ensure_loaded());
    });

    async move {
        rx.await.unwrap_or_else(|_| {
            Err(LoadError::Transport {
                message: "loader thread stopped unexpectedly".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        body: Result<Vec<u8>, LoadError>,
    }

    impl DatasetFetcher for CountingFetcher {
        fn fetch(&self) -> Result<Vec<u8>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone()
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn loader_with(body: Result<Vec<u8>, LoadError>) -> (DatasetLoader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            body,
        };
        (DatasetLoader::new(Box::new(fetcher)), calls)
    }

    #[test]
    fn test_second_call_uses_cache() {
        let (loader, calls) = loader_with(Ok(br#"{"1": {"name": "A"}}"#.to_vec()));

        let first = loader.ensure_loaded().unwrap();
        assert_eq!(first.outcome, LoadOutcome::Fresh);
        let second = loader.ensure_loaded().unwrap();
        assert_eq!(second.outcome, LoadOutcome::Cached);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first.dataset, &second.dataset));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let (loader, calls) = loader_with(Err(LoadError::Status { status: 404 }));

        let err = loader.ensure_loaded().unwrap_err();
        assert_eq!(err, LoadError::Status { status: 404 });
        assert!(loader.cached().is_none());

        assert!(loader.ensure_loaded().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unparsable_body_is_parse_error() {
        let (loader, _) = loader_with(Ok(b"<html>oops</html>".to_vec()));
        match loader.ensure_loaded() {
            Err(LoadError::Parse { .. }) => {}
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_first_calls_share_one_fetch() {
        let (loader, calls) = loader_with(Ok(br#"{"1": {"name": "A"}}"#.to_vec()));
        let loader = Arc::new(loader);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                std::thread::spawn(move || loader.ensure_loaded().map(|l| l.outcome))
            })
            .collect();
        let outcomes: Vec<LoadOutcome> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let fresh = outcomes
            .iter()
            .filter(|o| **o == LoadOutcome::Fresh)
            .count();
        assert_eq!(fresh, 1);
    }

    #[test]
    fn test_background_load_resolves() {
        let (loader, calls) = loader_with(Ok(br#"{"9": {"name": "Z"}}"#.to_vec()));
        let loaded = futures::executor::block_on(load_in_background(Arc::new(loader))).unwrap();
        assert_eq!(loaded.dataset.get("9").unwrap().name, "Z");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            DatasetSource::parse("https://example.org/students.json"),
            DatasetSource::Http("https://example.org/students.json".to_string())
        );
        assert_eq!(
            DatasetSource::parse(" HTTP://host/s.json "),
            DatasetSource::Http("HTTP://host/s.json".to_string())
        );
        assert_eq!(
            DatasetSource::parse("data/students.json"),
            DatasetSource::File(PathBuf::from("data/students.json"))
        );
    }

    /// Serve `responses` one connection each, returning the raw requests.
    fn serve(responses: Vec<String>) -> (String, std::thread::JoinHandle<Vec<String>>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/students.json", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }
                requests.push(String::from_utf8_lossy(&raw).to_lowercase());
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            requests
        });

        (url, handle)
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    #[test]
    fn test_http_fetch_sends_no_cache_and_maps_status() {
        let (url, server) = serve(vec![
            http_response("404 Not Found", ""),
            http_response("200 OK", r#"{"1001": {"name": "A", "total": "300/500"}}"#),
        ]);
        let loader = DatasetLoader::new(Box::new(HttpFetcher::new(url)));

        assert_eq!(
            loader.ensure_loaded().unwrap_err(),
            LoadError::Status { status: 404 }
        );
        let loaded = loader.ensure_loaded().unwrap();
        assert_eq!(loaded.outcome, LoadOutcome::Fresh);
        assert_eq!(loaded.dataset.get("1001").unwrap().name, "A");

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert!(request.starts_with("get /students.json"));
            assert!(request.contains("cache-control: no-store"));
            assert!(request.contains("pragma: no-cache"));
        }
    }

    #[test]
    fn test_file_fetcher_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FileFetcher::new(dir.path().join("absent.json"));
        match fetcher.fetch() {
            Err(LoadError::Read { path, .. }) => assert!(path.ends_with("absent.json")),
            other => panic!("expected read error, got {:?}", other),
        }
    }
}
