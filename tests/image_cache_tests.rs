use std::fs;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use sales_chart::cache::{ImageCache, ImageCacheConfig, ImageFetcher, content_hash};
use sales_chart::{ChartError, FetchErrorKind};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct CountingFetcher {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingFetcher {
    fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(format!("image bytes for {url}").into_bytes())
    }
}

struct FailingFetcher;

impl ImageFetcher for FailingFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        Err(FetchErrorKind::Network("connection refused".to_owned()))
    }
}

fn dir_entry_count(dir: &TempDir) -> usize {
    fs::read_dir(dir.path()).expect("read dir").count()
}

#[test]
fn second_resolve_is_served_from_disk_without_fetching() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/thumb/B01.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(b"\xff\xd8\xff\xe0fake-jpeg")
        .expect(1)
        .create();
    let url = format!("{}/thumb/B01.jpg", server.url());

    let dir = TempDir::new().expect("temp dir");
    let cache = ImageCache::new(dir.path(), ImageCacheConfig::default()).expect("cache");

    let first = cache.resolve(&url).expect("first resolve");
    let second = cache.resolve(&url).expect("second resolve");

    mock.assert();
    assert_eq!(first, second);
    assert_eq!(first, dir.path().join(format!("{}.jpg", content_hash(&url))));
    assert_eq!(
        fs::read(&second).expect("cached file"),
        b"\xff\xd8\xff\xe0fake-jpeg"
    );
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.failures, 0);
}

#[test]
fn non_success_status_is_a_fetch_error_and_later_retry_succeeds() {
    let mut server = mockito::Server::new();
    let missing = server.mock("GET", "/thumb/X.jpg").with_status(404).create();
    let url = format!("{}/thumb/X.jpg", server.url());

    let dir = TempDir::new().expect("temp dir");
    let cache = ImageCache::new(dir.path(), ImageCacheConfig::default()).expect("cache");

    let err = cache.resolve(&url).expect_err("404 must fail");
    match err {
        ChartError::Fetch { url: failed, kind } => {
            assert_eq!(failed, url);
            assert_eq!(kind, FetchErrorKind::Status(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!cache.contains(&url));
    assert_eq!(dir_entry_count(&dir), 0);

    missing.remove();
    let found = server
        .mock("GET", "/thumb/X.jpg")
        .with_status(200)
        .with_body("png-bytes")
        .expect(1)
        .create();
    let path = cache.resolve(&url).expect("retry resolves");
    found.assert();
    assert_eq!(fs::read(path).expect("cached file"), b"png-bytes");
    assert_eq!(cache.stats().failures, 1);
}

#[test]
fn timed_out_fetch_leaves_no_file_behind() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        // Accept and never answer.
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(Duration::from_secs(5));
            drop(stream);
        }
    });

    let dir = TempDir::new().expect("temp dir");
    let config = ImageCacheConfig::default().with_timeout(Duration::from_millis(300));
    let cache = ImageCache::new(dir.path(), config).expect("cache");
    let url = format!("http://{addr}/slow.jpg");

    let err = cache.resolve(&url).expect_err("timeout must fail");
    assert!(matches!(
        err,
        ChartError::Fetch {
            kind: FetchErrorKind::Timeout,
            ..
        }
    ));
    assert!(!cache.cache_path(&url).exists());
    assert_eq!(dir_entry_count(&dir), 0);
}

#[test]
fn failed_fetch_is_not_remembered() {
    let dir = TempDir::new().expect("temp dir");
    let cache = ImageCache::with_fetcher(dir.path(), "jpg", FailingFetcher).expect("cache");
    let url = "https://img.example/down.jpg";

    for _ in 0..2 {
        let err = cache.resolve(url).expect_err("fetch fails");
        assert!(matches!(err, ChartError::Fetch { .. }));
    }
    assert_eq!(cache.stats().failures, 2);
    assert_eq!(cache.stats().misses, 2);
    assert_eq!(dir_entry_count(&dir), 0);
}

#[test]
fn cached_files_survive_a_new_cache_instance() {
    let dir = TempDir::new().expect("temp dir");
    let url = "https://img.example/persist.jpg";

    let first_fetcher = Arc::new(CountingFetcher::default());
    let first = ImageCache::with_fetcher(dir.path(), "jpg", Arc::clone(&first_fetcher))
        .expect("cache");
    let path = first.resolve(url).expect("resolve");
    assert_eq!(first_fetcher.calls(), 1);

    let second_fetcher = Arc::new(CountingFetcher::default());
    let second = ImageCache::with_fetcher(dir.path(), "jpg", Arc::clone(&second_fetcher))
        .expect("cache");
    assert!(second.contains(url));
    assert_eq!(second.resolve(url).expect("resolve"), path);
    assert_eq!(second_fetcher.calls(), 0);
}

#[test]
fn concurrent_resolves_of_one_url_fetch_once() {
    let dir = TempDir::new().expect("temp dir");
    let fetcher = Arc::new(CountingFetcher::with_delay(Duration::from_millis(50)));
    let cache = ImageCache::with_fetcher(dir.path(), "jpg", Arc::clone(&fetcher)).expect("cache");
    let url = "https://img.example/hot.jpg";

    let paths: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.resolve(url).expect("resolve")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .collect()
    });

    assert_eq!(fetcher.calls(), 1);
    assert!(paths.iter().all(|path| path == &paths[0]));
    assert_eq!(dir_entry_count(&dir), 1);
}

#[test]
fn concurrent_resolves_of_distinct_urls_fetch_each_once() {
    let dir = TempDir::new().expect("temp dir");
    let fetcher = Arc::new(CountingFetcher::with_delay(Duration::from_millis(20)));
    let cache = ImageCache::with_fetcher(dir.path(), "jpg", Arc::clone(&fetcher)).expect("cache");
    let urls: Vec<String> = (0..4)
        .map(|i| format!("https://img.example/{i}.jpg"))
        .collect();

    thread::scope(|scope| {
        for _ in 0..3 {
            for url in &urls {
                let cache = &cache;
                scope.spawn(move || cache.resolve(url).expect("resolve"));
            }
        }
    });

    assert_eq!(fetcher.calls(), 4);
    assert_eq!(dir_entry_count(&dir), 4);
    for url in &urls {
        let body = fs::read(cache.cache_path(url)).expect("cached file");
        assert_eq!(body, format!("image bytes for {url}").into_bytes());
    }
}

#[test]
fn prefetch_reports_each_outcome_in_order() {
    let dir = TempDir::new().expect("temp dir");
    let fetcher = Arc::new(CountingFetcher::default());
    let cache = ImageCache::with_fetcher(dir.path(), "png", Arc::clone(&fetcher)).expect("cache");
    let urls = [
        "https://img.example/a.png",
        "https://img.example/b.png",
        "https://img.example/a.png",
    ];

    let outcomes = cache.prefetch(&urls);
    assert_eq!(outcomes.len(), 3);
    let paths: Vec<_> = outcomes
        .into_iter()
        .map(|outcome| outcome.expect("resolve"))
        .collect();
    assert_eq!(paths[0], paths[2]);
    assert!(paths[0].extension().is_some_and(|ext| ext == "png"));
    assert_eq!(fetcher.calls(), 2);
}

#[test]
fn invalid_extension_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    for extension in ["", "../jpg", "j.pg"] {
        assert!(ImageCache::with_fetcher(dir.path(), extension, FailingFetcher).is_err());
    }
}
