use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::error::{ChartError, ChartResult, FetchErrorKind};

/// Source of image bytes for cache misses.
///
/// Implementations must be shareable across threads because the cache
/// resolves different URLs concurrently.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind>;
}

impl<F: ImageFetcher + ?Sized> ImageFetcher for Arc<F> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP GET with a bounded timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> ChartResult<Self> {
        if timeout.is_zero() {
            return Err(ChartError::InvalidData(
                "image fetch timeout must be > 0".to_owned(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChartError::InvalidData(format!("reqwest client error: {e}")))?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(classify_reqwest_error)?;
        let body = response.bytes().map_err(classify_reqwest_error)?;
        trace!(url, bytes = body.len(), "fetched image");
        Ok(body.to_vec())
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Timeout
    } else if let Some(status) = err.status() {
        FetchErrorKind::Status(status.as_u16())
    } else {
        FetchErrorKind::Network(err.to_string())
    }
}
