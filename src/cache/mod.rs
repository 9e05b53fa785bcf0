mod fetcher;
mod image_cache;

pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use image_cache::{ImageCache, ImageCacheConfig, ImageCacheStats, content_hash};
