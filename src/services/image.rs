//! Pass-through [`ImageProxy`]: fetches the bytes, does not transcode.

use super::{ImageProxy, ServiceError};
use crate::scraper::{Fetch, HttpClient};
use tracing::debug;

/// Encoded image and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct HttpImageProxy<F: Fetch = HttpClient> {
    fetch: F,
}

impl<F: Fetch> HttpImageProxy<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F: Fetch> ImageProxy for HttpImageProxy<F> {
    /// `width` is accepted for interface compatibility; resizing happens elsewhere.
    fn fetch(&self, url: &str, width: u32) -> Result<ImageBytes, ServiceError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ServiceError::RelativeUrl {
                url: url.to_string(),
            });
        }
        let (bytes, content_type) = self.fetch.get_bytes(url, "image")?;
        debug!(url, width, bytes = bytes.len(), "proxied image");
        let content_type = if content_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            content_type
        };
        Ok(ImageBytes {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::stub::StubFetch;

    #[test]
    fn rejects_relative_urls() {
        let proxy = HttpImageProxy::new(StubFetch::new());
        assert!(matches!(
            proxy.fetch("/uploads/a.jpg", 300),
            Err(ServiceError::RelativeUrl { .. })
        ));
    }

    #[test]
    fn returns_bytes_and_type() -> Result<(), ServiceError> {
        let stub = StubFetch::new().with("https://img.example/a.jpg", "JPEGDATA");
        let proxy = HttpImageProxy::new(stub);
        let image = proxy.fetch("https://img.example/a.jpg", 300)?;
        assert_eq!(image.bytes, b"JPEGDATA".to_vec());
        assert_eq!(image.content_type, "image/jpeg");
        Ok(())
    }

    #[test]
    fn upstream_failure_is_wrapped() {
        let stub = StubFetch::new().with_status("https://img.example/x.jpg", 404);
        let proxy = HttpImageProxy::new(stub);
        assert!(matches!(
            proxy.fetch("https://img.example/x.jpg", 0),
            Err(ServiceError::Upstream(_))
        ));
    }
}
