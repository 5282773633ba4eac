//! Downloader for the decorative banner image. The session manager calls
//! this when a session has no fresh cached image; the renderer validates
//! the bytes again when decoding.

use crate::error::PulseErr;
use crate::error::Result;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Magic-number sniff for the formats the renderer can decode. A rejected
/// body is treated like a failed download so nothing bogus is cached.
fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(&[0xff, 0xd8, 0xff])
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
}

pub struct WaifuFetcher {
    client: reqwest::Client,
    source_url: String,
}

impl WaifuFetcher {
    pub fn new(source_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, source_url }
    }

    /// Fetch one image for `category`. The source endpoint takes the
    /// category as a query parameter and answers with the raw image body.
    pub async fn fetch(&self, category: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.source_url)
            .query(&[("category", category)])
            .send()
            .await
            .map_err(|err| PulseErr::CollectorTransient {
                collector: "waifu".to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PulseErr::CollectorTransient {
                collector: "waifu".to_string(),
                message: format!("HTTP {status}"),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| PulseErr::CollectorTransient {
                collector: "waifu".to_string(),
                message: err.to_string(),
            })?;
        if !looks_like_image(&bytes) {
            return Err(PulseErr::CollectorParse {
                collector: "waifu".to_string(),
                message: "response body is not a PNG, JPEG, or GIF".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::method;
    use wiremock::matchers::query_param;

    const TINY_PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0, 0, 13,
    ];

    #[tokio::test]
    async fn fetches_image_bytes_for_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("category", "scenery"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(TINY_PNG))
            .mount(&server)
            .await;

        let fetcher = WaifuFetcher::new(server.uri());
        let bytes = fetcher.fetch("scenery").await.expect("fetch");
        assert_eq!(bytes, TINY_PNG);
    }

    #[tokio::test]
    async fn http_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = WaifuFetcher::new(server.uri());
        let err = fetcher.fetch("scenery").await.expect_err("should fail");
        assert!(matches!(err, PulseErr::CollectorTransient { .. }));
    }

    #[tokio::test]
    async fn non_image_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let fetcher = WaifuFetcher::new(server.uri());
        let err = fetcher.fetch("scenery").await.expect_err("should fail");
        assert!(matches!(err, PulseErr::CollectorParse { .. }));
    }
}
