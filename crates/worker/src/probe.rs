//! HTTP implementation of the photo reachability probe.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use sportsfest_core::validation::{PhotoProbe, ProbeError, ProbeResponse};

/// Sends a HEAD request with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpPhotoProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPhotoProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sportsfest-worker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl PhotoProbe for HttpPhotoProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let started = Instant::now();
        let response = self
            .client
            .head(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                } else {
                    ProbeError::Request(e.to_string())
                }
            })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::debug!(url, status = response.status().as_u16(), ?content_type, "Probed photo URL");

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let probe = HttpPhotoProbe::new(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback (discard) is closed on test machines.
        let result = probe.head("http://127.0.0.1:9/photo.jpg").await;
        assert_matches!(result, Err(ProbeError::Request(_) | ProbeError::Timeout { .. }));
    }
}
