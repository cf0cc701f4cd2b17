//! reqwest-backed [`Transport`] for native builds.

use crate::transport::{FetchError, Transport};
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("GET {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                return Err(FetchError::Transport(e.to_string()));
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!("Bad response status for {}: {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }
        response.text().await.map_err(|e| {
            warn!("Failed to read response body for {}: {}", url, e);
            FetchError::Body(e.to_string())
        })
    }
}
