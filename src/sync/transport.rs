//! Record delivery to the remote endpoint

use crate::core::validation::validate_base_url;
use crate::store::ScanRecord;
use crate::sync::error::{NetworkError, SyncTransportResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Path joined onto the base URL for record uploads
pub const SYNC_ENDPOINT_PATH: &str = "codigos";

/// Default per-request timeout for the HTTP transport
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// JSON body sent for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPayload {
    pub data: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub timestamp: i64,
}

impl From<&ScanRecord> for SyncPayload {
    fn from(record: &ScanRecord) -> Self {
        Self {
            data: record.data.clone(),
            type_tag: record.type_tag.clone(),
            timestamp: record.created_at,
        }
    }
}

/// Delivers one record per call
///
/// Implementations do not retry; the coordinator decides what a failure means
/// for the rest of the batch.
#[async_trait]
pub trait RecordTransport: Send + Sync {
    async fn send(&self, payload: &SyncPayload) -> SyncTransportResult<()>;
}

/// `POST {base_url}/codigos` with a JSON body
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> SyncTransportResult<Self> {
        let endpoint = endpoint_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Client {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

pub(crate) fn endpoint_url(base_url: &str) -> SyncTransportResult<Url> {
    let base = validate_base_url(base_url).map_err(|e| NetworkError::Client {
        message: e.message().to_string(),
    })?;
    base.join(SYNC_ENDPOINT_PATH)
        .map_err(|e| NetworkError::Client {
            message: format!("Cannot build sync endpoint from '{}': {}", base_url, e),
        })
}

#[async_trait]
impl RecordTransport for HttpTransport {
    async fn send(&self, payload: &SyncPayload) -> SyncTransportResult<()> {
        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| NetworkError::Request {
                url: self.endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: self.endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
