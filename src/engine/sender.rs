//! Batch delivery to the aggregator: JSON array, gzip, `POST /files`, expect 204.

use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, info};
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;

use crate::FileRecord;

/// Why a batch did not reach the aggregator. Logged by the sender stage; the batch is then dropped.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode batch: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to compress batch: {0}")]
    Compress(#[from] io::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("http error: {0}")]
    Transport(String),
}

/// Destination for completed batches. Called from the single sender thread, one batch at a time.
pub trait BatchSink: Send + Sync {
    fn send_batch(&self, batch: &[FileRecord]) -> Result<(), DeliveryError>;
}

/// Serialize `batch` as a JSON array and gzip it.
pub fn encode_batch(batch: &[FileRecord]) -> Result<Vec<u8>, DeliveryError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, batch)?;
    encoder.write_all(b"\n")?;
    Ok(encoder.finish()?)
}

/// Blocking HTTP sink for the aggregator's ingestion endpoint.
pub struct HttpBatchSink {
    url: String,
    agent: ureq::Agent,
}

impl HttpBatchSink {
    /// `url` is the full endpoint, e.g. `http://host:8080/files`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            url: url.into(),
            agent,
        }
    }
}

impl BatchSink for HttpBatchSink {
    fn send_batch(&self, batch: &[FileRecord]) -> Result<(), DeliveryError> {
        info!("Sending batch of {} files", batch.len());
        let body = encode_batch(batch)?;
        debug!("Batch payload: {} bytes gzip'd", body.len());

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .set("Content-Encoding", "gzip")
            .send_bytes(&body);

        match response {
            Ok(resp) if resp.status() == 204 => {
                info!("Batch sent successfully");
                Ok(())
            }
            Ok(resp) => Err(DeliveryError::Status(resp.status())),
            Err(ureq::Error::Status(code, _)) => Err(DeliveryError::Status(code)),
            Err(ureq::Error::Transport(t)) => Err(DeliveryError::Transport(t.to_string())),
        }
    }
}
