//! Inbound photo handling.
//!
//! Telegram photo messages carry file ids, not bytes; the actual image is
//! fetched in two steps: `getFile` resolves the id to a path, then the file
//! endpoint serves the bytes. Telegram re-encodes photos as JPEG.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SendError};
use crate::send::TelegramSender;

/// Photos above this size are skipped rather than downloaded.
pub const MAX_PHOTO_BYTES: u64 = 20 * 1024 * 1024;

/// Media download seam — mocked in dispatcher tests.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download a file by its Telegram file id.
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>>;
}

#[derive(Deserialize)]
struct GetFileResponse {
    result: FileInfo,
}

#[derive(Deserialize)]
struct FileInfo {
    file_path: String,
    #[serde(default)]
    file_size: Option<u64>,
}

#[async_trait]
impl MediaFetcher for TelegramSender {
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let token = self.token()?;

        let url = format!(
            "{}/bot{}/getFile?file_id={}",
            self.api_base, token, file_id
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(SendError::from_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SendError::Rejected {
                status: status.as_u16(),
                description: "getFile failed".to_string(),
            });
        }
        let info: GetFileResponse = resp
            .json()
            .await
            .map_err(SendError::from_transport)?;

        if let Some(size) = info.result.file_size {
            size_guard(size)?;
        }

        let file_url = format!(
            "{}/file/bot{}/{}",
            self.api_base, token, info.result.file_path
        );
        let bytes = self
            .http
            .get(&file_url)
            .send()
            .await
            .map_err(SendError::from_transport)?
            .bytes()
            .await
            .map_err(SendError::from_transport)?;

        // getFile may omit file_size; the downloaded body is capped either way.
        size_guard(bytes.len() as u64)?;

        debug!(file_id, bytes = bytes.len(), "photo downloaded");
        Ok(bytes.to_vec())
    }
}

fn size_guard(len: u64) -> Result<()> {
    if len > MAX_PHOTO_BYTES {
        return Err(SendError::Rejected {
            status: 413,
            description: "file exceeds size limit".to_string(),
        });
    }
    Ok(())
}
