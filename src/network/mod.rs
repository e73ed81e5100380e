use async_trait::async_trait;
use futures::stream::StreamExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{ApiError, TransferError};

pub use crate::network::disk::Disk;
pub use crate::network::network_structs::*;
pub use crate::network::vk::Vk;

mod disk;
mod network_structs;
mod urls;
mod vk;

/// The social network side: account lookup, profile listing and fetching
/// the photo bytes.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Resolve a screen name to its numeric account id.
    async fn lookup_handle(&self, handle: &str) -> Result<i64, ApiError>;

    /// First page of the account's profile album.
    async fn profile_photos(&self, owner_id: i64) -> Result<Vec<Photo>, ApiError>;

    /// Stream `url` into a local file at `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), TransferError>;
}

/// The cloud storage side.
#[async_trait]
pub trait CloudDrive: Send + Sync {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ApiError>;

    /// Ask for a writable target for `path`.
    async fn upload_link(&self, path: &str, overwrite: bool) -> Result<UploadLink, ApiError>;

    /// Send the contents of `file` to a previously granted target.
    async fn put_file(&self, link: &UploadLink, file: &Path) -> Result<(), TransferError>;
}

/// Write a response body to `save_path` chunk by chunk.
async fn save_body(resp: reqwest::Response, save_path: &Path) -> Result<(), TransferError> {
    let path_str = save_path.display().to_string();
    let mut buffer = File::create(save_path)
        .await
        .map_err(|e| TransferError::FileErr(path_str.clone(), e))?;

    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransferError::StreamErr(path_str.clone(), e.without_url()))?;
        buffer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::FileErr(path_str.clone(), e))?;
    }
    buffer
        .flush()
        .await
        .map_err(|e| TransferError::FileErr(path_str, e))
}
