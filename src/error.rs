use std::io;

use reqwest::StatusCode;
use thiserror::Error;

use crate::network::{DiskError, VkError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading {0}: {1}")]
    ReadErr(String, #[source] io::Error),

    #[error("Error parsing {0}: {1}")]
    ParseErr(String, #[source] toml::de::Error),

    #[error("Error reading answer from stdin: {0}")]
    StdinErr(#[source] io::Error),

    #[error("No value given for {0}")]
    MissingErr(&'static str),
}

/// Failures talking to the VK or Yandex Disk APIs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error building request client: {0}")]
    ClientErr(#[source] reqwest::Error),

    #[error("Error constructing request header: {0}")]
    HeaderErr(#[source] reqwest::header::InvalidHeaderValue),

    #[error("Error sending request to {0}: {1}")]
    RequestErr(String, #[source] reqwest::Error),

    #[error("Error reading response text for {0}: {1}")]
    ResponseTextErr(String, #[source] reqwest::Error),

    #[error("Error parsing json for {0}: {1}")]
    ResponseJsonErr(String, #[source] serde_json::Error),

    #[error("Unexpected status {1} from {0}")]
    StatusErr(String, StatusCode),

    #[error("Empty response from {0}")]
    EmptyResponseErr(String),

    #[error("VK error: {0}")]
    VkErr(VkError),

    #[error("Yandex Disk error: {0}")]
    DiskErr(DiskError),

    #[error("Malformed handle {0:?}")]
    MalformedHandle(String),

    #[error("No account matches {0:?}")]
    NotFound(String),
}

/// Per-photo transfer failures.
///
/// Most of these only cost the current photo. Transport and local file
/// errors while moving bytes abort the run, see [`TransferError::is_fatal`].
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Photo {0} has no size variants")]
    NoSizesErr(i64),

    #[error("Upload of {0} refused: {1}")]
    GrantErr(String, #[source] ApiError),

    #[error("Unexpected status {1} from {0}")]
    StatusErr(String, StatusCode),

    #[error("Error transferring {0}: {1}")]
    StreamErr(String, #[source] reqwest::Error),

    #[error("Error accessing {0}: {1}")]
    FileErr(String, #[source] io::Error),

    #[error("Destination name {0} is already used in this run")]
    NameCollision(String),
}

impl TransferError {
    /// Whether this error should stop the whole batch instead of just
    /// skipping the current photo.
    pub fn is_fatal(&self) -> bool {
        match self {
            TransferError::NoSizesErr(_) => false,
            TransferError::GrantErr(..) => false,
            TransferError::StatusErr(..) => false,
            TransferError::StreamErr(..) => true,
            TransferError::FileErr(..) => true,
            TransferError::NameCollision(_) => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error setting up {0} client: {1}")]
    ClientErr(&'static str, #[source] ApiError),

    #[error("Could not resolve VK user {0}: {1}")]
    ResolveErr(String, #[source] ApiError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Error writing manifest {0}: {1}")]
    ManifestErr(String, #[source] io::Error),
}
