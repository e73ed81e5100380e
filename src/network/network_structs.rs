use serde::Deserialize;
use std::fmt;

/// Every VK method answers with either `response` or `error`.
#[derive(Debug, Deserialize)]
pub struct VkEnvelope<T> {
    pub response: Option<T>,
    pub error: Option<VkError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VkError {
    pub error_code: i64,
    pub error_msg: String,
}

impl fmt::Display for VkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error_msg, self.error_code)
    }
}

#[derive(Debug, Deserialize)]
pub struct VkUser {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoList {
    pub count: i64,
    pub items: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
    pub likes: Option<Likes>,
}

impl Photo {
    pub fn likes_count(&self) -> Option<i64> {
        self.likes.as_ref().map(|l| l.count)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoSize {
    #[serde(rename = "type", default)]
    pub size_type: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoSize {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Likes {
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadLink {
    pub href: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiskError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub error: String,
}

impl DiskError {
    /// An empty body deserializes into an all-default `DiskError`.
    pub fn is_payload(&self) -> bool {
        !self.error.is_empty() || !self.message.is_empty()
    }
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), self.description.is_empty()) {
            (false, _) => write!(f, "{}", self.message),
            (true, false) => write!(f, "{}", self.description),
            (true, true) => write!(f, "Unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UploadResp {
    Link(UploadLink),
    Error(DiskError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}
