use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use std::path::Path;
use tokio::fs::File;

use super::network_structs::*;
use super::urls::*;
use super::CloudDrive;
use crate::error::{ApiError, TransferError};

/// Yandex Disk REST client.
pub struct Disk {
    client: reqwest::Client,
    anon_client: reqwest::Client,
}

impl Disk {
    pub fn new(token: &str) -> Result<Disk, ApiError> {
        // create client with appropriate authorization header
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("OAuth {}", token))
            .map_err(ApiError::HeaderErr)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::ClientErr)?;

        // upload targets are pre-signed and live on a different host
        let anon_client = reqwest::Client::builder()
            .build()
            .map_err(ApiError::ClientErr)?;

        Ok(Disk {
            client,
            anon_client,
        })
    }
}

/// Yandex answers failures with a JSON description; fall back to the bare
/// status when the body is not one.
fn disk_error(url: &str, status: StatusCode, text: &str) -> ApiError {
    match serde_json::from_str::<DiskError>(text) {
        Ok(e) if e.is_payload() => ApiError::DiskErr(e),
        _ => ApiError::StatusErr(url.to_string(), status),
    }
}

/// 409 means the folder is already there.
fn folder_status(status: StatusCode) -> Option<FolderStatus> {
    match status {
        StatusCode::CREATED => Some(FolderStatus::Created),
        StatusCode::CONFLICT => Some(FolderStatus::AlreadyExists),
        _ => None,
    }
}

fn parse_upload_link(url: &str, status: StatusCode, text: &str) -> Result<UploadLink, ApiError> {
    match serde_json::from_str::<UploadResp>(text) {
        Ok(UploadResp::Link(link)) => Ok(link),
        Ok(UploadResp::Error(e)) if e.is_payload() => Err(ApiError::DiskErr(e)),
        Ok(UploadResp::Error(_)) => Err(ApiError::StatusErr(url.to_string(), status)),
        Err(_) if !status.is_success() => Err(ApiError::StatusErr(url.to_string(), status)),
        Err(e) => Err(ApiError::ResponseJsonErr(url.to_string(), e)),
    }
}

#[async_trait]
impl CloudDrive for Disk {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ApiError> {
        let url = DISK_RESOURCES;
        let resp = self
            .client
            .put(url)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| ApiError::RequestErr(url.to_string(), e))?;

        let status = resp.status();
        if let Some(folder) = folder_status(status) {
            return Ok(folder);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(disk_error(url, status, &text))
    }

    async fn upload_link(&self, path: &str, overwrite: bool) -> Result<UploadLink, ApiError> {
        let url = DISK_UPLOAD;
        let overwrite = if overwrite { "true" } else { "false" };
        let resp = self
            .client
            .get(url)
            .query(&[("path", path), ("overwrite", overwrite)])
            .send()
            .await
            .map_err(|e| ApiError::RequestErr(url.to_string(), e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::ResponseTextErr(url.to_string(), e))?;
        parse_upload_link(url, status, &text)
    }

    async fn put_file(&self, link: &UploadLink, file: &Path) -> Result<(), TransferError> {
        let path_str = file.display().to_string();
        let f = File::open(file)
            .await
            .map_err(|e| TransferError::FileErr(path_str.clone(), e))?;
        let len = f
            .metadata()
            .await
            .map_err(|e| TransferError::FileErr(path_str.clone(), e))?
            .len();

        let method = link
            .method
            .as_deref()
            .and_then(|m| Method::from_bytes(m.as_bytes()).ok())
            .unwrap_or(Method::PUT);
        let resp = self
            .anon_client
            .request(method, &link.href)
            .header(header::CONTENT_LENGTH, len)
            .body(f)
            .send()
            .await
            .map_err(|e| TransferError::StreamErr(path_str.clone(), e.without_url()))?;

        if !resp.status().is_success() {
            return Err(TransferError::StatusErr(path_str, resp.status()));
        }
        Ok(())
    }
}
