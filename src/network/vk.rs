use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;

use super::network_structs::*;
use super::urls::*;
use super::{save_body, PhotoSource};
use crate::error::{ApiError, TransferError};

/// VK API client. The access token travels as a query parameter, so request
/// errors are stripped of their URL before they are reported.
pub struct Vk {
    client: reqwest::Client,
    token: String,
    version: String,
}

impl Vk {
    pub fn new(token: &str, version: &str) -> Result<Vk, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(ApiError::ClientErr)?;

        Ok(Vk {
            client,
            token: token.to_owned(),
            version: version.to_owned(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let resp = self
            .client
            .get(url)
            .query(&[("access_token", self.token.as_str()), ("v", self.version.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::RequestErr(url.to_string(), e.without_url()))?;

        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::ResponseTextErr(url.to_string(), e.without_url()))?;
        unwrap_envelope(url, &text)
    }
}

fn unwrap_envelope<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, ApiError> {
    let envelope: VkEnvelope<T> =
        serde_json::from_str(text).map_err(|e| ApiError::ResponseJsonErr(url.to_string(), e))?;

    match envelope {
        VkEnvelope {
            response: Some(r), ..
        } => Ok(r),
        VkEnvelope { error: Some(e), .. } => Err(ApiError::VkErr(e)),
        _ => Err(ApiError::EmptyResponseErr(url.to_string())),
    }
}

#[async_trait]
impl PhotoSource for Vk {
    async fn lookup_handle(&self, handle: &str) -> Result<i64, ApiError> {
        let users: Vec<VkUser> = self.call(VK_USERS_GET, &[("user_ids", handle)]).await?;
        users
            .first()
            .map(|u| u.id)
            .ok_or_else(|| ApiError::NotFound(handle.to_string()))
    }

    async fn profile_photos(&self, owner_id: i64) -> Result<Vec<Photo>, ApiError> {
        // TODO: page through with `offset` once albums larger than the default
        // page size need to be backed up.
        let owner_id = owner_id.to_string();
        let list: PhotoList = self
            .call(
                VK_PHOTOS_GET,
                &[
                    ("owner_id", owner_id.as_str()),
                    ("album_id", "profile"),
                    ("photo_sizes", "1"),
                    ("extended", "1"),
                ],
            )
            .await?;
        tracing::debug!(
            "Profile album of {} holds {} photos, got {}",
            owner_id,
            list.count,
            list.items.len()
        );
        Ok(list.items)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), TransferError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::StreamErr(url.to_string(), e))?;

        if !resp.status().is_success() {
            return Err(TransferError::StatusErr(url.to_string(), resp.status()));
        }
        save_body(resp, dest).await
    }
}
