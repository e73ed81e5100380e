use regex::Regex;

use crate::error::ApiError;
use crate::network::{Photo, PhotoSize, PhotoSource};

lazy_static! {
    static ref NUMERIC_ID: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref SCREEN_NAME: Regex = Regex::new(r"^[A-Za-z0-9_.]+$").unwrap();
}

/// Map a user id or screen name to the numeric account id.
///
/// Numeric input is taken as-is without asking VK.
pub async fn resolve_account_id<S>(source: &S, ident: &str) -> Result<i64, ApiError>
where
    S: PhotoSource + ?Sized,
{
    let ident = ident.trim();
    if NUMERIC_ID.is_match(ident) {
        return ident
            .parse()
            .map_err(|_| ApiError::MalformedHandle(ident.to_string()));
    }
    if !SCREEN_NAME.is_match(ident) {
        return Err(ApiError::MalformedHandle(ident.to_string()));
    }

    match source.lookup_handle(ident).await {
        Ok(id) => {
            tracing::info!("Resolved {} to account {}", ident, id);
            Ok(id)
        }
        Err(e) => {
            tracing::error!("Error resolving {}: {}", ident, e);
            Err(e)
        }
    }
}

/// Photos of the profile album. Errors are logged and yield no photos.
pub async fn list_profile_photos<S>(source: &S, owner_id: i64) -> Vec<Photo>
where
    S: PhotoSource + ?Sized,
{
    match source.profile_photos(owner_id).await {
        Ok(photos) => {
            tracing::info!("Found {} profile photos for {}", photos.len(), owner_id);
            photos
        }
        Err(e) => {
            tracing::error!("Error getting photos for {}: {}", owner_id, e);
            Vec::new()
        }
    }
}

/// The variant with the largest width×height. The first one wins a tie.
pub fn largest_size(photo: &Photo) -> Option<&PhotoSize> {
    photo.sizes.iter().fold(None, |best, size| match best {
        Some(b) if b.area() >= size.area() => Some(b),
        _ => Some(size),
    })
}

/// `{likes}.jpg`, or `{id}.jpg` when the listing carried no like count.
pub fn destination_name(photo: &Photo) -> String {
    match photo.likes_count() {
        Some(likes) => format!("{}.jpg", likes),
        None => format!("{}.jpg", photo.id),
    }
}
