//! In-memory stand-ins for VK and Yandex Disk.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{ApiError, TransferError};
use crate::network::{
    CloudDrive, DiskError, FolderStatus, Likes, Photo, PhotoSize, PhotoSource, UploadLink,
};

pub fn size(size_type: &str, width: u32, height: u32) -> PhotoSize {
    PhotoSize {
        size_type: size_type.to_string(),
        url: format!("https://sun9-1/{}.jpg", size_type),
        width,
        height,
    }
}

pub fn photo(id: i64, sizes: Vec<PhotoSize>, likes: Option<i64>) -> Photo {
    Photo {
        id,
        owner_id: 1,
        sizes,
        likes: likes.map(|count| Likes { count }),
    }
}

/// Downloads write the URL itself as the file body.
#[derive(Default)]
pub struct FakeSource {
    pub handles: HashMap<String, i64>,
    pub photos: Vec<Photo>,
    pub listing_fails: bool,
    pub missing_urls: HashSet<String>,
    pub lookups_log: Mutex<Vec<String>>,
    pub downloads_log: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups_log.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoSource for FakeSource {
    async fn lookup_handle(&self, handle: &str) -> Result<i64, ApiError> {
        self.lookups_log.lock().unwrap().push(handle.to_string());
        self.handles
            .get(handle)
            .copied()
            .ok_or_else(|| ApiError::NotFound(handle.to_string()))
    }

    async fn profile_photos(&self, _owner_id: i64) -> Result<Vec<Photo>, ApiError> {
        if self.listing_fails {
            return Err(ApiError::EmptyResponseErr("photos.get".into()));
        }
        Ok(self.photos.clone())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), TransferError> {
        self.downloads_log.lock().unwrap().push(url.to_string());
        if self.missing_urls.contains(url) {
            return Err(TransferError::StatusErr(url.to_string(), StatusCode::NOT_FOUND));
        }
        tokio::fs::write(dest, url.as_bytes())
            .await
            .map_err(|e| TransferError::FileErr(dest.display().to_string(), e))
    }
}

/// Upload links are `fake://<path>`; accepted uploads keep the staged bytes.
pub struct FakeDrive {
    /// `None` makes folder creation fail.
    pub folder_status: Option<FolderStatus>,
    pub refused: HashSet<String>,
    pub rejected: HashSet<String>,
    pub fail_reads: bool,
    pub folders_log: Mutex<Vec<String>>,
    pub grants_log: Mutex<Vec<(String, bool)>>,
    pub uploads_log: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Default for FakeDrive {
    fn default() -> Self {
        FakeDrive {
            folder_status: Some(FolderStatus::Created),
            refused: HashSet::new(),
            rejected: HashSet::new(),
            fail_reads: false,
            folders_log: Mutex::new(Vec::new()),
            grants_log: Mutex::new(Vec::new()),
            uploads_log: Mutex::new(Vec::new()),
        }
    }
}

impl FakeDrive {
    pub fn folders(&self) -> Vec<String> {
        self.folders_log.lock().unwrap().clone()
    }

    pub fn grants(&self) -> Vec<(String, bool)> {
        self.grants_log.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads_log.lock().unwrap().clone()
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads().into_iter().map(|(p, _)| p).collect()
    }
}

#[async_trait]
impl CloudDrive for FakeDrive {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ApiError> {
        self.folders_log.lock().unwrap().push(path.to_string());
        self.folder_status.ok_or(ApiError::DiskErr(DiskError {
            message: "Insufficient storage".into(),
            description: String::new(),
            error: "DiskInsufficientStorageError".into(),
        }))
    }

    async fn upload_link(&self, path: &str, overwrite: bool) -> Result<UploadLink, ApiError> {
        self.grants_log.lock().unwrap().push((path.to_string(), overwrite));
        if self.refused.contains(path) {
            return Err(ApiError::DiskErr(DiskError {
                message: format!("Resource \"disk:/{}\" already exists", path),
                description: "Resource already exists".into(),
                error: "DiskResourceAlreadyExistsError".into(),
            }));
        }
        Ok(UploadLink {
            href: format!("fake://{}", path),
            method: Some("PUT".into()),
        })
    }

    async fn put_file(&self, link: &UploadLink, file: &Path) -> Result<(), TransferError> {
        let path_str = file.display().to_string();
        if self.fail_reads {
            return Err(TransferError::FileErr(
                path_str,
                io::Error::new(io::ErrorKind::PermissionDenied, "read denied"),
            ));
        }
        let data = tokio::fs::read(file)
            .await
            .map_err(|e| TransferError::FileErr(path_str.clone(), e))?;
        let path = link.href.trim_start_matches("fake://").to_string();
        if self.rejected.contains(&path) {
            return Err(TransferError::StatusErr(path_str, StatusCode::INSUFFICIENT_STORAGE));
        }
        self.uploads_log.lock().unwrap().push((path, data));
        Ok(())
    }
}
