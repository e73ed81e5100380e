use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{ErrorKind, IsTerminal};
use std::path::{Path, PathBuf};

use crate::error::TransferError;
use crate::manifest::TransferRecord;
use crate::network::{CloudDrive, FolderStatus, Photo, PhotoSource};
use crate::photos::{destination_name, largest_size};

/// What to do when two photos in one run map to the same file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Upload anyway; the later photo replaces the earlier one on the disk.
    Overwrite,
    /// Leave the earlier photo in place and skip the later one.
    Skip,
    /// Stop the run.
    Error,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        CollisionPolicy::Overwrite
    }
}

impl CollisionPolicy {
    /// Whether upload targets are requested with overwrite enabled. Only
    /// `Overwrite` may clobber files left by earlier runs.
    fn overwrite(self) -> bool {
        self == CollisionPolicy::Overwrite
    }
}

pub struct TransferOptions<'a> {
    pub folder: &'a str,
    pub max_photos: usize,
    pub collision_policy: CollisionPolicy,
    pub staging_dir: &'a Path,
    pub no_progress_bar: bool,
}

fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("Uploading photos [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb
}

async fn ensure_folder<D>(drive: &D, folder: &str)
where
    D: CloudDrive + ?Sized,
{
    match drive.create_folder(folder).await {
        Ok(FolderStatus::Created) => tracing::info!("Created folder {}", folder),
        Ok(FolderStatus::AlreadyExists) => tracing::info!("Folder {} already exists", folder),
        Err(e) => tracing::error!("Error creating folder {}: {}", folder, e),
    }
}

/// Copy up to `opts.max_photos` photos into `opts.folder`, in order.
///
/// Returns a record for every photo that made it to the disk. Photos the
/// remote side refuses are logged and skipped; local I/O and transport
/// failures abort the batch.
pub async fn transfer_photos<S, D>(
    source: &S,
    drive: &D,
    photos: &[Photo],
    opts: &TransferOptions<'_>,
) -> Result<Vec<TransferRecord>, TransferError>
where
    S: PhotoSource + ?Sized,
    D: CloudDrive + ?Sized,
{
    tokio::fs::create_dir_all(opts.staging_dir)
        .await
        .map_err(|e| TransferError::FileErr(opts.staging_dir.display().to_string(), e))?;
    ensure_folder(drive, opts.folder).await;

    let batch = &photos[..photos.len().min(opts.max_photos)];
    let pb = create_progress_bar(opts.no_progress_bar, batch.len() as u64);
    // names that are on the disk, only counting uploads from this run
    let mut uploaded_names = HashSet::new();
    let mut records = Vec::new();

    for photo in batch {
        let name = destination_name(photo);
        pb.set_message(name.clone());

        if uploaded_names.contains(&name) {
            match opts.collision_policy {
                CollisionPolicy::Overwrite => {
                    pb.suspend(|| tracing::warn!("{} is used twice, photo {} replaces it", name, photo.id));
                }
                CollisionPolicy::Skip => {
                    pb.suspend(|| tracing::warn!("{} is already taken, skipping photo {}", name, photo.id));
                    pb.inc(1);
                    continue;
                }
                CollisionPolicy::Error => {
                    pb.abandon();
                    return Err(TransferError::NameCollision(name));
                }
            }
        }

        match transfer_photo(source, drive, photo, &name, opts).await {
            Ok(()) => {
                pb.suspend(|| tracing::info!("Uploaded {}/{}", opts.folder, name));
                uploaded_names.insert(name.clone());
                records.push(TransferRecord::new(name));
            }
            Err(e) if e.is_fatal() => {
                pb.abandon();
                return Err(e);
            }
            Err(e) => pb.suspend(|| tracing::error!("Could not upload {}: {}", name, e)),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(records)
}

async fn transfer_photo<S, D>(
    source: &S,
    drive: &D,
    photo: &Photo,
    name: &str,
    opts: &TransferOptions<'_>,
) -> Result<(), TransferError>
where
    S: PhotoSource + ?Sized,
    D: CloudDrive + ?Sized,
{
    let size = largest_size(photo).ok_or(TransferError::NoSizesErr(photo.id))?;
    tracing::debug!(
        "Photo {}_{}: using size {} ({}x{})",
        photo.owner_id,
        photo.id,
        size.size_type,
        size.width,
        size.height
    );

    let remote_path = format!("{}/{}", opts.folder, name);
    let link = drive
        .upload_link(&remote_path, opts.collision_policy.overwrite())
        .await
        .map_err(|e| TransferError::GrantErr(remote_path.clone(), e))?;

    let staged = staging_path(opts.staging_dir, name);
    let result = match source.download(&size.url, &staged).await {
        Ok(()) => drive.put_file(&link, &staged).await,
        Err(e) => Err(e),
    };
    remove_staged(&staged).await;
    result
}

fn staging_path(staging_dir: &Path, name: &str) -> PathBuf {
    staging_dir.join(sanitize_filename::sanitize(name))
}

async fn remove_staged(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}
