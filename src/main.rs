#[macro_use]
extern crate lazy_static;

use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::error::Error;
use crate::manifest::TransferRecord;
use crate::network::{CloudDrive, Disk, PhotoSource, Vk};
use crate::transfer::TransferOptions;

mod config;
mod error;
mod manifest;
mod network;
mod photos;
#[cfg(test)]
mod testing;
mod transfer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(_) => process::exit(0),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

async fn run() -> Result<(), Error> {
    let conf = config::read_config(&config::config_path())?;
    let settings = config::complete_from_stdin(conf).await?;

    let vk = Vk::new(&settings.vk_token, &settings.vk_api_version)
        .map_err(|e| Error::ClientErr("VK", e))?;
    let disk = Disk::new(&settings.yandex_token).map_err(|e| Error::ClientErr("Yandex Disk", e))?;

    let records = backup(
        &vk,
        &disk,
        &settings.user_id,
        &settings.transfer_options(),
        &settings.manifest_path,
    )
    .await?;
    println!(
        "Uploaded {} photos, manifest written to {}",
        records.len(),
        settings.manifest_path.display()
    );
    Ok(())
}

/// Resolve the account, list its profile photos, copy them to the drive and
/// write the manifest.
async fn backup<S, D>(
    source: &S,
    drive: &D,
    user_id: &str,
    opts: &TransferOptions<'_>,
    manifest_path: &Path,
) -> Result<Vec<TransferRecord>, Error>
where
    S: PhotoSource + ?Sized,
    D: CloudDrive + ?Sized,
{
    let owner_id = photos::resolve_account_id(source, user_id)
        .await
        .map_err(|e| Error::ResolveErr(user_id.to_string(), e))?;
    let photos = photos::list_profile_photos(source, owner_id).await;
    let records = transfer::transfer_photos(source, drive, &photos, opts).await?;

    manifest::write_manifest(manifest_path, &records)
        .map_err(|e| Error::ManifestErr(manifest_path.display().to_string(), e))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{photo, size, FakeDrive, FakeSource};
    use crate::transfer::CollisionPolicy;
    use std::fs;
    use tempfile::tempdir;

    fn opts(staging_dir: &Path) -> TransferOptions<'_> {
        TransferOptions {
            folder: "Backups",
            max_photos: 5,
            collision_policy: CollisionPolicy::Overwrite,
            staging_dir,
            no_progress_bar: true,
        }
    }

    #[tokio::test]
    async fn test_backup_writes_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("uploaded_photos.json");
        let staging = dir.path().join("staging");
        fs::create_dir(&staging).unwrap();

        let mut source = FakeSource {
            photos: vec![
                photo(1, vec![size("z", 100, 100)], Some(5)),
                photo(2, vec![size("z", 50, 50)], None),
            ],
            ..FakeSource::default()
        };
        source.handles.insert("durov".into(), 1);

        let records = backup(&source, &FakeDrive::default(), "durov", &opts(&staging), &manifest_path)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"file_name": "5.jpg", "size": "z"},
                {"file_name": "2.jpg", "size": "z"}
            ])
        );
    }

    #[tokio::test]
    async fn test_backup_unresolved_user_stops_before_transfer() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("uploaded_photos.json");
        let drive = FakeDrive::default();

        let res = backup(&FakeSource::default(), &drive, "nobody_here", &opts(dir.path()), &manifest_path).await;

        assert!(matches!(res, Err(Error::ResolveErr(..))));
        assert!(drive.folders().is_empty());
        assert!(!manifest_path.exists());
    }

    #[tokio::test]
    async fn test_backup_listing_failure_gives_empty_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("uploaded_photos.json");
        fs::write(&manifest_path, "[{\"file_name\": \"old.jpg\", \"size\": \"z\"}]").unwrap();
        let source = FakeSource {
            listing_fails: true,
            ..FakeSource::default()
        };

        let records = backup(&source, &FakeDrive::default(), "42", &opts(dir.path()), &manifest_path)
            .await
            .unwrap();

        assert!(records.is_empty());
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_backup_refused_grant_in_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("uploaded_photos.json");
        let staging = dir.path().join("staging");
        fs::create_dir(&staging).unwrap();
        let source = FakeSource {
            photos: vec![
                photo(10, vec![size("z", 10, 10)], Some(1)),
                photo(11, vec![size("z", 10, 10)], Some(2)),
                photo(12, vec![size("z", 10, 10)], Some(3)),
            ],
            ..FakeSource::default()
        };
        let mut drive = FakeDrive::default();
        drive.refused.insert("Backups/2.jpg".into());

        backup(&source, &drive, "42", &opts(&staging), &manifest_path)
            .await
            .unwrap();

        let parsed: Vec<TransferRecord> =
            serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
        let names: Vec<&str> = parsed.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["1.jpg", "3.jpg"]);
    }
}
