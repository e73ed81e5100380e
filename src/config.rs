use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::ConfigError;
use crate::transfer::{CollisionPolicy, TransferOptions};

pub const CONFIG_ENV: &str = "VK_BACKUP_CONFIG";

/// Contents of `config.toml`. Credentials left out of the file are asked
/// for on stdin, see [`complete`].
#[derive(Deserialize, Clone)]
pub struct Config {
    pub vk_token: Option<String>,
    pub yandex_token: Option<String>,
    pub user_id: Option<String>,
    pub folder: Option<String>,
    #[serde(default = "default_max_photos")]
    pub max_photos: usize,
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    #[serde(default = "default_vk_api_version")]
    pub vk_api_version: String,
    #[serde(default)]
    pub no_progress_bar: bool,
}

fn default_max_photos() -> usize {
    5
}
fn default_manifest_path() -> PathBuf {
    PathBuf::from("uploaded_photos.json")
}
fn default_staging_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_vk_api_version() -> String {
    String::from("5.131")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vk_token: None,
            yandex_token: None,
            user_id: None,
            folder: None,
            max_photos: default_max_photos(),
            manifest_path: default_manifest_path(),
            staging_dir: default_staging_dir(),
            collision_policy: CollisionPolicy::default(),
            vk_api_version: default_vk_api_version(),
            no_progress_bar: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("vk_token", &self.vk_token.as_ref().map(|_| "<redacted>"))
            .field("yandex_token", &self.yandex_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("folder", &self.folder)
            .field("max_photos", &self.max_photos)
            .field("manifest_path", &self.manifest_path)
            .field("collision_policy", &self.collision_policy)
            .finish_non_exhaustive()
    }
}

/// Everything one run needs, with no blanks left.
#[derive(Clone)]
pub struct Settings {
    pub vk_token: String,
    pub yandex_token: String,
    pub user_id: String,
    pub folder: String,
    pub max_photos: usize,
    pub manifest_path: PathBuf,
    pub staging_dir: PathBuf,
    pub collision_policy: CollisionPolicy,
    pub vk_api_version: String,
    pub no_progress_bar: bool,
}

impl Settings {
    pub fn transfer_options(&self) -> TransferOptions<'_> {
        TransferOptions {
            folder: &self.folder,
            max_photos: self.max_photos,
            collision_policy: self.collision_policy,
            staging_dir: &self.staging_dir,
            no_progress_bar: self.no_progress_bar,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("vk_token", &"<redacted>")
            .field("yandex_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("folder", &self.folder)
            .field("max_photos", &self.max_photos)
            .field("manifest_path", &self.manifest_path)
            .field("collision_policy", &self.collision_policy)
            .finish_non_exhaustive()
    }
}

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Read the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let conf_contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(ConfigError::ReadErr(path.display().to_string(), e)),
    };
    let conf: Config = toml::from_str(&conf_contents)
        .map_err(|e| ConfigError::ParseErr(path.display().to_string(), e))?;
    tracing::debug!("config: {:?}", conf);
    Ok(conf)
}

async fn ask<R>(
    lines: &mut Lines<R>,
    value: Option<String>,
    prompt: &str,
    name: &'static str,
) -> Result<String, ConfigError>
where
    R: AsyncBufRead + Unpin,
{
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(v);
    }
    println!("{}:", prompt);
    let answer = lines
        .next_line()
        .await
        .map_err(ConfigError::StdinErr)?
        .ok_or(ConfigError::MissingErr(name))?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ConfigError::MissingErr(name));
    }
    Ok(answer.to_owned())
}

/// Fill in missing credentials by asking on stdin.
pub async fn complete<R>(conf: Config, input: R) -> Result<Settings, ConfigError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    let user_id = ask(
        &mut lines,
        conf.user_id,
        "Enter the VK user id or screen name",
        "user_id",
    )
    .await?;
    let vk_token = ask(&mut lines, conf.vk_token, "Enter the VK access token", "vk_token").await?;
    let yandex_token = ask(
        &mut lines,
        conf.yandex_token,
        "Enter the Yandex Disk OAuth token",
        "yandex_token",
    )
    .await?;
    let folder = ask(
        &mut lines,
        conf.folder,
        "Enter the Yandex Disk folder to upload into",
        "folder",
    )
    .await?;

    Ok(Settings {
        vk_token,
        yandex_token,
        user_id,
        folder,
        max_photos: conf.max_photos,
        manifest_path: conf.manifest_path,
        staging_dir: conf.staging_dir,
        collision_policy: conf.collision_policy,
        vk_api_version: conf.vk_api_version,
        no_progress_bar: conf.no_progress_bar,
    })
}

pub async fn complete_from_stdin(conf: Config) -> Result<Settings, ConfigError> {
    complete(conf, io::BufReader::new(io::stdin())).await
}
