//! Font bootstrap for the PDF body text.
//!
//! The document needs a monospaced face that covers Unicode, so by default
//! DejaVu Sans Mono is downloaded once and cached next to the executable.

use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FONT_URL: &str =
    "https://github.com/dejavu-fonts/dejavu-fonts/raw/master/ttf/DejaVuSansMono.ttf";
pub const DEFAULT_FONT_FILE: &str = "DejaVuSansMono.ttf";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the body font comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Read `path`, downloading it from `url` first if it is missing.
    Cached { url: String, path: PathBuf },
    /// A TrueType file supplied by the user.
    File(PathBuf),
    /// The PDF core Courier face. Latin-1 only.
    Builtin,
}

/// Font data ready to embed.
#[derive(Debug, Clone)]
pub enum FontAsset {
    TrueType(Vec<u8>),
    Builtin,
}

impl FontSource {
    /// The DejaVu Sans Mono cache beside the running executable.
    pub fn default_cached() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        FontSource::Cached {
            url: DEFAULT_FONT_URL.to_string(),
            path: dir.join(DEFAULT_FONT_FILE),
        }
    }

    pub async fn load(&self) -> Result<FontAsset> {
        match self {
            FontSource::Builtin => Ok(FontAsset::Builtin),
            FontSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| Error::FontUnavailable {
                    origin: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(FontAsset::TrueType(bytes))
            }
            FontSource::Cached { url, path } => {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    debug!("Using cached font {}", path.display());
                    return Ok(FontAsset::TrueType(bytes));
                }

                info!("Downloading font to {}...", path.display());
                let bytes = download(url).await.map_err(|reason| Error::FontUnavailable {
                    origin: url.clone(),
                    reason: format!(
                        "{reason}. Download {DEFAULT_FONT_FILE} manually and place it at {}, \
                         or pass --font <PATH>",
                        path.display()
                    ),
                })?;

                if let Err(err) = tokio::fs::write(path, &bytes).await {
                    warn!("Could not cache font at {}: {err}", path.display());
                } else {
                    info!("Font downloaded successfully");
                }
                Ok(FontAsset::TrueType(bytes))
            }
        }
    }
}

async fn download(url: &str) -> std::result::Result<Vec<u8>, String> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())?;
    let resp = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Err("server returned an empty body".to_string());
    }
    Ok(bytes.to_vec())
}
