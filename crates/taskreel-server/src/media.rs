// SPDX-License-Identifier: Apache-2.0

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskreel_api::ApiError;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

const THUMBNAIL_DIR: &str = "thumbnail";

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Path relative to the media root, as recorded in the store.
    pub relative: String,
    pub absolute: PathBuf,
}

/// Filesystem side of the upload pipeline: unique-named writes under the
/// media root and midpoint thumbnail extraction through the external
/// ffprobe/ffmpeg binaries, both bounded by a timeout.
pub struct MediaStore {
    root: PathBuf,
    pipeline_timeout: Duration,
}

impl MediaStore {
    pub fn new(root: PathBuf, pipeline_timeout: Duration) -> Result<Self, ApiError> {
        std::fs::create_dir_all(root.join(THUMBNAIL_DIR))
            .map_err(|e| ApiError::internal(format!("media dir init failed: {e}")))?;
        Ok(Self {
            root,
            pipeline_timeout,
        })
    }

    /// Millisecond prefix plus the sanitized original name; unique per
    /// upload, so no cross-request locking is needed on the directory.
    #[must_use]
    pub fn unique_name(original: &str) -> String {
        let base = Path::new(original)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        let sanitized: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{}", Utc::now().timestamp_millis(), sanitized)
    }

    pub async fn save(&self, original: &str, bytes: &[u8]) -> Result<StoredFile, ApiError> {
        let name = Self::unique_name(original);
        let absolute = self.root.join(&name);
        tokio::fs::write(&absolute, bytes)
            .await
            .map_err(|e| ApiError::processing(format!("media write failed: {e}")))?;
        Ok(StoredFile {
            relative: name,
            absolute,
        })
    }

    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Best-effort removal; an already-absent file is not an error, so
    /// deletes stay idempotent from the caller's perspective.
    pub fn remove(&self, relative: &str) {
        if relative.is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_file(self.resolve(relative)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %relative, "media remove failed: {e}");
            }
        }
    }

    /// Extracts one frame at the 50% point of the clip into
    /// `thumbnail/<stem>.png` and returns that relative path.
    pub async fn extract_thumbnail(&self, stored: &StoredFile) -> Result<String, ApiError> {
        let duration = self.probe_duration(&stored.absolute).await?;
        let midpoint = duration / 2.0;
        let stem = Path::new(&stored.relative)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&stored.relative);
        let relative = format!("{THUMBNAIL_DIR}/{stem}.png");
        let target = self.resolve(&relative);

        let output = timeout(
            self.pipeline_timeout,
            Command::new("ffmpeg")
                .arg("-y")
                .arg("-v")
                .arg("error")
                .arg("-ss")
                .arg(format!("{midpoint:.3}"))
                .arg("-i")
                .arg(&stored.absolute)
                .arg("-frames:v")
                .arg("1")
                .arg(&target)
                .output(),
        )
        .await
        .map_err(|_| ApiError::processing("thumbnail extraction timed out"))?
        .map_err(|e| ApiError::processing(format!("ffmpeg failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApiError::processing(format!(
                "thumbnail extraction failed: {}",
                stderr.trim()
            )));
        }
        Ok(relative)
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, ApiError> {
        let output = timeout(
            self.pipeline_timeout,
            Command::new("ffprobe")
                .arg("-v")
                .arg("error")
                .arg("-show_entries")
                .arg("format=duration")
                .arg("-of")
                .arg("default=noprint_wrappers=1:nokey=1")
                .arg(path)
                .output(),
        )
        .await
        .map_err(|_| ApiError::processing("media probe timed out"))?
        .map_err(|e| ApiError::processing(format!("ffprobe failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApiError::processing(format!(
                "media probe failed: {}",
                stderr.trim()
            )));
        }
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .map_err(|e| ApiError::processing(format!("unparseable media duration: {e}")))
    }
}
