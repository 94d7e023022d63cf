use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SpinError, SpinResult};

/// Container format of an encoded animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    /// Animated GIF, palette based.
    Gif,
    /// Animated PNG, lossless.
    Apng,
}

impl FormatTag {
    /// File extension written by [`EncodedArtifact::save`].
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Apng => "png",
        }
    }

    /// MIME type for attaching the bytes to a message.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Apng => "image/apng",
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Gif => "gif",
            Self::Apng => "apng",
        })
    }
}

/// Encoded animation bytes plus their format and size.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    format: FormatTag,
}

impl std::fmt::Debug for EncodedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedArtifact")
            .field("format", &self.format)
            .field("size", &self.size())
            .finish()
    }
}

impl EncodedArtifact {
    /// Wrap encoded bytes.
    pub fn new(bytes: Vec<u8>, format: FormatTag) -> Self {
        Self { bytes, format }
    }

    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Container format.
    pub fn format(&self) -> FormatTag {
        self.format
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Write the exact bytes to `path` with the format's extension and return the final path.
    ///
    /// Parent directories are created. The bytes go to a temporary file in the destination
    /// directory first and are renamed into place, so a failed save leaves nothing behind.
    pub fn save(&self, path: impl AsRef<Path>) -> SpinResult<PathBuf> {
        let path = path.as_ref().with_extension(self.format.extension());
        if path.file_name().is_none() {
            return Err(SpinError::validation(format!(
                "save path '{}' has no file name",
                path.display()
            )));
        }
        ensure_parent_dir(&path)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temporary file in '{}'", dir.display()))?;
        tmp.write_all(&self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("failed to flush '{}'", path.display()))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to move artifact into '{}'", path.display()))?;

        tracing::debug!(path = %path.display(), size = self.size(), format = %self.format, "artifact saved");
        Ok(path)
    }
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> SpinResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
