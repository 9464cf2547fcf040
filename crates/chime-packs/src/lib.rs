//! # chime-packs
//!
//! Types and loading for sound pack manifests.
//!
//! A pack is a directory containing a `pack.json` manifest plus the audio
//! files it references. Manifests map event categories to either audio
//! files or synthesized tones; the browser audio engine interprets them.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pack operations.
pub type PackResult<T> = Result<T, PackError>;

/// Errors from loading pack manifests.
#[derive(Debug, Error)]
pub enum PackError {
    /// The manifest file could not be read.
    #[error("read {path}: {source}")]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON for the expected shape.
    #[error("parse {path}: {source}")]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The packs base directory could not be enumerated.
    #[error("read packs dir {path}: {source}")]
    ListDir {
        /// Base directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Sound configuration for a single event category.
///
/// A category is either file-based (`files` populated) or synthesized
/// (`synth` populated).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySound {
    /// Audio files, relative to the pack directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Whether the sound loops while the category stays active.
    #[serde(default, rename = "loop")]
    pub looped: bool,
    /// Playback volume, 0.0 to 1.0.
    #[serde(default)]
    pub volume: f64,
    /// Synthesizer waveform name for synth packs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synth: Option<String>,
    /// Synth frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<f64>,
    /// Synth note duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// A sound pack manifest loaded from a `pack.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Directory-name slug, used to match installed packs against the
    /// download registry.
    #[serde(default)]
    pub slug: String,
    /// Short human description.
    #[serde(default)]
    pub description: String,
    /// Pack author.
    #[serde(default)]
    pub author: String,
    /// Pack version string.
    #[serde(default)]
    pub version: String,
    /// Whether the pack is fully synthesized (no audio files).
    #[serde(default, rename = "synth", skip_serializing_if = "std::ops::Not::not")]
    pub is_synth: bool,
    /// Per-category sound configuration.
    #[serde(default)]
    pub categories: HashMap<String, CategorySound>,
    /// Absolute path of the pack directory. Never serialized.
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Pack {
    /// Load the `pack.json` manifest inside `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the manifest cannot be read or parsed.
    pub fn load(dir: &Path) -> PackResult<Self> {
        let manifest_path = dir.join("pack.json");
        let data = std::fs::read(&manifest_path).map_err(|e| PackError::Read {
            path: manifest_path.clone(),
            source: e,
        })?;

        let mut pack: Self = serde_json::from_slice(&data).map_err(|e| PackError::Parse {
            path: manifest_path,
            source: e,
        })?;

        pack.dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        Ok(pack)
    }
}

/// Load every subdirectory of `base` that contains a valid `pack.json`.
///
/// Subdirectories without a loadable manifest are silently skipped; a
/// malformed pack is not fatal.
///
/// # Errors
///
/// Fails only when `base` itself cannot be enumerated.
pub fn list_packs(base: &Path) -> PackResult<Vec<Pack>> {
    let entries = std::fs::read_dir(base).map_err(|e| PackError::ListDir {
        path: base.to_path_buf(),
        source: e,
    })?;

    let mut packs = Vec::new();
    for entry in entries.flatten() {
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        if let Ok(pack) = Pack::load(&entry.path()) {
            packs.push(pack);
        }
    }

    Ok(packs)
}
