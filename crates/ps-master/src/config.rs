//! Session configuration and performance loading from RON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ps_engine::ParamsMapping;
use ps_ir::{ControlIdx, ParamId, PlaybackData};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration and performance loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// How a session translates performances for one plugin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Emit expression events from dynamics and report gain from them.
    #[serde(default)]
    pub use_dynamic_events: bool,
    /// Control index -> plugin parameter id.
    #[serde(default)]
    pub mapping: BTreeMap<u16, ParamId>,
}

impl SequencerConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|source| ConfigError::Parse {
            what: "sequencer config".to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_ron_str(&read(path)?)
    }

    /// The mapping keyed by logical control.
    pub fn params_mapping(&self) -> ParamsMapping {
        self.mapping
            .iter()
            .map(|(&control, &param)| (ControlIdx(control), param))
            .collect()
    }
}

/// Parse a performance description.
pub fn playback_data_from_ron_str(source: &str) -> Result<PlaybackData, ConfigError> {
    ron::from_str(source).map_err(|source| ConfigError::Parse {
        what: "performance".to_string(),
        source,
    })
}

/// Load a performance description from a RON file.
pub fn load_playback_data(path: &Path) -> Result<PlaybackData, ConfigError> {
    playback_data_from_ron_str(&read(path)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
