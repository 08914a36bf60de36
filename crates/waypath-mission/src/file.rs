//! Mission files: a search configuration and a list of GPS waypoints in YAML or JSON.
//!
//! ```yaml
//! search:
//!   target_object: mallet
//!   pattern:
//!     kind: none
//! waypoints:
//!   - { latitude: 38.4063, longitude: -110.7918 }
//!   - { latitude: 38.4071, longitude: -110.7902 }
//! ```

use crate::document::MissionDocument;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use waypath_core::error::{ConfigError, ParseError};
use waypath_core::{GeoPoint, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissionFile {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,
}

impl MissionFile {
    /// Parses YAML. JSON is valid YAML, so both formats are accepted.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| ParseError::from(e).into())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let text = std::fs::read_to_string(path)?;
        let file = Self::from_yaml(&text)?;
        debug!(path = %path.display(), waypoints = file.waypoints.len(), "Loaded mission file");
        Ok(file)
    }

    /// Validates every point and the search parameters, then builds the document.
    pub fn into_document(self) -> Result<MissionDocument> {
        self.search.validate()?;
        for point in &self.waypoints {
            point.validate()?;
        }

        let mut document = MissionDocument::with_search(self.search);
        for point in self.waypoints {
            document.append(point);
        }
        document.drain_changes();
        Ok(document)
    }

    pub fn from_document(document: &MissionDocument) -> Self {
        Self {
            search: *document.search(),
            waypoints: document.path().iter().map(|wp| wp.point).collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ParseError::from(e).into())
    }
}
