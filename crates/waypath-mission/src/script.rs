//! Recorded pointer input, expressed in GPS coordinates.
//!
//! ```yaml
//! magnification: 2.0
//! events:
//!   - { action: press, latitude: 38.4063, longitude: -110.7918 }
//!   - { action: drag, latitude: 38.4064, longitude: -110.7917 }
//!   - { action: release }
//!   - { action: remove, latitude: 38.4064, longitude: -110.7917 }
//! ```

use crate::controller::{InteractionController, PickTolerance, PointerEvent};
use crate::document::MissionDocument;
use crate::path::PathChange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use waypath_core::config::InteractionConfig;
use waypath_core::error::{ConfigError, ParseError};
use waypath_core::{GeoPoint, Result};
use waypath_geo::LocalFrame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptEvent {
    Press { latitude: f64, longitude: f64 },
    Drag { latitude: f64, longitude: f64 },
    Release,
    Remove { latitude: f64, longitude: f64 },
}

impl ScriptEvent {
    /// Projects the event into `frame` with tolerances for `magnification`.
    pub fn to_pointer_event(
        &self,
        frame: &LocalFrame,
        interaction: &InteractionConfig,
        magnification: f64,
    ) -> PointerEvent {
        let (pick_radius, insert_threshold) = interaction.thresholds_at(magnification);
        let probe = |latitude, longitude| {
            frame.to_planar(GeoPoint {
                latitude,
                longitude,
            })
        };

        match *self {
            ScriptEvent::Press {
                latitude,
                longitude,
            } => PointerEvent::PrimaryPress {
                probe: probe(latitude, longitude),
                tolerance: PickTolerance::new(pick_radius, insert_threshold),
            },
            ScriptEvent::Drag {
                latitude,
                longitude,
            } => PointerEvent::PrimaryDragMove {
                probe: probe(latitude, longitude),
            },
            ScriptEvent::Release => PointerEvent::PrimaryRelease,
            ScriptEvent::Remove {
                latitude,
                longitude,
            } => PointerEvent::SecondaryPress {
                probe: probe(latitude, longitude),
                pick_radius,
            },
        }
    }
}

fn default_magnification() -> f64 {
    1.0
}

/// A sequence of pointer events at a fixed view magnification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventScript {
    #[serde(default = "default_magnification")]
    pub magnification: f64,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Outcome of replaying a script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Events handled without error
    pub applied: usize,
    /// Events the controller rejected
    pub rejected: usize,
    pub changes: Vec<PathChange>,
}

impl EventScript {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| ParseError::from(e).into())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Feeds every event to `controller`. Rejected events are logged and skipped, the
    /// same way an interactive session carries on after a bad click.
    pub fn replay(
        &self,
        document: &mut MissionDocument,
        controller: &mut InteractionController,
        frame: &LocalFrame,
        interaction: &InteractionConfig,
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();

        for (step, event) in self.events.iter().enumerate() {
            let pointer = event.to_pointer_event(frame, interaction, self.magnification);
            match controller.handle(document, frame, pointer) {
                Ok(changes) => {
                    debug!(step, ?event, changes = changes.len(), "Replayed event");
                    summary.applied += 1;
                    summary.changes.extend(changes);
                }
                Err(e) => {
                    warn!(step, ?event, error = %e, "Event rejected");
                    summary.rejected += 1;
                }
            }
        }

        summary
    }
}
