//! Static configuration: which tag marks which board corner, how frames are
//! normalized, and the sampling/retry budgets.
//!
//! The configuration is an explicit immutable value handed to the session at
//! construction. Validation happens once, up front, and is fatal; everything
//! downstream can then trust the mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Named physical board corner. L/R orientation is as seen facing the board
/// from the named side (robot or human player).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerName {
    PlayerL,
    PlayerR,
    RobotL,
    RobotR,
}

impl fmt::Display for CornerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CornerName::PlayerL => "player_l",
            CornerName::PlayerR => "player_r",
            CornerName::RobotL => "robot_l",
            CornerName::RobotR => "robot_r",
        };
        f.write_str(s)
    }
}

/// One corner mapping: the board corner sits at corner `corner_index` of the
/// fiducial tag with id `tag_id`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CornerSpec {
    pub name: CornerName,
    pub tag_id: u32,
    /// Which of the tag's 4 detected corners is the board corner.
    pub corner_index: usize,
}

fn default_flush_frames() -> usize {
    4
}

fn default_max_locate_attempts() -> usize {
    10
}

fn default_ssim_window() -> usize {
    7
}

/// Full board-vision configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardViewConfig {
    /// Corner mappings in the iteration order corners are emitted.
    pub corners: Vec<CornerSpec>,
    /// How many of the configured corners must resolve in one frame.
    pub required_tags: usize,
    /// Frame rotation correction, degrees counterclockwise about the center.
    pub rotation_deg: f32,
    /// Frame translation correction, pixels.
    pub translation: (f32, f32),
    /// Stale capture-buffer frames discarded before each sampled frame.
    #[serde(default = "default_flush_frames")]
    pub flush_frames: usize,
    /// Localization attempts before giving up on a turn.
    #[serde(default = "default_max_locate_attempts")]
    pub max_locate_attempts: usize,
    /// Odd window side for the structural similarity map.
    #[serde(default = "default_ssim_window")]
    pub ssim_window: usize,
}

impl Default for BoardViewConfig {
    fn default() -> Self {
        Self {
            corners: vec![
                CornerSpec {
                    name: CornerName::PlayerL,
                    tag_id: 99,
                    corner_index: 1,
                },
                CornerSpec {
                    name: CornerName::PlayerR,
                    tag_id: 98,
                    corner_index: 2,
                },
                CornerSpec {
                    name: CornerName::RobotR,
                    tag_id: 97,
                    corner_index: 3,
                },
            ],
            required_tags: 3,
            rotation_deg: 110.0,
            translation: (-250.0, -50.0),
            flush_frames: default_flush_frames(),
            max_locate_attempts: default_max_locate_attempts(),
            ssim_window: default_ssim_window(),
        }
    }
}

/// Configuration validation errors. Fatal at startup.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("tag id {0} mapped to more than one corner")]
    DuplicateTagId(u32),
    #[error("corner {0} configured more than once")]
    DuplicateCorner(CornerName),
    #[error("corner {name} uses tag corner index {index}, tags have 4 corners")]
    CornerIndexOutOfRange { name: CornerName, index: usize },
    #[error("required_tags = {required} with {configured} corner mappings; need 3 or 4, at most the mapping count")]
    BadRequiredCount { required: usize, configured: usize },
    #[error("max_locate_attempts must be at least 1")]
    NoRetryBudget,
    #[error("ssim window must be odd and >= 3, got {0}")]
    BadSsimWindow(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BoardViewConfig {
    /// Check the invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, spec) in self.corners.iter().enumerate() {
            if spec.corner_index > 3 {
                return Err(ConfigError::CornerIndexOutOfRange {
                    name: spec.name,
                    index: spec.corner_index,
                });
            }
            for earlier in &self.corners[..i] {
                if earlier.tag_id == spec.tag_id {
                    return Err(ConfigError::DuplicateTagId(spec.tag_id));
                }
                if earlier.name == spec.name {
                    return Err(ConfigError::DuplicateCorner(spec.name));
                }
            }
        }
        if !(3..=4).contains(&self.required_tags) || self.required_tags > self.corners.len() {
            return Err(ConfigError::BadRequiredCount {
                required: self.required_tags,
                configured: self.corners.len(),
            });
        }
        if self.max_locate_attempts == 0 {
            return Err(ConfigError::NoRetryBudget);
        }
        if self.ssim_window < 3 || self.ssim_window % 2 == 0 {
            return Err(ConfigError::BadSsimWindow(self.ssim_window));
        }
        Ok(())
    }

    /// Corner mapping for a detected tag id, if one is configured.
    pub fn corner_for_tag(&self, tag_id: u32) -> Option<&CornerSpec> {
        self.corners.iter().find(|c| c.tag_id == tag_id)
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        BoardViewConfig::default().validate().expect("default");
    }

    #[test]
    fn duplicate_tag_id_is_rejected() {
        let mut cfg = BoardViewConfig::default();
        cfg.corners[1].tag_id = cfg.corners[0].tag_id;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DuplicateTagId(99))
        ));
    }

    #[test]
    fn duplicate_corner_name_is_rejected() {
        let mut cfg = BoardViewConfig::default();
        cfg.corners[2].name = CornerName::PlayerL;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DuplicateCorner(CornerName::PlayerL))
        ));
    }

    #[test]
    fn corner_index_must_fit_a_tag() {
        let mut cfg = BoardViewConfig::default();
        cfg.corners[0].corner_index = 4;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::CornerIndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn required_count_must_match_mappings() {
        let mut cfg = BoardViewConfig::default();
        cfg.required_tags = 4;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BadRequiredCount {
                required: 4,
                configured: 3
            })
        ));
        cfg.required_tags = 2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn even_ssim_window_is_rejected() {
        let mut cfg = BoardViewConfig::default();
        cfg.ssim_window = 8;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadSsimWindow(8))));
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.json");
        let cfg = BoardViewConfig::default();
        cfg.write_json(&path).expect("write");
        let loaded = BoardViewConfig::load_json(&path).expect("load");
        assert_eq!(loaded.corners, cfg.corners);
        assert_eq!(loaded.required_tags, 3);
        assert_eq!(loaded.rotation_deg, 110.0);
    }
}
