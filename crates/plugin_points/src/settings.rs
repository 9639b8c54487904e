//! Access to the game mode's script settings.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the mode script setting holding the points limit.
pub const POINTS_LIMIT: &str = "S_PointsLimit";

#[derive(Error, Debug)]
pub enum PointsError {
    #[error("Mode setting '{0}' is not available")]
    MissingSetting(&'static str),
    #[error("Mode setting '{name}' holds a non-integer value: {value}")]
    NotAnInteger { name: &'static str, value: String },
    #[error("Mode settings could not be updated: {0}")]
    Update(String),
}

/// Reads and writes the running mode's points limit.
///
/// `points_limit` returns `None` for modes without one, such as time attack.
pub trait ModeSettings: Send + Sync {
    fn points_limit(&self) -> Result<Option<i64>, PointsError>;
    fn set_points_limit(&self, limit: i64) -> Result<(), PointsError>;
}

/// Mode script settings kept in memory as raw strings, the way the game
/// server reports them.
#[derive(Debug, Default)]
pub struct InMemoryModeSettings {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryModeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points_limit(limit: i64) -> Self {
        let settings = Self::new();
        settings.set(POINTS_LIMIT, limit.to_string());
        settings
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.values.write().insert(name.to_string(), value.into());
    }
}

impl ModeSettings for InMemoryModeSettings {
    fn points_limit(&self) -> Result<Option<i64>, PointsError> {
        self.get(POINTS_LIMIT)
            .map(|value| {
                value.trim().parse().map_err(|_| PointsError::NotAnInteger {
                    name: POINTS_LIMIT,
                    value,
                })
            })
            .transpose()
    }

    fn set_points_limit(&self, limit: i64) -> Result<(), PointsError> {
        let mut values = self.values.write();
        match values.get_mut(POINTS_LIMIT) {
            Some(value) => {
                *value = limit.to_string();
                Ok(())
            }
            None => Err(PointsError::MissingSetting(POINTS_LIMIT)),
        }
    }
}
