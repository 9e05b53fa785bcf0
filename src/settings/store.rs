use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ChartError, ChartResult};

use super::SettingsProvider;

/// Settings persisted as one flat JSON object.
///
/// Unknown keys are carried through `save` untouched so other tools sharing
/// the file keep their entries.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonSettingsStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> ChartResult<Self> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Self {
                path,
                values: Map::new(),
            });
        }

        let raw = fs::read_to_string(&path).map_err(|e| {
            ChartError::InvalidData(format!(
                "failed to read settings `{}`: {e}",
                path.display()
            ))
        })?;
        let values = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(values)) => values,
            Ok(_) => {
                return Err(ChartError::InvalidData(format!(
                    "settings `{}` must hold a json object",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(ChartError::InvalidData(format!(
                    "failed to parse settings `{}`: {e}",
                    path.display()
                )));
            }
        };
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_owned(), Value::Bool(value));
    }

    pub fn save(&self) -> ChartResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ChartError::InvalidData(format!(
                    "failed to create settings directory `{}`: {e}",
                    parent.display()
                ))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize settings: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            ChartError::InvalidData(format!(
                "failed to write settings `{}`: {e}",
                self.path.display()
            ))
        })
    }
}

impl SettingsProvider for JsonSettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }
}
