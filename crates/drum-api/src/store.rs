use anyhow::{Context, Result};
use drum_core::{DrumSettings, WastageCalculator, WastageRequest};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Result of asking the store to change a drum's calculation settings
#[derive(Debug)]
pub enum SettingsUpdate {
    Applied(WastageRequest),
    Rejected(String),
    NotFound,
}

/// In-memory drum records keyed by drum id, each with its usage history.
#[derive(Default)]
pub struct DrumStore {
    drums: RwLock<HashMap<String, WastageRequest>>,
}

impl DrumStore {
    /// Preloads drums from a JSON or YAML list.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;

        let entries: Vec<WastageRequest> = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        info!("Loaded {} drums from {}", entries.len(), path.display());

        let store = Self::default();
        for entry in entries {
            store.upsert(entry);
        }
        Ok(store)
    }

    pub fn get(&self, id: &str) -> Option<WastageRequest> {
        self.drums
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn upsert(&self, entry: WastageRequest) {
        self.drums
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.drum.id.clone(), entry);
    }

    /// Validates and stores method and override together under one write lock,
    /// so readers never see one without the other.
    pub fn update_settings(
        &self,
        id: &str,
        settings: DrumSettings,
    ) -> drum_core::Result<SettingsUpdate> {
        let mut drums = self.drums.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = drums.get_mut(id) else {
            return Ok(SettingsUpdate::NotFound);
        };

        let calculator = WastageCalculator::new(entry.drum.initial_quantity)?;
        let outcome = calculator.validate_settings(&settings, &entry.usage_records);
        if let Some(message) = outcome.error {
            return Ok(SettingsUpdate::Rejected(message));
        }

        entry.drum.apply_settings(settings);
        Ok(SettingsUpdate::Applied(entry.clone()))
    }
}
