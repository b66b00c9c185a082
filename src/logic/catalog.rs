use crate::error::{KisaanError, Result};
use crate::models::CropTemplate;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/crops.yaml");

/// Ordered crop reference table. Declaration order is the ranking tiebreak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub crops: Vec<CropTemplate>,
}

impl Catalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Load a replacement catalog from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KisaanError::CatalogNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&contents)?;
        tracing::info!(
            "Loaded {} crops from {}",
            catalog.crops.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Builtin catalog unless a path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject templates the evaluator cannot score.
    pub fn validate(&self) -> Result<()> {
        let problems: Vec<String> = self
            .crops
            .iter()
            .enumerate()
            .flat_map(|(i, crop)| {
                crop.problems()
                    .into_iter()
                    .map(move |p| format!("crop #{} ({}): {}", i + 1, crop.name, p))
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(KisaanError::InvalidCatalog(problems.join("; ")))
        }
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn as_slice(&self) -> &[CropTemplate] {
        &self.crops
    }
}
