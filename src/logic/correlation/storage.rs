use std::fs;
use std::path::Path;

use super::registry::ModelRegistry;
use crate::error::CoreResult;

/// Save registry to disk
pub fn save_registry(registry: &ModelRegistry, path: &Path) -> CoreResult<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(registry)?;
    fs::write(path, json)?;
    log::info!("Saved {} correlation rules to {}", registry.len(), path.display());
    Ok(())
}

/// Load registry from disk with schema validation
pub fn load_registry(path: &Path) -> CoreResult<ModelRegistry> {
    let data = fs::read(path)?;
    let registry: ModelRegistry = serde_json::from_slice(&data)?;

    registry.validate_schema()?;

    log::info!("Loaded {} correlation rules from {}", registry.len(), path.display());
    Ok(registry)
}
