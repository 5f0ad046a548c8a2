pub mod ask;
pub mod doctor;
pub mod serve;

use std::path::Path;

use ragloop_config::AppConfig;

/// Load configuration, turning failures into a readable message.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}
