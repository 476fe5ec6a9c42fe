use std::path::Path;

use crate::error::Result;
use crate::model::flat_task::FlatTask;

/// Write the whole batch as one pretty-printed JSON array.
pub fn save_tasks(path: &Path, tasks: &[FlatTask]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tasks)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_tasks(path: &Path) -> Result<Vec<FlatTask>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
