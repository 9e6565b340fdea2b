use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::accweek::tools::error::{Result, ToolError};

/// Creates the output directory and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| ToolError::OutputWrite {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `value` as pretty-printed UTF-8 JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    fs::write(path, json_string).map_err(|source| ToolError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
