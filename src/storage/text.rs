use std::path::Path;

use anyhow::Context;

use super::ensure_parent;
use crate::BenchResult;

/// Write a rendered report, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> BenchResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
