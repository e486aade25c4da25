use std::path::Path;

use anyhow::Context;

use super::ensure_parent;
use crate::BenchResult;

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> BenchResult<()> {
    ensure_parent(path)?;
    let json = serde_json::to_vec_pretty(value).context("failed to serialize JSON")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.json");
        write_json(&path, &json!({"ok": true})).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}
