//! TOML files holding persisted state.
//!
//! The trigger and the window frame are both rewritten while the app runs, so
//! writes go to a sibling temp file that is renamed over the target. A crash
//! mid-write leaves the previous file intact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reads `path`, or returns `None` if it does not exist.
pub(crate) fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {:?}", path)),
    };
    let value = toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(Some(value))
}

/// Replaces `path` with `value`, creating parent directories as needed.
pub(crate) fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Failed to get parent directory of {:?}", path))?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory at {:?}", dir))?;

    let serialized = toml::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    let tmp = temp_path(path);
    fs::write(&tmp, serialized).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {:?}", path))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let temp = tempdir().unwrap();
        let value: Option<BTreeMap<String, u32>> = read(&temp.path().join("absent.toml")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_replaces_without_leftovers() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("state.toml");

        write(&path, &BTreeMap::from([("a".to_owned(), 1u32)])).unwrap();
        write(&path, &BTreeMap::from([("b".to_owned(), 2u32)])).unwrap();

        let value: BTreeMap<String, u32> = read(&path).unwrap().unwrap();
        assert_eq!(value, BTreeMap::from([("b".to_owned(), 2)]));
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("state.toml");
        fs::write(&path, "not = [toml").unwrap();
        assert!(read::<BTreeMap<String, u32>>(&path).is_err());
    }
}
