//! Persisted window frames, keyed by a fixed identifier.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::state_file;

/// Identifier the overlay window frame is saved under.
pub const FRAME_SAVE_NAME: &str = "SkylightWindowFrame";

#[derive(Debug, Default, Deserialize, Serialize)]
struct Frames {
    #[serde(default)]
    frames: BTreeMap<String, Rect>,
}

/// Stores window frames in a small TOML file next to the config.
pub struct FrameStore {
    path: PathBuf,
}

impl FrameStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join("frames.toml"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Frames> {
        Ok(state_file::read(&self.path)
            .context("Failed to load window frames")?
            .unwrap_or_default())
    }

    /// Returns the saved frame for `name`, if any.
    pub fn load(&self, name: &str) -> Result<Option<Rect>> {
        Ok(self.read()?.frames.remove(name))
    }

    /// Saves the frame for `name`, keeping frames saved under other names.
    pub fn save(&self, name: &str, frame: Rect) -> Result<()> {
        // An unreadable file is replaced rather than blocking the save.
        let mut frames = self.read().unwrap_or_default();
        frames.frames.insert(name.to_owned(), frame);
        state_file::write(&self.path, &frames).context("Failed to save window frames")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_frame() {
        let temp = tempdir().unwrap();
        let store = FrameStore::new(temp.path());
        assert_eq!(store.load(FRAME_SAVE_NAME).unwrap(), None);
    }

    #[test]
    fn test_save_and_restore() {
        let temp = tempdir().unwrap();
        let store = FrameStore::new(temp.path());
        let frame = Rect::new(445.0, 280.0, 550.0, 580.0);

        store.save(FRAME_SAVE_NAME, frame).unwrap();
        store.save("Other", Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        store
            .save(FRAME_SAVE_NAME, Rect::new(10.0, 20.0, 600.0, 700.0))
            .unwrap();

        assert_eq!(
            store.load(FRAME_SAVE_NAME).unwrap(),
            Some(Rect::new(10.0, 20.0, 600.0, 700.0))
        );
        assert_eq!(
            store.load("Other").unwrap(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_save() {
        let temp = tempdir().unwrap();
        let store = FrameStore::new(temp.path());
        fs::write(store.path(), "frames = 3").unwrap();
        assert!(store.load(FRAME_SAVE_NAME).is_err());

        store.save(FRAME_SAVE_NAME, Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(
            store.load(FRAME_SAVE_NAME).unwrap(),
            Some(Rect::new(1.0, 2.0, 3.0, 4.0))
        );
    }
}
