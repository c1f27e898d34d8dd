//! Persistence of layout preferences between sessions.
//!
//! Values are kept as JSON text under string keys, the way browser session
//! storage holds them. Anything unreadable is reported and treated as absent.

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::snapshot::LayoutSnapshot;
use crate::common::collections::{BTreeMap, HashMap};
use crate::layout_engine::{LayoutError, UserSetSize, WebcamsPlacement};

pub mod keys {
    pub const LAYOUT_DATA: &str = "layoutData";
    pub const AUTO_ARRANGE_LAYOUT: &str = "autoArrangeLayout";
    pub const WEBCAMS_PLACEMENT: &str = "webcamsPlacement";
    pub const WEBCAMS_USER_WIDTH: &str = "webcamsAreaUserSetsWidth";
    pub const WEBCAMS_USER_HEIGHT: &str = "webcamsAreaUserSetsHeight";
}

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), LayoutError>;
    fn remove(&mut self, key: &str) -> Result<(), LayoutError>;
}

#[derive(Default, Debug, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.0.get(key).cloned() }

    fn set(&mut self, key: &str, value: String) -> Result<(), LayoutError> {
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), LayoutError> {
        self.0.remove(key);
        Ok(())
    }
}

/// A store backed by a RON map on disk, rewritten after every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`. A missing file starts empty; so does a corrupted one,
    /// which is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(buf) => match ron::from_str(&buf) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("ignoring unreadable storage file {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened storage {} with {} entries", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), LayoutError> {
        let buf = ron::ser::to_string_pretty(&self.entries, ron::ser::PrettyConfig::default())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, buf.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> { self.entries.get(key).cloned() }

    fn set(&mut self, key: &str, value: String) -> Result<(), LayoutError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), LayoutError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed access to the layout keys on top of any [`KeyValueStore`].
pub struct LayoutStorage {
    store: Box<dyn KeyValueStore>,
}

impl LayoutStorage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self { Self { store: Box::new(store) } }

    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring malformed stored {key}: {e}");
                None
            }
        }
    }

    pub fn set_item<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), LayoutError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), LayoutError> { self.store.remove(key) }

    pub fn load_snapshot(&self) -> Option<LayoutSnapshot> { self.get_item(keys::LAYOUT_DATA) }

    pub fn save_snapshot(&mut self, snapshot: &LayoutSnapshot) -> Result<(), LayoutError> {
        self.set_item(keys::LAYOUT_DATA, snapshot)
    }

    pub fn auto_arrange(&self) -> Option<bool> { self.get_item(keys::AUTO_ARRANGE_LAYOUT) }

    pub fn set_auto_arrange(&mut self, enabled: bool) -> Result<(), LayoutError> {
        self.set_item(keys::AUTO_ARRANGE_LAYOUT, &enabled)
    }

    pub fn webcams_placement(&self) -> Option<WebcamsPlacement> {
        self.get_item(keys::WEBCAMS_PLACEMENT)
    }

    pub fn set_webcams_placement(&mut self, placement: WebcamsPlacement) -> Result<(), LayoutError> {
        self.set_item(keys::WEBCAMS_PLACEMENT, &placement)
    }

    pub fn webcams_user_set(&self) -> UserSetSize {
        UserSetSize {
            width: self.get_item(keys::WEBCAMS_USER_WIDTH),
            height: self.get_item(keys::WEBCAMS_USER_HEIGHT),
        }
    }

    /// Stores the dragged webcam size. `None` leaves the stored value as is.
    pub fn set_webcams_user_set(&mut self, size: UserSetSize) -> Result<(), LayoutError> {
        if let Some(width) = size.width {
            self.set_item(keys::WEBCAMS_USER_WIDTH, &width)?;
        }
        if let Some(height) = size.height {
            self.set_item(keys::WEBCAMS_USER_HEIGHT, &height)?;
        }
        Ok(())
    }
}
