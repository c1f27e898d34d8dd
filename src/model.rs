pub mod layout_state;
pub mod snapshot;
pub mod storage;

pub use layout_state::{LayoutAction, LayoutState, LayoutStateStore};
pub use snapshot::{LayoutSnapshot, PanelSize};
pub use storage::{FileStore, KeyValueStore, LayoutStorage, MemoryStore};
