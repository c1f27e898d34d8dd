//! The geometry engine: turns window size, panel state, webcam count and
//! slide dimensions into concrete sizes for every region of the meeting UI.
//!
//! Everything below `engine` is a pure function of its inputs. `manager`
//! wraps it with storage reads before and dispatch/storage writes after.

pub mod engine;
mod error;
pub mod manager;
pub mod panels;
pub mod presentation;
pub mod viewport;
pub mod webcams;

pub use engine::{DeviceProfile, LayoutInputs, LayoutOutcome, calculate_layout};
pub use error::LayoutError;
pub use manager::{LayoutManager, RecomputeFlags};
pub use panels::{PanelKind, PanelSelector, PerPanel};
pub use viewport::ViewportClass;
pub use webcams::{UserSetSize, WebcamsPlacement};
