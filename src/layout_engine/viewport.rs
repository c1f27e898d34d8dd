use serde::{Deserialize, Serialize};

use super::PanelSelector;
use crate::common::config::ViewportSettings;

/// Breakpoint-derived behaviour of the side panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportClass {
    /// Open panels overlay the media area instead of pushing it aside.
    pub layered: bool,
    /// Panel resize handles are usable.
    pub resize_enabled: bool,
}

impl ViewportClass {
    pub fn classify(window_width: f64, settings: &ViewportSettings) -> Self {
        Self {
            layered: window_width <= settings.layered_breakpoint,
            resize_enabled: window_width > settings.mobile_breakpoint,
        }
    }

    /// Whether the media region should be hidden from assistive technology
    /// because an open panel covers it.
    pub fn hides_media(&self, open: PanelSelector, is_phone: bool) -> bool {
        open != PanelSelector::None && (is_phone || self.layered)
    }
}
