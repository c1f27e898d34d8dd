use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::panels::{PanelInputs, resolve_panel_sizes};
use super::presentation::{PresentationAreaInputs, fit_slide, presentation_area_size};
use super::webcams::{PlacementInputs, WebcamsAreaInputs, decide_placement, webcams_area_size};
use super::{PanelSelector, PerPanel, UserSetSize, ViewportClass, WebcamsPlacement};
use crate::common::config::{ChromeSettings, LayoutSettings};
use crate::common::geometry::{Bounds, NonNegative, Size};
use crate::model::snapshot::LayoutSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub is_mobile: bool,
    /// Large-font mode grows the navbar.
    pub large_font: bool,
}

/// Everything one layout pass depends on. Nothing outside this struct and
/// [`LayoutSettings`] is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutInputs {
    pub window: Size,
    pub open_panel: PanelSelector,
    /// The pass was triggered by the panel selection changing.
    pub panel_changed: bool,
    /// Panel widths currently held in the shared state.
    pub current_panels: PerPanel<f64>,
    /// Panel widths from the last persisted snapshot.
    pub stored_panels: PerPanel<Option<f64>>,
    pub num_users_video: u32,
    pub webcams_placement: WebcamsPlacement,
    pub auto_arrange: bool,
    pub webcams_user_set: UserSetSize,
    pub presentation_fullscreen: bool,
    pub slide: Size,
    pub screen_share_active: bool,
    pub device: DeviceProfile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOutcome {
    pub snapshot: LayoutSnapshot,
    /// Set when auto-arrange picked a placement during this pass.
    pub decided_placement: Option<WebcamsPlacement>,
    pub viewport: ViewportClass,
}

/// The rectangle left for presentation and webcams once the navbar, the
/// actions bar and the open side panels are taken out.
pub fn media_bounds(
    window: Size,
    panels: &PerPanel<f64>,
    chrome: &ChromeSettings,
    device: &DeviceProfile,
) -> Bounds {
    let navbar = chrome.navbar_height_for(device);
    let actionsbar = chrome.actionsbar_height_for(device);
    let occupied = panels.occupied_width();

    Bounds {
        width: (window.width - occupied).non_negative(),
        height: (window.height - (navbar + actionsbar) - chrome.media_margin).non_negative(),
        top: navbar,
        left: occupied,
    }
}

#[instrument(
    level = "debug",
    skip_all,
    fields(open = %inputs.open_panel, webcams = inputs.num_users_video)
)]
pub fn calculate_layout(inputs: &LayoutInputs, settings: &LayoutSettings) -> LayoutOutcome {
    let window = inputs.window.sanitized();

    let panels = resolve_panel_sizes(
        &PanelInputs {
            open: inputs.open_panel,
            panel_changed: inputs.panel_changed,
            current: &inputs.current_panels,
            stored: &inputs.stored_panels,
            window_width: window.width,
        },
        &settings.panels,
    );

    let bounds = media_bounds(window, &panels, &settings.chrome, &inputs.device);
    let media = bounds.size();
    let fitted = fit_slide(media, inputs.slide);

    let decided_placement = decide_placement(&PlacementInputs {
        media,
        presentation: fitted,
        screen_share_active: inputs.screen_share_active,
        auto_arrange: inputs.auto_arrange,
        is_mobile: inputs.device.is_mobile,
    });
    let placement = decided_placement.unwrap_or(inputs.webcams_placement);

    let webcams_area = webcams_area_size(
        &WebcamsAreaInputs {
            media,
            presentation: fitted,
            num_users_video: inputs.num_users_video,
            placement,
            auto_arrange: inputs.auto_arrange,
            user_set: inputs.webcams_user_set,
        },
        &settings.webcams,
        &settings.presentation,
    );

    let presentation_area = presentation_area_size(
        &PresentationAreaInputs {
            window,
            media,
            webcams_area,
            num_users_video: inputs.num_users_video,
            placement,
            fullscreen: inputs.presentation_fullscreen,
        },
        &settings.presentation,
    );

    let mut snapshot = LayoutSnapshot {
        window_size: window,
        media_bounds: bounds,
        webcams_area_size: webcams_area,
        presentation_area_size: presentation_area,
        webcams_placement: placement,
        ..Default::default()
    };
    snapshot.set_panel_widths(&panels);

    debug!(
        ?bounds,
        ?placement,
        ?webcams_area,
        ?presentation_area,
        "layout calculated"
    );

    LayoutOutcome {
        snapshot,
        decided_placement,
        viewport: ViewportClass::classify(window.width, &settings.viewport),
    }
}
