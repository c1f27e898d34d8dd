use serde::{Deserialize, Serialize};

use crate::common::geometry::{Bounds, Size};
use crate::layout_engine::{PanelKind, PerPanel, WebcamsPlacement};
use crate::model::layout_state::LayoutAction;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSize {
    pub width: f64,
}

impl PanelSize {
    pub const fn new(width: f64) -> Self { Self { width } }
}

/// Every computed region at one point in time. This is also the record
/// persisted under `layoutData`, so field names follow the stored format.
///
/// Missing fields deserialize as zero, which the engine treats the same as
/// "never stored".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSnapshot {
    pub window_size: Size,
    pub media_bounds: Bounds,
    pub user_list_size: PanelSize,
    pub chat_size: PanelSize,
    pub poll_size: PanelSize,
    pub note_size: PanelSize,
    pub captions_size: PanelSize,
    pub waiting_size: PanelSize,
    pub breakout_room_size: PanelSize,
    pub webcams_area_size: Size,
    pub presentation_area_size: Size,
    pub webcams_placement: WebcamsPlacement,
}

impl LayoutSnapshot {
    pub fn set_panel_widths(&mut self, widths: &PerPanel<f64>) {
        self.user_list_size = PanelSize::new(widths.userlist);
        self.chat_size = PanelSize::new(widths.chat);
        self.poll_size = PanelSize::new(widths.poll);
        self.note_size = PanelSize::new(widths.note);
        self.captions_size = PanelSize::new(widths.captions);
        self.waiting_size = PanelSize::new(widths.waiting);
        self.breakout_room_size = PanelSize::new(widths.breakout_room);
    }

    pub fn panel_widths(&self) -> PerPanel<f64> {
        PerPanel::from_fn(|kind| self.panel(kind).width)
    }

    /// Widths usable as restore hints; zero and non-finite entries are absent.
    pub fn stored_panel_widths(&self) -> PerPanel<Option<f64>> {
        self.panel_widths()
            .map(|_, &width| (width.is_finite() && width > 0.0).then_some(width))
    }

    pub fn panel(&self, kind: PanelKind) -> PanelSize {
        match kind {
            PanelKind::Userlist => self.user_list_size,
            PanelKind::Chat => self.chat_size,
            PanelKind::Poll => self.poll_size,
            PanelKind::Note => self.note_size,
            PanelKind::Captions => self.captions_size,
            PanelKind::Waiting => self.waiting_size,
            PanelKind::BreakoutRoom => self.breakout_room_size,
        }
    }

    /// The updates consumers receive for this snapshot, in dispatch order.
    pub fn actions(&self) -> Vec<LayoutAction> {
        vec![
            LayoutAction::SetWindowSize(self.window_size),
            LayoutAction::SetMediaBounds(self.media_bounds),
            LayoutAction::SetUserListSize(self.user_list_size),
            LayoutAction::SetChatSize(self.chat_size),
            LayoutAction::SetPollSize(self.poll_size),
            LayoutAction::SetNoteSize(self.note_size),
            LayoutAction::SetCaptionsSize(self.captions_size),
            LayoutAction::SetWaitingUsersPanelSize(self.waiting_size),
            LayoutAction::SetBreakoutRoomSize(self.breakout_room_size),
            LayoutAction::SetWebcamsAreaSize(self.webcams_area_size),
            LayoutAction::SetPresentationAreaSize(self.presentation_area_size),
        ]
    }
}
