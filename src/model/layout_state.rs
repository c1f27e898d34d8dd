//! Shared layout state. Consumers never mutate it directly; every change is
//! a [`LayoutAction`] passed to [`LayoutStateStore::dispatch`], which applies
//! it and forwards it to subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use super::snapshot::PanelSize;
use crate::common::geometry::{Bounds, Size};
use crate::layout_engine::{DeviceProfile, PanelKind, PanelSelector, PerPanel, WebcamsPlacement};

const SUBSCRIBER_CAPACITY: usize = 256;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LayoutAction {
    SetWindowSize(Size),
    SetMediaBounds(Bounds),
    SetUserListSize(PanelSize),
    SetChatSize(PanelSize),
    SetPollSize(PanelSize),
    SetNoteSize(PanelSize),
    SetCaptionsSize(PanelSize),
    SetWaitingUsersPanelSize(PanelSize),
    SetBreakoutRoomSize(PanelSize),
    SetWebcamsAreaSize(Size),
    SetPresentationAreaSize(Size),
    SetWebcamsPlacement(WebcamsPlacement),
    SetAutoArrangeLayout(bool),
    SetNumUsersVideo(u32),
    SetPresentationIsFullscreen(bool),
    SetPresentationSlideSize(Size),
    SetOpenPanel(PanelSelector),
    SetScreenIsShared(bool),
    SetDeviceProfile(DeviceProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub window_size: Size,
    pub media_bounds: Bounds,
    pub panels: PerPanel<f64>,
    pub webcams_area_size: Size,
    pub presentation_area_size: Size,
    pub webcams_placement: WebcamsPlacement,
    pub auto_arrange_layout: bool,
    pub num_users_video: u32,
    pub presentation_is_fullscreen: bool,
    pub presentation_slide_size: Size,
    pub open_panel: PanelSelector,
    pub screen_is_shared: bool,
    pub device: DeviceProfile,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            window_size: Size::ZERO,
            media_bounds: Bounds::default(),
            panels: PerPanel::default(),
            webcams_area_size: Size::ZERO,
            presentation_area_size: Size::ZERO,
            webcams_placement: WebcamsPlacement::Top,
            auto_arrange_layout: true,
            num_users_video: 0,
            presentation_is_fullscreen: false,
            presentation_slide_size: Size::ZERO,
            open_panel: PanelSelector::None,
            screen_is_shared: false,
            device: DeviceProfile::default(),
        }
    }
}

impl LayoutState {
    pub fn apply(&mut self, action: &LayoutAction) {
        use LayoutAction::*;
        match *action {
            SetWindowSize(size) => self.window_size = size,
            SetMediaBounds(bounds) => self.media_bounds = bounds,
            SetUserListSize(size) => self.panels[PanelKind::Userlist] = size.width,
            SetChatSize(size) => self.panels[PanelKind::Chat] = size.width,
            SetPollSize(size) => self.panels[PanelKind::Poll] = size.width,
            SetNoteSize(size) => self.panels[PanelKind::Note] = size.width,
            SetCaptionsSize(size) => self.panels[PanelKind::Captions] = size.width,
            SetWaitingUsersPanelSize(size) => self.panels[PanelKind::Waiting] = size.width,
            SetBreakoutRoomSize(size) => self.panels[PanelKind::BreakoutRoom] = size.width,
            SetWebcamsAreaSize(size) => self.webcams_area_size = size,
            SetPresentationAreaSize(size) => self.presentation_area_size = size,
            SetWebcamsPlacement(placement) => self.webcams_placement = placement,
            SetAutoArrangeLayout(enabled) => self.auto_arrange_layout = enabled,
            SetNumUsersVideo(count) => self.num_users_video = count,
            SetPresentationIsFullscreen(fullscreen) => self.presentation_is_fullscreen = fullscreen,
            SetPresentationSlideSize(size) => self.presentation_slide_size = size,
            SetOpenPanel(panel) => self.open_panel = panel,
            SetScreenIsShared(shared) => self.screen_is_shared = shared,
            SetDeviceProfile(device) => self.device = device,
        }
    }
}

pub struct LayoutStateStore {
    state: LayoutState,
    subscribers: broadcast::Sender<LayoutAction>,
}

impl Default for LayoutStateStore {
    fn default() -> Self { Self::new(LayoutState::default()) }
}

impl LayoutStateStore {
    pub fn new(state: LayoutState) -> Self {
        let (subscribers, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self { state, subscribers }
    }

    pub fn state(&self) -> &LayoutState { &self.state }

    pub fn subscribe(&self) -> broadcast::Receiver<LayoutAction> { self.subscribers.subscribe() }

    pub fn dispatch(&mut self, action: LayoutAction) {
        trace!(?action, "dispatch");
        self.state.apply(&action);
        // No subscribers is fine; the state itself is still updated.
        _ = self.subscribers.send(action);
    }
}
