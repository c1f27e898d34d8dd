use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

use super::engine::{LayoutInputs, LayoutOutcome, calculate_layout};
use super::LayoutError;
use crate::common::config::LayoutSettings;
use crate::model::layout_state::{LayoutAction, LayoutState, LayoutStateStore};
use crate::model::storage::LayoutStorage;

bitflags::bitflags! {
    /// Why a recomputation was requested, where that changes its behaviour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RecomputeFlags: u8 {
        /// Keep panel widths the user just dragged instead of restoring them.
        const PANEL_CHANGED = 1 << 0;
        const AUTOARRANGE_CHANGED = 1 << 1;
        const PLACEMENT_CHANGED = 1 << 2;
    }
}

/// Owns the shared layout state and its persistence, and runs the engine
/// against them: read storage, calculate, dispatch, write storage.
pub struct LayoutManager {
    settings: LayoutSettings,
    storage: LayoutStorage,
    state: LayoutStateStore,
    mounted: bool,
}

impl LayoutManager {
    pub fn new(settings: LayoutSettings, storage: LayoutStorage, state: LayoutStateStore) -> Self {
        Self { settings, storage, state, mounted: false }
    }

    /// Starts accepting recomputations and pulls the stored preferences into
    /// the shared state.
    pub fn mount(&mut self) {
        if let Some(enabled) = self.storage.auto_arrange() {
            self.state.dispatch(LayoutAction::SetAutoArrangeLayout(enabled));
        }
        if let Some(placement) = self.storage.webcams_placement() {
            self.state.dispatch(LayoutAction::SetWebcamsPlacement(placement));
        }
        self.mounted = true;
        debug!("layout manager mounted");
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        debug!("layout manager unmounted");
    }

    pub fn is_mounted(&self) -> bool { self.mounted }

    pub fn state(&self) -> &LayoutState { self.state.state() }

    pub fn subscribe(&self) -> broadcast::Receiver<LayoutAction> { self.state.subscribe() }

    pub fn dispatch(&mut self, action: LayoutAction) { self.state.dispatch(action) }

    pub fn storage(&self) -> &LayoutStorage { &self.storage }

    pub fn storage_mut(&mut self) -> &mut LayoutStorage { &mut self.storage }

    /// Gathers the engine inputs from the shared state and storage.
    pub fn inputs(&self, flags: RecomputeFlags) -> LayoutInputs {
        let state = self.state.state();
        let stored_panels = self
            .storage
            .load_snapshot()
            .map(|snapshot| snapshot.stored_panel_widths())
            .unwrap_or_default();

        LayoutInputs {
            window: state.window_size,
            open_panel: state.open_panel,
            panel_changed: flags.contains(RecomputeFlags::PANEL_CHANGED),
            current_panels: state.panels,
            stored_panels,
            num_users_video: state.num_users_video,
            webcams_placement: state.webcams_placement,
            auto_arrange: state.auto_arrange_layout,
            webcams_user_set: self.storage.webcams_user_set(),
            presentation_fullscreen: state.presentation_is_fullscreen,
            slide: state.presentation_slide_size,
            screen_share_active: state.screen_is_shared,
            device: state.device,
        }
    }

    /// Recomputes the layout and publishes it. Returns `None` when the pass
    /// was skipped: the manager is unmounted, or auto-arrange was just turned
    /// off without a placement change to apply.
    #[instrument(level = "debug", skip(self))]
    pub fn set_layout_sizes(
        &mut self,
        flags: RecomputeFlags,
    ) -> Result<Option<LayoutOutcome>, LayoutError> {
        if !self.mounted {
            trace!("not mounted, skipping layout pass");
            return Ok(None);
        }
        if flags.contains(RecomputeFlags::AUTOARRANGE_CHANGED)
            && !flags.contains(RecomputeFlags::PLACEMENT_CHANGED)
            && !self.state.state().auto_arrange_layout
        {
            trace!("auto-arrange turned off, keeping current layout");
            return Ok(None);
        }

        let outcome = calculate_layout(&self.inputs(flags), &self.settings);

        if let Some(placement) = outcome.decided_placement {
            self.state.dispatch(LayoutAction::SetWebcamsPlacement(placement));
            self.storage.set_webcams_placement(placement)?;
        }
        for action in outcome.snapshot.actions() {
            self.state.dispatch(action);
        }
        self.storage.save_snapshot(&outcome.snapshot)?;

        Ok(Some(outcome))
    }
}
