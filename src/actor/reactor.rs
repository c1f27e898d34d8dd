//! The Reactor turns UI events into layout passes.
//!
//! Each event first updates the shared layout state with whatever input it
//! carries, then requests a recomputation. Whether that recomputation runs
//! now, is throttled, or waits for a DOM transition to settle depends only on
//! the reason. Deferred passes read the inputs current when they fire, so a
//! newer event overtaking an older delayed one is harmless.

mod throttle;

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, instrument, trace, warn};

pub use self::throttle::{Throttle, ThrottleDecision};
use crate::actor;
use crate::common::config::TimingSettings;
use crate::common::geometry::Size;
use crate::layout_engine::{
    DeviceProfile, LayoutManager, PanelSelector, RecomputeFlags, UserSetSize, WebcamsPlacement,
};
use crate::model::LayoutAction;

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The layout view appeared. Restores stored preferences and runs the
    /// first pass.
    Mounted,
    /// The layout view went away; pending passes become no-ops.
    Unmounted,

    WindowResized(Size),
    PanelChanged(PanelSelector),
    AutoArrangeChanged(bool),
    SlideChanged(Size),
    PresentationHideToggled,
    /// The user dragged the webcam strip's resize handle.
    WebcamAreaResized(UserSetSize),
    /// The user moved the webcam strip to another side.
    WebcamPlacementChanged(WebcamsPlacement),
    FullscreenChanged(bool),
    LocaleChanged,
    LargeFontChanged(bool),
    NumUsersVideoChanged(u32),
    ScreenShareChanged(bool),

    /// A deferred recomputation came due.
    Recompute(RecomputeReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeReason {
    Startup,
    Resize,
    PanelChanged,
    AutoArrangeChanged,
    SlideChanged,
    PresentationHideToggled,
    WebcamAreaResized,
    PlacementChanged,
    FullscreenChanged,
    LocaleChanged,
    FontChanged,
    WebcamCountChanged,
    ScreenShareChanged,
}

impl RecomputeReason {
    pub fn flags(self) -> RecomputeFlags {
        match self {
            RecomputeReason::PanelChanged => RecomputeFlags::PANEL_CHANGED,
            RecomputeReason::AutoArrangeChanged => RecomputeFlags::AUTOARRANGE_CHANGED,
            RecomputeReason::PlacementChanged => RecomputeFlags::PLACEMENT_CHANGED,
            _ => RecomputeFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Now,
    Throttled,
    After(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct RecomputePolicy {
    pub resize_throttle: Duration,
    pub settle_delay: Duration,
    pub media_change_delay: Duration,
}

impl From<&TimingSettings> for RecomputePolicy {
    fn from(timing: &TimingSettings) -> Self {
        Self {
            resize_throttle: Duration::from_millis(timing.resize_throttle_ms),
            settle_delay: Duration::from_millis(timing.settle_delay_ms),
            media_change_delay: Duration::from_millis(timing.media_change_delay_ms),
        }
    }
}

impl RecomputePolicy {
    pub fn schedule_for(&self, reason: RecomputeReason) -> Schedule {
        use RecomputeReason::*;
        match reason {
            Startup | PanelChanged | WebcamAreaResized | PlacementChanged => Schedule::Now,
            Resize => Schedule::Throttled,
            AutoArrangeChanged | SlideChanged | PresentationHideToggled | FullscreenChanged
            | LocaleChanged | FontChanged => Schedule::After(self.settle_delay),
            WebcamCountChanged | ScreenShareChanged => Schedule::After(self.media_change_delay),
        }
    }
}

pub struct Reactor {
    manager: LayoutManager,
    policy: RecomputePolicy,
    resize_throttle: Throttle,
    scheduled: Vec<(Duration, RecomputeReason)>,
}

impl Reactor {
    pub fn new(manager: LayoutManager, timing: &TimingSettings) -> Self {
        let policy = RecomputePolicy::from(timing);
        Self {
            manager,
            resize_throttle: Throttle::new(policy.resize_throttle),
            policy,
            scheduled: Vec::new(),
        }
    }

    /// Runs the reactor on its own thread and returns its mailbox. The thread
    /// exits once every sender is dropped.
    pub fn spawn(manager: LayoutManager, timing: TimingSettings) -> std::io::Result<Sender> {
        let (events_tx, events_rx) = actor::channel();
        thread::Builder::new().name("layout-reactor".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("layout-reactor: could not start runtime: {e}");
                    return;
                }
            };
            runtime.block_on(Reactor::new(manager, &timing).run(events_rx));
        })?;
        Ok(events_tx)
    }

    pub fn manager(&self) -> &LayoutManager { &self.manager }

    /// Deferred recomputations requested since the last call, as
    /// `(delay, reason)` pairs. The caller delivers each one back as
    /// [`Event::Recompute`] once its delay has passed.
    pub fn take_scheduled(&mut self) -> Vec<(Duration, RecomputeReason)> {
        std::mem::take(&mut self.scheduled)
    }

    pub fn handle_event(&mut self, event: Event) { self.handle_event_at(event, Instant::now()) }

    #[instrument(level = "debug", skip(self, now))]
    pub fn handle_event_at(&mut self, event: Event, now: Instant) {
        match event {
            Event::Mounted => {
                self.manager.mount();
                self.request(RecomputeReason::Startup, now);
            }
            Event::Unmounted => self.manager.unmount(),
            Event::WindowResized(size) => {
                self.manager.dispatch(LayoutAction::SetWindowSize(size));
                self.request(RecomputeReason::Resize, now);
            }
            Event::PanelChanged(panel) => {
                self.manager.dispatch(LayoutAction::SetOpenPanel(panel));
                self.request(RecomputeReason::PanelChanged, now);
            }
            Event::AutoArrangeChanged(enabled) => {
                self.manager.dispatch(LayoutAction::SetAutoArrangeLayout(enabled));
                if let Err(e) = self.manager.storage_mut().set_auto_arrange(enabled) {
                    warn!("could not store auto-arrange preference: {e}");
                }
                self.request(RecomputeReason::AutoArrangeChanged, now);
            }
            Event::SlideChanged(size) => {
                self.manager.dispatch(LayoutAction::SetPresentationSlideSize(size));
                self.request(RecomputeReason::SlideChanged, now);
            }
            Event::PresentationHideToggled => {
                self.request(RecomputeReason::PresentationHideToggled, now)
            }
            Event::WebcamAreaResized(size) => {
                if let Err(e) = self.manager.storage_mut().set_webcams_user_set(size) {
                    warn!("could not store webcam area size: {e}");
                }
                self.request(RecomputeReason::WebcamAreaResized, now);
            }
            Event::WebcamPlacementChanged(placement) => {
                self.manager.dispatch(LayoutAction::SetWebcamsPlacement(placement));
                if let Err(e) = self.manager.storage_mut().set_webcams_placement(placement) {
                    warn!("could not store webcam placement: {e}");
                }
                self.request(RecomputeReason::PlacementChanged, now);
            }
            Event::FullscreenChanged(fullscreen) => {
                self.manager.dispatch(LayoutAction::SetPresentationIsFullscreen(fullscreen));
                self.request(RecomputeReason::FullscreenChanged, now);
            }
            Event::LocaleChanged => self.request(RecomputeReason::LocaleChanged, now),
            Event::LargeFontChanged(large_font) => {
                let device = DeviceProfile { large_font, ..self.manager.state().device };
                self.manager.dispatch(LayoutAction::SetDeviceProfile(device));
                self.request(RecomputeReason::FontChanged, now);
            }
            Event::NumUsersVideoChanged(count) => {
                if count == self.manager.state().num_users_video {
                    return;
                }
                self.manager.dispatch(LayoutAction::SetNumUsersVideo(count));
                self.request(RecomputeReason::WebcamCountChanged, now);
            }
            Event::ScreenShareChanged(shared) => {
                if shared == self.manager.state().screen_is_shared {
                    return;
                }
                self.manager.dispatch(LayoutAction::SetScreenIsShared(shared));
                self.request(RecomputeReason::ScreenShareChanged, now);
            }
            Event::Recompute(reason) => {
                if reason == RecomputeReason::Resize {
                    self.resize_throttle.fire_trailing(now);
                }
                self.recompute(reason);
            }
        }
    }

    fn request(&mut self, reason: RecomputeReason, now: Instant) {
        match self.policy.schedule_for(reason) {
            Schedule::Now => self.recompute(reason),
            Schedule::Throttled => match self.resize_throttle.hit(now) {
                ThrottleDecision::Run => self.recompute(reason),
                ThrottleDecision::Defer(delay) => self.scheduled.push((delay, reason)),
                ThrottleDecision::Skip => trace!(?reason, "covered by pending trailing pass"),
            },
            Schedule::After(delay) => self.scheduled.push((delay, reason)),
        }
    }

    fn recompute(&mut self, reason: RecomputeReason) {
        match self.manager.set_layout_sizes(reason.flags()) {
            Ok(Some(_)) => debug!(?reason, "layout updated"),
            Ok(None) => trace!(?reason, "layout pass skipped"),
            Err(e) => error!(?reason, "layout pass failed: {e}"),
        }
    }

    async fn run(mut self, mut events: Receiver) {
        let (due_tx, mut due_rx) = tokio::sync::mpsc::unbounded_channel();

        loop {
            tokio::select! {
                received = events.recv() => {
                    let Some((span, event)) = received else { break };
                    let _guard = span.enter();
                    self.handle_event(event);
                }
                Some(reason) = due_rx.recv() => self.handle_event(Event::Recompute(reason)),
            }

            for (delay, reason) in self.take_scheduled() {
                let due_tx = due_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    _ = due_tx.send(reason);
                });
            }
        }

        debug!("layout-reactor: mailbox closed, exiting");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::common::config::LayoutSettings;
    use crate::model::{LayoutStateStore, LayoutStorage, MemoryStore, PanelSize};

    fn reactor() -> Reactor {
        let mut manager = LayoutManager::new(
            LayoutSettings::default(),
            LayoutStorage::new(MemoryStore::new()),
            LayoutStateStore::default(),
        );
        manager.dispatch(LayoutAction::SetWindowSize(Size::new(1200.0, 764.0)));
        manager.dispatch(LayoutAction::SetPresentationSlideSize(Size::new(1600.0, 900.0)));
        Reactor::new(manager, &TimingSettings::default())
    }

    fn mounted() -> (Reactor, Instant) {
        let mut reactor = reactor();
        let now = Instant::now();
        reactor.handle_event_at(Event::Mounted, now);
        (reactor, now)
    }

    #[test]
    fn nothing_is_computed_before_mount() {
        let reactor = reactor();
        assert_eq!(reactor.manager().state().media_bounds.width, 0.0);
        assert_eq!(reactor.manager().storage().load_snapshot(), None);
    }

    #[test]
    fn mount_runs_first_pass() {
        let (reactor, _) = mounted();
        assert_eq!(reactor.manager().state().media_bounds.width, 1200.0);
        assert!(reactor.manager().storage().load_snapshot().is_some());
    }

    #[test]
    fn panel_change_applies_immediately() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::PanelChanged(PanelSelector::Chat), now);

        assert!(reactor.take_scheduled().is_empty());
        assert_eq!(reactor.manager().state().panels.chat, 240.0);
        assert_eq!(reactor.manager().state().media_bounds.left, 360.0);
    }

    #[test]
    fn settle_and_media_reasons_are_delayed() {
        let (mut reactor, now) = mounted();

        reactor.handle_event_at(Event::FullscreenChanged(true), now);
        reactor.handle_event_at(Event::LocaleChanged, now);
        reactor.handle_event_at(Event::NumUsersVideoChanged(2), now);
        reactor.handle_event_at(Event::ScreenShareChanged(true), now);

        assert_eq!(reactor.take_scheduled(), vec![
            (Duration::from_millis(200), RecomputeReason::FullscreenChanged),
            (Duration::from_millis(200), RecomputeReason::LocaleChanged),
            (Duration::from_millis(500), RecomputeReason::WebcamCountChanged),
            (Duration::from_millis(500), RecomputeReason::ScreenShareChanged),
        ]);
        // Inputs are recorded right away; only the pass waits.
        assert!(reactor.manager().state().presentation_is_fullscreen);
        assert_eq!(reactor.manager().state().presentation_area_size, Size::new(1200.0, 580.0));

        reactor.handle_event_at(Event::Recompute(RecomputeReason::FullscreenChanged), now);
        assert_eq!(reactor.manager().state().presentation_area_size, Size::new(1200.0, 764.0));
    }

    #[test]
    fn every_reason_has_its_schedule() {
        use RecomputeReason::*;

        let policy = RecomputePolicy::from(&TimingSettings::default());
        let settle = Schedule::After(Duration::from_millis(200));
        let media = Schedule::After(Duration::from_millis(500));

        for (reason, expected) in [
            (Startup, Schedule::Now),
            (Resize, Schedule::Throttled),
            (PanelChanged, Schedule::Now),
            (AutoArrangeChanged, settle),
            (SlideChanged, settle),
            (PresentationHideToggled, settle),
            (WebcamAreaResized, Schedule::Now),
            (PlacementChanged, Schedule::Now),
            (FullscreenChanged, settle),
            (LocaleChanged, settle),
            (FontChanged, settle),
            (WebcamCountChanged, media),
            (ScreenShareChanged, media),
        ] {
            assert_eq!(policy.schedule_for(reason), expected, "{reason:?}");
        }
    }

    #[test]
    fn slide_change_is_recorded_now_and_laid_out_later() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::NumUsersVideoChanged(3), now);
        for (_, reason) in reactor.take_scheduled() {
            reactor.handle_event_at(Event::Recompute(reason), now);
        }
        let before = reactor.manager().state().webcams_area_size;

        reactor.handle_event_at(Event::SlideChanged(Size::new(800.0, 600.0)), now);
        reactor.handle_event_at(Event::PresentationHideToggled, now);
        assert_eq!(reactor.manager().state().presentation_slide_size, Size::new(800.0, 600.0));
        assert_eq!(reactor.manager().state().webcams_area_size, before);
        assert_eq!(reactor.take_scheduled(), vec![
            (Duration::from_millis(200), RecomputeReason::SlideChanged),
            (Duration::from_millis(200), RecomputeReason::PresentationHideToggled),
        ]);

        reactor.handle_event_at(Event::Recompute(RecomputeReason::SlideChanged), now);
        // The 4:3 slide leaves 400px beside it in the 1200x600 media area.
        assert_eq!(reactor.manager().state().webcams_area_size, Size::new(400.0, 600.0));
    }

    #[test]
    fn auto_arrange_toggle_waits_for_settle_delay() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::AutoArrangeChanged(false), now);

        assert!(!reactor.manager().state().auto_arrange_layout);
        assert_eq!(reactor.take_scheduled(), vec![(
            Duration::from_millis(200),
            RecomputeReason::AutoArrangeChanged
        )]);
    }

    #[test]
    fn unchanged_media_state_does_not_schedule() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::NumUsersVideoChanged(0), now);
        reactor.handle_event_at(Event::ScreenShareChanged(false), now);
        assert!(reactor.take_scheduled().is_empty());
    }

    #[test]
    fn resize_storm_is_throttled() {
        let (mut reactor, start) = mounted();

        reactor.handle_event_at(Event::WindowResized(Size::new(1000.0, 764.0)), start);
        assert_eq!(reactor.manager().state().media_bounds.width, 1000.0);

        let later = start + Duration::from_millis(40);
        reactor.handle_event_at(Event::WindowResized(Size::new(900.0, 764.0)), later);
        reactor.handle_event_at(Event::WindowResized(Size::new(800.0, 764.0)), later);
        assert_eq!(reactor.manager().state().media_bounds.width, 1000.0);
        assert_eq!(reactor.take_scheduled(), vec![(
            Duration::from_millis(160),
            RecomputeReason::Resize
        )]);

        reactor.handle_event_at(
            Event::Recompute(RecomputeReason::Resize),
            start + Duration::from_millis(200),
        );
        assert_eq!(reactor.manager().state().media_bounds.width, 800.0);
    }

    #[test]
    fn delayed_pass_after_unmount_is_ignored() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::NumUsersVideoChanged(3), now);
        let before = reactor.manager().state().webcams_area_size;

        reactor.handle_event_at(Event::Unmounted, now);
        for (_, reason) in reactor.take_scheduled() {
            reactor.handle_event_at(Event::Recompute(reason), now);
        }
        assert_eq!(reactor.manager().state().webcams_area_size, before);
    }

    #[test]
    fn manual_placement_and_resize_persist_preferences() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::AutoArrangeChanged(false), now);
        reactor.handle_event_at(Event::NumUsersVideoChanged(2), now);
        for (_, reason) in reactor.take_scheduled() {
            reactor.handle_event_at(Event::Recompute(reason), now);
        }

        reactor.handle_event_at(Event::WebcamPlacementChanged(WebcamsPlacement::Right), now);
        reactor.handle_event_at(
            Event::WebcamAreaResized(UserSetSize { width: Some(300.0), height: None }),
            now,
        );
        assert!(reactor.take_scheduled().is_empty());

        let storage = reactor.manager().storage();
        assert_eq!(storage.auto_arrange(), Some(false));
        assert_eq!(storage.webcams_placement(), Some(WebcamsPlacement::Right));
        assert_eq!(reactor.manager().state().webcams_area_size, Size::new(300.0, 600.0));
    }

    #[test]
    fn large_font_grows_navbar_after_settling() {
        let (mut reactor, now) = mounted();
        reactor.handle_event_at(Event::LargeFontChanged(true), now);
        assert_eq!(reactor.manager().state().media_bounds.top, 112.0);

        for (_, reason) in reactor.take_scheduled() {
            reactor.handle_event_at(Event::Recompute(reason), now);
        }
        assert_eq!(reactor.manager().state().media_bounds.top, 170.0);
        assert!(reactor.manager().state().device.large_font);
    }

    #[test]
    fn spawned_reactor_delivers_delayed_passes() {
        let manager = LayoutManager::new(
            LayoutSettings::default(),
            LayoutStorage::new(MemoryStore::new()),
            LayoutStateStore::default(),
        );
        let mut rx = manager.subscribe();
        let timing = TimingSettings {
            resize_throttle_ms: 10,
            settle_delay_ms: 10,
            media_change_delay_ms: 10,
        };
        let tx = Reactor::spawn(manager, timing).unwrap();

        tx.send(Event::WindowResized(Size::new(1200.0, 764.0)));
        tx.send(Event::PanelChanged(PanelSelector::Userlist));
        tx.send(Event::Mounted);
        tx.send(Event::NumUsersVideoChanged(2));
        std::thread::sleep(Duration::from_millis(300));

        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        assert!(actions.contains(&LayoutAction::SetUserListSize(PanelSize::new(120.0))));
        assert!(actions.iter().any(|action| matches!(
            action,
            LayoutAction::SetWebcamsAreaSize(size) if size.width > 0.0
        )));
    }
}
