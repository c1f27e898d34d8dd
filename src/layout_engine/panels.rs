use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::LayoutError;
use crate::common::config::{PanelBounds, PanelSettings};
use crate::common::geometry::{NonNegative, bound};

/// Which side panel is open. At most one is open at a time; the user list
/// may stay visible next to any of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PanelSelector {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "userlist")]
    Userlist,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "poll")]
    Poll,
    #[serde(rename = "note")]
    Note,
    #[serde(rename = "captions")]
    Captions,
    #[serde(rename = "waitingUsersPanel")]
    WaitingUsersPanel,
    #[serde(rename = "breakoutroom")]
    BreakoutRoom,
}

impl PanelSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelSelector::None => "",
            PanelSelector::Userlist => "userlist",
            PanelSelector::Chat => "chat",
            PanelSelector::Poll => "poll",
            PanelSelector::Note => "note",
            PanelSelector::Captions => "captions",
            PanelSelector::WaitingUsersPanel => "waitingUsersPanel",
            PanelSelector::BreakoutRoom => "breakoutroom",
        }
    }

    /// The panel whose width this selector keeps, besides the user list.
    pub fn panel(&self) -> Option<PanelKind> {
        match self {
            PanelSelector::None => None,
            PanelSelector::Userlist => Some(PanelKind::Userlist),
            PanelSelector::Chat => Some(PanelKind::Chat),
            PanelSelector::Poll => Some(PanelKind::Poll),
            PanelSelector::Note => Some(PanelKind::Note),
            PanelSelector::Captions => Some(PanelKind::Captions),
            PanelSelector::WaitingUsersPanel => Some(PanelKind::Waiting),
            PanelSelector::BreakoutRoom => Some(PanelKind::BreakoutRoom),
        }
    }

    /// Whether `kind` keeps its width while this selector is active.
    pub fn keeps(&self, kind: PanelKind) -> bool {
        match self {
            PanelSelector::None => false,
            _ => kind == PanelKind::Userlist || self.panel() == Some(kind),
        }
    }
}

impl FromStr for PanelSelector {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => PanelSelector::None,
            "userlist" => PanelSelector::Userlist,
            "chat" => PanelSelector::Chat,
            "poll" => PanelSelector::Poll,
            "note" => PanelSelector::Note,
            "captions" => PanelSelector::Captions,
            "waitingUsersPanel" => PanelSelector::WaitingUsersPanel,
            "breakoutroom" => PanelSelector::BreakoutRoom,
            other => return Err(LayoutError::UnexpectedPanel(other.to_string())),
        })
    }
}

impl fmt::Display for PanelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A side panel that owns a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PanelKind {
    Userlist,
    Chat,
    Poll,
    Note,
    Captions,
    Waiting,
    BreakoutRoom,
}

impl PanelKind {
    /// Panels that can sit next to the user list, in the order the media
    /// area looks for the visible one.
    pub const SECONDARY: [PanelKind; 6] = [
        PanelKind::Chat,
        PanelKind::Poll,
        PanelKind::Note,
        PanelKind::Captions,
        PanelKind::Waiting,
        PanelKind::BreakoutRoom,
    ];

    pub fn bounds(self, settings: &PanelSettings) -> PanelBounds {
        match self {
            PanelKind::Userlist => settings.userlist,
            PanelKind::Chat => settings.chat,
            PanelKind::Poll => settings.poll,
            PanelKind::Note => settings.note,
            PanelKind::Captions => settings.captions,
            PanelKind::Waiting => settings.waiting,
            PanelKind::BreakoutRoom => settings.breakout_room,
        }
    }
}

/// One value per side panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerPanel<T> {
    pub userlist: T,
    pub chat: T,
    pub poll: T,
    pub note: T,
    pub captions: T,
    pub waiting: T,
    pub breakout_room: T,
}

impl<T> PerPanel<T> {
    pub fn from_fn(mut f: impl FnMut(PanelKind) -> T) -> Self {
        Self {
            userlist: f(PanelKind::Userlist),
            chat: f(PanelKind::Chat),
            poll: f(PanelKind::Poll),
            note: f(PanelKind::Note),
            captions: f(PanelKind::Captions),
            waiting: f(PanelKind::Waiting),
            breakout_room: f(PanelKind::BreakoutRoom),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(PanelKind, &T) -> U) -> PerPanel<U> {
        PerPanel::from_fn(|kind| f(kind, &self[kind]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelKind, &T)> {
        PanelKind::iter().map(move |kind| (kind, &self[kind]))
    }
}

impl<T> Index<PanelKind> for PerPanel<T> {
    type Output = T;

    fn index(&self, kind: PanelKind) -> &T {
        match kind {
            PanelKind::Userlist => &self.userlist,
            PanelKind::Chat => &self.chat,
            PanelKind::Poll => &self.poll,
            PanelKind::Note => &self.note,
            PanelKind::Captions => &self.captions,
            PanelKind::Waiting => &self.waiting,
            PanelKind::BreakoutRoom => &self.breakout_room,
        }
    }
}

impl<T> IndexMut<PanelKind> for PerPanel<T> {
    fn index_mut(&mut self, kind: PanelKind) -> &mut T {
        match kind {
            PanelKind::Userlist => &mut self.userlist,
            PanelKind::Chat => &mut self.chat,
            PanelKind::Poll => &mut self.poll,
            PanelKind::Note => &mut self.note,
            PanelKind::Captions => &mut self.captions,
            PanelKind::Waiting => &mut self.waiting,
            PanelKind::BreakoutRoom => &mut self.breakout_room,
        }
    }
}

impl PerPanel<f64> {
    /// Width of the visible secondary panel, or zero.
    pub fn secondary_width(&self) -> f64 {
        PanelKind::SECONDARY
            .iter()
            .map(|&kind| self[kind])
            .find(|&width| width > 0.0)
            .unwrap_or(0.0)
    }

    /// Horizontal space taken away from the media area.
    pub fn occupied_width(&self) -> f64 { self.userlist + self.secondary_width() }
}

#[derive(Clone, Copy, Debug)]
pub struct PanelInputs<'a> {
    pub open: PanelSelector,
    /// Set when the trigger was the panel selection itself changing.
    pub panel_changed: bool,
    /// Widths currently held in the shared layout state.
    pub current: &'a PerPanel<f64>,
    /// Widths read back from the persisted snapshot.
    pub stored: &'a PerPanel<Option<f64>>,
    pub window_width: f64,
}

pub fn default_width(bounds: &PanelBounds, window_width: f64) -> f64 {
    bound(window_width.non_negative() * bounds.ratio, bounds.min_width, bounds.max_width)
}

/// A persisted width is only a hint: it was computed for whatever window
/// existed back then, so it is forced back into the panel's bounds and the
/// current window. The window never pulls it below `min_width`, which keeps
/// a restored default equal to the default.
pub fn restored_width(stored: f64, bounds: &PanelBounds, window_width: f64) -> f64 {
    let upper = bounds.max_width.min(window_width.non_negative()).max(bounds.min_width);
    bound(stored, bounds.min_width, upper).non_negative()
}

fn candidate_width(kind: PanelKind, inputs: &PanelInputs<'_>, settings: &PanelSettings) -> f64 {
    let bounds = kind.bounds(settings);
    let current = inputs.current[kind];

    if inputs.panel_changed && current.non_negative() > 0.0 {
        return current;
    }

    match inputs.stored[kind].filter(|w| w.is_finite() && *w > 0.0) {
        Some(stored) => restored_width(stored, &bounds, inputs.window_width),
        None => default_width(&bounds, inputs.window_width),
    }
}

/// Zeroes every panel the selector hides. Runs after candidate resolution,
/// so a reused or restored width never leaks through for a hidden panel.
pub fn apply_mutual_exclusion(open: PanelSelector, widths: &mut PerPanel<f64>) {
    for kind in PanelKind::iter() {
        if !open.keeps(kind) {
            widths[kind] = 0.0;
        }
    }
}

pub fn resolve_panel_sizes(inputs: &PanelInputs<'_>, settings: &PanelSettings) -> PerPanel<f64> {
    let mut widths = PerPanel::from_fn(|kind| candidate_width(kind, inputs, settings));
    apply_mutual_exclusion(inputs.open, &mut widths);
    widths
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolve(open: PanelSelector, window_width: f64) -> PerPanel<f64> {
        let current = PerPanel::default();
        let stored = PerPanel::default();
        resolve_panel_sizes(
            &PanelInputs {
                open,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width,
            },
            &PanelSettings::default(),
        )
    }

    #[test]
    fn default_width_stays_within_panel_bounds() {
        let settings = PanelSettings::default();
        for kind in PanelKind::iter() {
            let bounds = kind.bounds(&settings);
            for window_width in [0.0, 120.0, 480.0, 1200.0, 1920.0, 3840.0, 10_000.0] {
                let width = default_width(&bounds, window_width);
                assert!(
                    (bounds.min_width..=bounds.max_width).contains(&width),
                    "{kind:?} at {window_width}: {width}"
                );
                let expected = (window_width * bounds.ratio).max(bounds.min_width).min(bounds.max_width);
                assert_eq!(width, expected);
            }
        }
    }

    #[test]
    fn chat_at_1200_keeps_userlist_and_hides_others() {
        let widths = resolve(PanelSelector::Chat, 1200.0);

        assert_eq!(widths.chat, 240.0);
        assert_eq!(widths.userlist, 120.0);
        assert_eq!(widths.poll, 0.0);
        assert_eq!(widths.note, 0.0);
        assert_eq!(widths.captions, 0.0);
        assert_eq!(widths.waiting, 0.0);
        assert_eq!(widths.breakout_room, 0.0);
    }

    #[test]
    fn every_selector_hides_all_but_its_panel_and_userlist() {
        for selector in [
            PanelSelector::Userlist,
            PanelSelector::Chat,
            PanelSelector::Poll,
            PanelSelector::Note,
            PanelSelector::Captions,
            PanelSelector::WaitingUsersPanel,
            PanelSelector::BreakoutRoom,
        ] {
            let widths = resolve(selector, 1440.0);
            for (kind, width) in widths.iter() {
                if kind == PanelKind::Userlist || selector.panel() == Some(kind) {
                    assert!(*width > 0.0, "{selector:?} hid {kind:?}");
                } else {
                    assert_eq!(*width, 0.0, "{selector:?} left {kind:?} visible");
                }
            }
        }
    }

    #[test]
    fn no_open_panel_hides_everything() {
        let widths = resolve(PanelSelector::None, 1440.0);
        assert_eq!(widths, PerPanel::default());
        assert_eq!(widths.occupied_width(), 0.0);
    }

    #[test]
    fn panel_change_reuses_current_width_before_exclusion() {
        let current = PerPanel { userlist: 180.0, poll: 333.0, ..Default::default() };
        let stored = PerPanel { chat: Some(300.0), ..Default::default() };
        let settings = PanelSettings::default();

        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Poll,
                panel_changed: true,
                current: &current,
                stored: &stored,
                window_width: 1200.0,
            },
            &settings,
        );

        assert_eq!(widths.userlist, 180.0);
        assert_eq!(widths.poll, 333.0);
        // The stored chat width was resolved, then zeroed by the selector.
        assert_eq!(widths.chat, 0.0);

        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Poll,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width: 1200.0,
            },
            &settings,
        );
        assert_eq!(widths.userlist, 120.0);
        assert_eq!(widths.poll, 320.0);
    }

    #[test]
    fn stored_widths_are_reclamped_for_the_current_window() {
        let current = PerPanel::default();
        let stored = PerPanel {
            userlist: Some(5000.0),
            note: Some(12.0),
            ..Default::default()
        };

        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Note,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width: 1000.0,
            },
            &PanelSettings::default(),
        );
        assert_eq!(widths.userlist, 240.0);
        assert_eq!(widths.note, 340.0);

        let stored = PerPanel { note: Some(790.0), ..Default::default() };
        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Note,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width: 500.0,
            },
            &PanelSettings::default(),
        );
        assert_eq!(widths.note, 500.0);

        // A window narrower than the panel minimum keeps the minimum.
        let stored = PerPanel { note: Some(340.0), ..Default::default() };
        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Note,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width: 320.0,
            },
            &PanelSettings::default(),
        );
        assert_eq!(widths.note, 340.0);
        assert_eq!(widths.note, default_width(&PanelSettings::default().note, 320.0));
    }

    #[test]
    fn nan_current_width_falls_back_on_panel_change() {
        let current = PerPanel { userlist: f64::NAN, chat: -5.0, ..Default::default() };
        let stored = PerPanel { chat: Some(300.0), ..Default::default() };

        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Chat,
                panel_changed: true,
                current: &current,
                stored: &stored,
                window_width: 1200.0,
            },
            &PanelSettings::default(),
        );
        assert_eq!(widths.userlist, 120.0);
        assert_eq!(widths.chat, 300.0);
    }

    #[test]
    fn non_positive_or_nan_stored_widths_fall_back_to_defaults() {
        let current = PerPanel::default();
        let stored = PerPanel {
            userlist: Some(f64::NAN),
            chat: Some(0.0),
            ..Default::default()
        };

        let widths = resolve_panel_sizes(
            &PanelInputs {
                open: PanelSelector::Chat,
                panel_changed: false,
                current: &current,
                stored: &stored,
                window_width: 1200.0,
            },
            &PanelSettings::default(),
        );
        assert_eq!(widths.userlist, 120.0);
        assert_eq!(widths.chat, 240.0);
    }

    #[test]
    fn secondary_width_picks_first_visible_in_order() {
        let widths = PerPanel { userlist: 100.0, note: 350.0, breakout_room: 320.0, ..Default::default() };
        assert_eq!(widths.secondary_width(), 350.0);
        assert_eq!(widths.occupied_width(), 450.0);
    }

    #[test]
    fn selector_parsing_rejects_unknown_values() {
        assert_eq!("".parse::<PanelSelector>().unwrap(), PanelSelector::None);
        assert_eq!(
            "waitingUsersPanel".parse::<PanelSelector>().unwrap(),
            PanelSelector::WaitingUsersPanel
        );
        assert!(matches!(
            "sharedNotes".parse::<PanelSelector>(),
            Err(LayoutError::UnexpectedPanel(value)) if value == "sharedNotes"
        ));
    }

    #[test]
    fn selector_serializes_to_session_strings() {
        assert_eq!(serde_json::to_string(&PanelSelector::BreakoutRoom).unwrap(), "\"breakoutroom\"");
        assert_eq!(serde_json::to_string(&PanelSelector::None).unwrap(), "\"\"");
        for selector in [PanelSelector::None, PanelSelector::Captions, PanelSelector::WaitingUsersPanel] {
            assert_eq!(selector.as_str().parse::<PanelSelector>().unwrap(), selector);
        }
    }
}
