use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LayoutError;
use crate::common::config::{PresentationSettings, WebcamSettings};
use crate::common::geometry::{NonNegative, Size, bound};

/// Side of the media area the webcam strip is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebcamsPlacement {
    #[default]
    Top,
    Left,
    Right,
}

impl WebcamsPlacement {
    pub fn is_side(&self) -> bool { matches!(self, Self::Left | Self::Right) }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for WebcamsPlacement {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(LayoutError::UnexpectedPlacement(other.to_string())),
        }
    }
}

impl fmt::Display for WebcamsPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Size the user picked by dragging the webcam strip's resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSetSize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
pub struct WebcamsAreaInputs {
    pub media: Size,
    /// Aspect-fit size of the current slide inside the media area.
    pub presentation: Size,
    pub num_users_video: u32,
    pub placement: WebcamsPlacement,
    pub auto_arrange: bool,
    pub user_set: UserSetSize,
}

pub fn webcams_area_size(
    inputs: &WebcamsAreaInputs,
    webcams: &WebcamSettings,
    presentation: &PresentationSettings,
) -> Size {
    if inputs.num_users_video < 1 {
        return Size::ZERO;
    }

    let media = inputs.media;
    let min_width = media.width * webcams.min_percent;
    let min_height = media.height * webcams.min_percent;

    let mut area = match (inputs.auto_arrange, inputs.placement.is_side()) {
        (true, true) => {
            Size::new((media.width - inputs.presentation.width).max(min_width), media.height)
        }
        (true, false) => {
            Size::new(media.width, (media.height - inputs.presentation.height).max(min_height))
        }
        (false, true) => {
            let width = user_set_or(inputs.user_set.width, min_width);
            Size::new(bound(width, min_width, media.width * webcams.max_percent), media.height)
        }
        (false, false) => {
            let height = user_set_or(inputs.user_set.height, min_height);
            Size::new(media.width, bound(height, min_height, media.height * webcams.max_percent))
        }
    };

    // The presentation toolbar needs a minimum width; the webcams give way.
    if inputs.placement.is_side() && media.width - area.width < presentation.min_width {
        area.width = media.width - presentation.min_width;
    }

    area.sanitized()
}

/// A zero or unusable stored value counts as "never resized".
fn user_set_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.non_negative() > 0.0).unwrap_or(fallback)
}

#[derive(Clone, Copy, Debug)]
pub struct PlacementInputs {
    pub media: Size,
    pub presentation: Size,
    pub screen_share_active: bool,
    pub auto_arrange: bool,
    pub is_mobile: bool,
}

/// Picks where auto-arrange docks the webcams, or `None` when auto-arrange
/// is off and the current placement stands.
pub fn decide_placement(inputs: &PlacementInputs) -> Option<WebcamsPlacement> {
    if !inputs.auto_arrange {
        return None;
    }
    if inputs.screen_share_active {
        return Some(WebcamsPlacement::Top);
    }

    let spare_width = inputs.media.width - inputs.presentation.width;
    let spare_height = inputs.media.height - inputs.presentation.height;
    if !inputs.is_mobile && spare_width > spare_height {
        Some(WebcamsPlacement::Left)
    } else {
        Some(WebcamsPlacement::Top)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn area(inputs: WebcamsAreaInputs) -> Size {
        webcams_area_size(&inputs, &WebcamSettings::default(), &PresentationSettings::default())
    }

    fn auto(placement: WebcamsPlacement, presentation: Size) -> WebcamsAreaInputs {
        WebcamsAreaInputs {
            media: Size::new(1000.0, 600.0),
            presentation,
            num_users_video: 3,
            placement,
            auto_arrange: true,
            user_set: UserSetSize::default(),
        }
    }

    #[test]
    fn no_webcams_reserve_nothing() {
        let mut inputs = auto(WebcamsPlacement::Left, Size::new(400.0, 600.0));
        inputs.num_users_video = 0;
        assert_eq!(area(inputs), Size::ZERO);
    }

    #[test]
    fn auto_arrange_side_takes_leftover_width() {
        assert_eq!(
            area(auto(WebcamsPlacement::Left, Size::new(600.0, 600.0))),
            Size::new(400.0, 600.0)
        );
    }

    #[test]
    fn auto_arrange_side_is_floored_at_min_percent() {
        assert_eq!(
            area(auto(WebcamsPlacement::Right, Size::new(950.0, 534.0))),
            Size::new(200.0, 600.0)
        );
    }

    #[test]
    fn auto_arrange_top_takes_leftover_height_with_floor() {
        assert_eq!(
            area(auto(WebcamsPlacement::Top, Size::new(600.0, 337.5))),
            Size::new(1000.0, 262.5)
        );
        assert_eq!(
            area(auto(WebcamsPlacement::Top, Size::new(1000.0, 562.5))),
            Size::new(1000.0, 120.0)
        );
    }

    #[test]
    fn presentation_keeps_minimum_width_when_docked_sideways() {
        // Leftover would be 800px of webcams, leaving only 200px of slides.
        assert_eq!(
            area(auto(WebcamsPlacement::Left, Size::new(200.0, 600.0))),
            Size::new(615.0, 600.0)
        );
    }

    #[test]
    fn side_floor_holds_whenever_presentation_allows() {
        for presentation_width in [0.0, 200.0, 500.0, 615.0, 800.0, 950.0, 1000.0] {
            let size = area(auto(WebcamsPlacement::Left, Size::new(presentation_width, 600.0)));
            assert!(size.width >= 200.0, "{presentation_width}: {size:?}");
            assert!(1000.0 - size.width >= 385.0, "{presentation_width}: {size:?}");
        }
    }

    #[test]
    fn manual_size_is_clamped_to_percent_range() {
        let mut inputs = auto(WebcamsPlacement::Top, Size::ZERO);
        inputs.auto_arrange = false;

        inputs.user_set.height = Some(50.0);
        assert_eq!(area(inputs), Size::new(1000.0, 120.0));

        inputs.user_set.height = Some(300.0);
        assert_eq!(area(inputs), Size::new(1000.0, 300.0));

        inputs.user_set.height = Some(590.0);
        assert_eq!(area(inputs), Size::new(1000.0, 480.0));

        inputs.user_set.height = None;
        assert_eq!(area(inputs), Size::new(1000.0, 120.0));
    }

    #[test]
    fn manual_side_size_respects_presentation_minimum() {
        let mut inputs = auto(WebcamsPlacement::Right, Size::ZERO);
        inputs.auto_arrange = false;

        inputs.user_set.width = Some(350.0);
        assert_eq!(area(inputs), Size::new(350.0, 600.0));

        inputs.user_set.width = Some(780.0);
        assert_eq!(area(inputs), Size::new(615.0, 600.0));

        inputs.user_set.width = Some(0.0);
        assert_eq!(area(inputs), Size::new(200.0, 600.0));
    }

    #[test]
    fn narrow_media_area_does_not_produce_negative_width() {
        let mut inputs = auto(WebcamsPlacement::Left, Size::new(300.0, 200.0));
        inputs.media = Size::new(300.0, 600.0);
        assert_eq!(area(inputs), Size::new(0.0, 600.0));
    }

    fn placement(presentation: Size, screen_share_active: bool, is_mobile: bool) -> Option<WebcamsPlacement> {
        decide_placement(&PlacementInputs {
            media: Size::new(1000.0, 600.0),
            presentation,
            screen_share_active,
            auto_arrange: true,
            is_mobile,
        })
    }

    #[test]
    fn wide_spare_margin_docks_left() {
        assert_eq!(placement(Size::new(600.0, 600.0), false, false), Some(WebcamsPlacement::Left));
        assert_eq!(placement(Size::new(1000.0, 562.5), false, false), Some(WebcamsPlacement::Top));
    }

    #[test]
    fn screen_share_and_mobile_force_top() {
        assert_eq!(placement(Size::new(600.0, 600.0), true, false), Some(WebcamsPlacement::Top));
        assert_eq!(placement(Size::new(600.0, 600.0), false, true), Some(WebcamsPlacement::Top));
    }

    #[test]
    fn manual_mode_leaves_placement_alone() {
        let decided = decide_placement(&PlacementInputs {
            media: Size::new(1000.0, 600.0),
            presentation: Size::new(600.0, 600.0),
            screen_share_active: true,
            auto_arrange: false,
            is_mobile: false,
        });
        assert_eq!(decided, None);
    }

    #[test]
    fn placement_parses_and_serializes_lowercase() {
        assert_eq!("right".parse::<WebcamsPlacement>().unwrap(), WebcamsPlacement::Right);
        assert!(matches!(
            "bottom".parse::<WebcamsPlacement>(),
            Err(LayoutError::UnexpectedPlacement(_))
        ));
        assert_eq!(serde_json::to_string(&WebcamsPlacement::Left).unwrap(), "\"left\"");
    }
}
