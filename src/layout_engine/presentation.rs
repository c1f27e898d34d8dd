use super::WebcamsPlacement;
use crate::common::config::PresentationSettings;
use crate::common::geometry::{NonNegative, Size};

/// Largest rectangle with the slide's aspect ratio that fits inside `media`.
///
/// Landscape and square slides start from the full media width, portrait
/// slides from the full media height; whichever axis then overflows is
/// scaled back down. A slide without usable dimensions fills the media area.
pub fn fit_slide(media: Size, slide: Size) -> Size {
    let media = media.sanitized();
    if slide.is_degenerate() {
        return media;
    }

    if slide.width >= slide.height {
        let mut width = media.width;
        let mut height = media.width * slide.height / slide.width;
        if height > media.height {
            width = media.height * slide.width / slide.height;
            height = media.height;
        }
        Size::new(width, height)
    } else {
        let mut width = media.height * slide.width / slide.height;
        let mut height = media.height;
        if width > media.width {
            height = media.width * slide.height / slide.width;
            width = media.width;
        }
        Size::new(width, height)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PresentationAreaInputs {
    pub window: Size,
    pub media: Size,
    pub webcams_area: Size,
    pub num_users_video: u32,
    pub placement: WebcamsPlacement,
    pub fullscreen: bool,
}

/// Space handed to the slide viewer once the webcam strip is carved out.
pub fn presentation_area_size(
    inputs: &PresentationAreaInputs,
    settings: &PresentationSettings,
) -> Size {
    if inputs.fullscreen {
        return inputs.window.sanitized();
    }

    let media = inputs.media;
    if inputs.num_users_video < 1 {
        return Size::new(media.width, media.height - settings.margin).sanitized();
    }

    let area = if inputs.placement.is_side() {
        Size::new(
            media.width - inputs.webcams_area.width - settings.margin,
            media.height - settings.margin,
        )
    } else {
        Size::new(
            media.width,
            media.height - inputs.webcams_area.height - settings.top_margin,
        )
    };

    Size::new(area.width.non_negative(), area.height.non_negative())
}
