use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use meeting_layout::common::config::{Config, config_file, store_file};
use meeting_layout::common::geometry::Size;
use meeting_layout::common::log;
use meeting_layout::layout_engine::{
    DeviceProfile, LayoutManager, PanelSelector, RecomputeFlags, UserSetSize, ViewportClass,
    WebcamsPlacement,
};
use meeting_layout::model::{FileStore, LayoutAction, LayoutSnapshot, LayoutStateStore, LayoutStorage};
use serde::Serialize;
use tracing::{info, warn};

/// Compute the meeting layout for one set of inputs and print it as JSON.
///
/// Preferences (auto-arrange, webcam placement, dragged sizes) and the last
/// snapshot persist in the store file between runs.
#[derive(Parser)]
struct Cli {
    /// Window width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Window height in pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Open side panel: userlist, chat, poll, note, captions,
    /// waitingUsersPanel or breakoutroom.
    #[arg(long)]
    panel: Option<PanelSelector>,

    /// Number of users sharing video.
    #[arg(long, default_value_t = 0)]
    webcams: u32,

    /// Slide dimensions as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    slide: Option<Size>,

    /// Let the webcam placement follow the slide shape.
    #[arg(long, conflicts_with = "manual")]
    auto_arrange: bool,

    /// Keep the webcam placement and size the user chose.
    #[arg(long)]
    manual: bool,

    /// Dock the webcams on this side: top, left or right.
    #[arg(long)]
    placement: Option<WebcamsPlacement>,

    /// Width the user dragged a side webcam strip to.
    #[arg(long)]
    webcams_width: Option<f64>,

    /// Height the user dragged a top webcam strip to.
    #[arg(long)]
    webcams_height: Option<f64>,

    #[arg(long)]
    mobile: bool,

    #[arg(long)]
    large_font: bool,

    /// The presentation is in fullscreen mode.
    #[arg(long)]
    fullscreen: bool,

    /// A screen share is in progress.
    #[arg(long)]
    screen_share: bool,

    /// Storage file to read and update. Defaults to ~/.meeting-layout/storage.ron.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Configuration file. Defaults to ~/.meeting-layout.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the configuration file and exit.
    #[arg(long)]
    validate: bool,
}

impl Cli {
    fn auto_arrange(&self) -> Option<bool> {
        match (self.auto_arrange, self.manual) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Inputs that only live for this run.
    fn transient_actions(&self) -> Vec<LayoutAction> {
        vec![
            LayoutAction::SetWindowSize(Size::new(self.width, self.height)),
            LayoutAction::SetOpenPanel(self.panel.unwrap_or_default()),
            LayoutAction::SetNumUsersVideo(self.webcams),
            LayoutAction::SetPresentationSlideSize(self.slide.unwrap_or(Size::ZERO)),
            LayoutAction::SetPresentationIsFullscreen(self.fullscreen),
            LayoutAction::SetScreenIsShared(self.screen_share),
            LayoutAction::SetDeviceProfile(DeviceProfile {
                is_mobile: self.mobile,
                large_font: self.large_font,
            }),
        ]
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = width.trim().parse::<f64>().map_err(|e| format!("bad width: {e}"))?;
    let height = height.trim().parse::<f64>().map_err(|e| format!("bad height: {e}"))?;
    Ok(Size::new(width, height))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    #[serde(flatten)]
    snapshot: &'a LayoutSnapshot,
    viewport: ViewportClass,
    media_hidden: bool,
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let mut config = Config::read_or_default(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    let issues = config.validate();
    if opt.validate {
        if issues.is_empty() {
            println!("{}: ok", config_path.display());
            return Ok(());
        }
        for issue in &issues {
            eprintln!("{issue}");
        }
        anyhow::bail!("{} issue(s) in {}", issues.len(), config_path.display());
    }
    if !issues.is_empty() {
        for issue in &issues {
            warn!("config: {issue}");
        }
        let fixed = config.auto_fix_values();
        warn!("auto-fixed {fixed} config value(s)");
    }

    let store_path = opt.store.clone().unwrap_or_else(store_file);
    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening {}", store_path.display()))?;
    let mut manager = LayoutManager::new(
        config.settings.layout.clone(),
        LayoutStorage::new(store),
        LayoutStateStore::default(),
    );
    manager.mount();

    for action in opt.transient_actions() {
        manager.dispatch(action);
    }

    let mut flags = RecomputeFlags::empty();
    if let Some(enabled) = opt.auto_arrange() {
        manager.dispatch(LayoutAction::SetAutoArrangeLayout(enabled));
        manager.storage_mut().set_auto_arrange(enabled)?;
    }
    if let Some(placement) = opt.placement {
        manager.dispatch(LayoutAction::SetWebcamsPlacement(placement));
        manager.storage_mut().set_webcams_placement(placement)?;
        flags |= RecomputeFlags::PLACEMENT_CHANGED;
    }
    let user_set = UserSetSize {
        width: opt.webcams_width,
        height: opt.webcams_height,
    };
    if user_set != UserSetSize::default() {
        manager.storage_mut().set_webcams_user_set(user_set)?;
    }

    let outcome = manager
        .set_layout_sizes(flags)?
        .context("layout pass was skipped")?;
    info!(
        viewport = ?outcome.viewport,
        placement = %outcome.snapshot.webcams_placement,
        "stored layout in {}",
        store_path.display()
    );

    let report = Report {
        snapshot: &outcome.snapshot,
        viewport: outcome.viewport,
        media_hidden: outcome.viewport.hides_media(opt.panel.unwrap_or_default(), opt.mobile),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of unwinding.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
