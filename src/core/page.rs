//! Page installer: wires every motion binding to a host in one pass.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use super::anchors::bind_anchors;
use super::callouts::bind_callouts;
use super::config::MotionConfig;
use super::counter::bind_counters;
use super::debounce::{Debouncer, bind_resize};
use super::error::Result;
use super::geometry::RootMargin;
use super::host::Host;
use super::konami::{KonamiDetector, bind_konami};
use super::lazy_image::bind_lazy_images;
use super::parallax::bind_parallax;
use super::reveal::{StaggerLane, reveal_each, reveal_staggered};
use super::stagger::StaggerRun;
use super::stripes::bind_stripes;
use super::style::RevealStyle;
use super::tilt::bind_tilt;
use super::watcher::{WatchOptions, WatchPolicy};

pub const RAINBOW_KEYFRAMES: &str = "
    @keyframes rainbow {
        0% { filter: hue-rotate(0deg); }
        100% { filter: hue-rotate(360deg); }
    }
";

/// Which features found their elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MotionReport {
    pub parallax: bool,
    pub anchors: usize,
    pub counters: bool,
    pub tilt_cards: usize,
    pub callouts: usize,
    pub tech_grid: bool,
    pub timeline: bool,
    pub stripes: bool,
    pub lazy_images: usize,
    pub revealed: usize,
}

/// Handles to the stateful bindings of an installed page.
pub struct InstalledMotion<H: Host> {
    pub report: MotionReport,
    pub konami: Rc<RefCell<KonamiDetector>>,
    pub resize: Rc<Debouncer<H>>,
    pub callouts: StaggerRun,
}

/// Installs every binding on `host`.
///
/// A feature whose elements are missing, or whose observer cannot be
/// created, is left out; the rest of the page still installs.
pub fn install<H: Host>(host: &Rc<H>, config: &MotionConfig) -> InstalledMotion<H> {
    let margin = match config.reveal_margin() {
        Ok(margin) => margin,
        Err(e) => {
            tracing::warn!("Falling back to a zero reveal margin: {}", e);
            RootMargin::ZERO
        }
    };

    let mut report = MotionReport {
        parallax: bind_parallax(host, &config.parallax),
        anchors: bind_anchors(host, &config.anchors),
        counters: settle("counters", bind_counters(host, &config.counters)),
        tilt_cards: bind_tilt(host, &config.tilt),
        ..MotionReport::default()
    };

    let callouts = bind_callouts(host, &config.callouts);
    report.callouts = callouts.len();

    let group_options = WatchOptions::new(config.reveal.threshold, margin, WatchPolicy::OneShotGroup);
    report.tech_grid = settle(
        "tech grid",
        reveal_staggered(
            host,
            &config.tech_grid.container,
            vec![tech_grid_lane(config)],
            group_options.clone(),
        ),
    );
    report.timeline = settle(
        "timeline",
        reveal_staggered(
            host,
            &config.timeline.container,
            timeline_lanes(config),
            group_options,
        ),
    );

    report.stripes = bind_stripes(host, &config.stripes);
    report.lazy_images = settle("lazy images", bind_lazy_images(host, &config.lazy_images));
    let resize = bind_resize(host, Duration::from_millis(config.resize.debounce_ms));
    let konami = bind_konami(host, &config.konami);

    host.inject_stylesheet(RAINBOW_KEYFRAMES);
    for banner in &config.banners {
        host.console_banner(&banner.text, &banner.css);
    }

    // Runs last so its inline styles win on elements the staggered groups
    // also prepared.
    report.revealed = settle(
        "reveal",
        reveal_each(
            host,
            &config.reveal.selector,
            RevealStyle::fade_up(config.reveal.offset_px, config.reveal.duration()),
            WatchOptions::new(config.reveal.threshold, margin, WatchPolicy::OneShotElement),
        ),
    );

    tracing::info!("Motion installed: {:?}", report);

    InstalledMotion {
        report,
        konami,
        resize,
        callouts,
    }
}

fn tech_grid_lane(config: &MotionConfig) -> StaggerLane {
    let grid = &config.tech_grid;
    StaggerLane {
        selector: grid.item.clone(),
        style: RevealStyle::slide_x(grid.offset_px, Duration::from_millis(grid.duration_ms)),
        step: Duration::from_millis(grid.step_ms),
        offset: Duration::ZERO,
    }
}

fn timeline_lanes(config: &MotionConfig) -> Vec<StaggerLane> {
    let timeline = &config.timeline;
    let step = Duration::from_millis(timeline.step_ms);
    vec![
        StaggerLane {
            selector: timeline.item.clone(),
            style: RevealStyle::pop(
                timeline.item_scale,
                Duration::from_millis(timeline.item_duration_ms),
            ),
            step,
            offset: Duration::ZERO,
        },
        StaggerLane {
            selector: timeline.connector.clone(),
            style: RevealStyle::wipe_x(Duration::from_millis(timeline.connector_duration_ms)),
            step,
            offset: Duration::from_millis(timeline.connector_offset_ms),
        },
    ]
}

fn settle<T: Default>(feature: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Skipping {}: {}", feature, e);
        T::default()
    })
}
