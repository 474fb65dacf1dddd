//! Core motion logic: host capabilities, watchers, timers and the bindings
//! built on them

pub mod anchors;
pub mod callouts;
pub mod config;
pub mod counter;
pub mod debounce;
mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod konami;
pub mod lazy_image;
pub mod page;
pub mod parallax;
pub mod reveal;
pub mod stagger;
pub mod stripes;
pub mod style;
pub mod tilt;
pub mod timer;
pub mod watcher;

pub use config::MotionConfig;
pub use error::{MotionError, Result};
pub use headless::HeadlessPage;
pub use host::{Events, Host, Surface, Visibility};
pub use page::{InstalledMotion, MotionReport, install};
pub use timer::Scheduler;
