//! Motion configuration.
//!
//! Every selector, threshold, duration and step used by the bindings lives
//! here. `MotionConfig::default()` is the stock tuning; a page can override
//! any subset through a JSON document (see `MotionConfig::from_json`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{MotionError, Result};
use super::geometry::RootMargin;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Generic fade-up reveal for cards and sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub threshold: f64,
    pub root_margin: String,
    pub offset_px: f64,
    pub duration_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".performance-card, .tech-card, .design-showcase, .anticipation-content"
                .to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -100px 0px".to_string(),
            offset_px: 40.0,
            duration_ms: 800,
        }
    }
}

impl RevealConfig {
    pub fn duration(&self) -> Duration {
        ms(self.duration_ms)
    }
}

/// Staggered slide-in of the tech cards inside their grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechGridConfig {
    pub container: String,
    pub item: String,
    pub offset_px: f64,
    pub duration_ms: u64,
    pub step_ms: u64,
}

impl Default for TechGridConfig {
    fn default() -> Self {
        Self {
            container: ".tech-grid".to_string(),
            item: ".tech-card".to_string(),
            offset_px: -30.0,
            duration_ms: 600,
            step_ms: 150,
        }
    }
}

/// Timeline items pop in, connectors wipe in half a step later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub container: String,
    pub item: String,
    pub connector: String,
    pub item_scale: f64,
    pub item_duration_ms: u64,
    pub connector_duration_ms: u64,
    pub step_ms: u64,
    pub connector_offset_ms: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            container: ".anticipation-timeline".to_string(),
            item: ".timeline-item".to_string(),
            connector: ".timeline-connector".to_string(),
            item_scale: 0.8,
            item_duration_ms: 500,
            connector_duration_ms: 400,
            step_ms: 300,
            connector_offset_ms: 150,
        }
    }
}

/// Hero figure counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub trigger: String,
    pub selector: String,
    pub threshold: f64,
    pub duration_ms: u64,
    pub tick_ms: u64,
    pub stagger_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            trigger: ".hero".to_string(),
            selector: ".spec-value".to_string(),
            threshold: 0.5,
            duration_ms: 1500,
            tick_ms: 16,
            stagger_ms: 200,
        }
    }
}

impl CounterConfig {
    pub fn duration(&self) -> Duration {
        ms(self.duration_ms)
    }

    pub fn tick(&self) -> Duration {
        ms(self.tick_ms)
    }

    pub fn stagger(&self) -> Duration {
        ms(self.stagger_ms)
    }
}

/// Pointer tilt on cards. Larger `sensitivity` means smaller angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub selector: String,
    pub perspective_px: f64,
    pub sensitivity: f64,
    pub lift_px: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            selector: ".performance-card".to_string(),
            perspective_px: 1000.0,
            sensitivity: 20.0,
            lift_px: 8.0,
        }
    }
}

/// Pulsing callout dots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalloutConfig {
    pub selector: String,
    pub animation: String,
    pub duration_s: f64,
    pub delay_step_s: f64,
    pub start_step_ms: u64,
}

impl Default for CalloutConfig {
    fn default() -> Self {
        Self {
            selector: ".callout-dot".to_string(),
            animation: "pulse".to_string(),
            duration_s: 2.0,
            delay_step_s: 0.3,
            start_step_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub selector: String,
    pub speed: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            selector: ".hero-image-wrapper".to_string(),
            speed: 0.5,
        }
    }
}

/// Rotating racing-stripe background, desktop only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripesConfig {
    pub selector: String,
    pub start_deg: f64,
    pub step_deg: f64,
    pub min_viewport_px: f64,
    pub color: String,
    pub gap_px: f64,
    pub width_px: f64,
}

impl Default for StripesConfig {
    fn default() -> Self {
        Self {
            selector: ".racing-stripes".to_string(),
            start_deg: 45.0,
            step_deg: 0.05,
            min_viewport_px: 768.0,
            color: "rgba(0, 102, 255, 0.03)".to_string(),
            gap_px: 50.0,
            width_px: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyImageConfig {
    pub selector: String,
    pub duration_ms: u64,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            selector: "img".to_string(),
            duration_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub selector: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            selector: "a[href^=\"#\"]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub debounce_ms: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

/// Key sequence easter egg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KonamiConfig {
    pub pattern: Vec<String>,
    pub animation: String,
    pub effect_ms: u64,
}

impl Default for KonamiConfig {
    fn default() -> Self {
        let pattern = [
            "ArrowUp",
            "ArrowUp",
            "ArrowDown",
            "ArrowDown",
            "ArrowLeft",
            "ArrowRight",
            "ArrowLeft",
            "ArrowRight",
            "b",
            "a",
        ];
        Self {
            pattern: pattern.iter().map(|key| key.to_string()).collect(),
            animation: "rainbow 2s ease infinite".to_string(),
            effect_ms: 5000,
        }
    }
}

/// One styled console line written at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerLine {
    pub text: String,
    pub css: String,
}

fn default_banners() -> Vec<BannerLine> {
    vec![
        BannerLine {
            text: "🏍️ BMW R1300RT 2026 - Engineered for Excellence".to_string(),
            css: "font-size: 20px; font-weight: bold; color: #0066ff;".to_string(),
        },
        BannerLine {
            text: "Try the Konami Code for a surprise! ↑ ↑ ↓ ↓ ← → ← → B A".to_string(),
            css: "font-size: 12px; color: #666;".to_string(),
        },
    ]
}

/// Full motion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub reveal: RevealConfig,
    pub tech_grid: TechGridConfig,
    pub timeline: TimelineConfig,
    pub counters: CounterConfig,
    pub tilt: TiltConfig,
    pub callouts: CalloutConfig,
    pub parallax: ParallaxConfig,
    pub stripes: StripesConfig,
    pub lazy_images: LazyImageConfig,
    pub anchors: AnchorConfig,
    pub resize: ResizeConfig,
    pub konami: KonamiConfig,
    pub banners: Vec<BannerLine>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            tech_grid: TechGridConfig::default(),
            timeline: TimelineConfig::default(),
            counters: CounterConfig::default(),
            tilt: TiltConfig::default(),
            callouts: CalloutConfig::default(),
            parallax: ParallaxConfig::default(),
            stripes: StripesConfig::default(),
            lazy_images: LazyImageConfig::default(),
            anchors: AnchorConfig::default(),
            resize: ResizeConfig::default(),
            konami: KonamiConfig::default(),
            banners: default_banners(),
        }
    }
}

impl MotionConfig {
    /// Parses a (possibly partial) JSON override and validates it.
    ///
    /// Missing sections and fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MotionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Trigger margin of the generic reveal, parsed.
    pub fn reveal_margin(&self) -> Result<RootMargin> {
        self.reveal.root_margin.parse()
    }

    pub fn validate(&self) -> Result<()> {
        check_ratio("reveal.threshold", self.reveal.threshold)?;
        check_ratio("counters.threshold", self.counters.threshold)?;
        self.reveal_margin()?;

        if self.counters.tick_ms == 0 {
            return Err(MotionError::InvalidValue {
                field: "counters.tick_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tilt.sensitivity == 0.0 {
            return Err(MotionError::InvalidValue {
                field: "tilt.sensitivity",
                reason: "must not be zero".to_string(),
            });
        }
        if self.konami.pattern.is_empty() {
            return Err(MotionError::InvalidValue {
                field: "konami.pattern",
                reason: "must contain at least one key".to_string(),
            });
        }
        Ok(())
    }
}

fn check_ratio(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MotionError::InvalidValue {
            field,
            reason: format!("{} is outside 0..=1", value),
        })
    }
}
