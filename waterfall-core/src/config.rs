use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use waterfall_layout::{BreakpointError, BreakpointMatch, BreakpointTable};

pub const DEFAULT_GUTTER: f32 = 20.0;
pub const DEFAULT_ITEM_WIDTH: f32 = 250.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid breakpoints: {0}")]
    Breakpoints(#[from] BreakpointError),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a newly revealed item should enter. Passed through to the host with
/// every reveal notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPolicy {
    pub effect: String,
    pub duration_ms: u64,
    pub delay_ms: u64,
}

impl AnimationPolicy {
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            duration_ms: 0,
            delay_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AnimationPolicy {
    fn default() -> Self {
        Self::new("fadeIn")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallConfig {
    pub gutter: f32,
    pub default_width: f32,
    pub breakpoints: BreakpointTable,
    pub breakpoint_match: BreakpointMatch,
    pub animation: AnimationPolicy,
    pub resize_debounce_ms: u64,
    pub refresh_throttle_ms: u64,
}

impl WaterfallConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config, then clamp out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WaterfallConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn with_default_width(mut self, width: f32) -> Self {
        self.default_width = width;
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: BreakpointTable) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    /// Strict variant of [`with_breakpoints`](Self::with_breakpoints) for
    /// callers that want malformed tables reported.
    pub fn try_with_breakpoint_pairs<I>(mut self, pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        self.breakpoints = BreakpointTable::try_from_pairs(pairs)?;
        Ok(self)
    }

    pub fn with_breakpoint_match(mut self, mode: BreakpointMatch) -> Self {
        self.breakpoint_match = mode;
        self
    }

    pub fn with_animation(mut self, animation: AnimationPolicy) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_resize_debounce(mut self, debounce: Duration) -> Self {
        self.resize_debounce_ms = debounce.as_millis() as u64;
        self
    }

    pub fn with_refresh_throttle(mut self, throttle: Duration) -> Self {
        self.refresh_throttle_ms = throttle.as_millis() as u64;
        self
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn refresh_throttle(&self) -> Duration {
        Duration::from_millis(self.refresh_throttle_ms)
    }

    /// Replace values layout cannot work with by the defaults.
    pub fn normalized(mut self) -> Self {
        if !(self.gutter >= 0.0) || !self.gutter.is_finite() {
            tracing::warn!(gutter = self.gutter, "invalid gutter, using {}", DEFAULT_GUTTER);
            self.gutter = DEFAULT_GUTTER;
        }
        if !(self.default_width > 0.0) || !self.default_width.is_finite() {
            tracing::warn!(
                default_width = self.default_width,
                "invalid default width, using {}",
                DEFAULT_ITEM_WIDTH
            );
            self.default_width = DEFAULT_ITEM_WIDTH;
        }
        self
    }
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            gutter: DEFAULT_GUTTER,
            default_width: DEFAULT_ITEM_WIDTH,
            breakpoints: BreakpointTable::standard(),
            breakpoint_match: BreakpointMatch::UpTo,
            animation: AnimationPolicy::default(),
            resize_debounce_ms: 100,
            refresh_throttle_ms: 300,
        }
    }
}
