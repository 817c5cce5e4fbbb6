//! Masonry ("waterfall") grid layout.
//!
//! [`Waterfall`] ties the pieces together for one container: breakpoint
//! resolution and shortest-column-first placement from `waterfall-layout`,
//! debounced and throttled reflow from `waterfall-reactive`, and the host's
//! width and height probes.

pub mod config;
pub mod item;
pub mod measure;
pub mod probe;
pub mod waterfall;

pub use config::{AnimationPolicy, ConfigError, WaterfallConfig, DEFAULT_GUTTER, DEFAULT_ITEM_WIDTH};
pub use item::{GridItem, ItemId, ItemPlacement};
pub use measure::{
    balanced_flow_height, wrapped_lines, Attribute, CardContent, CardKind, CardMeasurer, CardMetrics, Content, ContentProbe, PanelContent,
};
pub use probe::{ContainerProbe, FixedHeights, ItemProbe, SharedWidth};
pub use waterfall::{LayoutCallback, LayoutPass, RevealCallback, Waterfall, WaterfallEvent};

pub use waterfall_layout::{Breakpoint, BreakpointMatch, BreakpointTable, ColumnGeometry, Placement};
pub use waterfall_reactive::{
    Clock, DriverError, DriverPhase, ManualClock, RefreshDecision, ReflowDriver, ReflowState, ReflowTrigger, SystemClock, TokioClock,
};
