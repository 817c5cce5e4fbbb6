pub mod breakpoints;
pub mod columns;
pub mod placement;
pub mod reveal;

pub use breakpoints::{
    fit_columns, resolve_columns, Breakpoint, BreakpointError, BreakpointMatch, BreakpointResolver,
    BreakpointTable, ColumnGeometry, ColumnsSpec, MAX_COLUMNS,
};
pub use columns::ColumnTracker;
pub use placement::{Placement, PlacementEngine, PlacementPass};
pub use reveal::RevealGate;
