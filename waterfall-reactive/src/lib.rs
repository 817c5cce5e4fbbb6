pub mod clock;
pub mod driver;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use driver::{DriverError, DriverPhase, ReflowDriver, ReflowTarget};
pub use scheduler::{
    RefreshDecision, ReflowScheduler, ReflowState, ReflowTrigger, SchedulerStats, DEFAULT_DEBOUNCE,
    DEFAULT_THROTTLE,
};
