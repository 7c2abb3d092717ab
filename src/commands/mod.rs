pub mod model;
pub mod queue;

pub use model::{Command, FanLimits, FAN_LIMITS};
pub use queue::CommandQueue;
