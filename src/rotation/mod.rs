//! Persona rotation
//!
//! The policy decides when and to whom the active persona moves; the
//! scheduler applies it against the settings service.

mod policy;
mod scheduler;

pub use policy::{check_consistency, Consistency};
pub use scheduler::{RotationScheduler, SchedulerConfig, TickOutcome};
