//! Review-record state model: the record itself, the scheduling policy and the
//! pure transition applied when a learner answers a review prompt.

pub mod error;
pub mod model;
pub mod policy;
pub mod transition;

pub use error::RecordError;
pub use model::{NewReviewRecord, ReviewOutcome, ReviewRecord, COMPLETION_LEVEL};
pub use policy::{PolicyError, SchedulePolicy};
pub use transition::apply_outcome;
