//! Seams between components. Each component only sees the narrow trait of
//! its downstream collaborator.

mod event_observer;
mod record_sink;
mod review_intake;

pub use event_observer::IEventObserver;
pub use record_sink::IRecordSink;
pub use review_intake::IReviewIntake;
