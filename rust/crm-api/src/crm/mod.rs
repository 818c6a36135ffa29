//! Derived CRM views.
//!
//! Pure computations over already-fetched collections. Handlers in
//! [`crate::api`] do the fetching; everything here is synchronous and
//! side-effect free, which keeps the edge cases unit-testable without a
//! store.

pub mod dashboard;
pub mod prep;

pub use dashboard::{partition_follow_ups, todays_meetings, DashboardStats, FollowUpBuckets};
pub use prep::MeetingPrep;
