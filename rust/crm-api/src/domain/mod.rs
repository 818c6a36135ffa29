//! Core domain models.
//!
//! Every entity is a tenant-scoped record owned by exactly one user
//! (`user_id`), except [`clients::Interaction`] which is scoped through its
//! owning client. Status fields are closed enums; transitions between
//! values are deliberately unrestricted.

pub mod activity;
pub mod assistant;
pub mod clients;
pub mod deals;
pub mod leads;
pub mod projects;

pub use activity::{Communication, CommunicationKind, FollowUp, FollowUpKind, FollowUpWithClient};
pub use assistant::AiConversation;
pub use clients::{Client, ClientRef, Interaction};
pub use deals::{Deal, DealStatus, DealWithRelations, PipelineStage, StageRef};
pub use leads::{Lead, LeadStatus};
pub use projects::{
    Project, ProjectRef, ProjectStatus, Task, TaskPriority, TaskStatus, TaskWithRelations,
};
