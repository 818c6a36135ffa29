//! Mapping from domain entities to stored documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{SortKey, Table};
use crate::domain::{
    AiConversation, Client, Communication, Deal, FollowUp, Interaction, Lead, PipelineStage,
    Project, Task,
};

/// A domain entity that can be persisted as a document.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table this entity lives in.
    const TABLE: Table;

    fn id(&self) -> Uuid;

    /// Owning user; `None` for client-scoped entities (interactions).
    fn owner(&self) -> Option<&str>;

    /// Key under the table's default ordering (see [`Table::order`]).
    fn sort_key(&self) -> SortKey;

    /// Referenced client, for client-filtered reads and cascade deletes.
    fn client_ref(&self) -> Option<Uuid> {
        None
    }
}

impl Record for Client {
    const TABLE: Table = Table::Clients;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
}

impl Record for Lead {
    const TABLE: Table = Table::Leads;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
}

impl Record for Deal {
    const TABLE: Table = Table::Deals;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
    fn client_ref(&self) -> Option<Uuid> {
        self.client_id
    }
}

impl Record for PipelineStage {
    const TABLE: Table = Table::PipelineStages;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::Num(f64::from(self.order_index))
    }
}

impl Record for Project {
    const TABLE: Table = Table::Projects;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
    fn client_ref(&self) -> Option<Uuid> {
        self.client_id
    }
}

impl Record for Task {
    const TABLE: Table = Table::Tasks;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
    fn client_ref(&self) -> Option<Uuid> {
        self.client_id
    }
}

impl Record for Interaction {
    const TABLE: Table = Table::Interactions;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        None
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
    fn client_ref(&self) -> Option<Uuid> {
        Some(self.client_id)
    }
}

impl Record for Communication {
    const TABLE: Table = Table::Communications;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
    fn client_ref(&self) -> Option<Uuid> {
        self.client_id
    }
}

impl Record for FollowUp {
    const TABLE: Table = Table::FollowUps;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.scheduled_for)
    }
    fn client_ref(&self) -> Option<Uuid> {
        self.client_id
    }
}

impl Record for AiConversation {
    const TABLE: Table = Table::AiConversations;
    fn id(&self) -> Uuid {
        self.id
    }
    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }
    fn sort_key(&self) -> SortKey {
        SortKey::timestamp(self.created_at)
    }
}
