//! Typed entity accessors.
//!
//! One CRUD surface per entity over the document store, plus the
//! relationship-expanding list reads and the interaction side effect.
//! List reads go through the coarse [`ListCache`]; every mutation
//! invalidates the whole entity kind it touched.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::{DocStore, ListCache, Record, Store, Table};
use crate::domain::{
    Client, ClientRef, Deal, DealWithRelations, FollowUp, FollowUpWithClient, Interaction,
    PipelineStage, Project, ProjectRef, StageRef, Task, TaskWithRelations,
};

/// Entity accessors over a backing store.
#[derive(Debug, Clone)]
pub struct Accessors {
    store: Store,
    cache: ListCache,
}

impl Accessors {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            cache: ListCache::new(),
        }
    }

    // ------------------------------------------------------------------
    // Generic CRUD
    // ------------------------------------------------------------------

    /// All rows of `T` owned by `owner`, in the table's default order.
    pub async fn list<T: Record>(&self, owner: &str) -> Result<Vec<T>> {
        let docs = match self.cache.get(T::TABLE, owner) {
            Some(cached) => cached,
            None => {
                let fetched = self.store.list(T::TABLE, owner).await?;
                self.cache.put(T::TABLE, owner, fetched.clone());
                std::sync::Arc::new(fetched)
            }
        };
        docs.iter()
            .map(|doc| Ok(serde_json::from_value(doc.clone())?))
            .collect()
    }

    pub async fn get<T: Record>(&self, owner: &str, id: Uuid) -> Result<Option<T>> {
        let doc = self.store.get(T::TABLE, owner, &id.to_string()).await?;
        Ok(match doc {
            Some(doc) => Some(serde_json::from_value(doc)?),
            None => None,
        })
    }

    pub async fn insert<T: Record>(&self, record: &T) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.store
            .insert(
                T::TABLE,
                &record.id().to_string(),
                record.owner(),
                record.client_ref().map(|id| id.to_string()).as_deref(),
                record.sort_key(),
                doc,
            )
            .await?;
        self.cache.invalidate(T::TABLE);
        Ok(())
    }

    /// Overwrite an owned row with its updated value. `false` when the row
    /// does not exist (or belongs to someone else).
    pub async fn replace<T: Record>(&self, record: &T) -> Result<bool> {
        let owner = record
            .owner()
            .ok_or_else(|| anyhow::anyhow!("replace requires an owner-scoped record"))?;
        let doc = serde_json::to_value(record)?;
        let client_id = record.client_ref().map(|id| id.to_string());
        let replaced = self
            .store
            .replace(
                T::TABLE,
                owner,
                &record.id().to_string(),
                client_id.as_deref(),
                record.sort_key(),
                doc,
            )
            .await?;
        if replaced {
            self.cache.invalidate(T::TABLE);
        }
        Ok(replaced)
    }

    pub async fn delete<T: Record>(&self, owner: &str, id: Uuid) -> Result<bool> {
        let deleted = self.store.delete(T::TABLE, owner, &id.to_string()).await?;
        if deleted {
            self.cache.invalidate(T::TABLE);
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Clients and interactions
    // ------------------------------------------------------------------

    /// Delete a client. Dependent deals/projects/tasks keep their dangling
    /// `client_id`; interactions go with the client since they are scoped
    /// through it (see DESIGN.md).
    pub async fn delete_client(&self, owner: &str, id: Uuid) -> Result<bool> {
        let deleted = self.delete::<Client>(owner, id).await?;
        if deleted {
            match self
                .store
                .delete_by_client(Table::Interactions, &id.to_string())
                .await
            {
                Ok(removed) if removed > 0 => {
                    tracing::debug!(client_id = %id, removed, "Removed interactions with client");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(client_id = %id, error = %e, "Failed to remove interactions for deleted client");
                }
            }
            self.cache.invalidate(Table::Interactions);
        }
        Ok(deleted)
    }

    /// Interaction history for a client, newest first. `None` when the
    /// client is not the caller's.
    pub async fn list_interactions(
        &self,
        owner: &str,
        client_id: Uuid,
    ) -> Result<Option<Vec<Interaction>>> {
        if self.get::<Client>(owner, client_id).await?.is_none() {
            return Ok(None);
        }
        let scope = client_id.to_string();
        let docs = match self.cache.get(Table::Interactions, &scope) {
            Some(cached) => cached,
            None => {
                let fetched = self.store.list_by_client(Table::Interactions, &scope).await?;
                self.cache.put(Table::Interactions, &scope, fetched.clone());
                std::sync::Arc::new(fetched)
            }
        };
        let interactions = docs
            .iter()
            .map(|doc| Ok(serde_json::from_value(doc.clone())?))
            .collect::<Result<Vec<Interaction>>>()?;
        Ok(Some(interactions))
    }

    /// Log an interaction, then touch the owning client's `last_contact`.
    ///
    /// Two independent writes, no transaction: if the touch fails after the
    /// interaction is recorded, the failure is logged and the client keeps
    /// a stale `last_contact` until the user corrects it. Returns `None`
    /// when the client is not the caller's.
    pub async fn record_interaction(
        &self,
        owner: &str,
        interaction: Interaction,
    ) -> Result<Option<Interaction>> {
        let Some(mut client) = self.get::<Client>(owner, interaction.client_id).await? else {
            return Ok(None);
        };

        self.insert(&interaction).await?;

        client.last_contact = Some(Utc::now());
        match self.replace(&client).await {
            Ok(true) => {}
            Ok(false) => {
                // Client deleted between the two writes; nothing to touch.
                tracing::warn!(client_id = %client.id, "Client vanished before last_contact touch");
            }
            Err(e) => {
                tracing::warn!(
                    client_id = %client.id,
                    interaction_id = %interaction.id,
                    error = %e,
                    "Interaction recorded but last_contact touch failed"
                );
            }
        }

        Ok(Some(interaction))
    }

    /// Deals belonging to one client, newest first.
    pub async fn client_deals(&self, owner: &str, client_id: Uuid) -> Result<Vec<Deal>> {
        let docs = self
            .store
            .list_by_client(Table::Deals, &client_id.to_string())
            .await?;
        let deals = docs
            .into_iter()
            .map(|doc| Ok(serde_json::from_value::<Deal>(doc)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(deals.into_iter().filter(|d| d.user_id == owner).collect())
    }

    // ------------------------------------------------------------------
    // Relationship-expanding list reads
    // ------------------------------------------------------------------

    pub async fn list_deals_with_relations(&self, owner: &str) -> Result<Vec<DealWithRelations>> {
        let deals = self.list::<Deal>(owner).await?;
        let client_names = self.client_name_map(owner).await?;
        let stages: HashMap<Uuid, StageRef> = self
            .list::<PipelineStage>(owner)
            .await?
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    StageRef {
                        name: s.name,
                        color: s.color,
                    },
                )
            })
            .collect();

        Ok(deals
            .into_iter()
            .map(|deal| {
                let client = deal
                    .client_id
                    .and_then(|id| client_names.get(&id).cloned())
                    .map(|name| ClientRef { name });
                let stage = deal.stage_id.and_then(|id| stages.get(&id).cloned());
                DealWithRelations { deal, client, stage }
            })
            .collect())
    }

    pub async fn list_tasks_with_relations(&self, owner: &str) -> Result<Vec<TaskWithRelations>> {
        let tasks = self.list::<Task>(owner).await?;
        let client_names = self.client_name_map(owner).await?;
        let project_titles: HashMap<Uuid, String> = self
            .list::<Project>(owner)
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|task| {
                let client = task
                    .client_id
                    .and_then(|id| client_names.get(&id).cloned())
                    .map(|name| ClientRef { name });
                let project = task
                    .project_id
                    .and_then(|id| project_titles.get(&id).cloned())
                    .map(|title| ProjectRef { title });
                TaskWithRelations { task, project, client }
            })
            .collect())
    }

    pub async fn list_follow_ups_with_client(
        &self,
        owner: &str,
    ) -> Result<Vec<FollowUpWithClient>> {
        let follow_ups = self.list::<FollowUp>(owner).await?;
        let client_names = self.client_name_map(owner).await?;

        Ok(follow_ups
            .into_iter()
            .map(|follow_up| {
                let client = follow_up
                    .client_id
                    .and_then(|id| client_names.get(&id).cloned())
                    .map(|name| ClientRef { name });
                FollowUpWithClient { follow_up, client }
            })
            .collect())
    }

    async fn client_name_map(&self, owner: &str) -> Result<HashMap<Uuid, String>> {
        Ok(self
            .list::<Client>(owner)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }
}

/// Shallow-merge a JSON patch onto an existing record and decode the result.
///
/// Identity and bookkeeping keys can't be overridden by the caller. An
/// unknown enum value or wrong type in the patch surfaces as the returned
/// error string (the handler maps it to an invalid-request response).
pub fn apply_patch<T: Record>(existing: &T, patch: &Value) -> Result<T, String> {
    const PROTECTED: [&str; 3] = ["id", "user_id", "created_at"];

    let Value::Object(patch_map) = patch else {
        return Err("patch body must be a JSON object".to_string());
    };

    let mut doc = serde_json::to_value(existing).map_err(|e| e.to_string())?;
    let Value::Object(doc_map) = &mut doc else {
        return Err("record is not a JSON object".to_string());
    };
    for (key, value) in patch_map {
        if PROTECTED.contains(&key.as_str()) {
            continue;
        }
        doc_map.insert(key.clone(), value.clone());
    }

    serde_json::from_value(doc).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DealStatus, LeadStatus};
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_client(owner: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            user_id: owner.to_string(),
            name: "Acme".to_string(),
            email: None,
            phone: None,
            company: None,
            notes: None,
            tags: None,
            last_contact: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    fn accessors() -> Accessors {
        Accessors::new(Store::in_memory())
    }

    #[tokio::test]
    async fn list_after_insert_sees_the_new_row() {
        let acc = accessors();
        // Prime the cache with an empty list first.
        assert!(acc.list::<Client>("u1").await.unwrap().is_empty());

        acc.insert(&sample_client("u1")).await.unwrap();
        assert_eq!(acc.list::<Client>("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn record_interaction_touches_last_contact() {
        let acc = accessors();
        let client = sample_client("u1");
        acc.insert(&client).await.unwrap();

        let before = Utc::now();
        let interaction = Interaction {
            id: Uuid::new_v4(),
            client_id: client.id,
            kind: "Phone Call".to_string(),
            content: "X".to_string(),
            created_at: Utc::now(),
        };
        let recorded = acc
            .record_interaction("u1", interaction)
            .await
            .unwrap()
            .expect("client exists");

        let listed = acc
            .list_interactions("u1", client.id)
            .await
            .unwrap()
            .expect("client exists");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, recorded.id);
        assert_eq!(listed[0].content, "X");

        let touched: Client = acc.get("u1", client.id).await.unwrap().unwrap();
        assert!(touched.last_contact.expect("touched") >= before);
    }

    #[tokio::test]
    async fn record_interaction_rejects_foreign_client() {
        let acc = accessors();
        let client = sample_client("u1");
        acc.insert(&client).await.unwrap();

        let interaction = Interaction {
            id: Uuid::new_v4(),
            client_id: client.id,
            kind: "call".to_string(),
            content: "nope".to_string(),
            created_at: Utc::now(),
        };
        assert!(acc
            .record_interaction("u2", interaction)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_client_cascades_interactions() {
        let acc = accessors();
        let client = sample_client("u1");
        acc.insert(&client).await.unwrap();
        let interaction = Interaction {
            id: Uuid::new_v4(),
            client_id: client.id,
            kind: "call".to_string(),
            content: "hi".to_string(),
            created_at: Utc::now(),
        };
        acc.record_interaction("u1", interaction).await.unwrap();

        assert!(acc.delete_client("u1", client.id).await.unwrap());
        // Client gone, so the interaction list is unreachable.
        assert!(acc.list_interactions("u1", client.id).await.unwrap().is_none());
    }

    #[test]
    fn apply_patch_merges_and_protects_identity() {
        let client = sample_client("u1");
        let patched: Client = apply_patch(
            &client,
            &json!({"name": "Updated", "user_id": "intruder", "id": Uuid::new_v4()}),
        )
        .unwrap();
        assert_eq!(patched.name, "Updated");
        assert_eq!(patched.user_id, "u1");
        assert_eq!(patched.id, client.id);
    }

    #[test]
    fn apply_patch_rejects_unknown_enum_value() {
        let lead = crate::domain::Lead {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            contact_name: None,
            email: None,
            phone: None,
            company: None,
            value: None,
            status: LeadStatus::New,
            source: None,
            tags: None,
            notes: None,
            target_date: None,
            contacted_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(apply_patch(&lead, &json!({"status": "frozen"})).is_err());
        let ok = apply_patch(&lead, &json!({"status": "qualified"})).unwrap();
        assert_eq!(ok.status, LeadStatus::Qualified);
    }

    #[tokio::test]
    async fn client_deals_filters_other_owners() {
        let acc = accessors();
        let client = sample_client("u1");
        acc.insert(&client).await.unwrap();

        let mut deal = Deal {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            client_id: Some(client.id),
            title: "Deal".to_string(),
            description: None,
            value: Some(100.0),
            stage_id: None,
            probability: None,
            status: DealStatus::Active,
            expected_close_date: None,
            actual_close_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        acc.insert(&deal).await.unwrap();

        deal.id = Uuid::new_v4();
        deal.user_id = "u2".to_string();
        acc.insert(&deal).await.unwrap();

        assert_eq!(acc.client_deals("u1", client.id).await.unwrap().len(), 1);
    }
}
