use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ComplaintStore, UserStore};
use crate::db::models::{
    Category, CategoryStat, Complaint, ComplaintQuery, ComplaintStats, ComplaintStatus,
    FeedbackChange, NewComplaint, NewUser, OwnStatusFilter, StatusChange, User,
};
use crate::db::DatabaseError;

/// In-process complaint and identity store.
///
/// Each operation holds the table lock for its whole read-modify-write, which
/// gives the same single-row atomicity the Postgres statements provide.
#[derive(Default)]
pub struct MemoryStore {
    complaints: RwLock<HashMap<Uuid, Complaint>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(complaints: &mut [Complaint]) {
    complaints.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn insert(&self, new: NewComplaint) -> Result<Complaint, DatabaseError> {
        let now = OffsetDateTime::now_utc();
        let complaint = Complaint {
            id: Uuid::now_v7(),
            title: new.title,
            description: new.description,
            category: new.category,
            subcategory: new.subcategory,
            status: ComplaintStatus::Open,
            priority: new.priority,
            user_id: new.user_id,
            assigned_admin_id: None,
            resolver_name: None,
            admin_notes: None,
            room_number: new.room_number,
            rating: None,
            feedback: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };

        self.complaints
            .write()
            .await
            .insert(complaint.id, complaint.clone());
        Ok(complaint)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: OwnStatusFilter,
    ) -> Result<Vec<Complaint>, DatabaseError> {
        let complaints = self.complaints.read().await;
        let mut owned: Vec<Complaint> = complaints
            .values()
            .filter(|c| c.user_id == user_id && filter.matches(c.status))
            .cloned()
            .collect();
        newest_first(&mut owned);
        Ok(owned)
    }

    async fn search(&self, query: &ComplaintQuery) -> Result<(Vec<Complaint>, u64), DatabaseError> {
        let complaints = self.complaints.read().await;
        let mut matching: Vec<Complaint> = complaints
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        newest_first(&mut matching);

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<Complaint>, DatabaseError> {
        let mut complaints = self.complaints.write().await;
        let Some(complaint) = complaints.get_mut(&id) else {
            return Ok(None);
        };

        let now = OffsetDateTime::now_utc();
        complaint.status = change.status;
        complaint.assigned_admin_id = Some(change.admin_id);
        if let Some(resolver_name) = change.resolver_name {
            complaint.resolver_name = Some(resolver_name);
        }
        if let Some(admin_notes) = change.admin_notes {
            complaint.admin_notes = Some(admin_notes);
        }
        if change.status == ComplaintStatus::Resolved && complaint.resolved_at.is_none() {
            complaint.resolved_at = Some(now);
        }
        complaint.updated_at = now;

        Ok(Some(complaint.clone()))
    }

    async fn set_feedback(
        &self,
        id: Uuid,
        user_id: Uuid,
        change: FeedbackChange,
    ) -> Result<Option<Complaint>, DatabaseError> {
        let mut complaints = self.complaints.write().await;
        let Some(complaint) = complaints
            .get_mut(&id)
            .filter(|c| c.user_id == user_id && c.status == ComplaintStatus::Resolved)
        else {
            return Ok(None);
        };

        complaint.rating = Some(change.rating);
        if let Some(feedback) = change.feedback {
            complaint.feedback = Some(feedback);
        }
        complaint.updated_at = OffsetDateTime::now_utc();

        Ok(Some(complaint.clone()))
    }

    async fn stats(&self) -> Result<ComplaintStats, DatabaseError> {
        let complaints = self.complaints.read().await;
        let mut stats = ComplaintStats::default();
        let mut by_category: HashMap<Category, CategoryStat> = HashMap::new();

        for complaint in complaints.values() {
            stats.total += 1;
            match complaint.status {
                ComplaintStatus::Open => stats.open += 1,
                ComplaintStatus::InProgress => stats.in_progress += 1,
                ComplaintStatus::Resolved => stats.resolved += 1,
            }

            let entry = by_category
                .entry(complaint.category)
                .or_insert_with(|| CategoryStat {
                    category: complaint.category,
                    count: 0,
                    resolved_count: 0,
                });
            entry.count += 1;
            if complaint.status == ComplaintStatus::Resolved {
                entry.resolved_count += 1;
            }
        }

        let mut category_stats: Vec<CategoryStat> = by_category.into_values().collect();
        category_stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        stats.category_stats = category_stats;

        Ok(stats)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, new: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        let email = new.email.to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(DatabaseError::Duplicate);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::now_v7(),
            name: new.name,
            email,
            password_hash: new.password_hash,
            role: new.role,
            room_number: new.room_number,
            phone_number: new.phone_number,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.users.read().await.len() as u64)
    }
}
