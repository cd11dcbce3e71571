//! Storage seams for the complaint and identity stores.
//!
//! Every write touches exactly one row and is a single atomic statement, so
//! concurrent updates to the same complaint are last-write-wins.

mod complaint_repository;
#[cfg(test)]
mod conformance;
mod memory;
mod user_repository;

use async_trait::async_trait;
use uuid::Uuid;

use super::error::DatabaseError;
use super::models::{
    Complaint, ComplaintQuery, ComplaintStats, FeedbackChange, NewComplaint, NewUser,
    OwnStatusFilter, StatusChange, User,
};

pub use complaint_repository::PgComplaintStore;
pub use memory::MemoryStore;
pub use user_repository::PgUserStore;

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn insert(&self, new: NewComplaint) -> Result<Complaint, DatabaseError>;

    /// Complaints owned by `user_id`, newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: OwnStatusFilter,
    ) -> Result<Vec<Complaint>, DatabaseError>;

    /// One page of matching complaints (newest first) plus the total match count.
    async fn search(&self, query: &ComplaintQuery) -> Result<(Vec<Complaint>, u64), DatabaseError>;

    /// Applies an admin status change. `resolved_at` is stamped only on the
    /// first transition into Resolved. Returns `None` when the id is unknown.
    async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<Complaint>, DatabaseError>;

    /// Writes a rating only if the complaint exists, belongs to `user_id`
    /// and is Resolved; otherwise returns `None` without distinguishing why.
    async fn set_feedback(
        &self,
        id: Uuid,
        user_id: Uuid,
        change: FeedbackChange,
    ) -> Result<Option<Complaint>, DatabaseError>;

    async fn stats(&self) -> Result<ComplaintStats, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, new: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// `email` is matched case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError>;

    async fn count(&self) -> Result<u64, DatabaseError>;
}
