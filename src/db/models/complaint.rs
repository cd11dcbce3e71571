use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "complaint_status")]
pub enum ComplaintStatus {
    Open,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Open,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "Open",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ComplaintStatus::Open | ComplaintStatus::InProgress)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "complaint_priority")]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl ComplaintPriority {
    pub const ALL: [ComplaintPriority; 4] = [
        ComplaintPriority::Low,
        ComplaintPriority::Medium,
        ComplaintPriority::High,
        ComplaintPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "Low",
            ComplaintPriority::Medium => "Medium",
            ComplaintPriority::High => "High",
            ComplaintPriority::Urgent => "Urgent",
        }
    }
}

impl FromStr for ComplaintPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

/// A stored maintenance ticket.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Complaint {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    pub status: ComplaintStatus,
    pub priority: ComplaintPriority,
    pub user_id: Uuid,
    pub assigned_admin_id: Option<Uuid>,
    pub resolver_name: Option<String>,
    pub admin_notes: Option<String>,
    /// Snapshot of the owner's room at creation time.
    pub room_number: String,
    pub rating: Option<i16>,
    pub feedback: Option<String>,
    pub resolved_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    pub priority: ComplaintPriority,
    pub user_id: Uuid,
    pub room_number: String,
}

/// Admin triage write. `None` text fields keep the stored value.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ComplaintStatus,
    pub admin_id: Uuid,
    pub resolver_name: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeedbackChange {
    pub rating: i16,
    pub feedback: Option<String>,
}

/// Status filter for a resident's own complaints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnStatusFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl OwnStatusFilter {
    /// Unrecognised values fall back to `All`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("active") => OwnStatusFilter::Active,
            Some("resolved") => OwnStatusFilter::Resolved,
            _ => OwnStatusFilter::All,
        }
    }

    pub fn matches(&self, status: ComplaintStatus) -> bool {
        match self {
            OwnStatusFilter::All => true,
            OwnStatusFilter::Active => status.is_active(),
            OwnStatusFilter::Resolved => status == ComplaintStatus::Resolved,
        }
    }
}

/// Admin listing criteria; `offset`/`limit` are already normalized.
#[derive(Debug, Clone, Default)]
pub struct ComplaintQuery {
    pub category: Option<Category>,
    pub status: Option<ComplaintStatus>,
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl ComplaintQuery {
    /// Filter predicate shared by the in-process store and its tests.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if self.category.is_some_and(|c| c != complaint.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&complaint.title, &complaint.description, &complaint.room_number]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: Category,
    pub count: u64,
    pub resolved_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub category_stats: Vec<CategoryStat>,
}
