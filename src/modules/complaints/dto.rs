use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::db::{Category, Complaint, ComplaintPriority, ComplaintStatus, User};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Trim and drop text that is empty once trimmed.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateComplaintRequest {
    #[serde(default)]
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub priority: Option<String>,
}

impl CreateComplaintRequest {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.category = self.category.trim().to_string();
        self.subcategory = self.subcategory.trim().to_string();
        self.priority = non_empty(self.priority);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
    pub resolver_name: Option<String>,
    pub admin_notes: Option<String>,
}

impl UpdateStatusRequest {
    pub fn normalized(mut self) -> Self {
        self.status = self.status.trim().to_string();
        self.resolver_name = non_empty(self.resolver_name);
        self.admin_notes = non_empty(self.admin_notes);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(
        required(message = "Rating is required"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i64>,
    #[validate(length(max = 500, message = "Feedback must be less than 500 characters"))]
    pub feedback: Option<String>,
}

impl FeedbackRequest {
    pub fn normalized(mut self) -> Self {
        self.feedback = non_empty(self.feedback);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct MyComplaintsQuery {
    pub status: Option<String>,
}

/// Raw admin listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListComplaintsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub room_number: Option<String>,
    pub phone_number: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            room_number: user.room_number.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for AdminSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// A complaint with its user references expanded for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub subcategory: String,
    pub status: ComplaintStatus,
    pub priority: ComplaintPriority,
    pub user: Option<UserSummary>,
    pub assigned_admin: Option<AdminSummary>,
    pub resolver_name: Option<String>,
    pub admin_notes: Option<String>,
    pub room_number: String,
    pub rating: Option<i16>,
    pub feedback: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ComplaintView {
    pub fn new(complaint: Complaint, users: &HashMap<Uuid, User>) -> Self {
        Self {
            user: users.get(&complaint.user_id).map(UserSummary::from),
            assigned_admin: complaint
                .assigned_admin_id
                .and_then(|id| users.get(&id))
                .map(AdminSummary::from),
            id: complaint.id,
            title: complaint.title,
            description: complaint.description,
            category: complaint.category,
            subcategory: complaint.subcategory,
            status: complaint.status,
            priority: complaint.priority,
            resolver_name: complaint.resolver_name,
            admin_notes: complaint.admin_notes,
            room_number: complaint.room_number,
            rating: complaint.rating,
            feedback: complaint.feedback,
            resolved_at: complaint.resolved_at,
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
        }
    }
}

/// Category name → complaints, keyed in order of each category's newest entry.
#[derive(Debug, Clone, Default)]
pub struct GroupedComplaints(Vec<(Category, Vec<ComplaintView>)>);

impl GroupedComplaints {
    /// `complaints` must already be newest first.
    pub fn group(complaints: Vec<ComplaintView>) -> Self {
        let mut groups: Vec<(Category, Vec<ComplaintView>)> = Vec::new();
        for complaint in complaints {
            match groups.iter_mut().find(|(c, _)| *c == complaint.category) {
                Some((_, items)) => items.push(complaint),
                None => groups.push((complaint.category, vec![complaint])),
            }
        }
        Self(groups)
    }
}

#[cfg(test)]
impl GroupedComplaints {
    pub fn get(&self, category: Category) -> Option<&[ComplaintView]> {
        self.0
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().map(|(c, _)| *c)
    }
}

impl Serialize for GroupedComplaints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, items) in &self.0 {
            map.serialize_entry(category.as_str(), items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MyComplaints {
    pub complaints: GroupedComplaints,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPage {
    pub complaints: Vec<ComplaintView>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ComplaintEnvelope {
    pub message: &'static str,
    pub complaint: ComplaintView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(2), Some(1000)).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageRequest::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.total_pages(25), 3);
        assert_eq!(page.total_pages(30), 3);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn blank_optional_text_counts_as_absent() {
        let request = UpdateStatusRequest {
            status: " Resolved ".to_string(),
            resolver_name: Some("   ".to_string()),
            admin_notes: Some(" Fixed the fan ".to_string()),
        }
        .normalized();
        assert_eq!(request.status, "Resolved");
        assert_eq!(request.resolver_name, None);
        assert_eq!(request.admin_notes.as_deref(), Some("Fixed the fan"));
    }
}
