//! Complaint lifecycle rules.
//!
//! Every operation takes the caller explicitly and performs its own role check
//! before touching the store.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::dto::{
    ComplaintPage, ComplaintView, CreateComplaintRequest, FeedbackRequest, GroupedComplaints,
    ListComplaintsQuery, MyComplaints, PageRequest, UpdateStatusRequest,
};
use crate::app_state::AppState;
use crate::db::{
    Category, CategoryCatalog, Complaint, ComplaintPriority, ComplaintQuery, ComplaintStats,
    ComplaintStatus, ComplaintStore, FeedbackChange, NewComplaint, OwnStatusFilter,
    StatusChange, User, UserStore,
};
use crate::error::{field_errors, AppError, AppResult, FieldError};
use crate::middleware::AuthUser;

pub struct ComplaintService<'a> {
    complaints: &'a dyn ComplaintStore,
    users: &'a dyn UserStore,
}

impl<'a> ComplaintService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            complaints: state.complaints.as_ref(),
            users: state.users.as_ref(),
        }
    }

    pub fn categories(&self) -> CategoryCatalog {
        CategoryCatalog
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        request: CreateComplaintRequest,
    ) -> AppResult<ComplaintView> {
        let request = request.normalized();

        let mut errors = match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_errors(&errors),
        };

        let category = request.category.parse::<Category>().ok();
        match category {
            Some(category) if !category.allows(&request.subcategory) => errors.push(
                FieldError::new("subcategory", "Invalid subcategory for selected category"),
            ),
            Some(_) => {}
            None => {
                errors.push(FieldError::new("category", "Invalid category"));
                errors.push(FieldError::new(
                    "subcategory",
                    "Invalid subcategory for selected category",
                ));
            }
        }

        let priority = match request.priority.as_deref() {
            None => Some(ComplaintPriority::default()),
            Some(value) => value.parse::<ComplaintPriority>().ok(),
        };
        if priority.is_none() {
            errors.push(FieldError::new("priority", "Invalid priority"));
        }

        let room_number = caller
            .room_number
            .as_deref()
            .map(str::trim)
            .filter(|room| !room.is_empty());
        if room_number.is_none() {
            errors.push(FieldError::new(
                "roomNumber",
                "Your account has no room number on file",
            ));
        }

        let (Some(category), Some(priority), Some(room_number), true) =
            (category, priority, room_number, errors.is_empty())
        else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(AppError::Validation(errors));
        };

        let complaint = self
            .complaints
            .insert(NewComplaint {
                title: request.title,
                description: request.description,
                category,
                subcategory: request.subcategory,
                priority,
                user_id: caller.id,
                room_number: room_number.to_string(),
            })
            .await?;

        info!(complaint_id = %complaint.id, user_id = %caller.id, %category, "complaint created");
        self.expand_one(complaint).await
    }

    pub async fn list_own(
        &self,
        caller: &AuthUser,
        filter: OwnStatusFilter,
    ) -> AppResult<MyComplaints> {
        let complaints = self.complaints.list_by_user(caller.id, filter).await?;
        let total = complaints.len() as u64;
        let views = self.expand(complaints).await?;

        Ok(MyComplaints {
            complaints: GroupedComplaints::group(views),
            total,
        })
    }

    pub async fn list_all(
        &self,
        caller: &AuthUser,
        query: ListComplaintsQuery,
    ) -> AppResult<ComplaintPage> {
        caller.require_admin()?;

        let page = PageRequest::new(query.page, query.limit);
        let empty = ComplaintPage {
            complaints: Vec::new(),
            current_page: page.page,
            total_pages: 0,
            total: 0,
        };

        // A filter value outside the fixed sets can match nothing.
        let Some(category) = parse_filter::<Category>(query.category.as_deref()) else {
            return Ok(empty);
        };
        let Some(status) = parse_filter::<ComplaintStatus>(query.status.as_deref()) else {
            return Ok(empty);
        };
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (complaints, total) = self
            .complaints
            .search(&ComplaintQuery {
                category,
                status,
                search,
                offset: page.offset(),
                limit: page.limit,
            })
            .await?;

        Ok(ComplaintPage {
            complaints: self.expand(complaints).await?,
            current_page: page.page,
            total_pages: page.total_pages(total),
            total,
        })
    }

    pub async fn update_status(
        &self,
        caller: &AuthUser,
        complaint_id: Uuid,
        request: UpdateStatusRequest,
    ) -> AppResult<ComplaintView> {
        caller.require_admin()?;

        let request = request.normalized();
        let status = request.status.parse::<ComplaintStatus>().map_err(|_| {
            AppError::Validation(vec![FieldError::new("status", "Invalid status")])
        })?;

        let complaint = self
            .complaints
            .update_status(
                complaint_id,
                StatusChange {
                    status,
                    admin_id: caller.id,
                    resolver_name: request.resolver_name,
                    admin_notes: request.admin_notes,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

        info!(complaint_id = %complaint.id, admin_id = %caller.id, %status, "complaint status updated");
        self.expand_one(complaint).await
    }

    /// Rates a resolved complaint. Re-rating overwrites the earlier rating.
    pub async fn add_feedback(
        &self,
        caller: &AuthUser,
        complaint_id: Uuid,
        request: FeedbackRequest,
    ) -> AppResult<ComplaintView> {
        let request = request.normalized();
        request.validate()?;

        let rating = request
            .rating
            .and_then(|r| i16::try_from(r).ok())
            .ok_or_else(|| {
                AppError::Validation(vec![FieldError::new(
                    "rating",
                    "Rating must be between 1 and 5",
                )])
            })?;

        let complaint = self
            .complaints
            .set_feedback(
                complaint_id,
                caller.id,
                FeedbackChange {
                    rating,
                    feedback: request.feedback,
                },
            )
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Resolved complaint not found or not accessible".to_string())
            })?;

        info!(complaint_id = %complaint.id, rating, "feedback recorded");
        self.expand_one(complaint).await
    }

    pub async fn stats(&self, caller: &AuthUser) -> AppResult<ComplaintStats> {
        caller.require_admin()?;
        Ok(self.complaints.stats().await?)
    }

    async fn expand_one(&self, complaint: Complaint) -> AppResult<ComplaintView> {
        let mut views = self.expand(vec![complaint]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::InternalServerError("complaint vanished".to_string()))
    }

    /// Resolves owner and admin references in one identity-store lookup.
    async fn expand(&self, complaints: Vec<Complaint>) -> AppResult<Vec<ComplaintView>> {
        let mut ids: Vec<Uuid> = complaints
            .iter()
            .flat_map(|c| std::iter::once(c.user_id).chain(c.assigned_admin_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<Uuid, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(complaints
            .into_iter()
            .map(|complaint| ComplaintView::new(complaint, &users))
            .collect())
    }
}

/// `None`/`"all"`/blank → no filter; unknown values → `None` (matches nothing).
fn parse_filter<T: std::str::FromStr>(value: Option<&str>) -> Option<Option<T>> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Some(None),
        Some(value) => value.parse::<T>().ok().map(Some),
    }
}
