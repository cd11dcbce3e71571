//! Demo accounts and complaints for local development.

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::app_state::AppState;
use crate::db::{
    Category, ComplaintPriority, ComplaintStatus, FeedbackChange, NewComplaint, NewUser,
    StatusChange, User, UserRole,
};
use crate::modules::auth::password;

const DEMO_PASSWORD: &str = "password123";

struct DemoComplaint {
    title: &'static str,
    description: &'static str,
    category: Category,
    subcategory: &'static str,
    priority: ComplaintPriority,
    owner: usize,
    status: ComplaintStatus,
    resolver_name: Option<&'static str>,
    admin_notes: Option<&'static str>,
    feedback: Option<(i16, &'static str)>,
}

const DEMO_COMPLAINTS: [DemoComplaint; 5] = [
    DemoComplaint {
        title: "Fan not working in room",
        description: "The ceiling fan in my room has stopped working since yesterday. It does not respond to the regulator and makes a strange noise when I try to turn it on.",
        category: Category::Electrical,
        subcategory: "Fan",
        priority: ComplaintPriority::Medium,
        owner: 0,
        status: ComplaintStatus::Open,
        resolver_name: None,
        admin_notes: None,
        feedback: None,
    },
    DemoComplaint {
        title: "Water leakage from bathroom tap",
        description: "There is continuous water leakage from the bathroom tap. The water is dripping even when the tap is completely closed. This is causing water wastage.",
        category: Category::Plumbing,
        subcategory: "Tap",
        priority: ComplaintPriority::High,
        owner: 1,
        status: ComplaintStatus::InProgress,
        resolver_name: Some("Maintenance Team"),
        admin_notes: None,
        feedback: None,
    },
    DemoComplaint {
        title: "WiFi connection issues",
        description: "The WiFi connection in my room is very slow and keeps disconnecting frequently. Unable to attend online classes properly.",
        category: Category::InternetAndConnection,
        subcategory: "WiFi",
        priority: ComplaintPriority::High,
        owner: 2,
        status: ComplaintStatus::Resolved,
        resolver_name: Some("IT Support"),
        admin_notes: None,
        feedback: Some((4, "Issue resolved quickly. Good service!")),
    },
    DemoComplaint {
        title: "Room door lock not working",
        description: "The door lock of my room is jammed and I am having difficulty locking and unlocking the door. Sometimes the key gets stuck.",
        category: Category::Carpentry,
        subcategory: "Door",
        priority: ComplaintPriority::Urgent,
        owner: 0,
        status: ComplaintStatus::Open,
        resolver_name: None,
        admin_notes: None,
        feedback: None,
    },
    DemoComplaint {
        title: "Garbage not collected for 3 days",
        description: "The garbage from our floor has not been collected for the past 3 days. It is creating hygiene issues and bad smell.",
        category: Category::Housekeeping,
        subcategory: "Garbage",
        priority: ComplaintPriority::High,
        owner: 1,
        status: ComplaintStatus::InProgress,
        resolver_name: None,
        admin_notes: Some("Housekeeping team notified. Will be resolved by tomorrow."),
        feedback: None,
    },
];

/// Populates an empty identity store. Returns `false` when users already exist.
pub async fn seed_demo_data(state: &AppState) -> Result<bool> {
    if state.users.count().await? > 0 {
        info!("Identity store not empty, skipping demo seed");
        return Ok(false);
    }

    let password_hash = password::hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow!("failed to hash demo password: {e}"))?;

    let admin = create_user(
        state,
        "Admin User",
        "admin@hostel.com",
        &password_hash,
        UserRole::Admin,
        None,
        "9876543210",
    )
    .await?;

    let mut residents = Vec::with_capacity(3);
    for (name, email, room, phone) in [
        ("John Doe", "user@hostel.com", "A101", "9876543211"),
        ("Jane Smith", "jane@hostel.com", "B205", "9876543212"),
        ("Mike Johnson", "mike@hostel.com", "C310", "9876543213"),
    ] {
        residents.push(
            create_user(state, name, email, &password_hash, UserRole::User, Some(room), phone)
                .await?,
        );
    }

    for demo in &DEMO_COMPLAINTS {
        let owner = &residents[demo.owner];
        let complaint = state
            .complaints
            .insert(NewComplaint {
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                category: demo.category,
                subcategory: demo.subcategory.to_string(),
                priority: demo.priority,
                user_id: owner.id,
                room_number: owner.room_number.clone().unwrap_or_default(),
            })
            .await
            .with_context(|| format!("failed to seed complaint {:?}", demo.title))?;

        if demo.status != ComplaintStatus::Open {
            state
                .complaints
                .update_status(
                    complaint.id,
                    StatusChange {
                        status: demo.status,
                        admin_id: admin.id,
                        resolver_name: demo.resolver_name.map(str::to_string),
                        admin_notes: demo.admin_notes.map(str::to_string),
                    },
                )
                .await?;
        }

        if let Some((rating, feedback)) = demo.feedback {
            state
                .complaints
                .set_feedback(
                    complaint.id,
                    owner.id,
                    FeedbackChange {
                        rating,
                        feedback: Some(feedback.to_string()),
                    },
                )
                .await?;
        }
    }

    info!(
        users = residents.len() + 1,
        complaints = DEMO_COMPLAINTS.len(),
        "Demo data seeded"
    );
    Ok(true)
}

async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
    room_number: Option<&str>,
    phone_number: &str,
) -> Result<User> {
    state
        .users
        .insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            room_number: room_number.map(str::to_string),
            phone_number: Some(phone_number.to_string()),
        })
        .await
        .with_context(|| format!("failed to seed user {email}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::OwnStatusFilter;
    use crate::test_support;

    #[tokio::test]
    async fn seeds_once_into_an_empty_store() {
        let state = test_support::state();

        assert!(seed_demo_data(&state).await.unwrap());
        assert!(!seed_demo_data(&state).await.unwrap());
        assert_eq!(state.users.count().await.unwrap(), 4);

        let stats = state.complaints.stats().await.unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!((stats.open, stats.in_progress, stats.resolved), (2, 2, 1));
    }

    #[tokio::test]
    async fn resolved_demo_complaint_carries_rating() {
        let state = test_support::state();
        seed_demo_data(&state).await.unwrap();

        let mike = state
            .users
            .find_by_email("mike@hostel.com")
            .await
            .unwrap()
            .unwrap();
        let resolved = state
            .complaints
            .list_by_user(mike.id, OwnStatusFilter::Resolved)
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].rating, Some(4));
        assert!(resolved[0].resolved_at.is_some());
        assert_eq!(resolved[0].room_number, "C310");
    }
}
