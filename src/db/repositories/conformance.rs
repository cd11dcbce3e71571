//! Behaviour every `ComplaintStore` must share, run against each backend.

use uuid::Uuid;

use super::{ComplaintStore, UserStore};
use crate::db::models::{
    Category, Complaint, ComplaintPriority, ComplaintQuery, ComplaintStatus, FeedbackChange,
    NewComplaint, NewUser, OwnStatusFilter, StatusChange, User, UserRole,
};

async fn user(users: &dyn UserStore, email: &str, role: UserRole, room: Option<&str>) -> User {
    users
        .insert(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            role,
            room_number: room.map(str::to_string),
            phone_number: None,
        })
        .await
        .expect("insert user")
}

async fn file(
    complaints: &dyn ComplaintStore,
    owner: &User,
    category: Category,
    title: &str,
    description: &str,
) -> Complaint {
    complaints
        .insert(NewComplaint {
            title: title.to_string(),
            description: description.to_string(),
            category,
            subcategory: category.subcategories()[0].to_string(),
            priority: ComplaintPriority::Medium,
            user_id: owner.id,
            room_number: owner.room_number.clone().unwrap_or_default(),
        })
        .await
        .expect("insert complaint")
}

fn change(status: ComplaintStatus, admin: &User) -> StatusChange {
    StatusChange {
        status,
        admin_id: admin.id,
        resolver_name: None,
        admin_notes: None,
    }
}

fn page(offset: u64, limit: u64) -> ComplaintQuery {
    ComplaintQuery {
        offset,
        limit,
        ..Default::default()
    }
}

pub async fn resolved_at_is_stamped_once(complaints: &dyn ComplaintStore, users: &dyn UserStore) {
    let admin = user(users, "admin@hostel.com", UserRole::Admin, None).await;
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let filed = file(complaints, &owner, Category::Electrical, "Fan broken", "Fan stopped").await;
    assert_eq!(filed.status, ComplaintStatus::Open);
    assert!(filed.resolved_at.is_none());

    let in_progress = complaints
        .update_status(filed.id, change(ComplaintStatus::InProgress, &admin))
        .await
        .unwrap()
        .unwrap();
    assert!(in_progress.resolved_at.is_none());
    assert_eq!(in_progress.assigned_admin_id, Some(admin.id));

    let resolved = complaints
        .update_status(filed.id, change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap()
        .unwrap();
    let stamped = resolved.resolved_at.expect("stamped on first resolve");

    let reopened = complaints
        .update_status(filed.id, change(ComplaintStatus::Open, &admin))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.status, ComplaintStatus::Open);
    assert_eq!(reopened.resolved_at, Some(stamped));

    let again = complaints
        .update_status(filed.id, change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.resolved_at, Some(stamped));

    let missing = complaints
        .update_status(Uuid::now_v7(), change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap();
    assert!(missing.is_none());
}

pub async fn absent_notes_keep_prior_values(
    complaints: &dyn ComplaintStore,
    users: &dyn UserStore,
) {
    let admin = user(users, "admin@hostel.com", UserRole::Admin, None).await;
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let filed = file(complaints, &owner, Category::Plumbing, "Tap leak", "Drips all night").await;

    complaints
        .update_status(
            filed.id,
            StatusChange {
                resolver_name: Some("Maintenance Team".to_string()),
                admin_notes: Some("Plumber booked".to_string()),
                ..change(ComplaintStatus::InProgress, &admin)
            },
        )
        .await
        .unwrap();

    let updated = complaints
        .update_status(filed.id, change(ComplaintStatus::InProgress, &admin))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.resolver_name.as_deref(), Some("Maintenance Team"));
    assert_eq!(updated.admin_notes.as_deref(), Some("Plumber booked"));

    let renamed = complaints
        .update_status(
            filed.id,
            StatusChange {
                resolver_name: Some("Night Shift".to_string()),
                ..change(ComplaintStatus::InProgress, &admin)
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.resolver_name.as_deref(), Some("Night Shift"));
    assert_eq!(renamed.admin_notes.as_deref(), Some("Plumber booked"));
}

pub async fn feedback_requires_owner_and_resolved(
    complaints: &dyn ComplaintStore,
    users: &dyn UserStore,
) {
    let admin = user(users, "admin@hostel.com", UserRole::Admin, None).await;
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let stranger = user(users, "jane@hostel.com", UserRole::User, Some("B205")).await;
    let filed = file(complaints, &owner, Category::Laundry, "Iron broken", "Sparks on use").await;
    let rating = |rating, feedback: Option<&str>| FeedbackChange {
        rating,
        feedback: feedback.map(str::to_string),
    };

    let not_resolved = complaints
        .set_feedback(filed.id, owner.id, rating(5, None))
        .await
        .unwrap();
    assert!(not_resolved.is_none());

    complaints
        .update_status(filed.id, change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap();

    let not_owner = complaints
        .set_feedback(filed.id, stranger.id, rating(5, None))
        .await
        .unwrap();
    assert!(not_owner.is_none());
    let missing = complaints
        .set_feedback(Uuid::now_v7(), owner.id, rating(5, None))
        .await
        .unwrap();
    assert!(missing.is_none());

    let rated = complaints
        .set_feedback(filed.id, owner.id, rating(4, Some("Fixed quickly")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rated.rating, Some(4));
    assert_eq!(rated.feedback.as_deref(), Some("Fixed quickly"));

    let rerated = complaints
        .set_feedback(filed.id, owner.id, rating(2, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rerated.rating, Some(2));
    assert_eq!(rerated.feedback.as_deref(), Some("Fixed quickly"));
}

pub async fn stats_are_sorted_by_count_then_name(
    complaints: &dyn ComplaintStore,
    users: &dyn UserStore,
) {
    let admin = user(users, "admin@hostel.com", UserRole::Admin, None).await;
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let mut filed = Vec::new();
    for category in [
        Category::Plumbing,
        Category::Laundry,
        Category::Plumbing,
        Category::Electrical,
    ] {
        filed.push(file(complaints, &owner, category, "Broken thing", "Needs fixing").await);
    }
    complaints
        .update_status(filed[0].id, change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap();
    complaints
        .update_status(filed[1].id, change(ComplaintStatus::InProgress, &admin))
        .await
        .unwrap();

    let stats = complaints.stats().await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!((stats.open, stats.in_progress, stats.resolved), (2, 1, 1));

    let rows: Vec<(Category, u64, u64)> = stats
        .category_stats
        .iter()
        .map(|s| (s.category, s.count, s.resolved_count))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Category::Plumbing, 2, 1),
            (Category::Electrical, 1, 0),
            (Category::Laundry, 1, 0),
        ]
    );
}

pub async fn search_is_case_insensitive_and_literal(
    complaints: &dyn ComplaintStore,
    users: &dyn UserStore,
) {
    let a101 = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let wifi_room = user(users, "jane@hostel.com", UserRole::User, Some("WIFI-7")).await;
    let category = Category::InternetAndConnection;

    let by_title = file(complaints, &a101, category, "WiFi is down", "No signal at all").await;
    let by_description = file(complaints, &a101, category, "Router", "The wIfI drops").await;
    let by_room = file(complaints, &wifi_room, category, "Slow net", "Pages time out").await;
    let percent = file(complaints, &a101, category, "100% offline", "Nothing loads").await;

    let search = |needle: &str| ComplaintQuery {
        search: Some(needle.to_string()),
        ..page(0, 100)
    };

    let (found, total) = complaints.search(&search("wifi")).await.unwrap();
    let mut ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
    ids.sort();
    let mut expected = vec![by_title.id, by_description.id, by_room.id];
    expected.sort();
    assert_eq!(ids, expected);
    assert_eq!(total, 3);

    let (found, total) = complaints.search(&search("%")).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, percent.id);

    let (_, total) = complaints.search(&search("_")).await.unwrap();
    assert_eq!(total, 0);

    let filtered = ComplaintQuery {
        category: Some(Category::Electrical),
        ..search("wifi")
    };
    let (_, total) = complaints.search(&filtered).await.unwrap();
    assert_eq!(total, 0);
}

pub async fn pages_newest_first_and_past_the_end(
    complaints: &dyn ComplaintStore,
    users: &dyn UserStore,
) {
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let mut filed = Vec::new();
    for title in ["First fault", "Second fault", "Third fault"] {
        filed.push(file(complaints, &owner, Category::Security, title, "Door left open").await);
    }

    let (second, total) = complaints.search(&page(1, 1)).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, filed[1].id);

    let (beyond, total) = complaints
        .search(&page(9_999_999_999_999_999_900, 100))
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(total, 3);
}

pub async fn lists_own_by_status(complaints: &dyn ComplaintStore, users: &dyn UserStore) {
    let admin = user(users, "admin@hostel.com", UserRole::Admin, None).await;
    let owner = user(users, "user@hostel.com", UserRole::User, Some("A101")).await;
    let other = user(users, "jane@hostel.com", UserRole::User, Some("B205")).await;
    let open = file(complaints, &owner, Category::Medical, "Need doctor", "Fever since noon").await;
    let done = file(complaints, &owner, Category::Medical, "First aid", "Kit is empty").await;
    file(complaints, &other, Category::Medical, "Not mine", "Someone else's").await;
    complaints
        .update_status(done.id, change(ComplaintStatus::Resolved, &admin))
        .await
        .unwrap();

    let ids = |list: Vec<Complaint>| list.into_iter().map(|c| c.id).collect::<Vec<_>>();

    let all = complaints
        .list_by_user(owner.id, OwnStatusFilter::All)
        .await
        .unwrap();
    assert_eq!(ids(all), vec![done.id, open.id]);

    let active = complaints
        .list_by_user(owner.id, OwnStatusFilter::Active)
        .await
        .unwrap();
    assert_eq!(ids(active), vec![open.id]);

    let resolved = complaints
        .list_by_user(owner.id, OwnStatusFilter::Resolved)
        .await
        .unwrap();
    assert_eq!(ids(resolved), vec![done.id]);
}
