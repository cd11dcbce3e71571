use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ComplaintStore;
use crate::db::models::{
    Category, CategoryStat, Complaint, ComplaintQuery, ComplaintStats, FeedbackChange,
    NewComplaint, OwnStatusFilter, StatusChange,
};
use crate::db::DatabaseError;

pub struct PgComplaintStore {
    pool: PgPool,
}

impl PgComplaintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so search input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Postgres `LIMIT`/`OFFSET` are signed; anything past `i64::MAX` is already past the end.
fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ComplaintQuery) {
    builder.push(" WHERE TRUE");
    if let Some(category) = query.category {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR room_number ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ComplaintStore for PgComplaintStore {
    async fn insert(&self, new: NewComplaint) -> Result<Complaint, DatabaseError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (id, title, description, category, subcategory, priority, user_id, room_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.category)
        .bind(&new.subcategory)
        .bind(new.priority)
        .bind(new.user_id)
        .bind(&new.room_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(complaint)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: OwnStatusFilter,
    ) -> Result<Vec<Complaint>, DatabaseError> {
        let status_clause = match filter {
            OwnStatusFilter::All => "",
            OwnStatusFilter::Active => " AND status IN ('Open', 'In Progress')",
            OwnStatusFilter::Resolved => " AND status = 'Resolved'",
        };
        let sql = format!(
            "SELECT * FROM complaints WHERE user_id = $1{} ORDER BY created_at DESC, id DESC",
            status_clause
        );

        let complaints = sqlx::query_as::<_, Complaint>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(complaints)
    }

    async fn search(&self, query: &ComplaintQuery) -> Result<(Vec<Complaint>, u64), DatabaseError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM complaints");
        push_filters(&mut count_query, query);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::<Postgres>::new("SELECT * FROM complaints");
        push_filters(&mut page_query, query);
        page_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(to_bigint(query.limit))
            .push(" OFFSET ")
            .push_bind(to_bigint(query.offset));
        let complaints = page_query
            .build_query_as::<Complaint>()
            .fetch_all(&self.pool)
            .await?;

        Ok((complaints, total.max(0) as u64))
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<Complaint>, DatabaseError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET
                status = $1,
                assigned_admin_id = $2,
                resolver_name = COALESCE($3, resolver_name),
                admin_notes = COALESCE($4, admin_notes),
                resolved_at = CASE
                    WHEN $1 = 'Resolved'::complaint_status THEN COALESCE(resolved_at, NOW())
                    ELSE resolved_at
                END,
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(change.status)
        .bind(change.admin_id)
        .bind(&change.resolver_name)
        .bind(&change.admin_notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(complaint)
    }

    async fn set_feedback(
        &self,
        id: Uuid,
        user_id: Uuid,
        change: FeedbackChange,
    ) -> Result<Option<Complaint>, DatabaseError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET rating = $1, feedback = COALESCE($2, feedback), updated_at = NOW()
            WHERE id = $3 AND user_id = $4 AND status = 'Resolved'
            RETURNING *
            "#,
        )
        .bind(change.rating)
        .bind(&change.feedback)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(complaint)
    }

    async fn stats(&self) -> Result<ComplaintStats, DatabaseError> {
        let (total, open, in_progress, resolved): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'Open'),
                COUNT(*) FILTER (WHERE status = 'In Progress'),
                COUNT(*) FILTER (WHERE status = 'Resolved')
            FROM complaints
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(Category, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                category,
                COUNT(*) AS count,
                COUNT(*) FILTER (WHERE status = 'Resolved') AS resolved_count
            FROM complaints
            GROUP BY category
            ORDER BY count DESC, category::text ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ComplaintStats {
            total: total as u64,
            open: open as u64,
            in_progress: in_progress as u64,
            resolved: resolved as u64,
            category_stats: rows
                .into_iter()
                .map(|(category, count, resolved_count)| CategoryStat {
                    category,
                    count: count as u64,
                    resolved_count: resolved_count as u64,
                })
                .collect(),
        })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    use super::*;
    use crate::db::repositories::{conformance, PgUserStore};

    /// Stores on a fresh schema of `TEST_DATABASE_URL`, or `None` when it is unset.
    async fn pg_stores() -> Option<(PgComplaintStore, PgUserStore)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let schema = format!("hostelmate_test_{}", Uuid::now_v7().simple());

        let admin = PgPool::connect(&url).await.expect("connect to TEST_DATABASE_URL");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("create test schema");
        admin.close().await;

        let options = PgConnectOptions::from_str(&url)
            .expect("parse TEST_DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("connect to test schema");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("apply migrations");

        Some((PgComplaintStore::new(pool.clone()), PgUserStore::new(pool)))
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("wifi"), "wifi");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[test]
    fn bigint_binds_saturate() {
        assert_eq!(to_bigint(20), 20);
        assert_eq!(to_bigint(i64::MAX as u64), i64::MAX);
        assert_eq!(to_bigint(9_999_999_999_999_999_900), i64::MAX);
        assert_eq!(to_bigint(u64::MAX), i64::MAX);
    }

    #[tokio::test]
    async fn resolved_at_is_stamped_once() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::resolved_at_is_stamped_once(&complaints, &users).await;
    }

    #[tokio::test]
    async fn absent_notes_keep_prior_values() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::absent_notes_keep_prior_values(&complaints, &users).await;
    }

    #[tokio::test]
    async fn feedback_requires_owner_and_resolved() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::feedback_requires_owner_and_resolved(&complaints, &users).await;
    }

    #[tokio::test]
    async fn stats_are_sorted_by_count_then_name() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::stats_are_sorted_by_count_then_name(&complaints, &users).await;
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::search_is_case_insensitive_and_literal(&complaints, &users).await;
    }

    #[tokio::test]
    async fn pages_newest_first_and_past_the_end() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::pages_newest_first_and_past_the_end(&complaints, &users).await;
    }

    #[tokio::test]
    async fn lists_own_by_status() {
        let Some((complaints, users)) = pg_stores().await else {
            return;
        };
        conformance::lists_own_by_status(&complaints, &users).await;
    }
}
