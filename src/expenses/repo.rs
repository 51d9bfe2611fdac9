use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::ledger::analytics::Entry;
use crate::ledger::query::ListQuery;

use super::dto::{ExpensePatch, NewExpense};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn insert(db: &PgPool, user_id: Uuid, new: &NewExpense) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        r#"
        INSERT INTO expenses (user_id, category, amount, note, date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, category, amount, note, date, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&new.category)
    .bind(new.amount)
    .bind(&new.note)
    .bind(new.date)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, user_id, category, amount, note, date, created_at, updated_at
        FROM expenses
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Partial field replacement; `None` leaves the stored value untouched.
/// Returns `None` when no row exists for this user.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: &ExpensePatch,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        r#"
        UPDATE expenses SET
            category = COALESCE($3, category),
            amount = COALESCE($4, amount),
            note = COALESCE($5, note),
            date = COALESCE($6, date),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, category, amount, note, date, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&patch.category)
    .bind(patch.amount)
    .bind(&patch.note)
    .bind(patch.date)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Expense>, sqlx::Error> {
    let mut qb = query.select_query();
    qb.build_query_as::<Expense>().fetch_all(db).await
}

pub async fn count(db: &PgPool, query: &ListQuery) -> Result<i64, sqlx::Error> {
    let mut qb = query.count_query();
    qb.build_query_scalar::<i64>().fetch_one(db).await
}

pub async fn entries(db: &PgPool, query: &ListQuery) -> Result<Vec<Entry>, sqlx::Error> {
    let mut qb = query.entries_query();
    qb.build_query_as::<Entry>().fetch_all(db).await
}

pub async fn distinct_categories(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM expenses WHERE user_id = $1 ORDER BY category",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
