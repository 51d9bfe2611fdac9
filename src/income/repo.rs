use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::ledger::analytics::Entry;
use crate::ledger::query::ListQuery;

use super::dto::{IncomePatch, IncomeType, NewIncome};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Income {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Date,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: IncomeType,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn insert(db: &PgPool, user_id: Uuid, new: &NewIncome) -> Result<Income, sqlx::Error> {
    sqlx::query_as::<_, Income>(
        r#"
        INSERT INTO income (user_id, source, amount, note, date, type)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, source, amount, note, date, type, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&new.source)
    .bind(new.amount)
    .bind(&new.note)
    .bind(new.date)
    .bind(new.kind)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Income>, sqlx::Error> {
    sqlx::query_as::<_, Income>(
        r#"
        SELECT id, user_id, source, amount, note, date, type, created_at, updated_at
        FROM income
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
    patch: &IncomePatch,
) -> Result<Option<Income>, sqlx::Error> {
    sqlx::query_as::<_, Income>(
        r#"
        UPDATE income SET
            source = COALESCE($3, source),
            amount = COALESCE($4, amount),
            note = COALESCE($5, note),
            date = COALESCE($6, date),
            type = COALESCE($7, type),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, source, amount, note, date, type, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&patch.source)
    .bind(patch.amount)
    .bind(&patch.note)
    .bind(patch.date)
    .bind(patch.kind)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM income WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Income>, sqlx::Error> {
    let mut qb = query.select_query();
    qb.build_query_as::<Income>().fetch_all(db).await
}

pub async fn count(db: &PgPool, query: &ListQuery) -> Result<i64, sqlx::Error> {
    let mut qb = query.count_query();
    qb.build_query_scalar::<i64>().fetch_one(db).await
}

pub async fn entries(db: &PgPool, query: &ListQuery) -> Result<Vec<Entry>, sqlx::Error> {
    let mut qb = query.entries_query();
    qb.build_query_as::<Entry>().fetch_all(db).await
}
