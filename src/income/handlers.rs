use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::ledger::{analytics, query::ListQuery};
use crate::response::{ApiResponse, ListResponse, PageMeta};
use crate::state::AppState;

use super::dto::{
    CreateIncomeBody, IncomeAnalyticsParams, IncomeListParams, IncomeSummary, IncomeType,
    UpdateIncomeBody,
};
use super::repo::{self, Income};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/income", get(list_income).post(create_income))
        .route(
            "/income/:id",
            get(get_income).put(update_income).delete(delete_income),
        )
        .route("/income/analytics/summary", get(income_summary))
}

/// The type filter is validated against the closed enumeration before it
/// reaches the query builder.
fn kind_filter(raw: Option<&str>) -> Result<Option<String>, AppError> {
    raw.map(|k| IncomeType::parse(k).map(|k| k.as_str().to_string()))
        .transpose()
}

#[instrument(skip(state))]
async fn list_income(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<IncomeListParams>,
) -> Result<Json<ListResponse<Income>>, AppError> {
    let query = ListQuery::income(user_id)
        .label(kind_filter(params.kind.as_deref())?)
        .date_range(params.start_date, params.end_date)
        .sort(params.sort_by.as_deref(), params.order.as_deref())
        .page(params.page, params.limit);

    let rows = repo::list(&state.db, &query).await?;
    let total = repo::count(&state.db, &query).await?;

    Ok(Json(ListResponse::new(
        rows,
        PageMeta::new(query.page_number(), query.limit(), total),
    )))
}

#[instrument(skip(state))]
async fn get_income(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Income>>, AppError> {
    let income = repo::find(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Income entry"))?;
    Ok(Json(ApiResponse::new(income)))
}

#[instrument(skip(state, body))]
async fn create_income(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateIncomeBody>,
) -> Result<(StatusCode, Json<ApiResponse<Income>>), AppError> {
    let today = OffsetDateTime::now_utc().date();
    let new = body.validate(today)?;
    let income = repo::insert(&state.db, user_id, &new).await?;
    info!(user_id = %user_id, income_id = %income.id, "income entry created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            income,
            "Income entry created successfully",
        )),
    ))
}

#[instrument(skip(state, body))]
async fn update_income(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateIncomeBody>,
) -> Result<Json<ApiResponse<Income>>, AppError> {
    let today = OffsetDateTime::now_utc().date();
    let patch = body.validate(today)?;
    let income = repo::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(AppError::NotFound("Income entry"))?;
    info!(user_id = %user_id, income_id = %income.id, "income entry updated");
    Ok(Json(ApiResponse::with_message(
        income,
        "Income entry updated successfully",
    )))
}

#[instrument(skip(state))]
async fn delete_income(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Income entry"));
    }
    info!(user_id = %user_id, income_id = %id, "income entry deleted");
    Ok(Json(ApiResponse::with_message(
        (),
        "Income entry deleted successfully",
    )))
}

#[instrument(skip(state))]
async fn income_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<IncomeAnalyticsParams>,
) -> Result<Json<ApiResponse<IncomeSummary>>, AppError> {
    let filter = ListQuery::income(user_id)
        .label(kind_filter(params.kind.as_deref())?)
        .date_range(params.start_date, params.end_date);
    let entries = repo::entries(&state.db, &filter).await?;

    let summary = IncomeSummary {
        total_income: analytics::round2(analytics::total(&entries)),
        type_breakdown: analytics::breakdown(&entries)
            .into_iter()
            .map(Into::into)
            .collect(),
        monthly_trend: analytics::monthly_trend(&entries),
    };
    Ok(Json(ApiResponse::new(summary)))
}
