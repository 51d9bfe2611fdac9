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
use crate::income;
use crate::ledger::{analytics, query::ListQuery};
use crate::response::{ApiResponse, ListResponse, PageMeta};
use crate::state::AppState;

use super::dto::{
    CreateExpenseBody, ExpenseAnalyticsParams, ExpenseListParams, ExpenseSummary,
    UpdateExpenseBody,
};
use super::repo::{self, Expense};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/analytics/summary", get(expense_summary))
        .route("/expenses/meta/categories", get(list_categories))
}

#[instrument(skip(state))]
async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<ListResponse<Expense>>, AppError> {
    let query = ListQuery::expenses(user_id)
        .label(params.category)
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
async fn get_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let expense = repo::find(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Expense"))?;
    Ok(Json(ApiResponse::new(expense)))
}

#[instrument(skip(state, body))]
async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateExpenseBody>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), AppError> {
    let today = OffsetDateTime::now_utc().date();
    let new = body.validate(today)?;
    let expense = repo::insert(&state.db, user_id, &new).await?;
    info!(user_id = %user_id, expense_id = %expense.id, "expense created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            expense,
            "Expense created successfully",
        )),
    ))
}

#[instrument(skip(state, body))]
async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateExpenseBody>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let today = OffsetDateTime::now_utc().date();
    let patch = body.validate(today)?;
    let expense = repo::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(AppError::NotFound("Expense"))?;
    info!(user_id = %user_id, expense_id = %expense.id, "expense updated");
    Ok(Json(ApiResponse::with_message(
        expense,
        "Expense updated successfully",
    )))
}

#[instrument(skip(state))]
async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Expense"));
    }
    info!(user_id = %user_id, expense_id = %id, "expense deleted");
    Ok(Json(ApiResponse::with_message(
        (),
        "Expense deleted successfully",
    )))
}

#[instrument(skip(state))]
async fn expense_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ExpenseAnalyticsParams>,
) -> Result<Json<ApiResponse<ExpenseSummary>>, AppError> {
    let expense_filter = ListQuery::expenses(user_id)
        .label(params.category)
        .date_range(params.start_date, params.end_date);
    let entries = repo::entries(&state.db, &expense_filter).await?;

    // Income is compared over the same date range only; the category
    // filter applies to expenses alone.
    let income_filter = ListQuery::income(user_id).date_range(params.start_date, params.end_date);
    let income_entries = income::repo::entries(&state.db, &income_filter).await?;

    let total_spend = analytics::total(&entries);
    let total_income = analytics::total(&income_entries);

    let summary = ExpenseSummary {
        total_spend: analytics::round2(total_spend),
        total_income: analytics::round2(total_income),
        balance: analytics::round2(total_income - total_spend),
        average_per_day: analytics::average_per_day(&entries),
        total_expenses: entries.len() as i64,
        category_breakdown: analytics::breakdown(&entries)
            .into_iter()
            .map(Into::into)
            .collect(),
        daily_trend: analytics::daily_trend(&entries),
    };
    Ok(Json(ApiResponse::new(summary)))
}

#[instrument(skip(state))]
async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let categories = repo::distinct_categories(&state.db, user_id).await?;
    Ok(Json(ApiResponse::new(categories)))
}
