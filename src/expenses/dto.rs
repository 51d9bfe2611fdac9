use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::AppError;
use crate::ledger::analytics::{BreakdownSlice, TrendPoint};
use crate::ledger::validate::{self, AmountInput};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateExpenseBody {
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    pub note: Option<String>,
    pub date: Option<String>,
}

/// A validated, normalized expense ready for insertion.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Date,
}

impl CreateExpenseBody {
    pub fn validate(self, today: Date) -> Result<NewExpense, AppError> {
        let category = validate::required_label(self.category.as_deref(), "category")?;
        let amount = match &self.amount {
            Some(raw) => validate::parse_amount(raw)?,
            None => return Err(AppError::MissingField("amount")),
        };
        let date = match self.date.as_deref() {
            Some(raw) => validate::parse_date(raw, today)?,
            None => return Err(AppError::MissingField("date")),
        };
        Ok(NewExpense {
            category,
            amount,
            note: self.note,
            date,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateExpenseBody {
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    pub note: Option<String>,
    pub date: Option<String>,
}

/// Partial update: only supplied fields are validated and replaced.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub note: Option<String>,
    pub date: Option<Date>,
}

impl UpdateExpenseBody {
    pub fn validate(self, today: Date) -> Result<ExpensePatch, AppError> {
        let category = self
            .category
            .as_deref()
            .map(|c| validate::required_label(Some(c), "category"))
            .transpose()?;
        let amount = self.amount.as_ref().map(validate::parse_amount).transpose()?;
        let date = self
            .date
            .as_deref()
            .map(|d| validate::parse_date(d, today))
            .transpose()?;
        Ok(ExpensePatch {
            category,
            amount,
            note: self.note,
            date,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListParams {
    pub category: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseAnalyticsParams {
    pub category: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct CategorySlice {
    pub category: String,
    pub total: Decimal,
    pub count: i64,
}

impl From<BreakdownSlice> for CategorySlice {
    fn from(slice: BreakdownSlice) -> Self {
        Self {
            category: slice.label,
            total: slice.total,
            count: slice.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_spend: Decimal,
    pub total_income: Decimal,
    pub balance: Decimal,
    pub average_per_day: Decimal,
    pub total_expenses: i64,
    pub category_breakdown: Vec<CategorySlice>,
    pub daily_trend: Vec<TrendPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn body(json: serde_json::Value) -> CreateExpenseBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn create_normalizes_category_and_amount() {
        let today = date!(2024 - 06 - 15);
        let new = body(serde_json::json!({
            "category": "  food ",
            "amount": "12.50",
            "date": "2024-01-05"
        }))
        .validate(today)
        .unwrap();
        assert_eq!(new.category, "food");
        assert_eq!(new.amount, "12.50".parse::<Decimal>().unwrap());
        assert_eq!(new.date, date!(2024 - 01 - 05));
        assert_eq!(new.note, None);
    }

    #[test]
    fn create_requires_category_amount_and_date() {
        let today = date!(2024 - 06 - 15);
        let err = body(serde_json::json!({"amount": 5, "date": "2024-01-05"}))
            .validate(today)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("category")));

        let err = body(serde_json::json!({"category": "food", "date": "2024-01-05"}))
            .validate(today)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("amount")));

        let err = body(serde_json::json!({"category": "food", "amount": 5}))
            .validate(today)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("date")));
    }

    #[test]
    fn create_rejects_future_dates_and_bad_amounts() {
        let today = date!(2024 - 06 - 15);
        let err = body(serde_json::json!({
            "category": "food", "amount": 5, "date": "2024-06-16"
        }))
        .validate(today)
        .unwrap_err();
        assert!(matches!(err, AppError::FutureDate));

        let err = body(serde_json::json!({
            "category": "food", "amount": -5, "date": "2024-06-01"
        }))
        .validate(today)
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount));
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let result: Result<CreateExpenseBody, _> = serde_json::from_value(serde_json::json!({
            "category": "food", "amount": 5, "date": "2024-06-01", "user_id": "someone-else"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn update_validates_only_supplied_fields() {
        let today = date!(2024 - 06 - 15);
        let update: UpdateExpenseBody =
            serde_json::from_value(serde_json::json!({"amount": 7.25})).unwrap();
        let patch = update.validate(today).unwrap();
        assert_eq!(patch.amount, Some("7.25".parse().unwrap()));
        assert_eq!(patch.category, None);
        assert_eq!(patch.date, None);

        let update: UpdateExpenseBody =
            serde_json::from_value(serde_json::json!({"category": "  "})).unwrap();
        assert!(matches!(
            update.validate(today),
            Err(AppError::MissingField("category"))
        ));
    }

    #[test]
    fn empty_update_is_a_no_op_patch() {
        let today = date!(2024 - 06 - 15);
        let update: UpdateExpenseBody = serde_json::from_value(serde_json::json!({})).unwrap();
        let patch = update.validate(today).unwrap();
        assert!(patch.category.is_none() && patch.amount.is_none());
        assert!(patch.note.is_none() && patch.date.is_none());
    }
}
