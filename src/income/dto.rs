use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::AppError;
use crate::ledger::analytics::{BreakdownSlice, MonthPoint};
use crate::ledger::validate::{self, AmountInput};

/// Closed set of income types; stored as text, checked by the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum IncomeType {
    #[default]
    Salary,
    Bonus,
    Investment,
    Freelance,
    Gift,
    Other,
}

impl IncomeType {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "salary" => Ok(Self::Salary),
            "bonus" => Ok(Self::Bonus),
            "investment" => Ok(Self::Investment),
            "freelance" => Ok(Self::Freelance),
            "gift" => Ok(Self::Gift),
            "other" => Ok(Self::Other),
            _ => Err(AppError::InvalidEnum),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Bonus => "bonus",
            Self::Investment => "investment",
            Self::Freelance => "freelance",
            Self::Gift => "gift",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIncomeBody {
    pub source: Option<String>,
    pub amount: Option<AmountInput>,
    pub note: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A validated, normalized income entry ready for insertion.
#[derive(Debug, Clone)]
pub struct NewIncome {
    pub source: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Date,
    pub kind: IncomeType,
}

impl CreateIncomeBody {
    pub fn validate(self, today: Date) -> Result<NewIncome, AppError> {
        let source = validate::required_label(self.source.as_deref(), "source")?;
        let amount = match &self.amount {
            Some(raw) => validate::parse_amount(raw)?,
            None => return Err(AppError::MissingField("amount")),
        };
        let date = match self.date.as_deref() {
            Some(raw) => validate::parse_date(raw, today)?,
            None => return Err(AppError::MissingField("date")),
        };
        let kind = match self.kind.as_deref() {
            Some(raw) => IncomeType::parse(raw)?,
            None => IncomeType::default(),
        };
        Ok(NewIncome {
            source,
            amount,
            note: self.note,
            date,
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateIncomeBody {
    pub source: Option<String>,
    pub amount: Option<AmountInput>,
    pub note: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Partial update: only supplied fields are validated and replaced.
#[derive(Debug, Clone, Default)]
pub struct IncomePatch {
    pub source: Option<String>,
    pub amount: Option<Decimal>,
    pub note: Option<String>,
    pub date: Option<Date>,
    pub kind: Option<IncomeType>,
}

impl UpdateIncomeBody {
    pub fn validate(self, today: Date) -> Result<IncomePatch, AppError> {
        let source = self
            .source
            .as_deref()
            .map(|s| validate::required_label(Some(s), "source"))
            .transpose()?;
        let amount = self.amount.as_ref().map(validate::parse_amount).transpose()?;
        let date = self
            .date
            .as_deref()
            .map(|d| validate::parse_date(d, today))
            .transpose()?;
        let kind = self.kind.as_deref().map(IncomeType::parse).transpose()?;
        Ok(IncomePatch {
            source,
            amount,
            note: self.note,
            date,
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeListParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeAnalyticsParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct TypeSlice {
    #[serde(rename = "type")]
    pub kind: String,
    pub total: Decimal,
    pub count: i64,
}

impl From<BreakdownSlice> for TypeSlice {
    fn from(slice: BreakdownSlice) -> Self {
        Self {
            kind: slice.label,
            total: slice.total,
            count: slice.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub total_income: Decimal,
    pub type_breakdown: Vec<TypeSlice>,
    pub monthly_trend: Vec<MonthPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn body(json: serde_json::Value) -> CreateIncomeBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn type_defaults_to_salary() {
        let today = date!(2024 - 06 - 15);
        let new = body(serde_json::json!({
            "source": "Acme Corp",
            "amount": 1000,
            "date": "2024-06-01"
        }))
        .validate(today)
        .unwrap();
        assert_eq!(new.kind, IncomeType::Salary);
        assert_eq!(new.source, "Acme Corp");
    }

    #[test]
    fn type_is_parsed_case_insensitively() {
        assert_eq!(IncomeType::parse("Freelance").unwrap(), IncomeType::Freelance);
        assert_eq!(IncomeType::parse(" gift ").unwrap(), IncomeType::Gift);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let today = date!(2024 - 06 - 15);
        let err = body(serde_json::json!({
            "source": "Acme Corp",
            "amount": 1000,
            "date": "2024-06-01",
            "type": "lottery"
        }))
        .validate(today)
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidEnum));
    }

    #[test]
    fn create_requires_source() {
        let today = date!(2024 - 06 - 15);
        let err = body(serde_json::json!({"amount": 1000, "date": "2024-06-01"}))
            .validate(today)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("source")));
    }

    #[test]
    fn update_patches_only_supplied_fields() {
        let today = date!(2024 - 06 - 15);
        let update: UpdateIncomeBody =
            serde_json::from_value(serde_json::json!({"type": "bonus"})).unwrap();
        let patch = update.validate(today).unwrap();
        assert_eq!(patch.kind, Some(IncomeType::Bonus));
        assert!(patch.source.is_none() && patch.amount.is_none() && patch.date.is_none());
    }

    #[test]
    fn income_type_round_trips_through_serde_as_lowercase() {
        let json = serde_json::to_string(&IncomeType::Freelance).unwrap();
        assert_eq!(json, r#""freelance""#);
        let parsed: IncomeType = serde_json::from_str(r#""investment""#).unwrap();
        assert_eq!(parsed, IncomeType::Investment);
    }
}
