use sqlx::{Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything that is not `asc` (case-insensitive) falls back to `DESC`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A user-scoped read over one ledger table. The owning user id is a
/// mandatory constructor input, so no query can be built without it; all
/// user-supplied values are bound as parameters, never spliced into the
/// SQL text. Column and table names come only from the fixed allow-lists
/// below.
#[derive(Debug, Clone)]
pub struct ListQuery {
    table: &'static str,
    label_column: &'static str,
    user_id: Uuid,
    label: Option<String>,
    start_date: Option<Date>,
    end_date: Option<Date>,
    sort_column: &'static str,
    order: SortOrder,
    page: i64,
    limit: i64,
}

impl ListQuery {
    pub fn expenses(user_id: Uuid) -> Self {
        Self::new("expenses", "category", user_id)
    }

    pub fn income(user_id: Uuid) -> Self {
        Self::new("income", "type", user_id)
    }

    fn new(table: &'static str, label_column: &'static str, user_id: Uuid) -> Self {
        Self {
            table,
            label_column,
            user_id,
            label: None,
            start_date: None,
            end_date: None,
            sort_column: "date",
            order: SortOrder::Desc,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Equality filter on the table's label column (category/type).
    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Inclusive calendar-date bounds.
    pub fn date_range(mut self, start: Option<Date>, end: Option<Date>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Unrecognized sort columns fall back to `date`, unrecognized
    /// directions to `DESC`.
    pub fn sort(mut self, sort_by: Option<&str>, order: Option<&str>) -> Self {
        let allowed = ["date", "amount", self.label_column, "created_at"];
        self.sort_column = sort_by
            .and_then(|s| allowed.iter().find(|c| **c == s))
            .copied()
            .unwrap_or("date");
        self.order = SortOrder::parse(order);
        self
    }

    pub fn page(mut self, page: Option<i64>, limit: Option<i64>) -> Self {
        self.page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        self.limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        self
    }

    pub fn page_number(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    fn push_predicate(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" WHERE user_id = ");
        qb.push_bind(self.user_id);
        if let Some(label) = &self.label {
            qb.push(" AND ");
            qb.push(self.label_column);
            qb.push(" = ");
            qb.push_bind(label.clone());
        }
        if let Some(start) = self.start_date {
            qb.push(" AND date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = self.end_date {
            qb.push(" AND date <= ");
            qb.push_bind(end);
        }
    }

    /// Full page read: predicate + ordering + pagination.
    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", self.table));
        self.push_predicate(&mut qb);
        qb.push(format!(" ORDER BY {} {}", self.sort_column, self.order.as_sql()));
        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.offset());
        qb
    }

    /// Matching-row count over the identical predicate, so pagination
    /// metadata is always consistent with the returned page.
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.table));
        self.push_predicate(&mut qb);
        qb
    }

    /// Rows for the aggregation engine: date, label and amount of every
    /// matched record, in insertion order so grouped ties stay stable.
    pub fn entries_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT date, {} AS label, amount FROM {}",
            self.label_column, self.table
        ));
        self.push_predicate(&mut qb);
        qb.push(" ORDER BY created_at");
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn user() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn defaults_to_date_desc_first_page() {
        let q = ListQuery::expenses(user());
        assert_eq!(
            q.select_query().sql(),
            "SELECT * FROM expenses WHERE user_id = $1 ORDER BY date DESC LIMIT $2 OFFSET $3"
        );
        assert_eq!(q.page_number(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn binds_every_filter_as_a_parameter() {
        let q = ListQuery::expenses(user())
            .label(Some("food".into()))
            .date_range(Some(date!(2024 - 01 - 01)), Some(date!(2024 - 01 - 31)))
            .sort(Some("amount"), Some("asc"))
            .page(Some(2), Some(5));
        assert_eq!(
            q.select_query().sql(),
            "SELECT * FROM expenses WHERE user_id = $1 AND category = $2 \
             AND date >= $3 AND date <= $4 ORDER BY amount ASC LIMIT $5 OFFSET $6"
        );
        assert_eq!(q.offset(), 5);
    }

    #[test]
    fn unrecognized_sort_falls_back_to_date_desc() {
        let q = ListQuery::expenses(user()).sort(Some("amount; DROP TABLE expenses"), Some("sideways"));
        assert!(q.select_query().sql().contains("ORDER BY date DESC"));
    }

    #[test]
    fn income_sorts_by_type_not_category() {
        let by_type = ListQuery::income(user()).sort(Some("type"), None);
        assert!(by_type.select_query().sql().contains("ORDER BY type DESC"));

        // `category` is not a column of the income table.
        let by_category = ListQuery::income(user()).sort(Some("category"), None);
        assert!(by_category.select_query().sql().contains("ORDER BY date DESC"));
    }

    #[test]
    fn invalid_page_and_limit_fall_back_to_defaults() {
        let q = ListQuery::income(user()).page(Some(0), Some(-3));
        assert_eq!(q.page_number(), DEFAULT_PAGE);
        assert_eq!(q.limit(), DEFAULT_LIMIT);

        let q = ListQuery::income(user()).page(None, None);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn count_query_shares_the_predicate_without_ordering() {
        let q = ListQuery::income(user())
            .label(Some("salary".into()))
            .date_range(Some(date!(2024 - 01 - 01)), None)
            .sort(Some("amount"), Some("asc"))
            .page(Some(4), Some(20));
        assert_eq!(
            q.count_query().sql(),
            "SELECT COUNT(*) FROM income WHERE user_id = $1 AND type = $2 AND date >= $3"
        );
    }

    #[test]
    fn entries_query_projects_label_in_storage_order() {
        let q = ListQuery::expenses(user()).label(Some("food".into()));
        assert_eq!(
            q.entries_query().sql(),
            "SELECT date, category AS label, amount FROM expenses \
             WHERE user_id = $1 AND category = $2 ORDER BY created_at"
        );
    }
}
