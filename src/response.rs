use serde::Serialize;

/// Envelope for single-object responses: `{success, data, message?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data, message: None }
    }

    pub fn with_message(data: T, message: &'static str) -> Self {
        Self { success: true, data, message: Some(message) }
    }
}

/// Envelope for paginated listings.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: PageMeta) -> Self {
        Self { success: true, data, pagination }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    /// `limit` is guaranteed positive by the query builder.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = (total + limit - 1) / limit;
        Self { page, limit, total, total_pages }
    }
}
