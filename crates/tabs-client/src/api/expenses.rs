//! Expense list and CRUD.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::client::{ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};

/// One page of a paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_pages: u32,
}

/// An expense as the backend reports it.
///
/// `amount` stays a decimal string on the wire; the client never does
/// arithmetic on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Payload for creating an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Sort orders the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DateAsc,
    DateDesc,
    AmountAsc,
    AmountDesc,
}

impl SortOrder {
    /// The `ordering` query parameter value.
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::DateAsc => "date",
            SortOrder::DateDesc => "-date",
            SortOrder::AmountAsc => "amount",
            SortOrder::AmountDesc => "-amount",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date" | "date-asc" => Ok(SortOrder::DateAsc),
            "-date" | "date-desc" => Ok(SortOrder::DateDesc),
            "amount" | "amount-asc" => Ok(SortOrder::AmountAsc),
            "-amount" | "amount-desc" => Ok(SortOrder::AmountDesc),
            _ => Err(ApiError::Validation(format!(
                "Unknown sort order '{value}' (expected date, date-desc, amount or amount-desc)"
            ))),
        }
    }
}

/// List filters; all optional except the page, which defaults to 1.
#[derive(Debug, Clone, Default)]
pub struct ExpenseQuery {
    pub page: Option<u32>,
    pub category: Option<String>,
    pub ordering: Option<SortOrder>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ExpenseQuery {
    /// Renders the query string pairs the backend expects.
    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("page".to_string(), self.page.unwrap_or(1).to_string())];
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        if let Some(ordering) = self.ordering {
            pairs.push(("ordering".to_string(), ordering.as_param().to_string()));
        }
        if let Some(from) = self.date_from {
            pairs.push(("date__gte".to_string(), from.to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date__lte".to_string(), to.to_string()));
        }
        pairs
    }
}

/// Fetches one page of expenses.
pub async fn list(client: &ApiClient, query: &ExpenseQuery) -> ApiResult<Page<Expense>> {
    let mut request = ApiRequest::get("/expenses/");
    for (key, value) in query.to_pairs() {
        request = request.query(key, value);
    }
    client.execute(&request).await
}

pub async fn get(client: &ApiClient, id: u64) -> ApiResult<Expense> {
    client.execute(&ApiRequest::get(format!("/expenses/{id}/"))).await
}

pub async fn create(client: &ApiClient, expense: &NewExpense) -> ApiResult<Expense> {
    let request = ApiRequest::post("/expenses/").json(json!({
        "amount": expense.amount,
        "category": expense.category,
        "description": expense.description,
        "date": expense.date,
    }));
    client.execute(&request).await
}

pub async fn update(client: &ApiClient, id: u64, patch: &ExpensePatch) -> ApiResult<Expense> {
    let mut body = Map::new();
    if let Some(amount) = &patch.amount {
        body.insert("amount".to_string(), json!(amount));
    }
    if let Some(category) = &patch.category {
        body.insert("category".to_string(), json!(category));
    }
    if let Some(description) = &patch.description {
        body.insert("description".to_string(), json!(description));
    }
    if let Some(date) = patch.date {
        body.insert("date".to_string(), json!(date));
    }

    let request = ApiRequest::patch(format!("/expenses/{id}/")).json(Value::Object(body));
    client.execute(&request).await
}

pub async fn delete(client: &ApiClient, id: u64) -> ApiResult<()> {
    client
        .execute_empty(&ApiRequest::delete(format!("/expenses/{id}/")))
        .await
}
