//! Category manager with per-category budgets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Payload for creating a category. `budget` goes out as an explicit
/// `null` when unset; the backend treats that as "no budget".
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub budget: Option<f64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the budget; `None` leaves it alone.
    pub budget: Option<Option<f64>>,
}

/// The category list is not paginated.
pub async fn list(client: &ApiClient) -> ApiResult<Vec<Category>> {
    client.execute(&ApiRequest::get("/categories/")).await
}

pub async fn create(client: &ApiClient, category: &NewCategory) -> ApiResult<Category> {
    let request = ApiRequest::post("/categories/").json(json!({
        "name": category.name,
        "color": category.color,
        "budget": category.budget,
    }));
    client.execute(&request).await
}

pub async fn update(client: &ApiClient, id: u64, patch: &CategoryPatch) -> ApiResult<Category> {
    let mut body = Map::new();
    if let Some(name) = &patch.name {
        body.insert("name".to_string(), json!(name));
    }
    if let Some(color) = &patch.color {
        body.insert("color".to_string(), json!(color));
    }
    if let Some(budget) = patch.budget {
        body.insert("budget".to_string(), json!(budget));
    }

    let request = ApiRequest::patch(format!("/categories/{id}/")).json(Value::Object(body));
    client.execute(&request).await
}

pub async fn delete(client: &ApiClient, id: u64) -> ApiResult<()> {
    client
        .execute_empty(&ApiRequest::delete(format!("/categories/{id}/")))
        .await
}
