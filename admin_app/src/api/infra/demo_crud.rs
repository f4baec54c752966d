//! Demo CRUD resource under `/infra/demo-crud`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::request::{to_query, ApiError, RequestClient};

const BASE: &str = "/infra/demo-crud";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Assigned by the server; left empty when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            name: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub async fn page_demo<C: RequestClient>(
    client: &C,
    params: &PageParams,
) -> Result<PageResult<Item>, ApiError> {
    client.get(&format!("{BASE}/page"), to_query(params)?).await
}

pub async fn get_demo<C: RequestClient>(client: &C, id: i64) -> Result<Item, ApiError> {
    client.get(&format!("{BASE}/get?id={id}"), Vec::new()).await
}

pub async fn create_demo<C: RequestClient>(client: &C, data: &Item) -> Result<Value, ApiError> {
    client.post(&format!("{BASE}/create"), data).await
}

pub async fn update_demo<C: RequestClient>(client: &C, data: &Item) -> Result<Value, ApiError> {
    client.put(&format!("{BASE}/update"), data).await
}

pub async fn delete_demo<C: RequestClient>(client: &C, id: i64) -> Result<Value, ApiError> {
    client.delete(&format!("{BASE}/delete?id={id}")).await
}
