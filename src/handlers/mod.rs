pub mod catalog;
pub mod customers;
pub mod sales;

use crate::errors::AppError;
use crate::models::AppData;
use crate::state::AppState;
use crate::storage::persist_data;
use axum::Json;
use chrono::{Local, NaiveDateTime};
use serde_json::{json, Value};
use tokio::sync::MutexGuard;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Applies a change to the shared state and saves it when the change succeeds.
async fn mutate<T>(
    state: &AppState,
    change: impl FnOnce(&mut AppData) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut guard: MutexGuard<'_, AppData> = state.data.lock().await;
    let data = &mut *guard;
    let result = change(data)?;
    persist_data(&state.data_path, data).await?;
    Ok(result)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
