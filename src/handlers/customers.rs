use super::{mutate, now};
use crate::credits::{self, Credit};
use crate::customers::{self, Customer, NewCustomer};
use crate::errors::AppError;
use crate::models::{CreditPaymentRequest, SearchQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CustomerCredits {
    pub customer_id: String,
    pub outstanding: Decimal,
    pub credits: Vec<Credit>,
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Customer>> {
    let data = state.data.lock().await;
    Json(
        customers::search(&data.customers, &query.q)
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(draft): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = mutate(&state, |data| {
        let mut counters = data.counters.clone();
        let id = counters.next_customer_id();
        let customer = customers::create(&mut data.customers, draft, id)?;
        data.counters = counters;
        Ok(customer)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(customers::find(&data.customers, &id)?.clone()))
}

pub async fn customer_credits(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerCredits>, AppError> {
    let data = state.data.lock().await;
    customers::find(&data.customers, &id)?;
    let credits: Vec<Credit> = credits::for_customer(&data.credits, &id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(CustomerCredits {
        outstanding: credits::outstanding(&credits),
        customer_id: id,
        credits,
    }))
}

pub async fn get_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Credit>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(credits::find(&data.credits, &id)?.clone()))
}

pub async fn pay_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreditPaymentRequest>,
) -> Result<Json<Credit>, AppError> {
    let credit = mutate(&state, |data| {
        Ok(credits::settle(data, &id, payload.amount, payload.method, now())?)
    })
    .await?;
    Ok(Json(credit))
}
