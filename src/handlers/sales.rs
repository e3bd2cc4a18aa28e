use super::{mutate, now};
use crate::checkout::{self, CheckoutReceipt, CheckoutRequest, Financials};
use crate::customers;
use crate::errors::AppError;
use crate::models::{
    AddItemRequest, AppData, CartCustomerRequest, CartResponse, CashQuery, CashResponse, InvoiceRequest, LoadOrderRequest,
    SearchQuery, StatsResponse, TaxRequest,
};
use crate::orders::{self, Invoice, Order};
use crate::pricing::PricingRequest;
use crate::state::AppState;
use crate::stats;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

fn cart_view(state: &AppState, data: &AppData) -> CartResponse {
    let totals = data.cart.totals(state.settings.vat_rate);
    CartResponse {
        cart: data.cart.clone(),
        total_label: state.settings.money(totals.total),
        totals,
    }
}

/// Runs a cart change and answers with the refreshed cart.
async fn change_cart(
    state: &AppState,
    change: impl FnOnce(&mut AppData) -> Result<(), AppError>,
) -> Result<Json<CartResponse>, AppError> {
    let view = mutate(state, |data| {
        change(data)?;
        Ok(cart_view(state, data))
    })
    .await?;
    Ok(Json(view))
}

pub async fn get_cart(State(state): State<AppState>) -> Json<CartResponse> {
    let data = state.data.lock().await;
    Json(cart_view(&state, &data))
}

pub async fn clear_cart(State(state): State<AppState>) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        data.cart.clear();
        Ok(())
    })
    .await
}

pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        data.cart
            .add_item(&data.catalog, &payload.product_id, payload.request)?;
        Ok(())
    })
    .await
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<PricingRequest>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        data.cart.update_item(index, &data.catalog, request)?;
        Ok(())
    })
    .await
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        data.cart.remove_item(index)?;
        Ok(())
    })
    .await
}

pub async fn set_cart_customer(
    State(state): State<AppState>,
    Json(payload): Json<CartCustomerRequest>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        let customer = match payload.customer_id.as_deref() {
            Some(id) => Some(customers::find(&data.customers, id)?.clone()),
            None => None,
        };
        data.cart.set_customer(customer);
        Ok(())
    })
    .await
}

pub async fn set_cart_tax(
    State(state): State<AppState>,
    Json(payload): Json<TaxRequest>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        data.cart.set_tax(payload.enabled);
        Ok(())
    })
    .await
}

pub async fn load_order_into_cart(
    State(state): State<AppState>,
    Json(payload): Json<LoadOrderRequest>,
) -> Result<Json<CartResponse>, AppError> {
    change_cart(&state, |data| {
        let order = orders::find_order(&data.orders, &payload.order_id)?;
        data.cart.load_order(order);
        Ok(())
    })
    .await
}

pub async fn preview_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Financials>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(checkout::preview(&data, state.settings.vat_rate, &request)?))
}

pub async fn commit_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), AppError> {
    let vat_rate = state.settings.vat_rate;
    let receipt = mutate(&state, |data| {
        Ok(checkout::commit(data, vat_rate, &request, now())?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Invoice>> {
    let data = state.data.lock().await;
    Json(
        orders::search_invoices(&data.invoices, &query.q)
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Option<Json<InvoiceRequest>>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let generate = payload.map(|Json(body)| body.generate).unwrap_or_default();
    let vat_rate = state.settings.vat_rate;
    let invoice = mutate(&state, |data| {
        Ok(orders::save_invoice(data, vat_rate, generate, now())?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(orders::find_invoice(&data.invoices, &id)?.clone()))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = mutate(&state, |data| {
        Ok(orders::delete_invoice(&mut data.invoices, &id)?)
    })
    .await?;
    Ok(Json(invoice))
}

pub async fn convert_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = mutate(&state, |data| Ok(orders::convert_invoice(data, &id, now())?)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Order>> {
    let data = state.data.lock().await;
    Json(
        orders::search_orders(&data.orders, &query.q)
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(orders::find_order(&data.orders, &id)?.clone()))
}

pub async fn order_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Order>>, AppError> {
    let data = state.data.lock().await;
    orders::find_order(&data.orders, &id)?;
    Ok(Json(
        orders::child_orders(&data.orders, &id)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = mutate(&state, |data| Ok(orders::delete_order(data, &id)?)).await?;
    Ok(Json(order))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let data = state.data.lock().await;
    Json(stats::build_stats(&data))
}

pub async fn cash_on_date(
    State(state): State<AppState>,
    Query(query): Query<CashQuery>,
) -> Result<Json<CashResponse>, AppError> {
    let data = state.data.lock().await;
    let cash_total = stats::cash_on(&data, &query.date)?;
    Ok(Json(CashResponse {
        date: query.date,
        cash_total,
    }))
}
