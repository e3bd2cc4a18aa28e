use super::mutate;
use crate::catalog::{CatalogConfig, Category, LowStockEntry, Product, ProductFilter, ProductPatch, SubCategory};
use crate::errors::AppError;
use crate::inventory::{self, Availability};
use crate::models::{
    AvailabilityQuery, CategoryRequest, ConfigValueRequest, LabelRequest, MatrixRequest, OptionsQuery,
    QuoteRequest, StockRequest, StockResponse, VariantPriceRequest, VariantsResponse,
};
use crate::pricing::{self, OptionSet, Quote};
use crate::state::AppState;
use crate::variants::{self, Variant};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<Vec<Product>> {
    let data = state.data.lock().await;
    Json(data.catalog.filter(&filter).into_iter().cloned().collect())
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(data.catalog.product(&id)?.clone()))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<Product>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = mutate(&state, |data| {
        let mut counters = data.counters.clone();
        let id = counters.next_product_id();
        let product = data.catalog.create_product(draft, id)?;
        data.counters = counters;
        Ok(product)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    let product = mutate(&state, |data| Ok(data.catalog.update_product(&id, patch)?)).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = mutate(&state, |data| Ok(data.catalog.delete_product(&id)?)).await?;
    Ok(Json(product))
}

pub async fn product_options(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OptionsQuery>,
) -> Result<Json<Vec<OptionSet>>, AppError> {
    let data = state.data.lock().await;
    let product = data.catalog.product(&id)?;
    Ok(Json(pricing::available_options(product, query.color.as_deref())))
}

pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    let data = state.data.lock().await;
    let product = data.catalog.product(&payload.product_id)?;
    Ok(Json(pricing::price_item(product, &payload.request)?))
}

pub async fn generate_variants(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MatrixRequest>,
) -> Result<Json<VariantsResponse>, AppError> {
    let variants = mutate(&state, |data| {
        let product = data.catalog.product_mut(&id)?;
        Ok(variants::regenerate(product, payload.attributes, &payload.template)?.to_vec())
    })
    .await?;
    Ok(Json(VariantsResponse {
        product_id: id,
        variants,
    }))
}

pub async fn add_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(variant): Json<Variant>,
) -> Result<(StatusCode, Json<Variant>), AppError> {
    let variant = mutate(&state, |data| {
        let product = data.catalog.product_mut(&id)?;
        Ok(variants::add_variant(product, variant)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update_variant_price(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
    Json(payload): Json<VariantPriceRequest>,
) -> Result<Json<Variant>, AppError> {
    let variant = mutate(&state, |data| {
        let product = data.catalog.product_mut(&id)?;
        Ok(variants::update_variant_price(product, &key, payload.price)?)
    })
    .await?;
    Ok(Json(variant))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> Result<Json<Variant>, AppError> {
    let variant = mutate(&state, |data| {
        let product = data.catalog.product_mut(&id)?;
        Ok(variants::delete_variant(product, &key)?)
    })
    .await?;
    Ok(Json(variant))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    let data = state.data.lock().await;
    Json(data.catalog.categories.clone())
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = mutate(&state, |data| {
        Ok(data.catalog.add_category(&payload.label, payload.icon)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    mutate(&state, |data| Ok(data.catalog.remove_category(&id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_sub_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<LabelRequest>,
) -> Result<(StatusCode, Json<SubCategory>), AppError> {
    let sub = mutate(&state, |data| {
        Ok(data.catalog.add_sub_category(&id, &payload.label)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

pub async fn delete_sub_category(
    State(state): State<AppState>,
    Path((id, sub)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    mutate(&state, |data| Ok(data.catalog.remove_sub_category(&id, &sub)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_config(State(state): State<AppState>) -> Json<CatalogConfig> {
    let data = state.data.lock().await;
    Json(data.catalog.config.clone())
}

pub async fn add_config_value(
    State(state): State<AppState>,
    Json(payload): Json<ConfigValueRequest>,
) -> Result<Json<CatalogConfig>, AppError> {
    let config = mutate(&state, |data| {
        data.catalog.add_config_value(payload.list, &payload.value)?;
        Ok(data.catalog.config.clone())
    })
    .await?;
    Ok(Json(config))
}

pub async fn remove_config_value(
    State(state): State<AppState>,
    Json(payload): Json<ConfigValueRequest>,
) -> Result<Json<CatalogConfig>, AppError> {
    let config = mutate(&state, |data| {
        data.catalog.remove_config_value(payload.list, &payload.value)?;
        Ok(data.catalog.config.clone())
    })
    .await?;
    Ok(Json(config))
}

pub async fn add_stock(
    State(state): State<AppState>,
    Json(payload): Json<StockRequest>,
) -> Result<Json<StockResponse>, AppError> {
    let stock = mutate(&state, |data| {
        Ok(inventory::add_stock(
            &mut data.catalog,
            &payload.product_id,
            payload.variant.as_deref(),
            payload.quantity,
        )?)
    })
    .await?;
    Ok(Json(StockResponse {
        product_id: payload.product_id,
        variant: payload.variant,
        stock,
    }))
}

pub async fn set_stock(
    State(state): State<AppState>,
    Json(payload): Json<StockRequest>,
) -> Result<Json<StockResponse>, AppError> {
    let stock = mutate(&state, |data| {
        Ok(inventory::set_stock(
            &mut data.catalog,
            &payload.product_id,
            payload.variant.as_deref(),
            payload.quantity,
        )?)
    })
    .await?;
    Ok(Json(StockResponse {
        product_id: payload.product_id,
        variant: payload.variant,
        stock,
    }))
}

pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(inventory::check_availability(
        &data.catalog,
        &query.product_id,
        query.variant.as_deref(),
        query.required,
    )?))
}

pub async fn low_stock(State(state): State<AppState>) -> Json<Vec<LowStockEntry>> {
    let data = state.data.lock().await;
    Json(data.catalog.low_stock())
}
