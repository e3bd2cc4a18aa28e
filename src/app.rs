use crate::handlers::{self, catalog, customers, sales};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(catalog_routes())
        .merge(sales_routes())
        .merge(customer_routes())
        .with_state(state)
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/catalog/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/catalog/products/:id",
            get(catalog::get_product)
                .patch(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/api/catalog/products/:id/options", get(catalog::product_options))
        .route(
            "/api/catalog/products/:id/variants",
            post(catalog::add_variant),
        )
        .route(
            "/api/catalog/products/:id/variants/matrix",
            post(catalog::generate_variants),
        )
        .route(
            "/api/catalog/products/:id/variants/:key",
            delete(catalog::delete_variant),
        )
        .route(
            "/api/catalog/products/:id/variants/:key/price",
            put(catalog::update_variant_price),
        )
        .route(
            "/api/catalog/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/catalog/categories/:id",
            delete(catalog::delete_category),
        )
        .route(
            "/api/catalog/categories/:id/sub-categories",
            post(catalog::create_sub_category),
        )
        .route(
            "/api/catalog/categories/:id/sub-categories/:sub",
            delete(catalog::delete_sub_category),
        )
        .route(
            "/api/catalog/config",
            get(catalog::get_config)
                .post(catalog::add_config_value)
                .delete(catalog::remove_config_value),
        )
        .route("/api/quote", post(catalog::quote))
        .route("/api/inventory/stock/add", post(catalog::add_stock))
        .route("/api/inventory/stock", put(catalog::set_stock))
        .route("/api/inventory/availability", get(catalog::availability))
        .route("/api/inventory/low-stock", get(catalog::low_stock))
}

fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(sales::get_cart).delete(sales::clear_cart))
        .route("/api/cart/items", post(sales::add_cart_item))
        .route(
            "/api/cart/items/:index",
            put(sales::update_cart_item).delete(sales::remove_cart_item),
        )
        .route("/api/cart/customer", put(sales::set_cart_customer))
        .route("/api/cart/tax", put(sales::set_cart_tax))
        .route("/api/cart/load", post(sales::load_order_into_cart))
        .route("/api/checkout/preview", post(sales::preview_checkout))
        .route("/api/checkout", post(sales::commit_checkout))
        .route(
            "/api/invoices",
            get(sales::list_invoices).post(sales::create_invoice),
        )
        .route(
            "/api/invoices/:id",
            get(sales::get_invoice).delete(sales::delete_invoice),
        )
        .route("/api/invoices/:id/convert", post(sales::convert_invoice))
        .route("/api/orders", get(sales::list_orders))
        .route(
            "/api/orders/:id",
            get(sales::get_order).delete(sales::delete_order),
        )
        .route("/api/orders/:id/children", get(sales::order_children))
        .route("/api/stats", get(sales::get_stats))
        .route("/api/stats/cash", get(sales::cash_on_date))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/api/customers/:id", get(customers::get_customer))
        .route("/api/customers/:id/credits", get(customers::customer_credits))
        .route("/api/credits/:id", get(customers::get_credit))
        .route("/api/credits/:id/payments", post(customers::pay_credit))
}
