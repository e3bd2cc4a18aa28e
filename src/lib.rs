pub mod app;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod credits;
pub mod customers;
pub mod errors;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod money;
pub mod orders;
pub mod pricing;
pub mod seed;
pub mod state;
pub mod stats;
pub mod storage;
pub mod units;
pub mod variants;

pub use app::router;
pub use config::Settings;
pub use state::AppState;
pub use storage::load_data;
