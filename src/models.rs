use crate::cart::{Cart, CartTotals};
use crate::catalog::{AttributeDef, Catalog, ConfigList};
use crate::credits::Credit;
use crate::customers::Customer;
use crate::orders::{Invoice, Order, PaymentMethod};
use crate::pricing::PricingRequest;
use crate::variants::{Variant, VariantTemplate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sequence numbers behind the generated record ids.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Counters {
    pub products: u64,
    pub customers: u64,
    pub orders: u64,
    pub invoices: u64,
    pub credits: u64,
}

impl Counters {
    pub fn next_product_id(&mut self) -> String {
        self.products += 1;
        format!("p{}", self.products)
    }

    pub fn next_customer_id(&mut self) -> String {
        self.customers += 1;
        format!("c{}", self.customers)
    }

    pub fn next_order_id(&mut self) -> String {
        self.orders += 1;
        format!("ORD-{}", self.orders)
    }

    pub fn next_invoice_id(&mut self) -> String {
        self.invoices += 1;
        format!("INV-{}", self.invoices)
    }

    pub fn next_credit_id(&mut self) -> String {
        self.credits += 1;
        format!("CR-{}", self.credits)
    }
}

/// Everything the shop keeps, persisted as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppData {
    pub catalog: Catalog,
    pub customers: Vec<Customer>,
    pub cart: Cart,
    pub orders: Vec<Order>,
    pub invoices: Vec<Invoice>,
    pub credits: Vec<Credit>,
    pub counters: Counters,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfigValueRequest {
    pub list: ConfigList,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRequest {
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub template: VariantTemplate,
}

#[derive(Debug, Deserialize)]
pub struct VariantPriceRequest {
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub product_id: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct OptionsQuery {
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub product_id: String,
    pub request: PricingRequest,
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub product_id: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub product_id: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default = "one")]
    pub required: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub variant: Option<String>,
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub request: PricingRequest,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub totals: CartTotals,
    pub total_label: String,
}

#[derive(Debug, Deserialize)]
pub struct CartCustomerRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoadOrderRequest {
    pub order_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct InvoiceRequest {
    pub generate: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CreditPaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct CashQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct CashResponse {
    pub date: String,
    pub cash_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub total_sales: Decimal,
    pub order_count: u64,
    pub cash_total: Decimal,
    pub mpesa_total: Decimal,
    pub outstanding_credit: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub order_count: u64,
    pub total_sales: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub order_count: u64,
    pub total_sales: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WeeklyAveragePoint {
    pub week: String,
    pub days_counted: u8,
    pub avg_sales: Decimal,
    pub avg_orders: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub today: DaySummary,
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub weekly_averages: Vec<WeeklyAveragePoint>,
}
