use crate::cart::CartItem;
use crate::credits::CreditStatus;
use crate::customers::Customer;
use crate::errors::DomainError;
use crate::models::AppData;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    Split,
    CashRefund,
    StoreCredit,
}

impl PaymentMethod {
    pub fn is_refund(self) -> bool {
        matches!(self, PaymentMethod::CashRefund | PaymentMethod::StoreCredit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub customer: Option<Customer>,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub balance: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub parent_order_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Generated,
    Converted,
}

/// A quotation. It holds prices but moves no stock and takes no money.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub customer: Option<Customer>,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub order_id: Option<String>,
}

pub fn find_order<'a>(orders: &'a [Order], id: &str) -> Result<&'a Order, DomainError> {
    orders
        .iter()
        .find(|order| order.id == id)
        .ok_or_else(|| DomainError::not_found(format!("order '{id}'")))
}

pub fn find_invoice<'a>(invoices: &'a [Invoice], id: &str) -> Result<&'a Invoice, DomainError> {
    invoices
        .iter()
        .find(|invoice| invoice.id == id)
        .ok_or_else(|| DomainError::not_found(format!("invoice '{id}'")))
}

/// Saves the cart as a quotation and empties it.
pub fn save_invoice(
    data: &mut AppData,
    vat_rate: Decimal,
    generate: bool,
    now: NaiveDateTime,
) -> Result<Invoice, DomainError> {
    if data.cart.items.is_empty() {
        return Err(DomainError::validation("cannot save an invoice from an empty cart"));
    }
    let totals = data.cart.totals(vat_rate);
    let invoice = Invoice {
        id: data.counters.next_invoice_id(),
        created_at: now,
        customer: data.cart.customer.clone(),
        items: data.cart.items.clone(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
        status: if generate {
            InvoiceStatus::Generated
        } else {
            InvoiceStatus::Draft
        },
        order_id: None,
    };
    data.invoices.insert(0, invoice.clone());
    data.cart.clear();
    info!(invoice = %invoice.id, total = %invoice.total, "invoice saved");
    Ok(invoice)
}

/// Turns a quotation into a pending order and marks the quotation converted.
pub fn convert_invoice(data: &mut AppData, invoice_id: &str, now: NaiveDateTime) -> Result<Order, DomainError> {
    let index = data
        .invoices
        .iter()
        .position(|invoice| invoice.id == invoice_id)
        .ok_or_else(|| DomainError::not_found(format!("invoice '{invoice_id}'")))?;
    if data.invoices[index].status == InvoiceStatus::Converted {
        warn!(invoice = %invoice_id, "invoice already converted");
        return Err(DomainError::conflict(format!(
            "invoice '{invoice_id}' has already been converted"
        )));
    }

    let order_id = data.counters.next_order_id();
    let invoice = &mut data.invoices[index];
    let order = Order {
        id: order_id,
        created_at: now,
        updated_at: None,
        customer: invoice.customer.clone(),
        items: invoice.items.clone(),
        subtotal: invoice.subtotal,
        tax: invoice.tax,
        discount: Decimal::ZERO,
        total: invoice.total,
        amount_paid: Decimal::ZERO,
        balance: invoice.total,
        status: OrderStatus::Pending,
        payment_method: None,
        payments: Vec::new(),
        invoice_id: Some(invoice.id.clone()),
        parent_order_id: None,
    };
    invoice.status = InvoiceStatus::Converted;
    invoice.order_id = Some(order.id.clone());

    info!(invoice = %invoice_id, order = %order.id, "invoice converted");
    data.orders.insert(0, order.clone());
    Ok(order)
}

pub fn delete_invoice(invoices: &mut Vec<Invoice>, id: &str) -> Result<Invoice, DomainError> {
    let index = invoices
        .iter()
        .position(|invoice| invoice.id == id)
        .ok_or_else(|| DomainError::not_found(format!("invoice '{id}'")))?;
    Ok(invoices.remove(index))
}

/// Orders with an unsettled credit stay on the books.
pub fn delete_order(data: &mut AppData, id: &str) -> Result<Order, DomainError> {
    let index = data
        .orders
        .iter()
        .position(|order| order.id == id)
        .ok_or_else(|| DomainError::not_found(format!("order '{id}'")))?;
    if data
        .credits
        .iter()
        .any(|credit| credit.order_id == id && credit.status != CreditStatus::Paid)
    {
        return Err(DomainError::conflict(format!(
            "order '{id}' still has an outstanding credit"
        )));
    }
    Ok(data.orders.remove(index))
}

fn matches_query(id: &str, customer: Option<&Customer>, query: &str) -> bool {
    id.to_lowercase().contains(query)
        || customer.is_some_and(|customer| customer.name.to_lowercase().contains(query))
}

fn newest_first<'a, T>(mut records: Vec<&'a T>, created_at: impl Fn(&T) -> NaiveDateTime) -> Vec<&'a T> {
    records.sort_by_key(|record| std::cmp::Reverse(created_at(*record)));
    records
}

pub fn search_orders<'a>(orders: &'a [Order], query: &str) -> Vec<&'a Order> {
    let query = query.trim().to_lowercase();
    let hits = orders
        .iter()
        .filter(|order| matches_query(&order.id, order.customer.as_ref(), &query))
        .collect();
    newest_first(hits, |order| order.created_at)
}

pub fn search_invoices<'a>(invoices: &'a [Invoice], query: &str) -> Vec<&'a Invoice> {
    let query = query.trim().to_lowercase();
    let hits = invoices
        .iter()
        .filter(|invoice| matches_query(&invoice.id, invoice.customer.as_ref(), &query))
        .collect();
    newest_first(hits, |invoice| invoice.created_at)
}

pub fn child_orders<'a>(orders: &'a [Order], parent_id: &str) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|order| order.parent_order_id.as_deref() == Some(parent_id))
        .collect()
}
