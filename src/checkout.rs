//! Turns the cart into an order.
//!
//! The same [`financials`] calculation backs the preview and the commit, so
//! what the cashier is shown is what gets recorded.

use crate::cart::{Cart, CartItem};
use crate::credits::{Credit, CreditStatus};
use crate::customers;
use crate::errors::DomainError;
use crate::inventory;
use crate::models::AppData;
use crate::money;
use crate::orders::{Order, OrderStatus, Payment, PaymentMethod};
use crate::pricing::StockClaim;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    #[default]
    New,
    /// Rewrites an existing order in place.
    Edit,
    /// Adds a follow-up order linked to a parent.
    Link,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    /// The order being edited, or the parent in link mode.
    pub order_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub discount: Decimal,
    pub partial: bool,
    pub amount_paid: Decimal,
    pub cash_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Financials {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub base_total: Decimal,
    pub discount_value: Decimal,
    pub total: Decimal,
    /// What the edited order has already been paid; zero outside edit mode.
    pub original_total: Decimal,
    pub effective_total: Decimal,
    pub current_payable: Decimal,
    pub balance: Decimal,
    pub mpesa_amount: Decimal,
}

impl Financials {
    pub fn is_refund(&self) -> bool {
        self.effective_total < Decimal::ZERO
    }

    pub fn refund_due(&self) -> Decimal {
        (-self.effective_total).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub credit: Option<Credit>,
    pub financials: Financials,
}

pub fn financials(subtotal: Decimal, tax: Decimal, original_total: Decimal, req: &CheckoutRequest) -> Financials {
    let base_total = subtotal + tax;
    let discount_value = if req.partial { Decimal::ZERO } else { req.discount };
    let total = (base_total - discount_value).max(Decimal::ZERO);
    let editing = req.mode == CheckoutMode::Edit;
    let original_total = if editing { original_total } else { Decimal::ZERO };
    let effective_total = if editing { total - original_total } else { total };
    let current_payable = if req.partial {
        req.amount_paid
    } else {
        effective_total.max(Decimal::ZERO)
    };
    let balance = (total - (original_total + current_payable)).max(Decimal::ZERO);
    let mpesa_amount = (current_payable - req.cash_amount).max(Decimal::ZERO);

    Financials {
        subtotal,
        tax,
        base_total,
        discount_value,
        total,
        original_total,
        effective_total,
        current_payable,
        balance,
        mpesa_amount,
    }
}

fn check_inputs(req: &CheckoutRequest) -> Result<(), DomainError> {
    for (name, value) in [
        ("discount", req.discount),
        ("amount paid", req.amount_paid),
        ("cash amount", req.cash_amount),
    ] {
        money::check(name, value)?;
    }
    Ok(())
}

/// The order an edit or link checkout refers to.
fn referenced_order<'a>(data: &'a AppData, req: &CheckoutRequest) -> Result<Option<&'a Order>, DomainError> {
    let id = match req.mode {
        CheckoutMode::New => return Ok(None),
        CheckoutMode::Edit => req
            .order_id
            .as_deref()
            .or(data.cart.editing_order_id.as_deref()),
        CheckoutMode::Link => req.order_id.as_deref(),
    };
    let id = id.ok_or_else(|| DomainError::validation("an order id is required for this checkout mode"))?;
    data.orders
        .iter()
        .find(|order| order.id == id)
        .map(Some)
        .ok_or_else(|| DomainError::not_found(format!("order '{id}'")))
}

fn compute(data: &AppData, vat_rate: Decimal, req: &CheckoutRequest) -> Result<(Financials, Option<Order>), DomainError> {
    check_inputs(req)?;
    let reference = referenced_order(data, req)?.cloned();
    let totals = data.cart.totals(vat_rate);
    // An edit only charges what the original order has not already paid.
    let original_total = match (&reference, req.mode) {
        (Some(order), CheckoutMode::Edit) => order.amount_paid,
        _ => Decimal::ZERO,
    };
    Ok((financials(totals.subtotal, totals.tax, original_total, req), reference))
}

pub fn preview(data: &AppData, vat_rate: Decimal, req: &CheckoutRequest) -> Result<Financials, DomainError> {
    compute(data, vat_rate, req).map(|(financials, _)| financials)
}

fn validate(cart: &Cart, req: &CheckoutRequest, fin: &Financials) -> Result<(), DomainError> {
    if cart.items.is_empty() {
        return Err(DomainError::validation("cart is empty"));
    }
    let eligible = cart
        .customer
        .as_ref()
        .is_some_and(|customer| customer.customer_type.credit_eligible());

    if req.partial && !eligible {
        return Err(DomainError::validation(
            "partial payment needs a registered, frequent or corporate customer",
        ));
    }
    if req.partial && fin.current_payable > fin.effective_total.max(Decimal::ZERO) {
        return Err(DomainError::validation("amount paid exceeds the amount due"));
    }

    if fin.is_refund() {
        match req.payment_method {
            Some(PaymentMethod::StoreCredit) if !eligible => {
                return Err(DomainError::validation(
                    "store credit is only available to registered, frequent or corporate customers",
                ));
            }
            Some(method) if method.is_refund() => {}
            _ => return Err(DomainError::validation("choose a refund method")),
        }
        return Ok(());
    }

    if fin.current_payable > Decimal::ZERO {
        match req.payment_method {
            None => return Err(DomainError::validation("choose a payment method")),
            Some(method) if method.is_refund() => {
                return Err(DomainError::validation(
                    "refund methods only apply when money is owed back",
                ));
            }
            Some(_) => {}
        }
    }
    if req.payment_method == Some(PaymentMethod::Split) && req.cash_amount > fin.current_payable {
        return Err(DomainError::validation("cash amount exceeds the amount payable"));
    }
    Ok(())
}

fn claims(items: &[CartItem]) -> Vec<StockClaim> {
    items
        .iter()
        .flat_map(|item| item.quote.stock_claims.iter().cloned())
        .collect()
}

fn payments(req: &CheckoutRequest, fin: &Financials, now: NaiveDateTime) -> Vec<Payment> {
    let payment = |method, amount| Payment {
        method,
        amount,
        paid_at: now,
    };
    if fin.is_refund() {
        return req
            .payment_method
            .map(|method| payment(method, fin.refund_due()))
            .into_iter()
            .collect();
    }
    if fin.current_payable <= Decimal::ZERO {
        return Vec::new();
    }
    match req.payment_method {
        Some(PaymentMethod::Split) => {
            let mut parts = Vec::with_capacity(2);
            if req.cash_amount > Decimal::ZERO {
                parts.push(payment(PaymentMethod::Cash, req.cash_amount));
            }
            if fin.mpesa_amount > Decimal::ZERO {
                parts.push(payment(PaymentMethod::Mpesa, fin.mpesa_amount));
            }
            parts
        }
        Some(method) => vec![payment(method, fin.current_payable)],
        None => Vec::new(),
    }
}

/// Records the sale. Stock, payments, credit and store credit all change
/// together or not at all.
pub fn commit(
    data: &mut AppData,
    vat_rate: Decimal,
    req: &CheckoutRequest,
    now: NaiveDateTime,
) -> Result<CheckoutReceipt, DomainError> {
    let (fin, reference) = compute(data, vat_rate, req)?;
    if let Err(err) = validate(&data.cart, req, &fin) {
        warn!(error = %err, "checkout rejected");
        return Err(err);
    }

    let customer = data.cart.customer.clone();
    let refund_to_store_credit = fin.is_refund() && req.payment_method == Some(PaymentMethod::StoreCredit);
    if refund_to_store_credit {
        let id = customer.as_ref().map(|c| c.id.as_str()).unwrap_or_default();
        customers::find(&data.customers, id)?;
    }

    let mut catalog = data.catalog.clone();
    if let (CheckoutMode::Edit, Some(original)) = (req.mode, &reference) {
        if original.status != OrderStatus::Pending {
            inventory::release(&mut catalog, &claims(&original.items));
        }
    }
    inventory::deduct(&mut catalog, &claims(&data.cart.items))?;
    data.catalog = catalog;

    let new_payments = payments(req, &fin, now);
    let status = if fin.balance > Decimal::ZERO {
        OrderStatus::Credit
    } else {
        OrderStatus::Completed
    };
    let paid_now = fin.current_payable - fin.refund_due();

    let order = match (req.mode, reference) {
        (CheckoutMode::Edit, Some(original)) => {
            let order = data
                .orders
                .iter_mut()
                .find(|order| order.id == original.id)
                .ok_or_else(|| DomainError::not_found(format!("order '{}'", original.id)))?;
            order.updated_at = Some(now);
            order.customer = customer.clone();
            order.items = data.cart.items.clone();
            order.subtotal = fin.subtotal;
            order.tax = fin.tax;
            order.discount = fin.discount_value;
            order.total = fin.total;
            order.amount_paid += paid_now;
            order.balance = fin.balance;
            order.status = status;
            if req.payment_method.is_some() {
                order.payment_method = req.payment_method;
            }
            order.payments.extend(new_payments);
            order.clone()
        }
        (mode, reference) => {
            let order = Order {
                id: data.counters.next_order_id(),
                created_at: now,
                updated_at: None,
                customer: customer.clone(),
                items: data.cart.items.clone(),
                subtotal: fin.subtotal,
                tax: fin.tax,
                discount: fin.discount_value,
                total: fin.total,
                amount_paid: fin.current_payable,
                balance: fin.balance,
                status,
                payment_method: req.payment_method,
                payments: new_payments,
                invoice_id: None,
                parent_order_id: match mode {
                    CheckoutMode::Link => reference.map(|parent| parent.id),
                    _ => None,
                },
            };
            data.orders.insert(0, order.clone());
            order
        }
    };

    let credit = record_credit(data, &order, customer.as_ref().map(|c| c.id.as_str()), fin.balance, now);

    if refund_to_store_credit {
        if let Some(customer) = &customer {
            let record = customers::find_mut(&mut data.customers, &customer.id)?;
            record.store_credit += fin.refund_due();
            info!(customer = %record.id, amount = %fin.refund_due(), "store credit issued");
        }
    }

    data.cart.clear();
    info!(
        order = %order.id,
        mode = ?req.mode,
        total = %fin.total,
        paid = %fin.current_payable,
        balance = %fin.balance,
        "checkout completed"
    );
    Ok(CheckoutReceipt {
        order,
        credit,
        financials: fin,
    })
}

/// Opens a credit for a new balance, or brings an edited order's open credit
/// in line with its new balance.
fn record_credit(
    data: &mut AppData,
    order: &Order,
    customer_id: Option<&str>,
    balance: Decimal,
    now: NaiveDateTime,
) -> Option<Credit> {
    if let Some(existing) = data
        .credits
        .iter_mut()
        .find(|credit| credit.order_id == order.id && credit.is_open())
    {
        existing.amount_due = balance;
        if balance.is_zero() {
            existing.status = CreditStatus::Paid;
            existing.settled_at = Some(now);
        } else if balance < existing.amount {
            existing.status = CreditStatus::PartiallyPaid;
        } else {
            existing.amount = balance;
        }
        return Some(existing.clone());
    }

    let customer_id = customer_id?;
    if balance.is_zero() {
        return None;
    }
    let credit = Credit {
        id: data.counters.next_credit_id(),
        order_id: order.id.clone(),
        customer_id: customer_id.to_string(),
        amount: balance,
        amount_due: balance,
        status: CreditStatus::Pending,
        created_at: now,
        settled_at: None,
    };
    info!(credit = %credit.id, order = %order.id, amount = %balance, "credit opened");
    data.credits.push(credit.clone());
    Some(credit)
}
