use crate::errors::DomainError;
use crate::models::AppData;
use crate::money;
use crate::orders::{OrderStatus, Payment, PaymentMethod};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreditStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

/// Money a customer still owes on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credit {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub amount: Decimal,
    pub amount_due: Decimal,
    pub status: CreditStatus,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub settled_at: Option<NaiveDateTime>,
}

impl Credit {
    pub fn is_open(&self) -> bool {
        self.status != CreditStatus::Paid
    }
}

pub fn find<'a>(credits: &'a [Credit], id: &str) -> Result<&'a Credit, DomainError> {
    credits
        .iter()
        .find(|credit| credit.id == id)
        .ok_or_else(|| DomainError::not_found(format!("credit '{id}'")))
}

pub fn for_customer<'a>(credits: &'a [Credit], customer_id: &str) -> Vec<&'a Credit> {
    credits
        .iter()
        .filter(|credit| credit.customer_id == customer_id)
        .collect()
}

pub fn outstanding(credits: &[Credit]) -> Decimal {
    credits
        .iter()
        .filter(|credit| credit.is_open())
        .map(|credit| credit.amount_due)
        .sum()
}

/// Records a repayment against a credit and the order it belongs to.
pub fn settle(
    data: &mut AppData,
    credit_id: &str,
    amount: Decimal,
    method: PaymentMethod,
    now: NaiveDateTime,
) -> Result<Credit, DomainError> {
    if money::check("payment amount", amount)?.is_zero() {
        return Err(DomainError::validation("payment amount must be greater than zero"));
    }
    if !matches!(method, PaymentMethod::Cash | PaymentMethod::Mpesa) {
        return Err(DomainError::validation("credits are settled in cash or M-Pesa"));
    }

    let index = data
        .credits
        .iter()
        .position(|credit| credit.id == credit_id)
        .ok_or_else(|| DomainError::not_found(format!("credit '{credit_id}'")))?;
    let credit = &data.credits[index];
    if !credit.is_open() {
        return Err(DomainError::conflict(format!("credit '{credit_id}' is already paid")));
    }
    if amount > credit.amount_due {
        return Err(DomainError::validation(format!(
            "payment of {} exceeds the amount due of {}",
            money::format(amount),
            money::format(credit.amount_due)
        )));
    }
    let order = data
        .orders
        .iter_mut()
        .find(|order| order.id == credit.order_id)
        .ok_or_else(|| DomainError::not_found(format!("order '{}'", credit.order_id)))?;

    let credit = &mut data.credits[index];
    if amount == credit.amount_due {
        credit.amount_due = Decimal::ZERO;
        credit.status = CreditStatus::Paid;
        credit.settled_at = Some(now);
        order.status = OrderStatus::Completed;
    } else {
        credit.amount_due -= amount;
        credit.status = CreditStatus::PartiallyPaid;
    }
    order.amount_paid += amount;
    order.balance = credit.amount_due;
    order.payments.push(Payment {
        method,
        amount,
        paid_at: now,
    });

    info!(
        credit = %credit.id,
        order = %credit.order_id,
        amount = %amount,
        remaining = %credit.amount_due,
        "credit payment recorded"
    );
    Ok(credit.clone())
}
