use crate::catalog::Catalog;
use crate::customers::{Customer, CustomerType};
use crate::errors::DomainError;
use crate::money;
use crate::orders::Order;
use crate::pricing::{self, PricingRequest, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One priced line of the order being built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    pub total_price: Decimal,
    pub request: PricingRequest,
    pub quote: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub customer: Option<Customer>,
    pub tax_enabled: bool,
    pub editing_order_id: Option<String>,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            customer: None,
            tax_enabled: true,
            editing_order_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DisplayTotals {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub count: usize,
    pub is_empty: bool,
    pub tax_enabled: bool,
    pub display: DisplayTotals,
}

fn price_line(catalog: &Catalog, product_id: &str, request: PricingRequest) -> Result<CartItem, DomainError> {
    let product = catalog.product(product_id)?;
    let quote = pricing::price_item(product, &request)?;
    if quote.total <= Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "'{}' would be added with a total of {}",
            product.name,
            money::format(quote.total)
        )));
    }
    money::check("line total", quote.total)?;
    Ok(CartItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        image: product.image.clone(),
        total_price: quote.total,
        request,
        quote,
    })
}

impl Cart {
    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.items.len() {
            return Err(DomainError::not_found(format!("cart line {index}")));
        }
        Ok(())
    }

    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        request: PricingRequest,
    ) -> Result<&CartItem, DomainError> {
        let item = price_line(catalog, product_id, request)?;
        info!(product = %item.product_id, total = %item.total_price, "cart line added");
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    pub fn update_item(
        &mut self,
        index: usize,
        catalog: &Catalog,
        request: PricingRequest,
    ) -> Result<&CartItem, DomainError> {
        self.check_index(index)?;
        let product_id = self.items[index].product_id.clone();
        self.items[index] = price_line(catalog, &product_id, request)?;
        Ok(&self.items[index])
    }

    pub fn remove_item(&mut self, index: usize) -> Result<CartItem, DomainError> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    /// Empties lines and customer. The tax switch survives.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer = None;
        self.editing_order_id = None;
    }

    /// Puts a saved order back into the cart for editing.
    pub fn load_order(&mut self, order: &Order) {
        self.items = order.items.clone();
        self.customer = order.customer.clone();
        self.tax_enabled = order.tax > Decimal::ZERO;
        self.editing_order_id = Some(order.id.clone());
    }

    /// Walk-in sales and corporate customers are taxed; others are not.
    pub fn set_customer(&mut self, customer: Option<Customer>) {
        self.tax_enabled = customer
            .as_ref()
            .is_none_or(|customer| customer.customer_type == CustomerType::Corporate);
        self.customer = customer;
    }

    pub fn set_tax(&mut self, enabled: bool) {
        self.tax_enabled = enabled;
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(|item| item.total_price).sum()
    }

    /// VAT is rounded to cents once, on the subtotal.
    pub fn totals(&self, vat_rate: Decimal) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = if self.tax_enabled {
            money::round(subtotal * vat_rate)
        } else {
            Decimal::ZERO
        };
        let total = subtotal + tax;
        CartTotals {
            subtotal,
            tax,
            total,
            count: self.items.len(),
            is_empty: self.items.is_empty(),
            tax_enabled: self.tax_enabled,
            display: DisplayTotals {
                subtotal: money::format(subtotal),
                tax: money::format(tax),
                total: money::format(total),
            },
        }
    }
}
