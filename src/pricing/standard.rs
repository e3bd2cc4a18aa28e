use super::{stock_claim, LineItem, LineKind, Quote};
use crate::catalog::Product;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StandardRequest {
    pub qty: Option<u32>,
}

pub(super) fn price(product: &Product, req: &StandardRequest) -> Result<Quote, DomainError> {
    let qty = req.qty.unwrap_or(1);
    let label = if product.name.is_empty() {
        "Item"
    } else {
        product.name.as_str()
    };
    let mut line = LineItem::new(
        LineKind::Standard,
        label,
        qty.into(),
        product.price.unwrap_or_default(),
    )?;
    if let Some(unit) = &product.unit {
        line = line.with_meta("unit", unit.as_str());
    }

    let mut quote = Quote::from_lines(vec![line], Vec::new())?;
    quote.stock = product.stock;
    quote.stock_claims.extend(stock_claim(product, None, qty));
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;
    use crate::seed;
    use rust_decimal::Decimal;

    #[test]
    fn quantity_times_price() {
        let data = seed::initial_data();
        let s1 = data.catalog.product("s1").unwrap();
        let quote = price(s1, &StandardRequest { qty: Some(3) }).unwrap();
        assert_eq!(quote.total, Decimal::from(3) * s1.price.unwrap());
        assert_eq!(quote.line_items[0].label, s1.name);
        assert!(quote.attributes.is_empty());
    }

    #[test]
    fn tracked_stock_is_claimed() {
        let product = Product {
            id: "x".into(),
            name: "Silicone".into(),
            price: Some(d("350")),
            stock: Some(12),
            ..Product::default()
        };
        let quote = price(&product, &StandardRequest::default()).unwrap();
        assert_eq!(quote.total, d("350"));
        assert_eq!(quote.stock_claims[0].quantity, 1);
        assert!(quote.stock_claims[0].variant.is_none());
    }
}
