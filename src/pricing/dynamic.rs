use super::{
    matches_selections, rate, resolve_selections, stock_claim, AttributeTag, LineItem, LineKind,
    OptionSet, Quote,
};
use crate::catalog::Product;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pick from a product's attribute schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DynamicRequest {
    pub selections: BTreeMap<String, String>,
    pub qty: Option<u32>,
}

pub(super) fn price(product: &Product, req: &DynamicRequest) -> Result<Quote, DomainError> {
    let schema: Vec<OptionSet> = product
        .attributes
        .iter()
        .map(|attr| OptionSet {
            name: attr.name.clone(),
            values: attr.values.clone(),
        })
        .collect();
    let selections = resolve_selections(&schema, &req.selections, &product.default_attributes);
    let qty = req.qty.unwrap_or(1).max(1);

    let variant = product
        .variants
        .iter()
        .find(|variant| matches_selections(variant, &selections));
    let unit_price = match variant {
        Some(variant) => variant.price.or(variant.price_full).unwrap_or_default(),
        None => rate(product.price_full)
            .or(rate(product.price))
            .unwrap_or_default(),
    };

    let description = schema
        .iter()
        .filter_map(|set| selections.get(&set.name).map(String::as_str))
        .collect::<Vec<_>>()
        .join(" - ");
    let tags = schema
        .iter()
        .filter_map(|set| {
            let value = selections.get(&set.name)?;
            Some(AttributeTag::new(set.name.as_str(), value.as_str()))
        })
        .collect();

    let label = if description.is_empty() {
        product.name.clone()
    } else {
        description.clone()
    };
    let line = LineItem::new(LineKind::Dynamic, label, qty.into(), unit_price)?;

    let mut quote = Quote::from_lines(vec![line], tags)?;
    quote.variant_key = variant.map(|variant| product.variant_key(variant));
    quote.description = Some(description).filter(|text| !text.is_empty());
    quote.stock = variant.and_then(|variant| variant.stock);
    quote.stock_claims.extend(stock_claim(product, variant, qty));
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;
    use crate::seed;
    use rust_decimal::Decimal;

    fn h1() -> Product {
        seed::initial_data().catalog.product("h1").unwrap().clone()
    }

    #[test]
    fn default_pick_prices_first_combination() {
        let product = h1();
        let quote = price(&product, &DynamicRequest::default()).unwrap();
        let first = &product.variants[0];
        assert_eq!(quote.total, first.price.unwrap());
        assert_eq!(quote.line_items[0].qty, 1.0);
        assert_eq!(quote.variant_key.as_deref(), Some(product.variant_key(first).as_str()));
        assert_eq!(quote.description, quote.variant_key);
    }

    #[test]
    fn zero_quantity_counts_as_one() {
        let product = h1();
        let quote = price(
            &product,
            &DynamicRequest {
                qty: Some(0),
                ..DynamicRequest::default()
            },
        )
        .unwrap();
        assert_eq!(quote.line_items[0].qty, 1.0);
    }

    #[test]
    fn selected_variant_sets_price_and_stock() {
        let product = h1();
        let last = product.variants.last().unwrap().clone();
        let quote = price(
            &product,
            &DynamicRequest {
                selections: last.attributes.clone(),
                qty: Some(4),
            },
        )
        .unwrap();
        assert_eq!(quote.total, Decimal::from(4) * last.price.unwrap());
        assert_eq!(quote.stock, last.stock);
        assert_eq!(quote.attributes.len(), product.attributes.len());
        if last.stock.is_some() {
            assert_eq!(quote.stock_claims[0].quantity, 4);
        }
    }

    #[test]
    fn missing_variant_falls_back_to_product_price() {
        let mut product = h1();
        product.variants.clear();
        product.price_full = None;
        product.price = Some(d("42.50"));
        let quote = price(&product, &DynamicRequest::default()).unwrap();
        assert_eq!(quote.total, d("42.5"));
        assert!(quote.variant_key.is_none());
    }
}
