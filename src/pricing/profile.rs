use super::{
    check_amount, format_quantity, matches_selections, rate, resolve_selections,
    stock_claim, variant_options, AttributeTag, LineItem, LineKind, OptionSet, Quote,
};
use crate::catalog::Product;
use crate::errors::DomainError;
use crate::variants::Variant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lengths sold off a profile bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProfileRequest {
    pub color: Option<String>,
    pub selections: BTreeMap<String, String>,
    pub full: u32,
    pub half: u32,
    pub feet: f64,
}

fn color_matches(variant: &Variant, color: Option<&str>) -> bool {
    match (color, variant.attributes.get("Color")) {
        (Some(color), Some(own)) => own == color,
        _ => true,
    }
}

/// Lengths are listed longest first.
pub(super) fn options(product: &Product, color: Option<&str>) -> Vec<OptionSet> {
    let variants = product
        .variants
        .iter()
        .filter(move |variant| color_matches(variant, color));
    variant_options(product, variants, Some("Length"))
}

struct ProfileRates {
    full: Decimal,
    half: Decimal,
    foot: Decimal,
}

/// Bar length in feet for the per-foot fallback. Only the digits of the label
/// count, so `10.5ft` reads as 105.
fn bar_length(label: &str) -> Option<u32> {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn rates(product: &Product, variant: Option<&Variant>, length: Option<u32>) -> ProfileRates {
    let Some(variant) = variant else {
        return ProfileRates {
            full: product.price_full.unwrap_or_default(),
            half: product.price_half.unwrap_or_default(),
            foot: product.price_foot.unwrap_or_default(),
        };
    };

    let full = rate(variant.price_full)
        .or(rate(variant.price))
        .or(rate(product.price_full))
        .unwrap_or_default();
    let half = rate(variant.price_half)
        .or(rate(variant.price).map(|price| price / Decimal::TWO))
        .or(rate(product.price_half))
        .unwrap_or_default();
    let foot = rate(variant.price_unit)
        .or(rate(product.price_foot))
        .or_else(|| {
            let length = length.filter(|length| *length > 0)?;
            rate(variant.price).map(|price| price / Decimal::from(length))
        })
        .unwrap_or_default();

    ProfileRates { full, half, foot }
}

pub(super) fn price(product: &Product, req: &ProfileRequest) -> Result<Quote, DomainError> {
    let feet = check_amount("feet", req.feet)?;
    let color = req.color.as_deref().filter(|color| !color.is_empty());

    let options = options(product, color);
    let selections = resolve_selections(&options, &req.selections, &product.default_attributes);
    let length_label = selections.get("Length").cloned();
    let length = length_label.as_deref().and_then(bar_length);

    let variant = product
        .variants
        .iter()
        .find(|variant| color_matches(variant, color) && matches_selections(variant, &selections));
    let rates = rates(product, variant, length);

    let mut lines = Vec::new();
    if req.full > 0 {
        let mut line = LineItem::new(LineKind::ProfileFull, "Full Length", req.full.into(), rates.full)?;
        if let Some(label) = &length_label {
            line = line.with_meta("length", label.as_str());
        }
        lines.push(line);
    }
    if req.half > 0 {
        let mut line = LineItem::new(LineKind::ProfileHalf, "Half Length", req.half.into(), rates.half)?;
        if let Some(label) = &length_label {
            line = line.with_meta("length", label.as_str());
        }
        lines.push(line);
    }
    if feet > 0.0 {
        let label = format!("Custom Feet ({}ft)", format_quantity(feet));
        lines.push(LineItem::new(LineKind::ProfileFeet, label, feet, rates.foot)?.with_meta("unit", "ft"));
    }

    let mut tags = Vec::new();
    if let Some(color) = color {
        tags.push(AttributeTag::new("Color", color));
    }
    if let Some(label) = &length_label {
        tags.push(AttributeTag::new("Length", label.as_str()));
    }
    tags.extend(
        selections
            .iter()
            .filter(|(name, _)| name.as_str() != "Length" && name.as_str() != "Color")
            .map(|(name, value)| AttributeTag::new(name.as_str(), value.as_str())),
    );

    let mut quote = Quote::from_lines(lines, tags)?;
    quote.variant_key = variant.map(|variant| product.variant_key(variant));
    quote.stock = variant.and_then(|variant| variant.stock);
    quote.stock_claims.extend(stock_claim(product, variant, req.full));
    Ok(quote)
}
