use super::{check_amount, stock_claim, AttributeTag, LineItem, LineKind, OptionSet, Quote};
use crate::catalog::{Product, RollOption};
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

pub const ACCESSORY_COLORS: [&str; 5] = ["Black", "Grey", "White", "Silver", "Brown"];
const DEFAULT_COLOR: &str = "Black";
const LEGACY_ROLL_LABEL: &str = "Standard Roll";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalesMode {
    #[default]
    Roll,
    Meter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AccessoryRequest {
    pub sales_mode: Option<SalesMode>,
    pub qty: Option<u32>,
    pub length: Option<f64>,
    pub color: Option<String>,
    pub thickness: Option<String>,
    pub roll: Option<String>,
}

fn is_meter(product: &Product) -> bool {
    product.unit.as_deref() == Some("meter")
}

/// Roll sizes on offer. A bare roll price is read as one standard roll.
fn roll_options(product: &Product) -> Vec<RollOption> {
    if !product.roll_options.is_empty() {
        return product.roll_options.clone();
    }
    match product.price_roll {
        Some(price) => vec![RollOption {
            label: LEGACY_ROLL_LABEL.into(),
            length: product.roll_length.unwrap_or(0.0),
            price,
        }],
        None => Vec::new(),
    }
}

pub(super) fn options(product: &Product) -> Vec<OptionSet> {
    let mut sets = Vec::new();
    if product.has_color {
        sets.push(OptionSet {
            name: "Color".into(),
            values: ACCESSORY_COLORS.iter().map(|c| c.to_string()).collect(),
        });
    }
    if !product.thicknesses.is_empty() {
        sets.push(OptionSet {
            name: "Thickness".into(),
            values: product.thicknesses.clone(),
        });
    }
    if is_meter(product) {
        let rolls = roll_options(product);
        if !rolls.is_empty() {
            sets.push(OptionSet {
                name: "Roll".into(),
                values: rolls.into_iter().map(|roll| roll.label).collect(),
            });
        }
    }
    sets
}

fn pick_color(product: &Product, requested: Option<&str>) -> Result<Option<String>, DomainError> {
    if !product.has_color {
        return match requested {
            Some(color) => Err(DomainError::validation(format!(
                "'{}' has no colour choice, got '{color}'",
                product.name
            ))),
            None => Ok(None),
        };
    }
    let color = requested.unwrap_or(DEFAULT_COLOR);
    if !ACCESSORY_COLORS.contains(&color) {
        return Err(DomainError::validation(format!(
            "'{color}' is not an accessory colour"
        )));
    }
    Ok(Some(color.to_string()))
}

fn pick_thickness(product: &Product, requested: Option<&str>) -> Result<Option<String>, DomainError> {
    match (product.thicknesses.first(), requested) {
        (None, None) => Ok(None),
        (None, Some(thickness)) => Err(DomainError::validation(format!(
            "'{}' has no thickness choice, got '{thickness}'",
            product.name
        ))),
        (Some(first), None) => Ok(Some(first.clone())),
        (Some(_), Some(thickness)) if product.thicknesses.iter().any(|t| t == thickness) => {
            Ok(Some(thickness.to_string()))
        }
        (Some(_), Some(thickness)) => Err(DomainError::validation(format!(
            "'{thickness}' is not offered for '{}'",
            product.name
        ))),
    }
}

pub(super) fn price(product: &Product, req: &AccessoryRequest) -> Result<Quote, DomainError> {
    let color = pick_color(product, req.color.as_deref())?;
    let thickness = pick_thickness(product, req.thickness.as_deref())?;
    let qty = req.qty.unwrap_or(1);
    let unit_price = product.price.unwrap_or_default();

    let mut tags = Vec::new();
    if let Some(color) = &color {
        tags.push(AttributeTag::new("Color", color.as_str()));
    }
    if let Some(thickness) = &thickness {
        tags.push(AttributeTag::new("Thickness", thickness.as_str()));
    }

    let meter = is_meter(product);
    let rolls = if meter { roll_options(product) } else { Vec::new() };
    let mode = req.sales_mode.unwrap_or_default();

    let mut claims = Vec::new();
    let line = if !rolls.is_empty() && mode == SalesMode::Roll {
        let roll = match req.roll.as_deref() {
            Some(label) => rolls
                .iter()
                .find(|roll| roll.label == label)
                .ok_or_else(|| DomainError::validation(format!("unknown roll '{label}'")))?,
            None => &rolls[0],
        };
        tags.push(AttributeTag::new("Roll Type", roll.label.as_str()));
        LineItem::new(LineKind::AccessoryRoll, roll.label.as_str(), qty.into(), roll.price)?
            .with_meta("length", roll.length)
    } else if meter {
        let length = check_amount("length", req.length.unwrap_or(1.0))?;
        LineItem::new(LineKind::AccessoryMeter, "Meter Length", length, unit_price)?.with_meta("unit", "m")
    } else {
        claims.extend(stock_claim(product, None, qty));
        let line = LineItem::new(LineKind::AccessoryUnit, "Quantity", qty.into(), unit_price)?;
        match &product.unit {
            Some(unit) => line.with_meta("unit", unit.as_str()),
            None => line,
        }
    };

    let mut quote = Quote::from_lines(vec![line], tags)?;
    quote.stock = product.stock;
    quote.stock_claims = claims;
    Ok(quote)
}
