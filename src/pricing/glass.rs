use super::{
    check_amount, compare_labels, format_quantity, matches_selections, rate, resolve_selections,
    stock_claim, variant_options, AttributeTag, LineItem, LineKind, OptionSet, Quote,
};
use crate::catalog::Product;
use crate::errors::DomainError;
use crate::money;
use crate::units::{area_square_feet, MeasureUnit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CutPiece {
    pub length: f64,
    pub width: f64,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub unit: MeasureUnit,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GlassRequest {
    pub selections: BTreeMap<String, String>,
    pub full_sheets: u32,
    pub half_sheets: u32,
    pub cuts: Vec<CutPiece>,
}

pub(super) fn options(product: &Product) -> Vec<OptionSet> {
    if !product.variants.is_empty() {
        return variant_options(product, product.variants.iter(), None);
    }
    if product.thickness_prices.is_empty() {
        return Vec::new();
    }

    let mut values: Vec<String> = Vec::new();
    for entry in &product.thickness_prices {
        if !values.contains(&entry.thickness) {
            values.push(entry.thickness.clone());
        }
    }
    values.sort_by(|a, b| compare_labels(a, b, false));
    vec![OptionSet {
        name: "Thickness".into(),
        values,
    }]
}

struct SheetRates {
    full: Decimal,
    half: Decimal,
    sq_ft: Decimal,
}

impl GlassRequest {
    fn validate(&self) -> Result<(), DomainError> {
        for cut in &self.cuts {
            check_amount("cut length", cut.length)?;
            check_amount("cut width", cut.width)?;
            if cut.length == 0.0 || cut.width == 0.0 || cut.quantity == 0 {
                return Err(DomainError::validation(
                    "cut pieces need a length, a width and a quantity above zero",
                ));
            }
        }
        Ok(())
    }
}

pub(super) fn price(product: &Product, req: &GlassRequest) -> Result<Quote, DomainError> {
    req.validate()?;

    let options = options(product);
    let selections = resolve_selections(&options, &req.selections, &product.default_attributes);

    let variant = if product.variants.is_empty() {
        None
    } else {
        product
            .variants
            .iter()
            .find(|variant| matches_selections(variant, &selections))
    };
    let legacy = match (variant, selections.get("Thickness")) {
        (None, Some(thickness)) => product
            .thickness_prices
            .iter()
            .find(|entry| &entry.thickness == thickness),
        _ => None,
    };

    let rates = match (variant, legacy) {
        (Some(variant), _) => SheetRates {
            full: rate(variant.price_full).unwrap_or_default(),
            half: rate(variant.price_half).unwrap_or_default(),
            sq_ft: rate(variant.price_unit).unwrap_or_default(),
        },
        (None, Some(entry)) => SheetRates {
            full: entry.price_full,
            half: entry.price_half,
            sq_ft: entry.price_sq_ft,
        },
        (None, None) => SheetRates {
            full: product.price_full_sheet.unwrap_or_default(),
            half: product.price_half_sheet.unwrap_or_default(),
            sq_ft: product.price_sq_ft.unwrap_or_default(),
        },
    };

    let mut lines = Vec::new();
    if req.full_sheets > 0 {
        lines.push(LineItem::new(
            LineKind::SheetFull,
            "Full Sheet",
            req.full_sheets.into(),
            rates.full,
        )?);
    }
    if req.half_sheets > 0 {
        lines.push(LineItem::new(
            LineKind::SheetHalf,
            "Half Sheet",
            req.half_sheets.into(),
            rates.half,
        )?);
    }
    for cut in &req.cuts {
        let area = area_square_feet(cut.length, cut.width, cut.unit);
        let label = format!(
            "Cut: {}x{}{}",
            format_quantity(cut.length),
            format_quantity(cut.width),
            cut.unit
        );
        let piece_rate = money::mul(money::from_measure(area)?, rates.sq_ft)?;
        let line = LineItem::new(LineKind::GlassCut, label, cut.quantity.into(), piece_rate)?
            .with_meta("l", cut.length)
            .with_meta("w", cut.width)
            .with_meta("u", cut.unit.as_str())
            .with_meta("area", area)
            .with_meta("rate_sq_ft", rates.sq_ft.to_string());
        lines.push(line);
    }

    let mut tags = Vec::new();
    if let Some(thickness) = selections.get("Thickness") {
        tags.push(AttributeTag::new("Thickness", thickness.as_str()));
    }
    tags.extend(
        selections
            .iter()
            .filter(|(name, _)| name.as_str() != "Thickness")
            .map(|(name, value)| AttributeTag::new(name.as_str(), value.as_str())),
    );

    let mut quote = Quote::from_lines(lines, tags)?;
    quote.variant_key = variant.map(|variant| product.variant_key(variant));
    quote.stock = variant.and_then(|variant| variant.stock);
    quote.stock_claims.extend(stock_claim(product, variant, req.full_sheets));
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, ThicknessPrice};
    use crate::money::d;
    use crate::seed;
    use crate::variants::Variant;

    fn thickness(value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("Thickness".to_string(), value.to_string())])
    }

    fn variant_glass() -> Product {
        Product {
            id: "gx".into(),
            category: "glass".into(),
            attributes: vec![AttributeDef::new("Thickness", &["8mm", "4mm", "6mm"])],
            variants: vec![
                Variant {
                    attributes: thickness("8mm"),
                    price_full: Some(d("5200")),
                    price_half: Some(d("2700")),
                    price_unit: Some(d("160")),
                    stock: Some(5),
                    ..Variant::default()
                },
                Variant {
                    attributes: thickness("4mm"),
                    price_full: Some(d("2500")),
                    price_half: Some(d("1300")),
                    price_unit: Some(d("80")),
                    ..Variant::default()
                },
                Variant {
                    attributes: thickness("6mm"),
                    price_full: Some(d("3800")),
                    price_half: Some(d("2000")),
                    price_unit: Some(d("120")),
                    ..Variant::default()
                },
            ],
            ..Product::default()
        }
    }

    #[test]
    fn thickness_options_sort_ascending() {
        let options = options(&variant_glass());
        assert_eq!(options[0].values, vec!["4mm", "6mm", "8mm"]);
    }

    #[test]
    fn sheets_and_cuts_use_selected_variant() {
        let product = variant_glass();
        let quote = price(
            &product,
            &GlassRequest {
                selections: thickness("8mm"),
                full_sheets: 1,
                half_sheets: 1,
                cuts: vec![CutPiece {
                    length: 24.0,
                    width: 24.0,
                    quantity: 2,
                    unit: MeasureUnit::Inch,
                }],
            },
        )
        .unwrap();

        assert_eq!(quote.line_items.len(), 3);
        let cut = &quote.line_items[2];
        assert_eq!(cut.label, "Cut: 24x24inch");
        assert_eq!(cut.rate, d("640"));
        assert_eq!(cut.total, d("1280"));
        assert_eq!(cut.meta["rate_sq_ft"], "160");
        assert_eq!(quote.total, d("9180"));
        assert_eq!(quote.attributes, vec![AttributeTag::new("Thickness", "8mm")]);
        assert_eq!(quote.stock, Some(5));
        assert_eq!(quote.stock_claims[0].quantity, 1);
    }

    #[test]
    fn default_selection_is_smallest_thickness() {
        let quote = price(
            &variant_glass(),
            &GlassRequest {
                full_sheets: 1,
                ..GlassRequest::default()
            },
        )
        .unwrap();
        assert_eq!(quote.total, d("2500"));
        assert_eq!(quote.variant_key.as_deref(), Some("4mm"));
    }

    #[test]
    fn legacy_thickness_prices_are_honoured() {
        let product = Product {
            id: "gl".into(),
            category: "glass".into(),
            thickness_prices: vec![
                ThicknessPrice {
                    thickness: "6mm".into(),
                    price_full: d("3600"),
                    price_half: d("1900"),
                    price_sq_ft: d("110"),
                },
                ThicknessPrice {
                    thickness: "4mm".into(),
                    price_full: d("2400"),
                    price_half: d("1250"),
                    price_sq_ft: d("75"),
                },
            ],
            ..Product::default()
        };
        let quote = price(
            &product,
            &GlassRequest {
                selections: thickness("6mm"),
                cuts: vec![CutPiece {
                    length: 2.0,
                    width: 3.0,
                    quantity: 1,
                    unit: MeasureUnit::Ft,
                }],
                ..GlassRequest::default()
            },
        )
        .unwrap();
        assert_eq!(quote.total, d("660"));
    }

    #[test]
    fn seeded_glass_prices_a_full_sheet() {
        let data = seed::initial_data();
        let g1 = data.catalog.product("g1").unwrap();
        let quote = price(
            g1,
            &GlassRequest {
                full_sheets: 1,
                ..GlassRequest::default()
            },
        )
        .unwrap();
        assert!(quote.total > Decimal::ZERO);
    }

    #[test]
    fn zero_sized_cut_is_rejected() {
        let request = GlassRequest {
            cuts: vec![CutPiece {
                length: 0.0,
                width: 10.0,
                quantity: 1,
                unit: MeasureUnit::Mm,
            }],
            ..GlassRequest::default()
        };
        assert!(price(&variant_glass(), &request).is_err());
    }
}
