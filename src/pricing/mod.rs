//! Category calculators.
//!
//! Each calculator turns a product plus the quantities picked at the counter
//! into a [`Quote`]: the receipt lines, the display tags and the total. The
//! cart stores the request next to the quote so a line can be re-priced when
//! it is edited.

mod accessory;
mod dynamic;
mod glass;
mod profile;
mod standard;

pub use accessory::{AccessoryRequest, SalesMode, ACCESSORY_COLORS};
pub use dynamic::DynamicRequest;
pub use glass::{CutPiece, GlassRequest};
pub use profile::ProfileRequest;
pub use standard::StandardRequest;

use crate::catalog::{PricingKind, Product};
use crate::errors::DomainError;
use crate::money;
use crate::variants::Variant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    ProfileFull,
    ProfileHalf,
    ProfileFeet,
    SheetFull,
    SheetHalf,
    GlassCut,
    AccessoryRoll,
    AccessoryMeter,
    AccessoryUnit,
    Dynamic,
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub label: String,
    pub qty: f64,
    pub rate: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl LineItem {
    /// The total is `qty * rate` rounded to cents; the rate is kept as given.
    fn new(kind: LineKind, label: impl Into<String>, qty: f64, rate: Decimal) -> Result<Self, DomainError> {
        let total = money::extend(money::from_measure(qty)?, rate)?;
        Ok(Self {
            kind,
            label: label.into(),
            qty,
            rate,
            total,
            meta: BTreeMap::new(),
        })
    }

    fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeTag {
    pub label: String,
    pub value: String,
}

impl AttributeTag {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Whole units that leave stock when the line is sold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockClaim {
    pub product_id: String,
    pub variant: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Quote {
    pub total: Decimal,
    pub line_items: Vec<LineItem>,
    pub attributes: Vec<AttributeTag>,
    #[serde(default)]
    pub variant_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub stock_claims: Vec<StockClaim>,
}

impl Quote {
    fn from_lines(line_items: Vec<LineItem>, attributes: Vec<AttributeTag>) -> Result<Self, DomainError> {
        let total = money::sum(line_items.iter().map(|line| line.total))?;
        Ok(Self {
            total,
            line_items,
            attributes,
            ..Quote::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PricingRequest {
    Profile(ProfileRequest),
    Glass(GlassRequest),
    Accessory(AccessoryRequest),
    Dynamic(DynamicRequest),
    Standard(StandardRequest),
}

impl PricingRequest {
    pub fn kind(&self) -> PricingKind {
        match self {
            PricingRequest::Profile(_) => PricingKind::Profile,
            PricingRequest::Glass(_) => PricingKind::Glass,
            PricingRequest::Accessory(_) => PricingKind::Accessory,
            PricingRequest::Dynamic(_) => PricingKind::Dynamic,
            PricingRequest::Standard(_) => PricingKind::Standard,
        }
    }
}

/// Selectable values for one attribute, in display order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionSet {
    pub name: String,
    pub values: Vec<String>,
}

pub fn price_item(product: &Product, request: &PricingRequest) -> Result<Quote, DomainError> {
    let expected = product.pricing_kind();
    match (expected, request) {
        (PricingKind::Profile, PricingRequest::Profile(req)) => profile::price(product, req),
        (PricingKind::Glass, PricingRequest::Glass(req)) => glass::price(product, req),
        (PricingKind::Accessory, PricingRequest::Accessory(req)) => accessory::price(product, req),
        (PricingKind::Dynamic, PricingRequest::Dynamic(req)) => dynamic::price(product, req),
        (PricingKind::Standard, PricingRequest::Standard(req)) => standard::price(product, req),
        (expected, other) => Err(DomainError::validation(format!(
            "product '{}' is priced as {:?}, got a {:?} request",
            product.id,
            expected,
            other.kind()
        ))),
    }
}

/// The choices a calculator offers for a product.
pub fn available_options(product: &Product, color: Option<&str>) -> Vec<OptionSet> {
    match product.pricing_kind() {
        PricingKind::Profile => profile::options(product, color),
        PricingKind::Glass => glass::options(product),
        PricingKind::Accessory => accessory::options(product),
        PricingKind::Dynamic | PricingKind::Standard => product
            .attributes
            .iter()
            .map(|attr| OptionSet {
                name: attr.name.clone(),
                values: attr.values.clone(),
            })
            .collect(),
    }
}

/// Zero and missing rates both fall through to the next candidate.
fn rate(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|price| !price.is_zero())
}

/// Numeric value of labels like `21ft`, `6mm` or `10.5ft`, used for ordering.
fn numeric_value(label: &str) -> Option<f64> {
    let digits: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok()
}

/// Total order over option labels.
///
/// Every label with a number sorts before every label without one. Numbered
/// labels compare by value (reversed when `descending`), ties broken by the
/// raw text; the rest compare byte-wise. This is not a locale-aware compare:
/// words never interleave with numbers and case is not folded, so `Zinc`
/// sorts before `amber`.
fn compare_labels(a: &str, b: &str, descending: bool) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => {
            let order = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            let order = if descending { order.reverse() } else { order };
            order.then_with(|| a.cmp(b))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Collects the values variants carry for every schema key except colour and
/// category.
fn variant_options<'a>(
    product: &'a Product,
    variants: impl Iterator<Item = &'a Variant> + Clone,
    descending_key: Option<&str>,
) -> Vec<OptionSet> {
    product
        .attributes
        .iter()
        .filter(|attr| attr.name != "Color" && attr.name != "Category")
        .filter_map(|attr| {
            let mut values: Vec<String> = Vec::new();
            for variant in variants.clone() {
                if let Some(value) = variant.attributes.get(&attr.name) {
                    if !value.is_empty() && !values.contains(value) {
                        values.push(value.clone());
                    }
                }
            }
            if values.is_empty() {
                return None;
            }
            let descending = descending_key == Some(attr.name.as_str());
            values.sort_by(|a, b| compare_labels(a, b, descending));
            Some(OptionSet {
                name: attr.name.clone(),
                values,
            })
        })
        .collect()
}

/// Keeps valid requested values, else the product default, else the first option.
fn resolve_selections(
    options: &[OptionSet],
    requested: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    options
        .iter()
        .filter_map(|set| {
            let valid = |value: &&String| set.values.contains(value);
            let chosen = requested
                .get(&set.name)
                .filter(valid)
                .or_else(|| defaults.get(&set.name).filter(valid))
                .or_else(|| set.values.first())?;
            Some((set.name.clone(), chosen.clone()))
        })
        .collect()
}

fn matches_selections(variant: &Variant, selections: &BTreeMap<String, String>) -> bool {
    selections
        .iter()
        .all(|(name, value)| variant.attributes.get(name) == Some(value))
}

fn stock_claim(product: &Product, variant: Option<&Variant>, quantity: u32) -> Option<StockClaim> {
    if quantity == 0 {
        return None;
    }
    match variant {
        Some(variant) if variant.stock.is_some() => Some(StockClaim {
            product_id: product.id.clone(),
            variant: Some(product.variant_key(variant)),
            quantity,
        }),
        _ if product.stock.is_some() => Some(StockClaim {
            product_id: product.id.clone(),
            variant: None,
            quantity,
        }),
        _ => None,
    }
}

/// Checks a length, width or foot count.
fn check_amount(name: &str, value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{name} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// `2` for whole numbers, `2.5` otherwise.
pub(crate) fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;
    use crate::seed;

    #[test]
    fn labels_sort_numerically_then_alphabetically() {
        let mut values = vec!["8mm", "10mm", "Frosted", "4mm"];
        values.sort_by(|a, b| compare_labels(a, b, false));
        assert_eq!(values, vec!["4mm", "8mm", "10mm", "Frosted"]);

        let mut lengths = vec!["15ft", "21ft", "17ft"];
        lengths.sort_by(|a, b| compare_labels(a, b, true));
        assert_eq!(lengths, vec!["21ft", "17ft", "15ft"]);
    }

    #[test]
    fn label_order_is_total_and_case_sensitive() {
        let mut values = vec!["amber", "Zinc", "10.5ft", "Clear", "10.5ft", "9ft"];
        values.sort_by(|a, b| compare_labels(a, b, true));
        assert_eq!(values, vec!["10.5ft", "10.5ft", "9ft", "Clear", "Zinc", "amber"]);

        assert_eq!(compare_labels("6mm", "Frosted", true), Ordering::Less);
        assert_eq!(compare_labels("Frosted", "6mm", false), Ordering::Greater);
        assert_eq!(compare_labels("6 mm", "6mm", false), Ordering::Less);
    }

    #[test]
    fn line_total_rounds_to_cents_and_keeps_rate() {
        let line = LineItem::new(LineKind::ProfileFeet, "Feet", 2.5, d("33.333")).unwrap();
        assert_eq!(line.rate, d("33.333"));
        assert_eq!(line.total, d("83.33"));
        assert!(LineItem::new(LineKind::ProfileFeet, "Feet", f64::NAN, d("1")).is_err());

        let quote = Quote::from_lines(
            vec![
                LineItem::new(LineKind::Standard, "a", 1.0, d("0.10")).unwrap(),
                LineItem::new(LineKind::Standard, "b", 1.0, d("0.20")).unwrap(),
            ],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(quote.total, d("0.30"));
    }

    #[test]
    fn selection_falls_back_to_default_then_first() {
        let options = vec![OptionSet {
            name: "Length".into(),
            values: vec!["21ft".into(), "10ft".into()],
        }];
        let mut defaults = BTreeMap::new();
        defaults.insert("Length".to_string(), "10ft".to_string());
        let mut requested = BTreeMap::new();
        requested.insert("Length".to_string(), "99ft".to_string());

        let resolved = resolve_selections(&options, &requested, &defaults);
        assert_eq!(resolved["Length"], "10ft");

        let resolved = resolve_selections(&options, &requested, &BTreeMap::new());
        assert_eq!(resolved["Length"], "21ft");
    }

    #[test]
    fn mismatched_request_kind_is_rejected() {
        let data = seed::initial_data();
        let glass = data.catalog.product("g1").unwrap();
        let request = PricingRequest::Standard(StandardRequest { qty: Some(1) });
        assert!(matches!(
            price_item(glass, &request),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn request_kind_tag_round_trips_through_json() {
        let request: PricingRequest =
            serde_json::from_str(r#"{"kind":"profile","full":2,"feet":3.5}"#).unwrap();
        match request {
            PricingRequest::Profile(req) => {
                assert_eq!(req.full, 2);
                assert_eq!(req.feet, 3.5);
                assert_eq!(req.half, 0);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn quantity_formatting_drops_trailing_zero() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2.5");
    }
}
