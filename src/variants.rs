use crate::catalog::{AttributeDef, Product};
use crate::errors::DomainError;
use crate::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A concrete attribute combination of a product with its own rates and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Variant {
    pub name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub price: Option<Decimal>,
    pub price_full: Option<Decimal>,
    pub price_half: Option<Decimal>,
    pub price_unit: Option<Decimal>,
    pub stock: Option<u32>,
}

/// Rates given to combinations that have no variant yet.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VariantTemplate {
    pub price: Option<Decimal>,
    pub price_full: Option<Decimal>,
    pub price_half: Option<Decimal>,
    pub price_unit: Option<Decimal>,
}

/// Name of the variant if it has one, else its values in schema order.
pub fn variant_key(variant: &Variant, schema: &[AttributeDef]) -> String {
    if let Some(name) = variant.name.as_deref().filter(|name| !name.is_empty()) {
        return name.to_string();
    }

    let mut parts: Vec<&str> = schema
        .iter()
        .filter_map(|attr| variant.attributes.get(&attr.name).map(String::as_str))
        .collect();
    parts.extend(
        variant
            .attributes
            .iter()
            .filter(|(name, _)| !schema.iter().any(|attr| &attr.name == *name))
            .map(|(_, value)| value.as_str()),
    );
    parts.join(" - ")
}

pub fn validate_schema(schema: &[AttributeDef]) -> Result<(), DomainError> {
    for (index, attr) in schema.iter().enumerate() {
        if attr.name.trim().is_empty() {
            return Err(DomainError::validation("attribute names must not be empty"));
        }
        if schema[..index].iter().any(|other| other.name == attr.name) {
            return Err(DomainError::validation(format!(
                "attribute '{}' is declared twice",
                attr.name
            )));
        }
        if attr.values.is_empty() || attr.values.iter().any(|value| value.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "attribute '{}' needs at least one non-empty value",
                attr.name
            )));
        }
    }
    Ok(())
}

pub fn validate_variant(variant: &Variant, schema: &[AttributeDef]) -> Result<(), DomainError> {
    let prices = [
        variant.price,
        variant.price_full,
        variant.price_half,
        variant.price_unit,
    ];
    for price in prices.into_iter().flatten() {
        money::check("variant price", price)?;
    }
    if schema.is_empty() {
        return Ok(());
    }

    for (name, value) in &variant.attributes {
        let attr = schema
            .iter()
            .find(|attr| &attr.name == name)
            .ok_or_else(|| DomainError::validation(format!("unknown attribute '{name}'")))?;
        if !attr.values.contains(value) {
            return Err(DomainError::validation(format!(
                "'{value}' is not a valid {name}"
            )));
        }
    }
    if let Some(missing) = schema
        .iter()
        .find(|attr| !variant.attributes.contains_key(&attr.name))
    {
        return Err(DomainError::validation(format!(
            "variant is missing attribute '{}'",
            missing.name
        )));
    }
    Ok(())
}

fn dedup_values(schema: &[AttributeDef]) -> Vec<AttributeDef> {
    schema
        .iter()
        .map(|attr| {
            let mut values: Vec<String> = Vec::with_capacity(attr.values.len());
            for value in &attr.values {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
            AttributeDef {
                name: attr.name.clone(),
                values,
            }
        })
        .collect()
}

/// Builds one variant per combination of schema values.
///
/// The first attribute varies slowest. Combinations that already exist keep
/// their variant untouched; new ones take the template rates and zero stock.
pub fn generate_matrix(
    schema: &[AttributeDef],
    template: &VariantTemplate,
    existing: &[Variant],
) -> Result<Vec<Variant>, DomainError> {
    let schema = dedup_values(schema);
    validate_schema(&schema)?;
    let rates = [
        template.price,
        template.price_full,
        template.price_half,
        template.price_unit,
    ];
    for price in rates.into_iter().flatten() {
        money::check("template price", price)?;
    }
    if schema.is_empty() {
        return Ok(Vec::new());
    }

    let mut combos: Vec<BTreeMap<String, String>> = vec![BTreeMap::new()];
    for attr in &schema {
        let mut next = Vec::with_capacity(combos.len() * attr.values.len());
        for combo in &combos {
            for value in &attr.values {
                let mut extended = combo.clone();
                extended.insert(attr.name.clone(), value.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    Ok(combos
        .into_iter()
        .map(|attributes| {
            existing
                .iter()
                .find(|variant| variant.attributes == attributes)
                .cloned()
                .unwrap_or_else(|| Variant {
                    name: None,
                    attributes,
                    price: template.price,
                    price_full: template.price_full,
                    price_half: template.price_half,
                    price_unit: template.price_unit,
                    stock: Some(0),
                })
        })
        .collect())
}

/// Replaces a product's schema and rebuilds its variants from it.
pub fn regenerate<'a>(
    product: &'a mut Product,
    schema: Vec<AttributeDef>,
    template: &VariantTemplate,
) -> Result<&'a [Variant], DomainError> {
    let variants = generate_matrix(&schema, template, &product.variants)?;
    product.attributes = dedup_values(&schema);
    let attributes = &product.attributes;
    product.default_attributes.retain(|name, value| {
        attributes
            .iter()
            .any(|attr| &attr.name == name && attr.values.contains(value))
    });
    product.variants = variants;
    info!(product = %product.id, variants = product.variants.len(), "variant matrix generated");
    Ok(&product.variants)
}

pub fn add_variant(product: &mut Product, variant: Variant) -> Result<Variant, DomainError> {
    validate_variant(&variant, &product.attributes)?;
    if variant.attributes.is_empty() && variant.name.is_none() {
        return Err(DomainError::validation("variant needs a name or attributes"));
    }
    let key = product.variant_key(&variant);
    if product.find_variant(&key).is_some() {
        return Err(DomainError::conflict(format!("variant '{key}' already exists")));
    }
    product.variants.push(variant.clone());
    info!(product = %product.id, variant = %key, "variant added");
    Ok(variant)
}

/// Sets the sell price of a variant; `price_full` is kept in step with it.
pub fn update_variant_price(product: &mut Product, key: &str, price: Decimal) -> Result<Variant, DomainError> {
    money::check("price", price)?;
    let variant = product
        .find_variant_mut(key)
        .ok_or_else(|| DomainError::not_found(format!("variant '{key}'")))?;
    variant.price = Some(price);
    variant.price_full = Some(price);
    Ok(variant.clone())
}

pub fn delete_variant(product: &mut Product, key: &str) -> Result<Variant, DomainError> {
    let index = product
        .variants
        .iter()
        .position(|variant| variant_key(variant, &product.attributes) == key)
        .ok_or_else(|| DomainError::not_found(format!("variant '{key}'")))?;
    Ok(product.variants.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;

    fn schema() -> Vec<AttributeDef> {
        vec![
            AttributeDef::new("Color", &["White", "Bronze"]),
            AttributeDef::new("Length", &["21ft", "17ft", "15ft"]),
        ]
    }

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn matrix_is_full_cartesian_product_in_schema_order() {
        let template = VariantTemplate {
            price: Some(d("100")),
            ..VariantTemplate::default()
        };
        let variants = generate_matrix(&schema(), &template, &[]).unwrap();
        assert_eq!(variants.len(), 6);

        let keys: Vec<_> = variants.iter().map(|v| variant_key(v, &schema())).collect();
        assert_eq!(
            keys,
            vec![
                "White - 21ft",
                "White - 17ft",
                "White - 15ft",
                "Bronze - 21ft",
                "Bronze - 17ft",
                "Bronze - 15ft"
            ]
        );
        assert!(variants.iter().all(|v| v.price == Some(d("100")) && v.stock == Some(0)));
    }

    #[test]
    fn matrix_keeps_existing_variants() {
        let existing = vec![Variant {
            attributes: attrs(&[("Color", "Bronze"), ("Length", "17ft")]),
            price: Some(d("90")),
            stock: Some(4),
            ..Variant::default()
        }];
        let variants = generate_matrix(&schema(), &VariantTemplate::default(), &existing).unwrap();
        let kept = variants
            .iter()
            .find(|v| v.attributes == existing[0].attributes)
            .unwrap();
        assert_eq!(kept.price, Some(d("90")));
        assert_eq!(kept.stock, Some(4));
    }

    #[test]
    fn matrix_collapses_duplicate_values_and_rejects_empty_lists() {
        let doubled = vec![AttributeDef::new("Thickness", &["6mm", "6mm", "8mm"])];
        let variants = generate_matrix(&doubled, &VariantTemplate::default(), &[]).unwrap();
        assert_eq!(variants.len(), 2);

        let empty = vec![AttributeDef::new("Thickness", &[])];
        assert!(generate_matrix(&empty, &VariantTemplate::default(), &[]).is_err());
        assert!(generate_matrix(&[], &VariantTemplate::default(), &[]).unwrap().is_empty());

        let negative = VariantTemplate {
            price_half: Some(d("-1")),
            ..VariantTemplate::default()
        };
        assert!(generate_matrix(&schema(), &negative, &[]).is_err());
    }

    #[test]
    fn variant_key_prefers_name() {
        let named = Variant {
            name: Some("Promo".into()),
            attributes: attrs(&[("Color", "White")]),
            ..Variant::default()
        };
        assert_eq!(variant_key(&named, &schema()), "Promo");
    }

    #[test]
    fn add_variant_validates_against_schema() {
        let mut product = Product {
            id: "x".into(),
            attributes: schema(),
            ..Product::default()
        };
        let good = Variant {
            attributes: attrs(&[("Color", "White"), ("Length", "21ft")]),
            price: Some(d("120")),
            ..Variant::default()
        };
        add_variant(&mut product, good.clone()).unwrap();
        assert!(matches!(
            add_variant(&mut product, good),
            Err(DomainError::Conflict(_))
        ));

        let partial = Variant {
            attributes: attrs(&[("Color", "White")]),
            ..Variant::default()
        };
        assert!(matches!(
            add_variant(&mut product, partial),
            Err(DomainError::Validation(_))
        ));

        let unknown = Variant {
            attributes: attrs(&[("Color", "Pink"), ("Length", "21ft")]),
            ..Variant::default()
        };
        assert!(add_variant(&mut product, unknown).is_err());
    }

    #[test]
    fn price_update_syncs_full_price_and_delete_removes() {
        let mut product = Product {
            id: "x".into(),
            attributes: schema(),
            ..Product::default()
        };
        regenerate(&mut product, schema(), &VariantTemplate::default()).unwrap();

        let updated = update_variant_price(&mut product, "White - 21ft", d("130.25")).unwrap();
        assert_eq!(updated.price, Some(d("130.25")));
        assert_eq!(updated.price_full, Some(d("130.25")));
        assert!(update_variant_price(&mut product, "White - 21ft", d("-5")).is_err());

        delete_variant(&mut product, "White - 21ft").unwrap();
        assert_eq!(product.variants.len(), 5);
        assert!(matches!(
            delete_variant(&mut product, "White - 21ft"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn regenerate_drops_stale_defaults() {
        let mut product = Product {
            id: "x".into(),
            default_attributes: attrs(&[("Length", "10ft"), ("Color", "White")]),
            ..Product::default()
        };
        let generated = regenerate(&mut product, schema(), &VariantTemplate::default()).unwrap();
        assert_eq!(generated.len(), 6);
        assert_eq!(product.default_attributes, attrs(&[("Color", "White")]));
    }
}
