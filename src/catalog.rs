use crate::errors::DomainError;
use crate::money;
use crate::variants::{self, Variant};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One entry of a product's attribute schema, e.g. `Length: [21ft, 17ft]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AttributeDef {
    pub name: String,
    pub values: Vec<String>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RollOption {
    pub label: String,
    pub length: f64,
    pub price: Decimal,
}

/// Per-thickness glass rates kept from before glass products carried variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ThicknessPrice {
    pub thickness: String,
    pub price_full: Decimal,
    pub price_half: Decimal,
    pub price_sq_ft: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub usage: Option<String>,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub price_full: Option<Decimal>,
    pub price_half: Option<Decimal>,
    pub price_foot: Option<Decimal>,
    pub price_full_sheet: Option<Decimal>,
    pub price_half_sheet: Option<Decimal>,
    pub price_sq_ft: Option<Decimal>,
    pub attributes: Vec<AttributeDef>,
    pub default_attributes: BTreeMap<String, String>,
    pub variants: Vec<Variant>,
    pub has_color: bool,
    pub thicknesses: Vec<String>,
    pub roll_options: Vec<RollOption>,
    pub price_roll: Option<Decimal>,
    pub roll_length: Option<f64>,
    pub thickness_prices: Vec<ThicknessPrice>,
    pub stock: Option<u32>,
    pub alarm_quantity: Option<u32>,
}

/// Which calculator prices a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingKind {
    Profile,
    Glass,
    Accessory,
    Dynamic,
    Standard,
}

impl PricingKind {
    /// Calculator bound to a category id. Ids match exactly; any other
    /// category prices by attributes or unit price.
    pub fn for_category(category: &str) -> Option<Self> {
        match category {
            "ke-profile" | "tz-profile" => Some(PricingKind::Profile),
            "glass" => Some(PricingKind::Glass),
            "accessories" => Some(PricingKind::Accessory),
            _ => None,
        }
    }
}

impl Product {
    pub fn pricing_kind(&self) -> PricingKind {
        PricingKind::for_category(&self.category).unwrap_or(if self.attributes.is_empty() {
            PricingKind::Standard
        } else {
            PricingKind::Dynamic
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn variant_key(&self, variant: &Variant) -> String {
        variants::variant_key(variant, &self.attributes)
    }

    pub fn find_variant(&self, key: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| self.variant_key(variant) == key)
    }

    pub fn find_variant_mut(&mut self, key: &str) -> Option<&mut Variant> {
        let index = self
            .variants
            .iter()
            .position(|variant| variants::variant_key(variant, &self.attributes) == key)?;
        self.variants.get_mut(index)
    }

    fn declares_color(&self, color: &str) -> bool {
        self.attribute("Color")
            .is_some_and(|attr| attr.values.iter().any(|value| value == color))
            || self
                .variants
                .iter()
                .any(|variant| variant.attributes.get("Color").map(String::as_str) == Some(color))
    }

    fn check_prices(&self) -> Result<(), DomainError> {
        let root = [
            self.price,
            self.price_full,
            self.price_half,
            self.price_foot,
            self.price_full_sheet,
            self.price_half_sheet,
            self.price_sq_ft,
            self.price_roll,
        ];
        let rolls = self.roll_options.iter().map(|roll| roll.price);
        let sheets = self
            .thickness_prices
            .iter()
            .flat_map(|entry| [entry.price_full, entry.price_half, entry.price_sq_ft]);
        for price in root.into_iter().flatten().chain(rolls).chain(sheets) {
            money::check("price", price)?;
        }
        Ok(())
    }

    fn low_stock_threshold(&self) -> u32 {
        self.alarm_quantity.unwrap_or(DEFAULT_ALARM_QUANTITY)
    }
}

pub const DEFAULT_ALARM_QUANTITY: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    pub id: String,
    pub label: String,
}

/// Admin-editable option lists used when building new products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CatalogConfig {
    pub sub_categories: BTreeMap<String, Vec<SubCategory>>,
    pub colors: Vec<String>,
    pub thicknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub config: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub usage: Option<String>,
    pub q: Option<String>,
    pub color: Option<String>,
}

/// Fields an admin may change on an existing product.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub usage: Option<String>,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub price_full: Option<Decimal>,
    pub price_half: Option<Decimal>,
    pub price_foot: Option<Decimal>,
    pub price_full_sheet: Option<Decimal>,
    pub price_half_sheet: Option<Decimal>,
    pub price_sq_ft: Option<Decimal>,
    pub alarm_quantity: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigList {
    Colors,
    Thicknesses,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LowStockEntry {
    pub product_id: String,
    pub product_name: String,
    pub variant: Option<String>,
    pub stock: u32,
    pub alarm_quantity: u32,
}

pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn is_all(value: Option<&str>) -> bool {
    matches!(value, None | Some("all") | Some(""))
}

impl Catalog {
    pub fn product(&self, id: &str) -> Result<&Product, DomainError> {
        self.products
            .iter()
            .find(|product| product.id == id)
            .ok_or_else(|| DomainError::not_found(format!("product '{id}'")))
    }

    pub fn product_mut(&mut self, id: &str) -> Result<&mut Product, DomainError> {
        self.products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or_else(|| DomainError::not_found(format!("product '{id}'")))
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn add_category(&mut self, label: &str, icon: Option<String>) -> Result<Category, DomainError> {
        let id = slugify(label);
        if id.is_empty() {
            return Err(DomainError::validation("category label must not be empty"));
        }
        if self.category(&id).is_some() {
            return Err(DomainError::conflict(format!("category '{id}' already exists")));
        }

        let category = Category {
            id: id.clone(),
            label: label.trim().to_string(),
            icon,
        };
        self.categories.push(category.clone());
        self.config.sub_categories.entry(id).or_default();
        info!(category = %category.id, "category added");
        Ok(category)
    }

    pub fn remove_category(&mut self, id: &str) -> Result<(), DomainError> {
        if self.category(id).is_none() {
            return Err(DomainError::not_found(format!("category '{id}'")));
        }
        if self.products.iter().any(|product| product.category == id) {
            return Err(DomainError::conflict(format!(
                "category '{id}' still has products"
            )));
        }
        self.categories.retain(|category| category.id != id);
        self.config.sub_categories.remove(id);
        Ok(())
    }

    pub fn add_sub_category(&mut self, category_id: &str, label: &str) -> Result<SubCategory, DomainError> {
        if self.category(category_id).is_none() {
            return Err(DomainError::not_found(format!("category '{category_id}'")));
        }
        let id = slugify(label);
        if id.is_empty() {
            return Err(DomainError::validation("sub-category label must not be empty"));
        }

        let list = self
            .config
            .sub_categories
            .entry(category_id.to_string())
            .or_default();
        if list.iter().any(|sub| sub.id == id) {
            return Err(DomainError::conflict(format!(
                "sub-category '{id}' already exists under '{category_id}'"
            )));
        }
        let sub = SubCategory {
            id,
            label: label.trim().to_string(),
        };
        list.push(sub.clone());
        Ok(sub)
    }

    pub fn remove_sub_category(&mut self, category_id: &str, sub_id: &str) -> Result<(), DomainError> {
        let list = self
            .config
            .sub_categories
            .get_mut(category_id)
            .ok_or_else(|| DomainError::not_found(format!("category '{category_id}'")))?;
        let before = list.len();
        list.retain(|sub| sub.id != sub_id);
        if list.len() == before {
            return Err(DomainError::not_found(format!("sub-category '{sub_id}'")));
        }
        Ok(())
    }

    pub fn add_config_value(&mut self, list: ConfigList, value: &str) -> Result<(), DomainError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("value must not be empty"));
        }
        let values = self.config_list_mut(list);
        if values.iter().any(|existing| existing == value) {
            return Err(DomainError::conflict(format!("'{value}' already exists")));
        }
        values.push(value.to_string());
        Ok(())
    }

    pub fn remove_config_value(&mut self, list: ConfigList, value: &str) -> Result<(), DomainError> {
        let values = self.config_list_mut(list);
        let before = values.len();
        values.retain(|existing| existing != value);
        if values.len() == before {
            return Err(DomainError::not_found(format!("'{value}'")));
        }
        Ok(())
    }

    fn config_list_mut(&mut self, list: ConfigList) -> &mut Vec<String> {
        match list {
            ConfigList::Colors => &mut self.config.colors,
            ConfigList::Thicknesses => &mut self.config.thicknesses,
        }
    }

    /// Validates a draft and stores it under `id`.
    pub fn create_product(&mut self, mut draft: Product, id: String) -> Result<Product, DomainError> {
        draft.name = draft.name.trim().to_string();
        if draft.name.is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if self.category(&draft.category).is_none() {
            return Err(DomainError::validation(format!(
                "unknown category '{}'",
                draft.category
            )));
        }
        let duplicate = self.products.iter().any(|existing| {
            existing.category == draft.category
                && existing.sku == draft.sku
                && existing.name.eq_ignore_ascii_case(&draft.name)
        });
        if duplicate {
            warn!(name = %draft.name, "duplicate product rejected");
            return Err(DomainError::conflict(format!(
                "product '{}' already exists",
                draft.name
            )));
        }

        draft.check_prices()?;
        variants::validate_schema(&draft.attributes)?;
        for variant in &draft.variants {
            variants::validate_variant(variant, &draft.attributes)?;
        }

        draft.id = id;
        info!(product = %draft.id, name = %draft.name, "product created");
        self.products.push(draft.clone());
        Ok(draft)
    }

    pub fn update_product(&mut self, id: &str, patch: ProductPatch) -> Result<Product, DomainError> {
        let product = self.product_mut(id)?;
        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("product name must not be empty"));
            }
            product.name = name.to_string();
        }
        if patch.usage.is_some() {
            product.usage = patch.usage;
        }
        if patch.sku.is_some() {
            product.sku = patch.sku;
        }
        if patch.image.is_some() {
            product.image = patch.image;
        }
        if patch.unit.is_some() {
            product.unit = patch.unit;
        }
        let prices = [
            (patch.price, &mut product.price),
            (patch.price_full, &mut product.price_full),
            (patch.price_half, &mut product.price_half),
            (patch.price_foot, &mut product.price_foot),
            (patch.price_full_sheet, &mut product.price_full_sheet),
            (patch.price_half_sheet, &mut product.price_half_sheet),
            (patch.price_sq_ft, &mut product.price_sq_ft),
        ];
        for (value, slot) in prices {
            if let Some(value) = value {
                *slot = Some(money::check("price", value)?);
            }
        }
        if patch.alarm_quantity.is_some() {
            product.alarm_quantity = patch.alarm_quantity;
        }
        Ok(product.clone())
    }

    pub fn delete_product(&mut self, id: &str) -> Result<Product, DomainError> {
        let index = self
            .products
            .iter()
            .position(|product| product.id == id)
            .ok_or_else(|| DomainError::not_found(format!("product '{id}'")))?;
        let removed = self.products.remove(index);
        info!(product = %id, variants = removed.variants.len(), "product deleted");
        Ok(removed)
    }

    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        let category = filter.category.as_deref();
        let kind = category.and_then(PricingKind::for_category);
        let query = filter.q.as_deref().map(str::to_lowercase).unwrap_or_default();
        let usage = filter.usage.as_deref();

        self.products
            .iter()
            .filter(|product| is_all(category) || Some(product.category.as_str()) == category)
            .filter(|product| query.is_empty() || product.name.to_lowercase().contains(&query))
            .filter(|product| {
                if kind.is_none() || is_all(usage) {
                    return true;
                }
                match product.usage.as_deref() {
                    Some(own) => Some(own) == usage,
                    None => usage == Some("general"),
                }
            })
            .filter(|product| match (kind, filter.color.as_deref()) {
                (Some(PricingKind::Profile), Some(color)) if !color.is_empty() => {
                    let constrained = product.attribute("Color").is_some() || !product.variants.is_empty();
                    !constrained || product.declares_color(color)
                }
                _ => true,
            })
            .collect()
    }

    /// Tracked stock at or below each product's alarm quantity.
    pub fn low_stock(&self) -> Vec<LowStockEntry> {
        let mut entries = Vec::new();
        for product in &self.products {
            let threshold = product.low_stock_threshold();
            if let Some(stock) = product.stock {
                if stock <= threshold {
                    entries.push(LowStockEntry {
                        product_id: product.id.clone(),
                        product_name: product.name.clone(),
                        variant: None,
                        stock,
                        alarm_quantity: threshold,
                    });
                }
            }
            for variant in &product.variants {
                if let Some(stock) = variant.stock {
                    if stock <= threshold {
                        entries.push(LowStockEntry {
                            product_id: product.id.clone(),
                            product_name: product.name.clone(),
                            variant: Some(product.variant_key(variant)),
                            stock,
                            alarm_quantity: threshold,
                        });
                    }
                }
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;
    use crate::seed;

    fn catalog() -> Catalog {
        seed::initial_data().catalog
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("  Shower  Doors "), "shower-doors");
        assert_eq!(slugify("One Way"), "one-way");
    }

    #[test]
    fn pricing_kind_follows_category() {
        let catalog = catalog();
        assert_eq!(catalog.product("k1").unwrap().pricing_kind(), PricingKind::Profile);
        assert_eq!(catalog.product("g1").unwrap().pricing_kind(), PricingKind::Glass);
        assert_eq!(catalog.product("a2").unwrap().pricing_kind(), PricingKind::Accessory);

        let mut custom = Product {
            category: "hardware".into(),
            ..Product::default()
        };
        assert_eq!(custom.pricing_kind(), PricingKind::Standard);
        custom.attributes.push(AttributeDef::new("Size", &["S", "L"]));
        assert_eq!(custom.pricing_kind(), PricingKind::Dynamic);
    }

    #[test]
    fn pricing_kind_matches_whole_category_ids() {
        assert_eq!(PricingKind::for_category("ke-profile"), Some(PricingKind::Profile));
        assert_eq!(PricingKind::for_category("tz-profile"), Some(PricingKind::Profile));
        assert_eq!(PricingKind::for_category("glass"), Some(PricingKind::Glass));
        assert_eq!(PricingKind::for_category("accessories"), Some(PricingKind::Accessory));

        for lookalike in ["profile-extras", "old-ke-profile", "tempered-glass", "glass-2", "accessories-misc"] {
            assert_eq!(PricingKind::for_category(lookalike), None, "{lookalike}");
        }
        let tempered = Product {
            category: "tempered-glass".into(),
            ..Product::default()
        };
        assert_eq!(tempered.pricing_kind(), PricingKind::Standard);
    }

    #[test]
    fn add_category_creates_empty_sub_category_list() {
        let mut catalog = catalog();
        let category = catalog.add_category("Shower Doors", None).unwrap();
        assert_eq!(category.id, "shower-doors");
        assert!(catalog.config.sub_categories["shower-doors"].is_empty());
        assert!(matches!(
            catalog.add_category("shower doors", None),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn category_with_products_cannot_be_removed() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.remove_category("glass"),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn config_values_are_unique() {
        let mut catalog = catalog();
        catalog.add_config_value(ConfigList::Colors, "Champagne").unwrap();
        assert!(catalog.add_config_value(ConfigList::Colors, "Champagne").is_err());
        catalog.remove_config_value(ConfigList::Colors, "Champagne").unwrap();
        assert!(matches!(
            catalog.remove_config_value(ConfigList::Colors, "Champagne"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn create_product_rejects_duplicates_and_unknown_category() {
        let mut catalog = catalog();
        let draft = Product {
            name: "Door Stopper".into(),
            category: "accessories".into(),
            price: Some(d("40")),
            unit: Some("pcs".into()),
            ..Product::default()
        };
        let created = catalog.create_product(draft.clone(), "p1".into()).unwrap();
        assert_eq!(created.id, "p1");
        assert!(matches!(
            catalog.create_product(draft.clone(), "p2".into()),
            Err(DomainError::Conflict(_))
        ));

        let orphan = Product {
            category: "nowhere".into(),
            ..draft.clone()
        };
        assert!(matches!(
            catalog.create_product(orphan, "p3".into()),
            Err(DomainError::Validation(_))
        ));

        let negative = Product {
            name: "Door Guard".into(),
            price: Some(d("-3")),
            ..draft
        };
        assert!(matches!(
            catalog.create_product(negative, "p4".into()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn update_product_applies_patch() {
        let mut catalog = catalog();
        let updated = catalog
            .update_product(
                "a1",
                ProductPatch {
                    name: Some("Steel Hinge Pair".into()),
                    price: Some(d("18.50")),
                    ..ProductPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Steel Hinge Pair");
        assert_eq!(updated.price, Some(d("18.5")));

        let negative = ProductPatch {
            price: Some(d("-1")),
            ..ProductPatch::default()
        };
        assert!(catalog.update_product("a1", negative).is_err());
    }

    #[test]
    fn filter_by_category_usage_and_search() {
        let catalog = catalog();
        let filter = ProductFilter {
            category: Some("accessories".into()),
            usage: Some("window".into()),
            ..ProductFilter::default()
        };
        let ids: Vec<_> = catalog.filter(&filter).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a3", "a5"]);

        let search = ProductFilter {
            q: Some("GASKET".into()),
            ..ProductFilter::default()
        };
        let ids: Vec<_> = catalog.filter(&search).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a2"]);
    }

    #[test]
    fn profile_colour_filter_is_strict() {
        let catalog = catalog();
        let white = ProductFilter {
            category: Some("ke-profile".into()),
            color: Some("White".into()),
            ..ProductFilter::default()
        };
        let ids: Vec<_> = catalog.filter(&white).iter().map(|p| p.id.as_str()).collect();
        assert!(ids.contains(&"k2"));
        assert!(!ids.contains(&"k1"));

        let bronze = ProductFilter {
            color: Some("Bronze".into()),
            ..white
        };
        let ids: Vec<_> = catalog.filter(&bronze).iter().map(|p| p.id.as_str()).collect();
        assert!(ids.contains(&"k2"));
    }

    #[test]
    fn low_stock_reports_variants_under_threshold() {
        let catalog = catalog();
        let low = catalog.low_stock();
        assert!(low.iter().any(|entry| entry.product_id == "k2"
            && entry.variant.as_deref() == Some("Bronze - 21ft")));
        assert!(low.iter().all(|entry| entry.stock <= entry.alarm_quantity));
    }
}
