use crate::catalog::Catalog;
use crate::errors::DomainError;
use crate::pricing::StockClaim;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    pub product_id: String,
    pub variant: Option<String>,
    pub in_stock: bool,
    /// `None` when the item's stock is not tracked.
    pub available_quantity: Option<u32>,
    pub message: String,
}

fn stock_slot<'a>(
    catalog: &'a mut Catalog,
    product_id: &str,
    variant: Option<&str>,
) -> Result<&'a mut Option<u32>, DomainError> {
    let product = catalog.product_mut(product_id)?;
    match variant {
        Some(key) => product
            .find_variant_mut(key)
            .map(|variant| &mut variant.stock)
            .ok_or_else(|| DomainError::not_found(format!("variant '{key}' of '{product_id}'"))),
        None => Ok(&mut product.stock),
    }
}

fn stock_of(catalog: &Catalog, product_id: &str, variant: Option<&str>) -> Result<Option<u32>, DomainError> {
    let product = catalog.product(product_id)?;
    match variant {
        Some(key) => product
            .find_variant(key)
            .map(|variant| variant.stock)
            .ok_or_else(|| DomainError::not_found(format!("variant '{key}' of '{product_id}'"))),
        None => Ok(product.stock),
    }
}

/// Receives goods. Untracked items start tracking from zero.
pub fn add_stock(
    catalog: &mut Catalog,
    product_id: &str,
    variant: Option<&str>,
    quantity: u32,
) -> Result<u32, DomainError> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity to add must be greater than zero"));
    }
    let slot = stock_slot(catalog, product_id, variant)?;
    let updated = slot.unwrap_or(0).saturating_add(quantity);
    *slot = Some(updated);
    info!(product = %product_id, variant = ?variant, added = quantity, stock = updated, "stock received");
    Ok(updated)
}

pub fn set_stock(
    catalog: &mut Catalog,
    product_id: &str,
    variant: Option<&str>,
    quantity: u32,
) -> Result<u32, DomainError> {
    let slot = stock_slot(catalog, product_id, variant)?;
    *slot = Some(quantity);
    info!(product = %product_id, variant = ?variant, stock = quantity, "stock set");
    Ok(quantity)
}

pub fn check_availability(
    catalog: &Catalog,
    product_id: &str,
    variant: Option<&str>,
    required: u32,
) -> Result<Availability, DomainError> {
    let stock = stock_of(catalog, product_id, variant)?;
    let (in_stock, message) = match stock {
        None => (true, "stock is not tracked for this item".to_string()),
        Some(available) if available >= required => {
            (true, format!("{available} available, {required} required"))
        }
        Some(available) => (
            false,
            format!("only {available} available, {required} required"),
        ),
    };
    Ok(Availability {
        product_id: product_id.to_string(),
        variant: variant.map(str::to_string),
        in_stock,
        available_quantity: stock,
        message,
    })
}

type StockKey = (String, Option<String>);

/// Sums claims per stock record.
fn grouped(claims: &[StockClaim]) -> Result<BTreeMap<StockKey, u32>, DomainError> {
    let mut totals: BTreeMap<StockKey, u32> = BTreeMap::new();
    for claim in claims {
        let total = totals
            .entry((claim.product_id.clone(), claim.variant.clone()))
            .or_insert(0);
        *total = total.checked_add(claim.quantity).ok_or_else(|| {
            DomainError::validation(format!(
                "quantity claimed for '{}' is too large",
                claim.variant.as_deref().unwrap_or(&claim.product_id)
            ))
        })?;
    }
    Ok(totals)
}

/// Takes claimed units out of stock. Nothing moves unless every claim fits.
pub fn deduct(catalog: &mut Catalog, claims: &[StockClaim]) -> Result<(), DomainError> {
    let totals = grouped(claims)?;
    for ((product_id, variant), quantity) in &totals {
        if let Some(available) = stock_of(catalog, product_id, variant.as_deref())? {
            if available < *quantity {
                let name = variant.as_deref().unwrap_or(product_id);
                warn!(product = %product_id, variant = ?variant, available, requested = quantity, "insufficient stock");
                return Err(DomainError::conflict(format!(
                    "insufficient stock for '{name}': {available} available, {quantity} requested"
                )));
            }
        }
    }
    for ((product_id, variant), quantity) in totals {
        let slot = stock_slot(catalog, &product_id, variant.as_deref())?;
        if let Some(available) = slot {
            *available -= quantity;
        }
    }
    Ok(())
}

/// Puts claimed units back, e.g. when an order is edited. Missing records are skipped.
pub fn release(catalog: &mut Catalog, claims: &[StockClaim]) {
    for claim in claims {
        if let Ok(Some(available)) = stock_slot(catalog, &claim.product_id, claim.variant.as_deref()) {
            *available = available.saturating_add(claim.quantity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn claim(product_id: &str, variant: Option<&str>, quantity: u32) -> StockClaim {
        StockClaim {
            product_id: product_id.into(),
            variant: variant.map(str::to_string),
            quantity,
        }
    }

    #[test]
    fn add_and_set_stock() {
        let mut catalog = seed::initial_data().catalog;
        let before = catalog.product("s1").unwrap().stock.unwrap();
        assert_eq!(add_stock(&mut catalog, "s1", None, 6).unwrap(), before + 6);
        assert!(add_stock(&mut catalog, "s1", None, 0).is_err());

        assert_eq!(set_stock(&mut catalog, "k2", Some("Bronze - 21ft"), 40).unwrap(), 40);
        assert!(matches!(
            set_stock(&mut catalog, "k2", Some("Pink - 1ft"), 1),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn untracked_item_starts_tracking_on_receipt() {
        let mut catalog = seed::initial_data().catalog;
        assert!(catalog.product("a2").unwrap().stock.is_none());
        assert_eq!(add_stock(&mut catalog, "a2", None, 5).unwrap(), 5);
    }

    #[test]
    fn availability_reports_shortfall() {
        let mut catalog = seed::initial_data().catalog;
        set_stock(&mut catalog, "s1", None, 3).unwrap();
        let ok = check_availability(&catalog, "s1", None, 3).unwrap();
        assert!(ok.in_stock);
        let short = check_availability(&catalog, "s1", None, 4).unwrap();
        assert!(!short.in_stock);
        assert_eq!(short.available_quantity, Some(3));

        let untracked = check_availability(&catalog, "a2", None, 1000).unwrap();
        assert!(untracked.in_stock);
        assert!(untracked.available_quantity.is_none());
    }

    #[test]
    fn deduct_is_all_or_nothing() {
        let mut catalog = seed::initial_data().catalog;
        set_stock(&mut catalog, "s1", None, 5).unwrap();
        set_stock(&mut catalog, "a1", None, 2).unwrap();

        let claims = vec![claim("s1", None, 3), claim("a1", None, 1), claim("a1", None, 2)];
        assert!(matches!(
            deduct(&mut catalog, &claims),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(catalog.product("s1").unwrap().stock, Some(5));

        deduct(&mut catalog, &claims[..2]).unwrap();
        assert_eq!(catalog.product("s1").unwrap().stock, Some(2));
        assert_eq!(catalog.product("a1").unwrap().stock, Some(1));

        release(&mut catalog, &claims[..2]);
        assert_eq!(catalog.product("s1").unwrap().stock, Some(5));
    }

    #[test]
    fn oversized_claims_are_rejected_without_panicking() {
        let mut catalog = seed::initial_data().catalog;
        set_stock(&mut catalog, "s1", None, u32::MAX).unwrap();

        let claims = vec![claim("s1", None, 3_000_000_000), claim("s1", None, 3_000_000_000)];
        assert!(matches!(
            deduct(&mut catalog, &claims),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(catalog.product("s1").unwrap().stock, Some(u32::MAX));

        release(&mut catalog, &claims);
        assert_eq!(catalog.product("s1").unwrap().stock, Some(u32::MAX));
    }
}
