use crate::errors::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerType {
    WalkIn,
    #[default]
    Standard,
    Registered,
    Frequent,
    Corporate,
}

impl CustomerType {
    /// Customers who may leave a balance on credit or hold store credit.
    pub fn credit_eligible(self) -> bool {
        matches!(
            self,
            CustomerType::Registered | CustomerType::Corporate | CustomerType::Frequent
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub points: u32,
    pub store_credit: Decimal,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<CustomerType>,
}

fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

pub fn find<'a>(customers: &'a [Customer], id: &str) -> Result<&'a Customer, DomainError> {
    customers
        .iter()
        .find(|customer| customer.id == id)
        .ok_or_else(|| DomainError::not_found(format!("customer '{id}'")))
}

pub fn find_mut<'a>(customers: &'a mut [Customer], id: &str) -> Result<&'a mut Customer, DomainError> {
    customers
        .iter_mut()
        .find(|customer| customer.id == id)
        .ok_or_else(|| DomainError::not_found(format!("customer '{id}'")))
}

pub fn create(customers: &mut Vec<Customer>, draft: NewCustomer, id: String) -> Result<Customer, DomainError> {
    let name = draft.name.trim();
    let phone = draft.phone.trim();
    if name.is_empty() || phone.is_empty() {
        return Err(DomainError::validation("customer name and phone are required"));
    }
    let key = normalize_phone(phone);
    if customers
        .iter()
        .any(|existing| normalize_phone(&existing.phone) == key)
    {
        warn!(phone = %phone, "customer phone already registered");
        return Err(DomainError::conflict(format!(
            "a customer with phone '{phone}' already exists"
        )));
    }

    let customer = Customer {
        id,
        name: name.to_string(),
        phone: phone.to_string(),
        email: draft.email.filter(|email| !email.trim().is_empty()),
        customer_type: draft.customer_type.unwrap_or_default(),
        points: 0,
        store_credit: Decimal::ZERO,
    };
    info!(customer = %customer.id, "customer created");
    customers.push(customer.clone());
    Ok(customer)
}

/// Case-insensitive match on name, plain substring match on phone.
pub fn search<'a>(customers: &'a [Customer], query: &str) -> Vec<&'a Customer> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return customers.iter().collect();
    }
    customers
        .iter()
        .filter(|customer| {
            customer.name.to_lowercase().contains(&query) || customer.phone.contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn eligibility_by_type() {
        assert!(CustomerType::Corporate.credit_eligible());
        assert!(CustomerType::Frequent.credit_eligible());
        assert!(!CustomerType::Standard.credit_eligible());
        assert!(!CustomerType::WalkIn.credit_eligible());
    }

    #[test]
    fn phone_must_be_unique_ignoring_spacing() {
        let mut customers = seed::initial_data().customers;
        let existing = customers[0].phone.replace(' ', "");
        let draft = NewCustomer {
            name: "Copy".into(),
            phone: existing,
            ..NewCustomer::default()
        };
        assert!(matches!(
            create(&mut customers, draft, "c99".into()),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn create_defaults_to_standard() {
        let mut customers = Vec::new();
        let created = create(
            &mut customers,
            NewCustomer {
                name: " Mary W ".into(),
                phone: "0712 000 111".into(),
                email: Some(" ".into()),
                customer_type: None,
            },
            "c1".into(),
        )
        .unwrap();
        assert_eq!(created.name, "Mary W");
        assert_eq!(created.customer_type, CustomerType::Standard);
        assert!(created.email.is_none());
        assert!(create(&mut customers, NewCustomer::default(), "c2".into()).is_err());
    }

    #[test]
    fn search_by_name_or_phone() {
        let customers = seed::initial_data().customers;
        let hits = search(&customers, "futtaim");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c3");
        assert_eq!(search(&customers, "987").len(), 1);
        assert_eq!(search(&customers, "").len(), customers.len());
    }
}
