//! Demo catalogue and customers loaded when no saved state exists.

use crate::catalog::{AttributeDef, Catalog, CatalogConfig, Category, Product, RollOption, SubCategory, ThicknessPrice};
use crate::customers::{Customer, CustomerType};
use crate::models::{AppData, Counters};
use crate::variants::Variant;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn ksh(amount: i64) -> Decimal {
    Decimal::from(amount)
}

fn bar(pairs: &[(&str, &str)], full: i64, half: i64, foot: i64, stock: Option<u32>) -> Variant {
    Variant {
        attributes: attrs(pairs),
        price_full: Some(ksh(full)),
        price_half: Some(ksh(half)),
        price_unit: Some(ksh(foot)),
        stock,
        ..Variant::default()
    }
}

fn priced(pairs: &[(&str, &str)], price: i64, stock: u32) -> Variant {
    Variant {
        attributes: attrs(pairs),
        price: Some(ksh(price)),
        stock: Some(stock),
        ..Variant::default()
    }
}

fn image(text: &str) -> Option<String> {
    Some(format!("https://placehold.co/300x200/777777/FFFFFF?text={text}"))
}

fn products() -> Vec<Product> {
    vec![
        Product {
            id: "k1".into(),
            name: "Silver Anodized Profile (KE)".into(),
            category: "ke-profile".into(),
            usage: Some("general".into()),
            image: image("Silver+KE"),
            price_full: Some(ksh(120)),
            price_half: Some(ksh(65)),
            price_foot: Some(ksh(25)),
            attributes: vec![AttributeDef::new("Length", &["21ft", "10ft"])],
            default_attributes: attrs(&[("Length", "21ft")]),
            variants: vec![
                bar(&[("Length", "21ft")], 120, 65, 25, None),
                bar(&[("Length", "10ft")], 60, 35, 25, None),
            ],
            ..Product::default()
        },
        Product {
            id: "k2".into(),
            name: "Casement Frame (KE)".into(),
            category: "ke-profile".into(),
            usage: Some("window".into()),
            image: image("Casement+KE"),
            attributes: vec![
                AttributeDef::new("Color", &["White", "Bronze", "Silver"]),
                AttributeDef::new("Length", &["21ft", "17ft"]),
            ],
            default_attributes: attrs(&[("Color", "White"), ("Length", "21ft")]),
            variants: vec![
                bar(&[("Color", "White"), ("Length", "21ft")], 1450, 760, 75, Some(30)),
                bar(&[("Color", "White"), ("Length", "17ft")], 1200, 630, 75, Some(18)),
                bar(&[("Color", "Bronze"), ("Length", "21ft")], 1550, 800, 80, Some(4)),
                bar(&[("Color", "Bronze"), ("Length", "17ft")], 1280, 670, 80, Some(22)),
                bar(&[("Color", "Silver"), ("Length", "21ft")], 1500, 780, 78, Some(25)),
                bar(&[("Color", "Silver"), ("Length", "17ft")], 1240, 650, 78, Some(16)),
            ],
            ..Product::default()
        },
        Product {
            id: "t1".into(),
            name: "Heavy Duty Frame (TZ)".into(),
            category: "tz-profile".into(),
            usage: Some("door".into()),
            image: image("Frame+TZ"),
            price_full: Some(ksh(650)),
            price_half: Some(ksh(340)),
            price_foot: Some(ksh(35)),
            stock: Some(40),
            ..Product::default()
        },
        Product {
            id: "g1".into(),
            name: "Clear Float Glass".into(),
            category: "glass".into(),
            image: image("Clear+Glass"),
            attributes: vec![AttributeDef::new("Thickness", &["4mm", "5mm", "6mm"])],
            default_attributes: attrs(&[("Thickness", "6mm")]),
            variants: vec![
                bar(&[("Thickness", "4mm")], 2500, 1300, 80, Some(12)),
                bar(&[("Thickness", "5mm")], 3100, 1600, 95, Some(8)),
                bar(&[("Thickness", "6mm")], 3800, 2000, 120, Some(15)),
            ],
            ..Product::default()
        },
        Product {
            id: "g2".into(),
            name: "Bronze Tinted Glass".into(),
            category: "glass".into(),
            image: image("Tinted+Glass"),
            price_full_sheet: Some(ksh(3400)),
            price_half_sheet: Some(ksh(1800)),
            price_sq_ft: Some(ksh(105)),
            thickness_prices: vec![
                ThicknessPrice {
                    thickness: "5mm".into(),
                    price_full: ksh(3400),
                    price_half: ksh(1800),
                    price_sq_ft: ksh(105),
                },
                ThicknessPrice {
                    thickness: "6mm".into(),
                    price_full: ksh(4200),
                    price_half: ksh(2200),
                    price_sq_ft: ksh(130),
                },
            ],
            ..Product::default()
        },
        Product {
            id: "a1".into(),
            name: "Steel Hinge Set".into(),
            category: "accessories".into(),
            usage: Some("door".into()),
            unit: Some("pair".into()),
            price: Some(ksh(15)),
            image: image("Hinges"),
            stock: Some(30),
            ..Product::default()
        },
        Product {
            id: "a2".into(),
            name: "Rubber Gasket (EPDM)".into(),
            category: "accessories".into(),
            usage: Some("window".into()),
            unit: Some("meter".into()),
            price: Some(ksh(5)),
            thicknesses: vec!["4mm".into(), "5mm".into(), "6mm".into()],
            roll_options: vec![
                RollOption {
                    label: "Small Roll".into(),
                    length: 50.0,
                    price: ksh(200),
                },
                RollOption {
                    label: "Big Roll".into(),
                    length: 100.0,
                    price: ksh(350),
                },
            ],
            image: image("Gasket"),
            ..Product::default()
        },
        Product {
            id: "a3".into(),
            name: "Window Handle (Touch Lock)".into(),
            category: "accessories".into(),
            usage: Some("window".into()),
            unit: Some("pcs".into()),
            price: Some(ksh(85)),
            has_color: true,
            image: image("Handle"),
            stock: Some(8),
            ..Product::default()
        },
        Product {
            id: "a4".into(),
            name: "Assembly Screws (1.5\")".into(),
            category: "accessories".into(),
            usage: Some("general".into()),
            unit: Some("pcs".into()),
            price: Some(ksh(2)),
            image: image("Screws"),
            stock: Some(500),
            ..Product::default()
        },
        Product {
            id: "a5".into(),
            name: "Wool Pile (Brush)".into(),
            category: "accessories".into(),
            usage: Some("window".into()),
            unit: Some("meter".into()),
            price: Some(ksh(8)),
            price_roll: Some(ksh(700)),
            roll_length: Some(100.0),
            has_color: true,
            image: image("Wool+Pile"),
            ..Product::default()
        },
        Product {
            id: "h1".into(),
            name: "Sliding Door Lock".into(),
            category: "hardware".into(),
            unit: Some("pcs".into()),
            price: Some(ksh(450)),
            image: image("Door+Lock"),
            attributes: vec![
                AttributeDef::new("Finish", &["Chrome", "Black"]),
                AttributeDef::new("Size", &["Standard", "Large"]),
            ],
            variants: vec![
                priced(&[("Finish", "Chrome"), ("Size", "Standard")], 450, 20),
                priced(&[("Finish", "Chrome"), ("Size", "Large")], 520, 15),
                priced(&[("Finish", "Black"), ("Size", "Standard")], 480, 6),
                priced(&[("Finish", "Black"), ("Size", "Large")], 560, 9),
            ],
            ..Product::default()
        },
        Product {
            id: "s1".into(),
            name: "Clear Silicone Sealant".into(),
            category: "hardware".into(),
            unit: Some("tube".into()),
            price: Some(ksh(350)),
            image: image("Silicone"),
            stock: Some(24),
            ..Product::default()
        },
    ]
}

fn category(id: &str, label: &str, icon: &str) -> Category {
    Category {
        id: id.into(),
        label: label.into(),
        icon: Some(icon.into()),
    }
}

fn subs(labels: &[(&str, &str)]) -> Vec<SubCategory> {
    labels
        .iter()
        .map(|(id, label)| SubCategory {
            id: id.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn catalog() -> Catalog {
    let usages = [("window", "Window"), ("door", "Door"), ("general", "General")];
    let mut sub_categories = BTreeMap::new();
    for id in ["ke-profile", "tz-profile", "accessories"] {
        sub_categories.insert(id.to_string(), subs(&usages));
    }
    sub_categories.insert("glass".into(), subs(&[("clear", "Clear"), ("tinted", "Tinted")]));
    sub_categories.insert("hardware".into(), Vec::new());

    Catalog {
        products: products(),
        categories: vec![
            category("ke-profile", "Ke Profile", "🏗️"),
            category("tz-profile", "Tz Profile", "🏢"),
            category("glass", "Glass", "🪟"),
            category("accessories", "Accessories", "🔩"),
            category("hardware", "Hardware", "🧰"),
        ],
        config: CatalogConfig {
            sub_categories,
            colors: ["White", "Bronze", "Silver", "Black", "Grey"]
                .map(String::from)
                .to_vec(),
            thicknesses: ["4mm", "5mm", "6mm", "8mm", "10mm"]
                .map(String::from)
                .to_vec(),
        },
    }
}

fn customer(id: &str, name: &str, phone: &str, email: &str, customer_type: CustomerType, points: u32) -> Customer {
    Customer {
        id: id.into(),
        name: name.into(),
        phone: phone.into(),
        email: Some(email.into()),
        customer_type,
        points,
        store_credit: Decimal::ZERO,
    }
}

pub fn initial_data() -> AppData {
    let customers = vec![
        customer("c1", "Ahmed Al-Mansoori", "+971 50 123 4567", "ahmed.m@example.com", CustomerType::Frequent, 120),
        customer("c2", "Sarah Jones", "+971 55 987 6543", "sarah.j@example.com", CustomerType::Standard, 0),
        customer("c3", "Al-Futtaim Construction", "+971 4 000 0000", "contact@alfuttaim.ae", CustomerType::Corporate, 5000),
        customer("c4", "John Doe", "+971 56 111 2222", "john.doe@gmail.com", CustomerType::Standard, 12),
    ];
    AppData {
        catalog: catalog(),
        counters: Counters {
            customers: customers.len() as u64,
            ..Counters::default()
        },
        customers,
        ..AppData::default()
    }
}
