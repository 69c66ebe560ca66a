use kalo_common::domain::{BloodType, Product};

const PRODUCTS_JSON: &str = include_str!("../../data/products.json");

/// Maximum number of search hits returned, matching the real backend.
const SEARCH_LIMIT: usize = 10;

/// The static product reference data the offline backend answers from.
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn embedded() -> Self {
        let products =
            serde_json::from_str(PRODUCTS_JSON).expect("embedded product catalog is valid");
        Self { products }
    }

    /// Case-insensitive substring search across every localized title.
    /// An empty query matches nothing rather than everything.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.products
            .iter()
            .filter(|p| p.title.matches(&needle))
            .take(SEARCH_LIMIT)
            .collect()
    }

    /// Products marked as not recommended for the given blood group.
    pub fn not_allowed_for(&self, blood_type: BloodType) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.not_allowed_for(blood_type))
            .collect()
    }

    /// Exact title lookup, used to price a diary entry that arrived without
    /// a calorie figure.
    pub fn by_title(&self, title: &str) -> Option<&Product> {
        let needle = title.to_lowercase();
        self.products.iter().find(|p| {
            let t = p.title.primary().to_lowercase();
            t == needle || p.title.matches(&needle)
        })
    }
}
