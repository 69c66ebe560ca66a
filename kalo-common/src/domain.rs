use serde::{Deserialize, Serialize};

/// Blood group 1 through 4, as used by the product exclusion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BloodType(u8);

impl BloodType {
    pub fn new(group: u8) -> Option<Self> {
        (1..=4).contains(&group).then_some(Self(group))
    }

    pub fn group(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BloodType {
    type Error = InvalidBloodType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidBloodType(value))
    }
}

impl From<BloodType> for u8 {
    fn from(value: BloodType) -> Self {
        value.0
    }
}

impl std::fmt::Display for BloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBloodType(pub u8);

impl std::fmt::Display for InvalidBloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blood type must be between 1 and 4, got {}", self.0)
    }
}

impl std::error::Error for InvalidBloodType {}

/// Product titles come in two shapes in the catalog data: a plain string or
/// an object with per-language values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductTitle {
    Plain(String),
    Localized {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ua: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        en: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ru: Option<String>,
    },
}

impl ProductTitle {
    /// The display title, preferring Ukrainian, then English, then Russian.
    pub fn primary(&self) -> &str {
        match self {
            ProductTitle::Plain(value) => value,
            ProductTitle::Localized { ua, en, ru } => ua
                .as_deref()
                .or(en.as_deref())
                .or(ru.as_deref())
                .unwrap_or(""),
        }
    }

    /// Case-insensitive substring match against every available language.
    pub fn matches(&self, needle_lower: &str) -> bool {
        let contains = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(needle_lower))
        };
        match self {
            ProductTitle::Plain(value) => value.to_lowercase().contains(needle_lower),
            ProductTitle::Localized { ua, en, ru } => {
                contains(ua) || contains(en) || contains(ru)
            }
        }
    }
}

impl std::fmt::Display for ProductTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.primary())
    }
}

/// A food product from the calorie catalog. `calories` is the energy for
/// `weight` grams of the product, which is 100 across the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub categories: String,
    pub weight: u32,
    pub title: ProductTitle,
    pub calories: f64,
    /// Index 0 is unused, indexes 1-4 say whether the product is not
    /// recommended for that blood group.
    pub group_blood_not_allowed: [Option<bool>; 5],
}

impl Product {
    pub fn not_allowed_for(&self, blood_type: BloodType) -> bool {
        self.group_blood_not_allowed
            .get(usize::from(blood_type.group()))
            .copied()
            .flatten()
            .unwrap_or(false)
    }

    /// Calorie intake for a portion of `grams` grams.
    pub fn intake(&self, grams: f64) -> f64 {
        grams * self.calories / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_type_accepts_valid_groups() {
        for group in 1..=4 {
            assert_eq!(BloodType::new(group).map(|b| b.group()), Some(group));
        }
        assert_eq!(BloodType::new(0), None);
        assert_eq!(BloodType::new(5), None);
    }

    #[test]
    fn title_prefers_ukrainian() {
        let title = ProductTitle::Localized {
            ua: Some("Яблуко".into()),
            en: Some("Apple".into()),
            ru: None,
        };
        assert_eq!(title.primary(), "Яблуко");

        let title = ProductTitle::Localized {
            ua: None,
            en: Some("Apple".into()),
            ru: Some("Яблоко".into()),
        };
        assert_eq!(title.primary(), "Apple");
    }

    #[test]
    fn title_matches_any_language() {
        let title = ProductTitle::Localized {
            ua: Some("Яблуко".into()),
            en: Some("Apple".into()),
            ru: None,
        };
        assert!(title.matches("apple"));
        assert!(title.matches("яблу"));
        assert!(!title.matches("pear"));
    }

    #[test]
    fn product_title_deserializes_both_shapes() {
        let plain: ProductTitle = serde_json::from_str("\"Bread\"").unwrap();
        assert_eq!(plain.primary(), "Bread");

        let localized: ProductTitle =
            serde_json::from_str(r#"{"ua":"Хліб","en":"Bread"}"#).unwrap();
        assert_eq!(localized.primary(), "Хліб");
    }

    #[test]
    fn blood_exclusion_reads_the_right_slot() {
        let product = Product {
            id: None,
            categories: "cereals".into(),
            weight: 100,
            title: ProductTitle::Plain("Oatmeal".into()),
            calories: 368.0,
            group_blood_not_allowed: [None, Some(false), Some(true), Some(false), Some(false)],
        };
        let second = BloodType::new(2).unwrap();
        let third = BloodType::new(3).unwrap();
        assert!(product.not_allowed_for(second));
        assert!(!product.not_allowed_for(third));
    }

    #[test]
    fn intake_scales_by_portion() {
        let product = Product {
            id: None,
            categories: "fruits".into(),
            weight: 100,
            title: ProductTitle::Plain("Apple".into()),
            calories: 52.0,
            group_blood_not_allowed: [None, Some(false), Some(false), Some(false), Some(false)],
        };
        assert_eq!(product.intake(150.0), 78.0);
    }
}
