//! Car rental catalogue model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// A rentable car. Fields beyond the known ones are kept as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Daily rate in rupees
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub seats: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub doors: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query parameters for GET /api/cars/search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSearchQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub search: Option<String>,
}

impl CarSearchQuery {
    /// Category to filter on in the store; `all` and blank mean no filter.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    /// Price bounds and free-text match. A bound excludes cars without a price.
    pub fn matches(&self, car: &Car) -> bool {
        if let Some(min) = self.min_price {
            if !car.price.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !car.price.is_some_and(|p| p <= max) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                car.name.to_lowercase().contains(&term)
                    || car.category.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn car(name: &str, category: &str, price: Option<f64>) -> Car {
        Car {
            name: name.to_string(),
            category: category.to_string(),
            price,
            seats: None,
            doors: None,
            transmission: None,
            image: None,
            description: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_car_keeps_unknown_fields() {
        let car: Car = serde_json::from_value(json!({
            "name": "Toyota Innova Crysta",
            "category": "SUV",
            "price": "3500",
            "seatingCapacity": 7,
            "features": ["AC", "GPS"]
        }))
        .unwrap();

        assert_eq!(car.price, Some(3500.0));
        assert_eq!(car.extra["seatingCapacity"], 7);
        let back = serde_json::to_value(&car).unwrap();
        assert_eq!(back["features"], json!(["AC", "GPS"]));
    }

    #[test]
    fn test_category_filter_ignores_all() {
        let q = CarSearchQuery {
            category: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(q.category_filter(), None);

        let q = CarSearchQuery {
            category: Some("SUV".into()),
            ..Default::default()
        };
        assert_eq!(q.category_filter(), Some("SUV"));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let q = CarSearchQuery {
            min_price: Some(2000.0),
            max_price: Some(3000.0),
            ..Default::default()
        };
        assert!(q.matches(&car("Dzire", "Sedan", Some(2000.0))));
        assert!(q.matches(&car("Scorpio", "SUV", Some(3000.0))));
        assert!(!q.matches(&car("Innova", "SUV", Some(3500.0))));
        assert!(!q.matches(&car("Unknown", "SUV", None)));
    }

    #[test]
    fn test_search_matches_name_or_category() {
        let q = CarSearchQuery {
            search: Some("suv".into()),
            ..Default::default()
        };
        assert!(q.matches(&car("Mahindra Scorpio", "SUV", None)));
        assert!(!q.matches(&car("Maruti Swift Dzire", "Sedan", None)));

        let q = CarSearchQuery {
            search: Some("SWIFT".into()),
            ..Default::default()
        };
        assert!(q.matches(&car("Maruti Swift Dzire", "Sedan", None)));
    }
}
