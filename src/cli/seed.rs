//! Sample catalogue data.

use serde_json::{json, Value};

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Car, Collection, Tour};

/// How many documents a seed run inserted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub cars: usize,
    pub tours: usize,
}

fn sample_cars() -> Vec<Value> {
    vec![
        json!({
            "name": "Toyota Innova Crysta",
            "category": "SUV",
            "price": 3500,
            "seats": 7,
            "fuelType": "Diesel",
            "transmission": "Manual",
            "features": ["AC", "Music System", "GPS"],
            "description": "Comfortable SUV perfect for family trips",
            "available": true,
            "image": "https://images.unsplash.com/photo-1519641471654-76ce0107ad1b?w=800"
        }),
        json!({
            "name": "Maruti Swift Dzire",
            "category": "Sedan",
            "price": 2000,
            "seats": 4,
            "fuelType": "Petrol",
            "transmission": "Automatic",
            "features": ["AC", "Music System"],
            "description": "Compact and fuel-efficient sedan",
            "available": true,
            "image": "https://images.unsplash.com/photo-1555215695-3004980ad54e?w=800"
        }),
        json!({
            "name": "Mahindra Scorpio",
            "category": "SUV",
            "price": 3000,
            "seats": 7,
            "fuelType": "Diesel",
            "transmission": "Manual",
            "features": ["AC", "4WD", "Music System"],
            "description": "Rugged SUV for mountain drives",
            "available": true,
            "image": "https://images.unsplash.com/photo-1606664515524-ed2f786a0bd6?w=800"
        }),
    ]
}

fn sample_tours() -> Vec<Value> {
    vec![
        json!({
            "title": "Splendour Of Himachal Tour",
            "duration": "9D / 8N",
            "price": "36500",
            "description": "Shimla, Kullu, Manali, Dalhousie, Amritsar, Dharamshala and Chandigarh in one trip.",
            "destinations": "Shimla, Kullu, Manali, Dalhousie, Amritsar, Dharamshala, Chandigarh City",
            "features": ["Kufri Adventure", "Rohtang Pass", "Golden Temple Visit", "Solang Valley", "Accommodation", "Meals Included"],
            "featured": false
        }),
        json!({
            "title": "Amritsar - Dalhousie - Dharamshala 7 Night Tour",
            "duration": "8D / 7N",
            "price": "35500",
            "description": "Amritsar's Golden Temple, the Dalhousie hills and the monasteries of Dharamshala.",
            "destinations": "Dalhousie, Khajjiar, Dharamshala, Amritsar",
            "features": ["Bhagsunag Waterfall", "Golden Temple", "Khajjiar Lake", "McLeodganj", "Tibetan Monasteries", "Local Cuisine"],
            "featured": false
        }),
        json!({
            "title": "Dharamshala - Dalhousie Package",
            "duration": "6D / 5N",
            "price": "25000",
            "description": "A short getaway to the hill stations of Dharamshala and Dalhousie.",
            "destinations": "Dalhousie, Khajjiar, Dharamshala, Mcleodganj",
            "features": "McLeodganj Market, Khajjiar Lake, Dalhousie Churches, Tibetan Culture, Nature Walks",
            "inclusions": "Hotel, Breakfast, Sightseeing by private cab",
            "featured": false
        }),
    ]
}

/// Insert the sample cars and tours, skipping any whose name or title is already present.
pub async fn seed(repo: &Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    for raw in sample_cars() {
        let car: Car = serde_json::from_value(raw)?;
        if repo.exists_where(Collection::Cars, "name", &car.name).await? {
            tracing::info!("Car already present: {}", car.name);
            continue;
        }
        let doc = repo.add(Collection::Cars, car).await?;
        tracing::info!("Added car: {} (ID: {})", doc.data.name, doc.id);
        report.cars += 1;
    }

    for raw in sample_tours() {
        let tour: Tour = serde_json::from_value(raw)?;
        if repo.exists_where(Collection::Tours, "title", &tour.title).await? {
            tracing::info!("Tour already present: {}", tour.title);
            continue;
        }
        let doc = repo.add(Collection::Tours, tour).await?;
        tracing::info!("Added tour: {} (ID: {})", doc.data.title, doc.id);
        report.tours += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, Query};
    use crate::models::Document;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("seed.sqlite")).await.unwrap();
        let repo = Repository::new(pool);

        let first = seed(&repo).await.unwrap();
        assert_eq!(first, SeedReport { cars: 3, tours: 3 });

        let second = seed(&repo).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let tours: Vec<Document<Tour>> = repo.list(Collection::Tours, &Query::new()).await.unwrap();
        let package = tours
            .iter()
            .find(|t| t.data.title == "Dharamshala - Dalhousie Package")
            .unwrap();
        assert_eq!(package.data.features.0.len(), 5);
        assert_eq!(package.data.price, Some(25000.0));
    }
}
