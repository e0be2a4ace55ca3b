//! Amadeus flight-offers search.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::AmadeusConfig;
use crate::errors::AppError;
use crate::models::{Flight, FlightSearchRequest, TripType};

/// Tokens are refreshed this long before Amadeus says they expire.
const TOKEN_EARLY_EXPIRY: Duration = Duration::from_secs(60);
const MAX_OFFERS: u32 = 20;

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Offer {
    id: String,
    #[serde(default)]
    validating_airline_codes: Vec<String>,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
    price: OfferPrice,
    #[serde(default)]
    number_of_bookable_seats: u32,
}

#[derive(Deserialize)]
struct Itinerary {
    #[serde(default)]
    duration: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    carrier_code: String,
    number: String,
    departure: SegmentEndpoint,
    arrival: SegmentEndpoint,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentEndpoint {
    iata_code: String,
    at: String,
}

#[derive(Deserialize)]
struct OfferPrice {
    total: String,
    currency: String,
}

/// Client for the Amadeus self-service flight APIs.
pub struct AmadeusClient {
    http: reqwest::Client,
    config: AmadeusConfig,
    token: RwLock<Option<CachedToken>>,
}

impl AmadeusClient {
    pub fn new(config: AmadeusConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            token: RwLock::new(None),
        }
    }

    /// Search flight offers and map them to the simplified shape.
    pub async fn search(&self, request: &FlightSearchRequest) -> Result<Vec<Flight>, AppError> {
        let token = self.access_token().await?;

        let mut params: Vec<(&str, String)> = vec![
            ("originLocationCode", request.from.clone()),
            ("destinationLocationCode", request.to.clone()),
            ("departureDate", request.depart_date.clone()),
            ("adults", request.adult_count().to_string()),
            ("currencyCode", "INR".to_string()),
            ("max", MAX_OFFERS.to_string()),
        ];
        if request.trip_type == TripType::RoundTrip {
            if let Some(return_date) = request.return_date.as_ref().filter(|d| !d.is_empty()) {
                params.push(("returnDate", return_date.clone()));
            }
        }

        let response: OffersResponse = self
            .http
            .get(format!("{}/v2/shopping/flight-offers", self.config.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.into_iter().filter_map(map_offer).collect())
    }

    /// Return a cached OAuth token, fetching a new one when it is about to expire.
    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(AppError::Upstream(
                "Amadeus credentials are not configured".to_string(),
            ));
        };

        let response: TokenResponse = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                AppError::Upstream(format!("Failed to authenticate with Amadeus API: {}", e))
            })?
            .json()
            .await?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EARLY_EXPIRY);
        *self.token.write().await = Some(CachedToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }
}

/// Map one raw offer. Offers without an itinerary segment are dropped.
fn map_offer(raw: Value) -> Option<Flight> {
    let offer: Offer = match serde_json::from_value(raw.clone()) {
        Ok(offer) => offer,
        Err(e) => {
            tracing::warn!("Skipping unreadable flight offer: {}", e);
            return None;
        }
    };

    let itinerary = offer.itineraries.first()?;
    let first = itinerary.segments.first()?;
    let last = itinerary.segments.last()?;

    Some(Flight {
        id: offer.id.clone(),
        airline: offer
            .validating_airline_codes
            .first()
            .cloned()
            .unwrap_or_else(|| first.carrier_code.clone()),
        flight_number: format!("{}-{}", first.carrier_code, first.number),
        from: first.departure.iata_code.clone(),
        to: last.arrival.iata_code.clone(),
        departure: first.departure.at.clone(),
        arrival: last.arrival.at.clone(),
        duration: itinerary.duration.clone(),
        price: offer.price.total.clone(),
        currency: offer.price.currency.clone(),
        seats: offer.number_of_bookable_seats,
        raw_data: Some(raw),
    })
}

/// Demo flights returned when the live search is unavailable.
pub fn mock_flights(request: &FlightSearchRequest) -> Vec<Flight> {
    let flight = |id: &str, airline: &str, dep: &str, arr: &str, dur: &str, price: &str, seats| {
        Flight {
            id: id.to_string(),
            airline: airline.to_string(),
            flight_number: id.to_string(),
            from: request.from.clone(),
            to: request.to.clone(),
            departure: dep.to_string(),
            arrival: arr.to_string(),
            duration: dur.to_string(),
            price: price.to_string(),
            currency: "INR".to_string(),
            seats,
            raw_data: None,
        }
    };

    vec![
        flight("AI-101", "Air India", "08:00", "10:30", "PT2H30M", "4500.00", 9),
        flight("6E-304", "IndiGo", "14:00", "16:15", "PT2H15M", "3800.00", 5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_offer_uses_first_and_last_segment() {
        let raw = json!({
            "id": "1",
            "validatingAirlineCodes": ["AI"],
            "itineraries": [{
                "duration": "PT5H10M",
                "segments": [
                    {"carrierCode": "AI", "number": "501",
                     "departure": {"iataCode": "DEL", "at": "2026-11-01T06:00:00"},
                     "arrival": {"iataCode": "BOM", "at": "2026-11-01T08:10:00"}},
                    {"carrierCode": "AI", "number": "610",
                     "departure": {"iataCode": "BOM", "at": "2026-11-01T09:30:00"},
                     "arrival": {"iataCode": "GOI", "at": "2026-11-01T11:10:00"}}
                ]
            }],
            "price": {"total": "7421.00", "currency": "INR"},
            "numberOfBookableSeats": 4
        });

        let flight = map_offer(raw).unwrap();
        assert_eq!(flight.airline, "AI");
        assert_eq!(flight.flight_number, "AI-501");
        assert_eq!(flight.from, "DEL");
        assert_eq!(flight.to, "GOI");
        assert_eq!(flight.arrival, "2026-11-01T11:10:00");
        assert_eq!(flight.price, "7421.00");
        assert_eq!(flight.seats, 4);
        assert!(flight.raw_data.is_some());
    }

    #[test]
    fn test_map_offer_skips_offer_without_segments() {
        let raw = json!({
            "id": "2",
            "itineraries": [],
            "price": {"total": "1.00", "currency": "INR"}
        });
        assert!(map_offer(raw).is_none());
    }

    #[test]
    fn test_mock_flights_echo_route() {
        let request: FlightSearchRequest = serde_json::from_value(json!({
            "from": "DEL", "to": "DHM", "departDate": "2026-11-01"
        }))
        .unwrap();
        let flights = mock_flights(&request);
        assert_eq!(flights.len(), 2);
        assert!(flights.iter().all(|f| f.from == "DEL" && f.to == "DHM"));
    }
}
