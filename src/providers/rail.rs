//! Indian Railways train search through RapidAPI.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::RapidApiConfig;
use crate::errors::AppError;
use crate::models::{Train, TrainSearchRequest};

/// Fares shown when the timetable endpoint carries no prices.
const DEFAULT_FARES: [(&str, u32); 4] = [("sleeper", 450), ("ac3", 1200), ("ac2", 1800), ("ac1", 3000)];
const DEFAULT_SEATS: u32 = 50;

/// What the live search produced.
#[derive(Debug)]
pub enum RailOutcome {
    Trains(Vec<Train>),
    /// The API answered but reported no trains.
    NoResults(String),
}

/// Map a city name to its main station code; anything else is upper-cased.
pub fn station_code(city: &str) -> String {
    let code = match city.trim().to_lowercase().as_str() {
        "delhi" | "new delhi" => "NDLS",
        "mumbai" => "CSMT",
        "bangalore" | "bengaluru" => "SBC",
        "kolkata" | "howrah" => "HWH",
        "chennai" => "MAS",
        "hyderabad" | "secunderabad" => "SC",
        "pune" => "PUNE",
        "ahmedabad" => "ADI",
        "jaipur" => "JP",
        "dharamshala" => "CHB",
        "pathankot" => "PTK",
        _ => return city.trim().to_uppercase(),
    };
    code.to_string()
}

pub struct RailClient {
    http: reqwest::Client,
    config: RapidApiConfig,
}

impl RailClient {
    pub fn new(config: RapidApiConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub async fn search(&self, request: &TrainSearchRequest) -> Result<RailOutcome, AppError> {
        let key = self
            .config
            .key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("RapidAPI key is not configured".to_string()))?;

        let from = station_code(&request.from);
        let to = station_code(&request.to);

        let body: Value = self
            .http
            .get(format!("{}/api/v2/trainBetweenStations", self.config.base_url))
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", &self.config.host)
            .query(&[("from", &from), ("to", &to), ("date", &request.date)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_trains(body, &from, &to))
    }
}

/// Interpret a timetable response, which may be a bare list or wrap it in
/// `data` or `trains`.
fn parse_trains(body: Value, from: &str, to: &str) -> RailOutcome {
    if body.is_null() || body.get("status") == Some(&Value::Bool(false)) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No trains found")
            .to_string();
        tracing::info!("Train API returned no data: {}", message);
        return RailOutcome::NoResults(message);
    }

    let list = match &body {
        Value::Array(items) => items.as_slice(),
        _ => body
            .get("data")
            .and_then(Value::as_array)
            .or_else(|| body.get("trains").and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };

    RailOutcome::Trains(list.iter().map(|t| map_train(t, from, to)).collect())
}

/// First present field among `keys`, rendering numbers as text.
fn text_field(train: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match train.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn map_train(train: &Value, from: &str, to: &str) -> Train {
    let number = text_field(train, &["train_number", "trainNumber"]).unwrap_or_default();
    Train {
        id: number.clone(),
        name: text_field(train, &["train_name", "trainName"]).unwrap_or_else(|| "Express".to_string()),
        train_number: number,
        from: text_field(train, &["from_sta", "fromStnCode"]).unwrap_or_else(|| from.to_string()),
        to: text_field(train, &["to_sta", "toStnCode"]).unwrap_or_else(|| to.to_string()),
        departure: text_field(train, &["from_std", "departureTime"]).unwrap_or_else(|| "00:00".to_string()),
        arrival: text_field(train, &["to_sta_std", "arrivalTime"]).unwrap_or_else(|| "00:00".to_string()),
        duration: text_field(train, &["duration"]).unwrap_or_else(|| "N/A".to_string()),
        classes: fares(&DEFAULT_FARES),
        seats: DEFAULT_SEATS,
    }
}

fn fares(classes: &[(&str, u32)]) -> BTreeMap<String, u32> {
    classes.iter().map(|(class, fare)| (class.to_string(), *fare)).collect()
}

/// Demo trains returned when the live search is unavailable.
pub fn mock_trains(request: &TrainSearchRequest) -> Vec<Train> {
    let train = |number: &str, name: &str, dep: &str, arr: &str, dur: &str, classes: &[(&str, u32)], seats| {
        Train {
            id: number.to_string(),
            name: name.to_string(),
            train_number: number.to_string(),
            from: request.from.clone(),
            to: request.to.clone(),
            departure: dep.to_string(),
            arrival: arr.to_string(),
            duration: dur.to_string(),
            classes: fares(classes),
            seats,
        }
    };

    vec![
        train(
            "12301",
            "Rajdhani Express (Demo)",
            "17:00",
            "10:00",
            "17h 00m",
            &[("sleeper", 800), ("ac3", 1500), ("ac2", 2400)],
            45,
        ),
        train(
            "12004",
            "Shatabdi Express (Demo)",
            "06:00",
            "12:00",
            "06h 00m",
            &[("ac2", 1200), ("ac1", 2000)],
            30,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_codes() {
        assert_eq!(station_code("Delhi"), "NDLS");
        assert_eq!(station_code("new delhi"), "NDLS");
        assert_eq!(station_code("Bengaluru"), "SBC");
        assert_eq!(station_code("Dharamshala"), "CHB");
        assert_eq!(station_code("bct"), "BCT");
    }

    #[test]
    fn test_parse_wrapped_list() {
        let body = json!({
            "status": true,
            "data": [{
                "train_number": 12951,
                "train_name": "Mumbai Rajdhani",
                "from_std": "16:35",
                "to_sta_std": "08:35",
                "duration": "16:00"
            }]
        });

        let RailOutcome::Trains(trains) = parse_trains(body, "NDLS", "MMCT") else {
            panic!("expected trains");
        };
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].id, "12951");
        assert_eq!(trains[0].name, "Mumbai Rajdhani");
        assert_eq!(trains[0].from, "NDLS");
        assert_eq!(trains[0].departure, "16:35");
        assert_eq!(trains[0].classes["ac1"], 3000);
        assert_eq!(trains[0].seats, 50);
    }

    #[test]
    fn test_parse_bare_array_and_trains_key() {
        let bare = json!([{"trainNumber": "1", "trainName": "A"}]);
        assert!(matches!(parse_trains(bare, "X", "Y"), RailOutcome::Trains(t) if t.len() == 1));

        let keyed = json!({"trains": [{"trainNumber": "1"}, {"trainNumber": "2"}]});
        match parse_trains(keyed, "X", "Y") {
            RailOutcome::Trains(t) => {
                assert_eq!(t.len(), 2);
                assert_eq!(t[1].name, "Express");
                assert_eq!(t[1].arrival, "00:00");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_false() {
        let body = json!({"status": false, "message": "Invalid station"});
        match parse_trains(body, "X", "Y") {
            RailOutcome::NoResults(message) => assert_eq!(message, "Invalid station"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse_trains(Value::Null, "X", "Y"), RailOutcome::NoResults(_)));
    }

    #[test]
    fn test_mock_trains() {
        let request = TrainSearchRequest {
            from: "Delhi".into(),
            to: "Pathankot".into(),
            date: "2026-11-01".into(),
        };
        let trains = mock_trains(&request);
        assert_eq!(trains[0].train_number, "12301");
        assert_eq!(trains[0].from, "Delhi");
        assert_eq!(trains[1].classes.len(), 2);
    }
}
