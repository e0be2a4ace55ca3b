//! Flight and train search endpoints.
//!
//! Live searches relay to Amadeus and RapidAPI. Transport or decoding
//! failures never reach the client: demo results are returned instead,
//! flagged with `isMock`.

use axum::{extract::State, Json};

use super::{done, ApiResult};
use crate::errors::AppError;
use crate::models::{Flight, FlightSearchRequest, SearchResults, Train, TrainSearchRequest};
use crate::providers::{mock_flights, mock_trains, RailOutcome};
use crate::AppState;

const FLIGHT_MOCK_MESSAGE: &str = "Showing demo results (Amadeus credentials invalid)";
const TRAIN_MOCK_MESSAGE: &str = "Showing demo results (API subscription required)";

fn require(fields: &[&str], names: &str) -> Result<(), AppError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::BadRequest(format!(
            "Missing required parameters: {}",
            names
        )));
    }
    Ok(())
}

/// POST /api/flights/search - Search flight offers.
pub async fn search_flights(
    State(state): State<AppState>,
    Json(request): Json<FlightSearchRequest>,
) -> Result<Json<SearchResults<Flight>>, AppError> {
    require(
        &[request.from.as_str(), request.to.as_str(), request.depart_date.as_str()],
        "from, to, departDate",
    )?;

    tracing::info!(from = %request.from, to = %request.to, date = %request.depart_date, "Searching flights");

    match state.flights.search(&request).await {
        Ok(flights) => Ok(Json(SearchResults::live(flights))),
        Err(e) => {
            tracing::warn!("Flight search unavailable, returning demo results: {}", e);
            Ok(Json(SearchResults::mock(mock_flights(&request), FLIGHT_MOCK_MESSAGE)))
        }
    }
}

/// POST /api/flights/booking-options - Acknowledge a booking-options request.
pub async fn flight_booking_options() -> ApiResult<()> {
    done("Booking options retrieved")
}

/// POST /api/trains/search - Search trains between two stations.
pub async fn search_trains(
    State(state): State<AppState>,
    Json(request): Json<TrainSearchRequest>,
) -> Result<Json<SearchResults<Train>>, AppError> {
    require(
        &[request.from.as_str(), request.to.as_str(), request.date.as_str()],
        "from, to, date",
    )?;

    tracing::info!(from = %request.from, to = %request.to, date = %request.date, "Searching trains");

    match state.trains.search(&request).await {
        Ok(RailOutcome::Trains(trains)) => Ok(Json(SearchResults::live(trains))),
        Ok(RailOutcome::NoResults(message)) => Ok(Json(SearchResults::empty(message))),
        Err(e) => {
            tracing::warn!("Train search unavailable, returning demo results: {}", e);
            Ok(Json(SearchResults::mock(mock_trains(&request), TRAIN_MOCK_MESSAGE)))
        }
    }
}
