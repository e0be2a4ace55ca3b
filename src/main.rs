//! DK Holidays Backend
//!
//! REST backend for a travel-agency website: car and tour catalogues, offers,
//! reviews, contact forms, booking requests, flight and train search relays and
//! payment-intent creation, persisted in SQLite.

mod api;
mod auth;
mod cli;
mod config;
mod db;
mod errors;
mod handoff;
mod models;
mod notify;
mod providers;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::TokenVerifier;
use config::Config;
use db::Repository;
use notify::BookingNotifier;
use providers::{AmadeusClient, RailClient, RazorpayClient, StripeClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub verifier: Arc<TokenVerifier>,
    pub flights: Arc<AmadeusClient>,
    pub trains: Arc<RailClient>,
    pub stripe: Arc<StripeClient>,
    pub razorpay: Arc<RazorpayClient>,
    /// Present only when SMTP is configured
    pub notifier: Option<Arc<BookingNotifier>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up every client from configuration around an opened repository.
    pub fn new(repo: Repository, config: Config) -> Result<Self, reqwest::Error> {
        let http = providers::http_client()?;

        let notifier = match &config.smtp {
            Some(smtp) => match BookingNotifier::new(smtp) {
                Ok(notifier) => Some(Arc::new(notifier)),
                Err(e) => {
                    tracing::warn!("Booking notifications disabled, SMTP setup failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            repo: Arc::new(repo),
            verifier: Arc::new(TokenVerifier::new(&config.auth, http.clone())),
            flights: Arc::new(AmadeusClient::new(config.amadeus.clone(), http.clone())),
            trains: Arc::new(RailClient::new(config.rapidapi.clone(), http.clone())),
            stripe: Arc::new(StripeClient::new(config.stripe.clone(), http.clone())),
            razorpay: Arc::new(RazorpayClient::new(config.razorpay.clone(), http)),
            notifier,
            config: Arc::new(config),
        })
    }
}

#[derive(Parser)]
#[command(name = "dk-holidays-api")]
#[command(version, about = "DK Holidays REST backend and management tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Grant the admin role to a user id
    MakeAdmin {
        /// Firebase uid of the user
        uid: String,
    },
    /// Select the payment provider
    SetPaymentProvider {
        /// `stripe` or `razorpay`
        provider: String,

        /// Store the provider but keep payments switched off
        #[arg(long)]
        disabled: bool,
    },
    /// Insert the sample cars and tour packages
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(repo, config).await?,
        Commands::MakeAdmin { uid } => cli::make_admin(&repo, &uid).await?,
        Commands::SetPaymentProvider { provider, disabled } => {
            let settings = cli::set_payment_provider(&repo, &provider, !disabled).await?;
            tracing::info!(
                "Payment provider set to {} (enabled: {})",
                settings.provider.as_str(),
                settings.enabled
            );
        }
        Commands::Seed => {
            let report = cli::seed(&repo).await?;
            tracing::info!("Seeded {} cars and {} tours", report.cars, report.tours);
        }
    }

    Ok(())
}

async fn serve(repo: Repository, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting DK Holidays Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    let state = AppState::new(repo, config.clone())?;

    tracing::info!("Token verification mode: {}", state.verifier.mode_name());
    if !state.verifier.is_enabled() {
        tracing::warn!(
            "Neither FIREBASE_PROJECT_ID nor DK_AUTH_SECRET is set. All protected routes will answer 401!"
        );
    }
    if state.notifier.is_none() {
        tracing::info!("SMTP not configured; booking notification emails are off");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let user = || middleware::from_fn_with_state(state.clone(), auth::require_user);
    let admin = || middleware::from_fn_with_state(state.clone(), auth::require_admin);

    let api_routes = Router::new()
        // Cars
        .route("/cars", get(api::list_cars))
        .route("/cars", post(api::create_car).route_layer(admin()))
        .route("/cars/search", get(api::search_cars))
        .route("/cars/{id}", get(api::get_car))
        .route("/cars/{id}", put(api::update_car).route_layer(admin()))
        .route("/cars/{id}", delete(api::delete_car).route_layer(admin()))
        // Tours
        .route("/tours", get(api::list_tours))
        .route("/tours", post(api::create_tour).route_layer(admin()))
        .route("/tours/{id}", get(api::get_tour))
        .route("/tours/{id}", put(api::update_tour).route_layer(admin()))
        .route("/tours/{id}", delete(api::delete_tour).route_layer(admin()))
        // Offers
        .route("/offers", get(api::list_offers))
        .route("/offers", post(api::create_offer).route_layer(admin()))
        .route("/offers/{id}", delete(api::delete_offer).route_layer(admin()))
        // Reviews
        .route("/reviews", get(api::list_reviews))
        .route("/reviews", post(api::create_review).route_layer(admin()))
        .route("/reviews/{id}", delete(api::delete_review).route_layer(admin()))
        // Contact
        .route("/contact", post(api::submit_contact))
        .route("/contact", get(api::list_contacts).route_layer(admin()))
        .route("/contact/newsletter", post(api::subscribe_newsletter))
        .route(
            "/contact/newsletter",
            get(api::list_subscribers).route_layer(admin()),
        )
        // Bookings
        .route("/bookings", post(api::create_booking).route_layer(user()))
        .route("/bookings", get(api::list_bookings).route_layer(admin()))
        .route("/bookings/handoff", post(api::booking_handoff))
        .route("/bookings/user", get(api::list_user_bookings).route_layer(user()))
        .route("/bookings/{id}", get(api::get_booking).route_layer(user()))
        .route("/bookings/{id}", delete(api::delete_booking).route_layer(admin()))
        .route(
            "/bookings/{id}/cancel",
            put(api::cancel_booking).route_layer(user()),
        )
        .route(
            "/bookings/{id}/status",
            put(api::update_booking_status).route_layer(admin()),
        )
        // Flights and trains
        .route("/flights/search", post(api::search_flights))
        .route("/flights/booking-options", post(api::flight_booking_options))
        .route("/trains/search", post(api::search_trains))
        // Payment
        .route(
            "/payment/settings",
            get(api::get_payment_settings).route_layer(admin()),
        )
        .route(
            "/payment/settings",
            put(api::update_payment_settings).route_layer(admin()),
        )
        .route(
            "/payment/create-payment-intent",
            post(api::create_payment_intent).route_layer(user()),
        )
        .route("/payment/verify", post(api::verify_payment).route_layer(user()))
        // Auth
        .route("/auth/verify", post(api::verify_user))
        .route("/auth/users", get(api::list_users).route_layer(admin()))
        .route(
            "/auth/admin/set-role",
            post(api::set_admin_role).route_layer(admin()),
        )
        .route(
            "/auth/users/{uid}",
            delete(api::delete_user).route_layer(admin()),
        )
        // Health check (no auth required)
        .route("/health", get(health_check));

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(root))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "DK Holidays API is running",
        "timestamp": db::now_timestamp(),
    }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to DK Holidays API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
