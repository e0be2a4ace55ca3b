//! Booking notification email over SMTP.
//!
//! Delivery is best-effort: callers log failures and carry on.

use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::SmtpConfig;
use crate::models::Booking;

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Sends new-booking alerts to the agency inbox.
#[derive(Clone)]
pub struct BookingNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    notify_address: String,
}

impl BookingNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            notify_address: config.notify_address.clone(),
        })
    }

    pub async fn notify_booking(&self, booking: &Booking) -> Result<(), NotifyError> {
        let (subject, body) = compose_booking_email(booking);

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(self
                .notify_address
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(self.notify_address.clone()))?)
            .subject(subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(email).await?;

        tracing::info!(to = %self.notify_address, subject = %subject, "Booking notification sent");
        Ok(())
    }
}

/// Subject and plain-text body of the new-booking alert.
pub fn compose_booking_email(booking: &Booking) -> (String, String) {
    let service = booking.kind.to_uppercase();
    let details = &booking.details;
    let or_blank = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut lines = vec![
        "New Booking Request Received!".to_string(),
        String::new(),
        format!("Service: {}", service),
        format!("Item: {}", booking.item_name),
        String::new(),
        "Customer Details:".to_string(),
        format!("Name: {}", or_blank(&booking.user_name)),
        format!("Phone: {}", or_blank(&booking.user_phone)),
        format!("Email: {}", or_blank(&booking.user_email)),
        String::new(),
        "Booking Details:".to_string(),
        format!("Date: {}", or_blank(&details.date)),
    ];
    if let Some(date) = &details.return_date {
        lines.push(format!("Return Date: {}", date));
    }
    if let Some(location) = &details.pickup_location {
        lines.push(format!("PickUp: {}", location));
    }
    if let Some(note) = &details.message {
        lines.push(format!("Note: {}", note));
    }
    lines.push(String::new());
    lines.push(match details.total_price {
        Some(price) => format!("Est. Price: \u{20b9}{}", price),
        None => "Est. Price: on request".to_string(),
    });

    (format!("New Booking Request: {}", service), lines.join("\n"))
}
