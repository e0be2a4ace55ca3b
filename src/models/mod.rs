//! Data models for the DK Holidays API.
//!
//! Field names follow the JSON the web client already sends and reads.

mod booking;
mod car;
mod contact;
mod document;
pub mod lenient;
mod offer;
mod payment;
mod review;
mod tour;
mod travel;
mod user;

pub use booking::*;
pub use car::*;
pub use contact::*;
pub use document::*;
pub use offer::*;
pub use payment::*;
pub use review::*;
pub use tour::*;
pub use travel::*;
pub use user::*;
