//! # Donations Module
//!
//! Donation records and everything that guards them:
//! - Models for stored records, validated records and partial updates
//! - Validators that turn loosely typed input into typed records
//! - The SQLite-backed store with its own constraint checks
//! - HTTP handlers and routes

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::donations_routes;
pub use store::DonationStore;
