/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Root banner and health check
/// - `auth`: User registration and login
/// - `delivery`: Delivery agent registration and login
/// - `owner`: Owner login
/// - `products`: Catalog listing, creation and sample seeding

pub mod auth;
pub mod delivery;
pub mod health;
pub mod owner;
pub mod products;

use serde::{Deserialize, Serialize};

/// Body of responses that only carry a message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
