/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Token issuance and verification (`TokenIssuer`)
/// - [`credentials`]: Registration and login over the principal tables
/// - [`middleware`]: Bearer-token gate for Axum routers
/// - [`authorization`]: Role allow-list checks for gated routes

pub mod authorization;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
