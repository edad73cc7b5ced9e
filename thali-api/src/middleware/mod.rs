/// Middleware for the API server
///
/// - `security`: Security response headers
///
/// The token gate itself lives in `thali_shared::auth::middleware`.

pub mod security;
