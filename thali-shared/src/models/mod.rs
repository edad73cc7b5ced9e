/// Database models for Thali
///
/// # Models
///
/// - `role`: Principal role enum shared by all account kinds
/// - `principal`: Trait over authenticable records
/// - `user`: Customer accounts (with order/transaction documents)
/// - `delivery_agent`: Delivery agent accounts
/// - `owner`: Owner account (lazily bootstrapped)
/// - `order`: Order and transaction document shapes
/// - `product`: Product catalog

pub mod delivery_agent;
pub mod order;
pub mod owner;
pub mod principal;
pub mod product;
pub mod role;
pub mod user;
