pub mod auth;
pub mod catalog;
pub mod kitchen;
pub mod orders;
pub mod reports;
