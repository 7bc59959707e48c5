//! Core business logic for admarket.

pub mod services;

pub use services::*;
