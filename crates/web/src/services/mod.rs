//! Business logic services.

pub mod cart;
