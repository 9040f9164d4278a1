//! Domain models for Procura.
//!
//! These are the core types shared across all crates.

pub mod department;
pub mod notification;
pub mod purchase_order;
pub mod signature;
pub mod user;
