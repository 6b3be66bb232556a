//! Shared types between the QuickCart server and its clients.
//!
//! Aggregates, DTOs and the pure business rules (cart arithmetic, checkout
//! pricing, order lifecycle) live here so they can be tested without a
//! database.

pub mod domain;
pub mod shared;
pub mod system;
