//! API endpoint handlers.
//!
//! Each module corresponds to one resource. Handlers open a
//! request-scoped connection and delegate to the service modules.

pub mod health;
pub mod medicines;
pub mod prescriptions;
pub mod search;
pub mod sellers;
pub mod stock;
