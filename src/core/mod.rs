//! Domain services: validation and orchestration over the store

pub mod services;
pub mod traits;
