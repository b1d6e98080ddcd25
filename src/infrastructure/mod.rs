//! Persistence: database handle, entities, query construction, repositories

pub mod database;
pub mod entities;
pub mod query;
pub mod repositories;
pub mod traits;
