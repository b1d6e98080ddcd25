//! Enquiry admin tool - Library exports for testing

pub mod api;
pub mod client;
pub mod core;
pub mod error;
pub mod infrastructure;
