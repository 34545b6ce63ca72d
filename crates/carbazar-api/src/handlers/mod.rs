//! HTTP request handlers

pub mod health;
pub mod listings;
pub mod submissions;
