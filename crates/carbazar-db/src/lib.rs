//! Database repositories for data access layer
//!
//! Listings are written out of band by the inventory tooling; this crate
//! only exposes the read side used by the API.

pub mod listing;

pub use listing::CarListingRepository;
