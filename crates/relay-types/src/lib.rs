//! Shared types for the UniswapX order relay.
//!
//! This crate holds the storage/wire-neutral entity model for decay and
//! priority orders, the response records exposed to API consumers, and the
//! field-shape validation applied to entities before they are persisted.
//! It also carries the schema helpers backends use to check their
//! configuration tables.

pub mod entities;
pub mod responses;
pub mod schema;
pub mod signature;
pub mod validation;

pub use entities::*;
pub use responses::*;
pub use schema::*;
pub use signature::*;
pub use validation::*;
