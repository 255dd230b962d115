//! Foundation types for jit.
//!
//! This crate provides the identifier and identity types shared by every
//! other jit crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (SHA-1 of an object envelope)
//! - [`Signature`] — Author/committer identity with a [`Timestamp`]
//! - [`Timestamp`] — Epoch seconds plus a time-zone offset

pub mod error;
pub mod object;
pub mod signature;

pub use error::TypeError;
pub use object::ObjectId;
pub use signature::{Signature, Timestamp};
