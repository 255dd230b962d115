//! Content hashing for jit objects.
//!
//! Every object is identified by the SHA-1 of its envelope
//! (`<kind> <len>\0<payload>`). All crypto operations wrap established
//! libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
