//! Operators available on every [`Observable`](crate::observable::Observable).
//!
//! Each operator wraps its source and interposes an observer; the methods
//! that build them live on the `Observable` trait.

pub mod concat;
pub mod filter;
pub mod map;
pub mod retry;
pub mod take;
pub mod tap;
