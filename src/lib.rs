//! # rxmarble: marble testing for reactive streams
//!
//! Describe a stream's timeline as an ASCII diagram, run it on a
//! deterministic virtual clock and compare what an observable emits with
//! the timeline you expected.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxmarble::prelude::*;
//!
//! MarbleRunner::default().run(|h| {
//!   let source: HotObservable<char, &str> = h.hot("---a--^-b-|")?;
//!   h.expect_observable(source).to_be("--b-|")
//! });
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`marble`] | Diagram grammar, parser and renderer |
//! | [`TestScheduler`] | Virtual clock with a frame-ordered action queue |
//! | [`MarbleRunner`] | Sets up a run, drains it and checks every expectation |
//! | [`Observable`] | The reactive contract the producers and operators implement |
//!
//! [`TestScheduler`]: scheduler::TestScheduler
//! [`MarbleRunner`]: testing::MarbleRunner
//! [`Observable`]: observable::Observable

pub mod config;
pub mod error;
pub mod marble;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscription;
pub mod testing;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
