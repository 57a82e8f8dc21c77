//! Core types and the wear-history consistency layer for the wardrobe.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! calendar aggregator, the wear-day invariant manager and the
//! recommendation session are written against the traits in [`store`], so
//! the same logic runs over SQLite on the server and over HTTP in the CLI.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod envelope;
pub mod error;
pub mod history;
pub mod item;
pub mod outfit;
pub mod recommend;
pub mod store;
pub mod wear;

pub use error::{Error, Result};
