//! Persistence for crawl and fetch progress.
//!
//! Three artifacts, all crash-oriented:
//!
//! - [`links::LinkStore`]: the append-only newline-delimited link log; a
//!   month's records land in one bulk write, so a crash never corrupts
//!   earlier months
//! - [`errors::ErrorLedger`]: failed (date, page) listing units, persisted
//!   immediately so no failure is lost before a replay
//! - [`checkpoint`]: per-batch artifacts from the fetch phase, so a crash
//!   loses at most the in-flight batch

pub mod checkpoint;
pub mod errors;
pub mod links;
