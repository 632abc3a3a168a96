//! Core traits for pluggable backends.
//!
//! - [`CacheStore`](store::CacheStore) - summary bundle storage
//! - [`Summarizer`](summarizer::Summarizer) - language-model backend
//! - [`Scraper`](scraper::Scraper) - page to profile extraction
//! - [`CompletionSignal`](signal::CompletionSignal) - prefetch indicator

pub mod scraper;
pub mod signal;
pub mod store;
pub mod summarizer;
