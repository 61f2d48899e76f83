//! Feed transport: fetching raw calendar blobs.

pub mod fetch;

pub use fetch::{FeedFetcher, HttpFeedFetcher, cache_busted_url, fetch_all};
