//! Integration test crate for the bucket proof engine.
//!
//! This crate has no library code. It only contains end-to-end tests that
//! run fragments through splitting, tagging, proving and aggregation.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p bucket-integration-tests
//! ```
