//! # Comment Stream Processor Test Suite
//!
//! Cross-crate tests of the comment pipeline.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Service + bus choreography
//!     ├── flows.rs      # Input → save → count → output
//!     └── failures.rs   # Store failures, DLQ routing
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cs-tests
//! cargo test -p cs-tests integration::failures::
//! ```

pub mod integration;
