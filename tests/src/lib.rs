//! # Command Gate Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # Shared contexts and scripted policies
//!     ├── flows.rs        # End-to-end check and cooldown scenarios
//!     ├── hierarchy.rs    # Alias composition and ancestor gating
//!     ├── concurrency.rs  # Shared policies under concurrent invocations
//!     └── properties.rs   # Group reduction properties through the facade
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gate-tests
//! cargo test -p gate-tests integration::flows::
//! cargo bench -p gate-tests
//! ```
