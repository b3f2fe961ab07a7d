//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestEngine, TEST_USER};
//!
//! #[tokio::test]
//! async fn test_recommend() {
//!     let env = TestEngine::new();
//!     let user = env.add_user(TEST_USER);
//!     let items = env.engine.get_recommendations(user, 10, 0.0, false).await.unwrap();
//!     assert!(items.is_empty());
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{seed_collector_catalog, write_ppm, TestEngine};
