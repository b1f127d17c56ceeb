pub mod client;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use client::{TestClient, TestResponse};
#[allow(unused_imports)]
pub use setup::{as_fields, TestSetup, TestSetupBuilder, TEST_SECRET};
