// Library crate for the car-doctor backend
// This file exposes the public API for the binary and integration tests

pub mod bookings;
pub mod config;
pub mod routes;
pub mod services;
pub mod session;
pub mod shared;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use routes::{app, cors_layer};
pub use session::{SessionClaims, TokenService};
pub use shared::{AppError, AppState};
pub use store::{Collection, Document, DocumentStore, InMemoryDocumentStore};
