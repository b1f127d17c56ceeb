// Public API - what other modules can use
pub use handlers::{get_service, list_services};

// Internal modules
mod handlers;
