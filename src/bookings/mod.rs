// Public API - what other modules can use
pub use handlers::{create_booking, delete_booking, list_bookings, update_booking_status};
pub use types::{BookingQuery, NewBooking, StatusUpdate};

// Internal modules
mod handlers;
mod types;
