use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, approve_booking, create_booking, get_booking_by_id, list_bookings_by_booker,
    list_bookings_by_owner,
};

/// Creates the API router with all booking management endpoints
///
/// Command endpoints (Write operations):
/// - POST /bookings - Create a new booking request
/// - PATCH /bookings/:id?approved= - Approve or reject a booking
///
/// Query endpoints (Read operations):
/// - GET /bookings/:id - Get booking details (owner or booker only)
/// - GET /bookings - List the caller's bookings as booker
/// - GET /bookings/owner - List bookings on the caller's items
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Booking endpoints (commands and queries share paths)
        .route("/bookings", post(create_booking).get(list_bookings_by_booker))
        .route("/bookings/owner", get(list_bookings_by_owner))
        .route("/bookings/:id", patch(approve_booking).get(get_booking_by_id))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
