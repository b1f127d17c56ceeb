use axum::{extract::State, Extension, Json};
use tracing::{debug, info, instrument};

use super::types::{BookingQuery, NewBooking, StatusUpdate};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState, ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::store::{
    parse_id, Collection, DeleteOutcome, Document, Filter, InsertOutcome, UpdateOutcome,
};

/// HTTP handler for listing bookings, optionally filtered by email
///
/// GET /bookings[?email=...]
/// Requires a session; see `session::require_session`
#[instrument(name = "list_bookings", skip(state, claims))]
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    ValidatedQuery(query): ValidatedQuery<BookingQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let filter = match query.email() {
        Some(email) => {
            // Not cross-checked against the session identity
            if claims.identity.email() != Some(email) {
                debug!(
                    requested = email,
                    authenticated = claims.identity.email().unwrap_or_default(),
                    "Booking filter email differs from session identity"
                );
            }
            Filter::all().eq("email", email)
        }
        None => Filter::all(),
    };

    let bookings = state.store.find_many(Collection::Bookings, &filter).await?;

    info!(booking_count = bookings.len(), "Bookings listed successfully");

    Ok(Json(bookings))
}

/// HTTP handler for creating a booking
///
/// POST /bookings
#[instrument(name = "create_booking", skip(state, booking))]
pub async fn create_booking(
    State(state): State<AppState>,
    ValidatedJson(booking): ValidatedJson<NewBooking>,
) -> Result<Json<InsertOutcome>, AppError> {
    booking.validate()?;

    let outcome = state
        .store
        .insert_one(Collection::Bookings, booking.into_fields())
        .await?;

    info!(booking_id = %outcome.inserted_id, "Booking created successfully");

    Ok(Json(outcome))
}

/// HTTP handler for changing a booking's status
///
/// PATCH /bookings/:id
/// Only `status` is written; 404 when no booking has the identifier
#[instrument(name = "update_booking_status", skip(state, update))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
    ValidatedJson(update): ValidatedJson<StatusUpdate>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = parse_id(&id)?;
    update.validate()?;

    let status = update.status.clone();
    let outcome = state
        .store
        .update_one(Collection::Bookings, id, update.into_fields())
        .await?;

    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("booking".to_string()));
    }

    info!(
        booking_id = %id,
        %status,
        modified = outcome.modified_count,
        "Booking status updated"
    );

    Ok(Json(outcome))
}

/// HTTP handler for deleting a booking
///
/// DELETE /bookings/:id
#[instrument(name = "delete_booking", skip(state))]
pub async fn delete_booking(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let id = parse_id(&id)?;

    let outcome = state.store.delete_one(Collection::Bookings, id).await?;

    if outcome.deleted_count == 0 {
        return Err(AppError::NotFound("booking".to_string()));
    }

    info!(booking_id = %id, "Booking deleted");

    Ok(Json(outcome))
}
