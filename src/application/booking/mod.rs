mod booking_service;
mod errors;

#[allow(unused_imports)]
pub use booking_service::{
    BookingDetails, ServiceDependencies, approve_booking, classify_last_next,
    classify_last_next_batch, create_booking, get_booking_by_id, get_bookings_by_owner,
    get_bookings_by_user, has_completed_booking,
};
#[allow(unused_imports)]
pub use errors::{BookingApplicationError, Result};
