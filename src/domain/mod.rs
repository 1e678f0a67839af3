pub mod booking;
pub mod classifier;
pub mod commands;
pub mod errors;
pub mod value_objects;

pub use booking::{Booking, BookingDraft};
pub use classifier::{BookingSelection, LastNext, StateFilter};
pub use errors::*;
pub use value_objects::*;
