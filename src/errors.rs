use crate::types::{Booking, ResourceType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("End time must be after start time.")]
    EndNotAfterStart,
    #[error("Please enter your name.")]
    MissingStaffName,
    #[error("Staff name must be at most {max} characters long.")]
    StaffNameTooLong { max: u64 },
    #[error("Please select a resource type.")]
    MissingResourceType,
    #[error("Please select a resource.")]
    MissingResource,
    #[error("{resource} is not a bookable {resource_type}.")]
    UnknownResource {
        resource_type: ResourceType,
        resource: String,
    },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize bookings: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Error: {0}")]
    Validation(#[from] ValidationError),
    #[error(
        "Error: This resource is already booked for the selected time ({}).",
        describe(.existing)
    )]
    Conflict { existing: Booking },
    #[error("Error: The booking could not be saved. {0}")]
    Storage(#[from] StorageError),
}

fn describe(booking: &Booking) -> String {
    format!(
        "{} has {} from {} to {}",
        booking.staff_name,
        booking.resource,
        booking.start_time.format("%H:%M"),
        booking.end_time.format("%H:%M")
    )
}
