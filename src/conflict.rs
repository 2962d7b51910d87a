use crate::types::{Booking, BookingInput};
use chrono::NaiveTime;

/// Half-open `[start, end)` overlap: touching endpoints do not overlap.
pub fn overlaps(start: NaiveTime, end: NaiveTime, other_start: NaiveTime, other_end: NaiveTime) -> bool {
    start < other_end && end > other_start
}

/// First existing booking of the same resource on the same date whose interval overlaps the candidate.
pub fn find_conflict<'a>(candidate: &BookingInput, existing: &'a [Booking]) -> Option<&'a Booking> {
    existing.iter().find(|booking| {
        booking.resource == candidate.resource
            && booking.date == candidate.date
            && overlaps(
                candidate.start_time,
                candidate.end_time,
                booking.start_time,
                booking.end_time,
            )
    })
}
