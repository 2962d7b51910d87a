use crate::{
    backend::BookingBackend,
    conflict::find_conflict,
    errors::{BookingError, StorageError, ValidationError},
    types::{hhmm, Booking, BookingId, BookingInput},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub struct BookingRepository<T: BookingBackend> {
    backend: T,
    write_lock: Arc<Mutex<()>>,
}

impl<T: BookingBackend> BookingRepository<T> {
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            write_lock: Arc::default(),
        }
    }

    pub fn create(&self, mut input: BookingInput) -> Result<Booking, BookingError> {
        input.start_time = hhmm::truncate(input.start_time);
        input.end_time = hhmm::truncate(input.end_time);
        if input.start_time >= input.end_time {
            return Err(ValidationError::EndNotAfterStart.into());
        }

        let _guard = self.write_lock.lock().unwrap();
        let mut bookings = self.backend.load();
        if let Some(existing) = find_conflict(&input, &bookings) {
            return Err(BookingError::Conflict {
                existing: existing.clone(),
            });
        }

        let id = next_id(&bookings, Utc::now().timestamp_millis().max(0) as u64);
        let booking = input.into_booking(id);
        bookings.push(booking.clone());
        self.backend.save(&bookings)?;

        info!(%id, resource = %booking.resource, date = %booking.date, "Booking created");
        Ok(booking)
    }

    /// Returns whether a booking was removed. Unknown ids leave storage untouched.
    pub fn cancel(&self, id: BookingId) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut bookings = self.backend.load();
        let count = bookings.len();
        bookings.retain(|booking| booking.id != id);

        if bookings.len() == count {
            debug!(%id, "Cancel requested for unknown booking");
            return Ok(false);
        }
        self.backend.save(&bookings)?;

        info!(%id, "Booking cancelled");
        Ok(true)
    }

    pub fn list(&self) -> Vec<Booking> {
        self.backend.load()
    }

    pub fn get(&self, id: BookingId) -> Option<Booking> {
        self.list().into_iter().find(|booking| booking.id == id)
    }
}

fn next_id(bookings: &[Booking], now_millis: u64) -> BookingId {
    let id = bookings
        .iter()
        .map(|booking| booking.id.0)
        .max()
        .map_or(now_millis, |max| now_millis.max(max.saturating_add(1)));
    BookingId(id)
}
