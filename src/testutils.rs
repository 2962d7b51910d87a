use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use crate::{backend::BookingBackend, errors::StorageError, types::Booking};

pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub calls_to_load: AtomicU64,
    pub calls_to_save: AtomicU64,
    pub bookings: Mutex<Vec<Booking>>,
}

#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_load: AtomicU64::default(),
            calls_to_save: AtomicU64::default(),
            bookings: Mutex::default(),
        }
    }
}

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner::new()))
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let backend = Self::new();
        *backend.0.bookings.lock().unwrap() = bookings;
        backend
    }
}

impl BookingBackend for MockBookingBackend {
    fn load(&self) -> Vec<Booking> {
        self.0.calls_to_load.fetch_add(1, Ordering::SeqCst);
        self.0.bookings.lock().unwrap().clone()
    }

    fn save(&self, bookings: &[Booking]) -> Result<(), StorageError> {
        self.0.calls_to_save.fetch_add(1, Ordering::SeqCst);
        match self.0.success.load(Ordering::SeqCst) {
            true => {
                *self.0.bookings.lock().unwrap() = bookings.to_vec();
                Ok(())
            }
            false => Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Supposed to fail",
            ))),
        }
    }
}
