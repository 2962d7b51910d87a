use crate::{
    backend::BookingBackend, errors::StorageError, key_value_store::KeyValueStore, types::Booking,
};
use std::sync::Arc;
use tracing::{error, warn};

pub const BOOKINGS_NAMESPACE: &str = "globalmicro_bookings";

#[derive(Debug)]
pub struct LocalBookings<S: KeyValueStore> {
    store: Arc<S>,
    namespace: String,
}

impl<S: KeyValueStore> LocalBookings<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, BOOKINGS_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: &str) -> Self {
        Self {
            store: Arc::new(store),
            namespace: namespace.into(),
        }
    }
}

impl<S: KeyValueStore> Clone for LocalBookings<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<S: KeyValueStore> BookingBackend for LocalBookings<S> {
    fn load(&self) -> Vec<Booking> {
        let data = match self.store.get(&self.namespace) {
            Ok(Some(data)) => data,
            Ok(None) => return vec![],
            Err(err) => {
                warn!(?err, namespace = %self.namespace, "Failed to read bookings, treating as empty");
                return vec![];
            }
        };

        match serde_json::from_str(&data) {
            Ok(bookings) => bookings,
            Err(err) => {
                warn!(?err, namespace = %self.namespace, "Stored bookings are unreadable, treating as empty");
                vec![]
            }
        }
    }

    fn save(&self, bookings: &[Booking]) -> Result<(), StorageError> {
        let data = serde_json::to_string(bookings)?;
        self.store.set(&self.namespace, &data).map_err(|err| {
            error!(?err, namespace = %self.namespace, "Failed to write bookings");
            err
        })
    }
}
