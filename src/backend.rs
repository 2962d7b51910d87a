use crate::{errors::StorageError, types::Booking};

/// Storage adapter: the whole collection is read and rewritten as one value.
pub trait BookingBackend: Clone + Send + Sync + 'static {
    /// Returns the stored collection, or an empty one if nothing readable is stored.
    fn load(&self) -> Vec<Booking>;
    fn save(&self, bookings: &[Booking]) -> Result<(), StorageError>;
}
