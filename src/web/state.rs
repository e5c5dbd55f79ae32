use crate::connection::StoreConnection;
use crate::core::Result;
use crate::reservation::{CART_COLLECTION, COURSES_COLLECTION, ReservationService};

#[derive(Clone)]
pub struct AppState {
    pub connection: StoreConnection,
}

impl AppState {
    pub fn new(connection: StoreConnection) -> Self {
        Self { connection }
    }

    /// Reservation workflow bound to the `courses` and `cart` collections.
    pub fn reservations(&self) -> Result<ReservationService> {
        Ok(ReservationService::new(
            self.connection.collection(COURSES_COLLECTION)?,
            self.connection.collection(CART_COLLECTION)?,
        ))
    }
}
