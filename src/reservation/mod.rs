//! Course reservation protocol.
//!
//! Reserving a place touches two collections:
//!
//! 1. `courses`: `Space` is decremented by a single conditional update that
//!    only matches while a whole unit is left (`Space >= 1`). The store
//!    evaluates the condition and applies the decrement atomically, so
//!    concurrent reservations can never drive `Space` below zero, fractional
//!    values included.
//! 2. `cart`: the entry keyed by `courseId` is incremented, or created with
//!    `quantity = 1` (upsert).
//!
//! Releasing runs the mirror image: `Space` is incremented, the cart entry
//! decremented without upsert, and an entry left at `quantity <= 0` is
//! removed by a conditional delete.
//!
//! # Consistency window
//!
//! Each step is atomic on its own document; the pair is not. If the process
//! dies, the client disconnects, or the second step fails after the first
//! succeeded, `Space` stays adjusted while the cart does not. Neither
//! `Space >= 0` nor `quantity > 0` can be violated by this, only the agreement
//! between the two collections. Failures of the second step are logged at
//! `warn` and returned as errors, never reported as success.

mod models;

pub use models::{CartEntry, Course};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{ObjectId, StoreError};
use crate::storage::{CollectionHandle, Filter, Update, UpdateOptions, UpdateResult};

pub const COURSES_COLLECTION: &str = "courses";
pub const CART_COLLECTION: &str = "cart";

pub const SPACE_FIELD: &str = "Space";
pub const NAME_FIELD: &str = "name";
pub const COURSE_ID_FIELD: &str = "courseId";
pub const QUANTITY_FIELD: &str = "quantity";

#[derive(Debug, Error)]
pub enum ReservationError {
    /// Course absent or `Space` exhausted. The two are indistinguishable to
    /// the conditional update.
    #[error("no capacity left for course {0}")]
    NoCapacity(ObjectId),

    #[error("course {0} not found")]
    CourseNotFound(ObjectId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ReservationResult<T> = std::result::Result<T, ReservationError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub course_id: ObjectId,
    /// `Space` after the decrement
    pub remaining_space: serde_json::Number,
    pub cart_result: UpdateResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub course_id: ObjectId,
    pub cart_result: UpdateResult,
    pub cart_entry_removed: bool,
}

/// Reservation workflow over explicitly resolved collection handles.
#[derive(Debug, Clone)]
pub struct ReservationService {
    courses: CollectionHandle,
    cart: CollectionHandle,
}

impl ReservationService {
    pub fn new(courses: CollectionHandle, cart: CollectionHandle) -> Self {
        Self { courses, cart }
    }

    /// Take one unit of capacity and add it to the cart.
    pub async fn reserve(&self, course_id: ObjectId) -> ReservationResult<Reservation> {
        let course_filter = Filter::by_id(course_id).gte(SPACE_FIELD, 1.0);
        let decrement = Update::new().inc(SPACE_FIELD, -1);

        let Some(updated) = self
            .courses
            .find_one_and_update(&course_filter, &decrement, UpdateOptions::default())
            .await?
        else {
            debug!(course_id = %course_id, "reservation refused, no capacity");
            return Err(ReservationError::NoCapacity(course_id));
        };
        let course = Course::from_document(&updated)?;

        let mut cart_update = Update::new().inc(QUANTITY_FIELD, 1);
        if let Some(name) = &course.name {
            cart_update = cart_update.set(NAME_FIELD, name.clone());
        }

        let cart_result = self
            .cart
            .update_one(&cart_entry_filter(course_id), &cart_update, UpdateOptions::upsert())
            .await
            .map_err(|err| {
                warn!(
                    course_id = %course_id,
                    error = %err,
                    "Space decremented but cart increment failed; collections disagree"
                );
                err
            })?;

        info!(course_id = %course_id, remaining_space = %course.space, "course reserved");
        Ok(Reservation {
            course_id,
            remaining_space: course.space,
            cart_result,
        })
    }

    /// Give one unit of capacity back and take it out of the cart.
    pub async fn release(&self, course_id: ObjectId) -> ReservationResult<Release> {
        let increment = Update::new().inc(SPACE_FIELD, 1);
        let course_result = self
            .courses
            .update_one(&Filter::by_id(course_id), &increment, UpdateOptions::default())
            .await?;
        if course_result.matched_count == 0 {
            return Err(ReservationError::CourseNotFound(course_id));
        }

        let entry_filter = cart_entry_filter(course_id);
        let decrement = Update::new().inc(QUANTITY_FIELD, -1);
        let cart_result = self
            .cart
            .update_one(&entry_filter, &decrement, UpdateOptions::default())
            .await
            .map_err(|err| {
                warn!(
                    course_id = %course_id,
                    error = %err,
                    "Space incremented but cart decrement failed; collections disagree"
                );
                err
            })?;

        let mut cart_entry_removed = false;
        if cart_result.matched_count == 1 {
            // Only delete while still drained; a reservation racing in between
            // will have brought the quantity back above zero.
            let drained = entry_filter.lte(QUANTITY_FIELD, 0.0);
            cart_entry_removed = self.cart.delete_one(&drained).await?.deleted_count == 1;
        } else {
            warn!(course_id = %course_id, "Space released without a matching cart entry");
        }

        info!(course_id = %course_id, cart_entry_removed, "course released");
        Ok(Release {
            course_id,
            cart_result,
            cart_entry_removed,
        })
    }

    pub async fn course(&self, course_id: ObjectId) -> ReservationResult<Option<Course>> {
        self.courses
            .find_one(&Filter::by_id(course_id))
            .await?
            .map(|doc| Course::from_document(&doc))
            .transpose()
            .map_err(ReservationError::from)
    }

    pub async fn cart_entry(&self, course_id: ObjectId) -> ReservationResult<Option<CartEntry>> {
        self.cart
            .find_one(&cart_entry_filter(course_id))
            .await?
            .map(|doc| CartEntry::from_document(&doc))
            .transpose()
            .map_err(ReservationError::from)
    }
}

fn cart_entry_filter(course_id: ObjectId) -> Filter {
    Filter::new().eq(COURSE_ID_FIELD, course_id.to_hex())
}
