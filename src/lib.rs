// ============================================================================
// docgate Library
// ============================================================================

//! REST gateway over a document store.
//!
//! Generic CRUD for any named collection, plus a course reservation workflow
//! that moves capacity (`Space`) from `courses` into `cart` entries.
//!
//! # Examples
//!
//! ```
//! use docgate::{AppState, ConnectionConfig, StoreConnection, build_router};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = StoreConnection::new(ConnectionConfig::from_url("memory://school")?);
//! connection.connect().await?;
//!
//! let app = build_router(AppState::new(connection));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod core;
pub mod reservation;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::core::{Document, ObjectId, Result, StoreError};
pub use storage::{CollectionHandle, DocumentStore, Filter, FindOptions, InMemoryStore, Update, UpdateOptions};

pub use connection::{StoreConnection, config::ConnectionConfig};
pub use reservation::{ReservationError, ReservationService};
pub use web::{ApiError, AppState, build_router};
