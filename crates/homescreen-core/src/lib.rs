#![forbid(unsafe_code)]
//! homescreen-core library.
//!
//! Decodes home screen snapshots and fills in the user data that TODO items
//! need before a client can render them.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in the library, `anyhow::Result` for
//!   config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod model;
pub mod prompt;
pub mod timing;

pub use enrich::{Enricher, enrich_home_screen};
pub use error::{EnrichError, ErrorCode};
pub use lookup::{Context, EmailLookup, LookupError, PhoneNumberLookup};
pub use model::item::{
    HomeScreen, HomeScreenItem, ItemData, ItemKind, SnapshotError, TodoItem, TodoState, TodoType,
};
pub use model::record::{EmailRecord, PhoneNumberRecord};
