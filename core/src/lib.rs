//! Client core for the animal list service.
//!
//! # Overview
//! Lists animal records from a REST endpoint and adds, renames, and deletes
//! them, keeping an observable in-memory copy of the collection.
//!
//! # Design
//! - `AnimalClient` is stateless and sans-IO: `build_*` produces requests,
//!   `parse_*` consumes responses.
//! - `Transport` performs the round-trip; `UreqTransport` is the network
//!   implementation and tests inject fakes.
//! - `AnimalApi` runs round-trips off the caller's task and exposes async
//!   list/create/rename/delete.
//! - `AnimalStore` owns the collection and latest error, published through a
//!   watch channel; it changes only after the server confirms a write.
//! - `render` and `screen` turn store snapshots into rows and user input into
//!   store operations.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod render;
pub mod screen;
pub mod store;
pub mod transport;
pub mod types;

pub use api::AnimalApi;
pub use client::AnimalClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use render::{ListView, Row, RowAction, RowControl};
pub use screen::{FlowOutcome, ListScreen, Prompt};
pub use store::{AnimalStore, ErrorPolicy, StoreState};
pub use transport::{Transport, UreqTransport};
pub use types::{Animal, IdRange, RenameAnimal};
