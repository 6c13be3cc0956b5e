//! Observable holder of the animal collection and the latest error message.
//!
//! # Design
//! State lives in a `tokio::sync::watch` channel. Every mutation goes through
//! `send_modify`/`send_if_modified`, which serializes writers, so completions
//! landing from concurrent requests never race on the collection.
//!
//! The collection only changes after the server confirms an operation:
//! - refresh replaces it (non-empty responses only),
//! - remove filters the deleted id out,
//! - add appends the record the server stored,
//! - rename does not touch it locally and reloads instead.
//!
//! Refreshes carry a generation number. A refresh response older than the
//! newest one already applied is discarded, and so is its failure message.
//! Writes are never discarded:
//! each one reports a mutation the server has already made.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::AnimalApi;
use crate::error::ApiError;
use crate::types::Animal;

pub const NO_ANIMALS_LEFT: &str = "No animals left";
pub const DELETE_FAILED: &str = "Failed to delete animal.";
pub const UPDATE_FAILED: &str = "Failed to update animal.";
pub const ADD_FAILED: &str = "Failed to add animal.";
pub const LOAD_FAILED: &str = "Failed to load animals.";

/// Which failures reach the observable error slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Only delete and update failures are reported; load and add failures
    /// are logged and otherwise silent.
    Legacy,
    /// Every failed operation reports a message.
    #[default]
    Unified,
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub animals: Vec<Animal>,
    /// Latest message only; each new error overwrites the previous one.
    pub error: Option<String>,
}

pub struct AnimalStore {
    api: AnimalApi,
    policy: ErrorPolicy,
    state: watch::Sender<StoreState>,
    issued_refreshes: AtomicU64,
    applied_refresh: AtomicU64,
}

impl AnimalStore {
    pub fn new(api: AnimalApi, policy: ErrorPolicy) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            policy,
            state,
            issued_refreshes: AtomicU64::new(0),
            applied_refresh: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Reload the collection from the server.
    ///
    /// An empty response keeps the current collection. A failed one keeps it
    /// too and, under [`ErrorPolicy::Unified`], reports [`LOAD_FAILED`]
    /// unless a newer refresh has already been applied.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let generation = self.issued_refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.list().await {
            Ok(animals) if animals.is_empty() => {
                warn!(generation, "fetched animals is empty, keeping current list");
                Ok(())
            }
            Ok(animals) => {
                let count = animals.len();
                let applied = self.state.send_if_modified(|state| {
                    if generation <= self.applied_refresh.load(Ordering::SeqCst) {
                        return false;
                    }
                    self.applied_refresh.store(generation, Ordering::SeqCst);
                    state.animals = animals;
                    true
                });
                if applied {
                    info!(generation, count, "fetched animals");
                } else {
                    debug!(generation, "discarding stale refresh");
                }
                Ok(())
            }
            Err(err) => {
                warn!(generation, error = %err, "fetching animals failed");
                if self.policy == ErrorPolicy::Unified {
                    let reported = self.state.send_if_modified(|state| {
                        if generation <= self.applied_refresh.load(Ordering::SeqCst) {
                            return false;
                        }
                        state.error = Some(LOAD_FAILED.to_string());
                        true
                    });
                    if !reported {
                        debug!(generation, "newer refresh already applied, not reporting");
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        match self.api.delete(id).await {
            Ok(()) => {
                self.state.send_modify(|state| {
                    state.animals.retain(|animal| animal.id != id);
                    if state.animals.is_empty() {
                        state.error = Some(NO_ANIMALS_LEFT.to_string());
                    }
                });
                info!(id, "deleted animal");
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, "deleting animal failed");
                self.report(DELETE_FAILED);
                Err(err)
            }
        }
    }

    /// Rename on the server, then reload. The local list is never patched.
    pub async fn rename(&self, id: i64, name: &str) -> Result<(), ApiError> {
        match self.api.rename(id, name).await {
            Ok(()) => {
                info!(id, name, "renamed animal, reloading");
                if let Err(err) = self.refresh().await {
                    debug!(id, error = %err, "reload after rename failed");
                }
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, "updating animal failed");
                self.report(UPDATE_FAILED);
                Err(err)
            }
        }
    }

    /// Create on the server and append the stored record, whose id may
    /// differ from `animal.id` if the server assigned its own.
    pub async fn add(&self, animal: Animal) -> Result<Animal, ApiError> {
        match self.api.create(&animal).await {
            Ok(stored) => {
                let appended = stored.clone();
                self.state.send_modify(|state| state.animals.push(appended));
                info!(id = stored.id, name = %stored.name, "added animal");
                Ok(stored)
            }
            Err(err) => {
                error!(id = animal.id, error = %err, "failed to add animal");
                self.report_unified(ADD_FAILED);
                Err(err)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    fn report(&self, message: &str) {
        self.state
            .send_modify(|state| state.error = Some(message.to_string()));
    }

    fn report_unified(&self, message: &str) {
        if self.policy == ErrorPolicy::Unified {
            self.report(message);
        }
    }
}
