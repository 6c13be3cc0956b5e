//! List screen and the add/edit flows.
//!
//! # Design
//! Flows talk to the user only through [`Prompt`], so the terminal front end
//! and tests supply their own. Store operations started by a screen run as
//! tasks in the screen's `JoinSet`; deactivating the screen aborts them, and
//! dropping it does the same.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::render::{self, ListView, RowAction, RowControl};
use crate::store::{AnimalStore, StoreState};
use crate::types::{Animal, IdRange};

pub const EMPTY_NAME: &str = "Name cannot be empty";

/// One-line text input plus transient messages.
pub trait Prompt {
    /// Ask for a line of text, pre-filled with `initial`. `None` means the
    /// user cancelled.
    fn ask(&mut self, label: &str, initial: &str) -> Option<String>;

    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<T> {
    Submitted(T),
    /// Input failed validation; the user was told why.
    Rejected,
    Cancelled,
}

/// Ask for a name and pair it with a fresh id from `ids`.
pub fn add_flow(prompt: &mut dyn Prompt, ids: IdRange) -> FlowOutcome<Animal> {
    match read_name(prompt, "New animal name", "") {
        FlowOutcome::Submitted(name) => FlowOutcome::Submitted(Animal::new(ids.generate(), name)),
        FlowOutcome::Rejected => FlowOutcome::Rejected,
        FlowOutcome::Cancelled => FlowOutcome::Cancelled,
    }
}

/// Ask for a replacement name, starting from the current one. Submitting the
/// current name unchanged counts as a cancel.
pub fn edit_flow(prompt: &mut dyn Prompt, animal: &Animal) -> FlowOutcome<String> {
    match read_name(prompt, "Rename animal", &animal.name) {
        FlowOutcome::Submitted(name) if name == animal.name => FlowOutcome::Cancelled,
        outcome => outcome,
    }
}

fn read_name(prompt: &mut dyn Prompt, label: &str, initial: &str) -> FlowOutcome<String> {
    let Some(input) = prompt.ask(label, initial) else {
        return FlowOutcome::Cancelled;
    };
    let name = input.trim();
    if name.is_empty() {
        prompt.notify(EMPTY_NAME);
        return FlowOutcome::Rejected;
    }
    FlowOutcome::Submitted(name.to_string())
}

pub struct ListScreen {
    store: Arc<AnimalStore>,
    ids: IdRange,
    updates: watch::Receiver<StoreState>,
    tasks: JoinSet<Result<(), ApiError>>,
    /// Failures reaped from finished tasks since the last `settle`.
    failed: usize,
}

impl ListScreen {
    pub fn new(store: Arc<AnimalStore>, ids: IdRange) -> Self {
        let updates = store.subscribe();
        Self {
            store,
            ids,
            updates,
            tasks: JoinSet::new(),
            failed: 0,
        }
    }

    pub fn store(&self) -> &Arc<AnimalStore> {
        &self.store
    }

    /// Start loading the list.
    pub fn activate(&mut self) {
        self.spawn(|store| async move { store.refresh().await });
    }

    /// Abort every operation this screen started that has not finished.
    /// Their results never reach the store.
    pub fn deactivate(&mut self) {
        if !self.tasks.is_empty() {
            debug!(count = self.tasks.len(), "aborting in-flight operations");
        }
        self.tasks.abort_all();
    }

    pub fn refresh(&mut self) {
        self.spawn(|store| async move { store.refresh().await });
    }

    /// Run the add flow; on submit, start the create.
    pub fn add(&mut self, prompt: &mut dyn Prompt) -> FlowOutcome<Animal> {
        let outcome = add_flow(prompt, self.ids);
        if let FlowOutcome::Submitted(animal) = &outcome {
            let animal = animal.clone();
            self.spawn(move |store| async move { store.add(animal).await.map(|_| ()) });
        }
        outcome
    }

    /// Apply a row control. Returns `false` when row `number` does not exist.
    pub fn select(&mut self, number: usize, control: RowControl, prompt: &mut dyn Prompt) -> bool {
        let action = render::resolve(&self.updates.borrow().animals, number, control);
        match action {
            Some(RowAction::Edit(animal)) => {
                if let FlowOutcome::Submitted(name) = edit_flow(prompt, &animal) {
                    self.spawn(move |store| async move { store.rename(animal.id, &name).await });
                }
                true
            }
            Some(RowAction::Delete(id)) => {
                self.spawn(move |store| async move { store.remove(id).await });
                true
            }
            None => {
                prompt.notify(&format!("No row {number}"));
                false
            }
        }
    }

    /// Render the latest state and mark it seen.
    pub fn view(&mut self) -> ListView {
        render::render(&self.updates.borrow_and_update())
    }

    /// Wait for the next state change. `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.updates.changed().await.is_ok()
    }

    /// Operations started by this screen that have not finished yet.
    pub fn in_flight(&mut self) -> usize {
        self.reap();
        self.tasks.len()
    }

    /// Wait for every started operation; returns how many failed since the
    /// last call. Aborted operations are not counted.
    pub async fn settle(&mut self) -> usize {
        while let Some(joined) = self.tasks.join_next().await {
            self.record(joined);
        }
        std::mem::take(&mut self.failed)
    }

    /// Collect finished operations without waiting for the rest.
    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            self.record(joined);
        }
    }

    fn record(&mut self, joined: Result<Result<(), ApiError>, JoinError>) {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(error = %err, "screen operation failed");
                self.failed += 1;
            }
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                warn!(error = %err, "screen task panicked");
                self.failed += 1;
            }
        }
    }

    fn spawn<F, Fut>(&mut self, op: F)
    where
        F: FnOnce(Arc<AnimalStore>) -> Fut,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.reap();
        self.tasks.spawn(op(Arc::clone(&self.store)));
    }
}
