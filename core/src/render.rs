//! Stateless list view over a store snapshot.
//!
//! Rows are numbered from 1 in collection order. A full view is rebuilt on
//! every change; nothing is diffed.

use std::fmt;

use crate::store::StoreState;
use crate::types::Animal;

/// Per-row control a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    Edit,
    Delete,
}

/// What a row control resolves to, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Open the edit prompt for this record.
    Edit(Animal),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: usize,
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<Row>,
    pub status: Option<String>,
}

pub fn render(state: &StoreState) -> ListView {
    let rows = state
        .animals
        .iter()
        .enumerate()
        .map(|(i, animal)| Row {
            number: i + 1,
            id: animal.id,
            name: animal.name.clone(),
        })
        .collect();
    ListView {
        rows,
        status: state.error.clone(),
    }
}

/// Map a 1-based row number and control to an action. `None` when the row
/// does not exist.
pub fn resolve(animals: &[Animal], number: usize, control: RowControl) -> Option<RowAction> {
    let animal = animals.get(number.checked_sub(1)?)?;
    Some(match control {
        RowControl::Edit => RowAction::Edit(animal.clone()),
        RowControl::Delete => RowAction::Delete(animal.id),
    })
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "  (no animals)")?;
        }
        let width = self.rows.len().to_string().len();
        for row in &self.rows {
            writeln!(
                f,
                "  {:>width$}. {}    [e {n}] edit  [d {n}] delete",
                row.number,
                row.name,
                n = row.number,
            )?;
        }
        if let Some(status) = &self.status {
            writeln!(f, "  ! {status}")?;
        }
        Ok(())
    }
}
