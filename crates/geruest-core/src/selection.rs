//! Facade selection state machine
//!
//! Lives for one address session. Loading a new facade collection always resets
//! the selection to every selectable facade.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{GeruestError, Result};
use crate::models::FacadeSide;

/// Observable state of a [`FacadeSelection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    /// No facades loaded for the current address
    Empty,
    /// Default selection: every selectable facade
    Default,
    /// The user changed the selection
    Modified,
}

/// Set of selected facade indices, constrained to the loaded collection
#[derive(Debug, Clone, Default)]
pub struct FacadeSelection {
    sides: Vec<FacadeSide>,
    eligible: BTreeSet<usize>,
    selected: BTreeSet<usize>,
    modified: bool,
}

impl FacadeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the facade collection wholesale and select every selectable facade
    pub fn load(&mut self, sides: Vec<FacadeSide>) {
        self.eligible = sides.iter().filter(|s| s.is_selectable()).map(|s| s.index).collect();
        self.selected = self.eligible.clone();
        self.sides = sides;
        self.modified = false;

        tracing::debug!(
            sides = self.sides.len(),
            eligible = self.eligible.len(),
            "Loaded facade collection"
        );
    }

    /// Forget the facade collection (address changed)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Flip membership of a facade
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        if !self.eligible.contains(&index) {
            return Err(GeruestError::InvalidFacadeIndex { index });
        }

        let now_selected = if self.selected.remove(&index) {
            false
        } else {
            self.selected.insert(index);
            true
        };
        self.modified = true;
        Ok(now_selected)
    }

    /// Replace the selection with an explicit index list
    pub fn set(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        let requested: BTreeSet<usize> = indices.into_iter().collect();
        if let Some(invalid) = requested.iter().find(|i| !self.eligible.contains(i)) {
            return Err(GeruestError::InvalidFacadeIndex { index: *invalid });
        }

        self.selected = requested;
        self.modified = true;
        Ok(())
    }

    /// Reset to every selectable facade
    pub fn select_all(&mut self) {
        self.selected = self.eligible.clone();
        self.modified = false;
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.modified = true;
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn state(&self) -> SelectionState {
        if self.sides.is_empty() {
            SelectionState::Empty
        } else if self.modified {
            SelectionState::Modified
        } else {
            SelectionState::Default
        }
    }

    /// Selected indices in ascending order
    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Every loaded facade, selectable or not
    pub fn sides(&self) -> &[FacadeSide] {
        &self.sides
    }

    /// Facades that can be selected
    pub fn selectable_sides(&self) -> impl Iterator<Item = &FacadeSide> {
        self.sides.iter().filter(|s| self.eligible.contains(&s.index))
    }

    /// Selected facades in collection order
    pub fn selected_sides(&self) -> impl Iterator<Item = &FacadeSide> {
        self.sides.iter().filter(|s| self.selected.contains(&s.index))
    }
}
