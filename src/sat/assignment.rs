#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Variable assignment tracking for the SAT engine.
//!
//! Each variable is in one of three states: unassigned, true, or false.
//! The `Assignment` trait abstracts the storage so the engine can run over
//! either a dense vector (contiguous variable spaces, the common case) or a
//! hash map (sparse spaces such as the three-digit Sudoku encoding, where
//! only 729 of the 999 declared ids ever occur).

use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Solutions;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt::Debug;

/// The assignment state of a single propositional variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum VarState {
    /// No truth value yet.
    #[default]
    Unassigned,
    /// Fixed to the given truth value.
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::Assigned(true))
    }

    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::Assigned(false))
    }
}

impl From<VarState> for Option<bool> {
    fn from(s: VarState) -> Self {
        match s {
            VarState::Assigned(b) => Some(b),
            VarState::Unassigned => None,
        }
    }
}

impl From<Option<bool>> for VarState {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Self::Unassigned, VarState::Assigned)
    }
}

/// Storage-agnostic interface over the assignment vector.
///
/// Variables are 1-based; implementations must treat every id in
/// `1..=num_vars` as a valid, initially unassigned variable.
pub trait Assignment: Debug + Clone {
    /// Creates an assignment manager for variables `1..=num_vars`, all
    /// unassigned.
    fn new(num_vars: usize) -> Self;

    /// The number of variables managed (the declared `V`).
    fn num_vars(&self) -> usize;

    /// The state of `var`.
    fn state(&self, var: Variable) -> VarState;

    /// Fixes `var` to `value`.
    fn set(&mut self, var: Variable, value: bool);

    /// Returns `var` to the unassigned state.
    fn unassign(&mut self, var: Variable);

    /// Returns every variable to the unassigned state.
    fn reset(&mut self);

    fn is_assigned(&self, var: Variable) -> bool {
        self.state(var).is_assigned()
    }

    fn var_value(&self, var: Variable) -> Option<bool> {
        self.state(var).into()
    }

    /// Fixes the variable of `lit` so that `lit` evaluates true.
    fn assign_literal(&mut self, lit: impl Literal) {
        self.set(lit.variable(), lit.polarity());
    }

    /// The truth value of `lit` under the current assignment, or `None`
    /// while its variable is unassigned.
    fn literal_value(&self, lit: impl Literal) -> Option<bool> {
        self.var_value(lit.variable()).map(|b| b == lit.polarity())
    }

    fn all_assigned(&self) -> bool {
        #[allow(clippy::cast_possible_truncation)]
        let num_vars = self.num_vars() as Variable;
        (1..=num_vars).all(|v| self.is_assigned(v))
    }

    /// Iterates the unassigned variables in ascending order.
    fn unassigned(&self) -> impl Iterator<Item = Variable> {
        #[allow(clippy::cast_possible_truncation)]
        let num_vars = self.num_vars() as Variable;
        (1..=num_vars).filter(move |&v| !self.is_assigned(v))
    }

    /// The currently assigned variables as a set of satisfied DIMACS
    /// literals. Unassigned variables are absent (don't-care).
    fn solutions(&self) -> Solutions {
        #[allow(clippy::cast_possible_truncation)]
        let num_vars = self.num_vars() as Variable;
        #[allow(clippy::cast_possible_wrap)]
        let literals = (1..=num_vars)
            .filter_map(|v| match self.state(v) {
                VarState::Assigned(true) => Some(v as i32),
                VarState::Assigned(false) => Some(-(v as i32)),
                VarState::Unassigned => None,
            })
            .collect_vec();
        Solutions::new(&literals)
    }
}

/// Dense assignment over a `Vec<VarState>`.
///
/// Slot 0 exists but is never used, so that variable ids index directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VecAssignment {
    states: Vec<VarState>,
}

impl Assignment for VecAssignment {
    fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars + 1],
        }
    }

    fn num_vars(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    fn state(&self, var: Variable) -> VarState {
        self.states[var as usize]
    }

    fn set(&mut self, var: Variable, value: bool) {
        self.states[var as usize] = VarState::Assigned(value);
    }

    fn unassign(&mut self, var: Variable) {
        self.states[var as usize] = VarState::Unassigned;
    }

    fn reset(&mut self) {
        self.states.fill(VarState::Unassigned);
    }
}

/// Sparse assignment over an `FxHashMap`.
///
/// Only variables that have been touched occupy memory; anything absent
/// from the map reads as unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapAssignment {
    map: FxHashMap<Variable, bool>,
    num_vars: usize,
}

impl Assignment for MapAssignment {
    fn new(num_vars: usize) -> Self {
        Self {
            map: FxHashMap::default(),
            num_vars,
        }
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn state(&self, var: Variable) -> VarState {
        self.map.get(&var).copied().into()
    }

    fn set(&mut self, var: Variable, value: bool) {
        self.map.insert(var, value);
    }

    fn unassign(&mut self, var: Variable) {
        self.map.remove(&var);
    }

    fn reset(&mut self) {
        self.map.clear();
    }
}
