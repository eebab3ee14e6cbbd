//! Constraints linking bodies together.
//!
//! The integrator doesn't solve constraints: it only needs to know which bodies share one,
//! to propagate wakeups.

use rapier::data::{Arena, Index};

use crate::dynamics::{BodyHandle, RigidBody};

/// The handle of a constraint in a [`ConstraintSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(pub Index);

/// A constraint between bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    bodies: Vec<BodyHandle>,
}

impl Constraint {
    pub(crate) fn new(bodies: Vec<BodyHandle>) -> Self {
        Self { bodies }
    }

    /// The constrained bodies. A body's index in this slice is its role in the constraint.
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Does this constraint involve `body`?
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.bodies.contains(&body)
    }
}

/// A set of constraints.
#[derive(Clone, Default)]
pub struct ConstraintSet {
    constraints: Arena<Constraint>,
}

impl ConstraintSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constraints in this set.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.constraints.len() == 0
    }

    pub(crate) fn insert(&mut self, constraint: Constraint) -> ConstraintHandle {
        ConstraintHandle(self.constraints.insert(constraint))
    }

    pub(crate) fn remove(&mut self, handle: ConstraintHandle) -> Option<Constraint> {
        self.constraints.remove(handle.0)
    }

    /// The constraint with the given handle.
    pub fn get(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle.0)
    }

    /// Iterates through all the constraints.
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintHandle, &Constraint)> {
        self.constraints
            .iter()
            .map(|(i, constraint)| (ConstraintHandle(i), constraint))
    }
}

impl RigidBody {
    pub(crate) fn add_constraint(&mut self, constraint: ConstraintHandle, role: usize) {
        self.constraints.push((constraint, role));
    }

    pub(crate) fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        self.constraints.retain(|(c, _)| *c != constraint);
    }
}
