//! Errors reported at the API boundary.
//!
//! Numerical degeneracies inside the integrator (empty shape sets, singular inertia,
//! zero-length rotations) are never reported here: they fall back silently to
//! well-defined physical values.

use crate::dynamics::{AreaHandle, BodyHandle, ConstraintHandle};
use crate::math::Real;

/// Errors returned by body and space operations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// A mass must be strictly positive.
    #[error("mass must be strictly positive, got {mass}")]
    NonPositiveMass {
        /// The rejected value.
        mass: Real,
    },
    /// The handle does not refer to a body of this space.
    #[error("unknown body: {0:?}")]
    UnknownBody(BodyHandle),
    /// The handle does not refer to an area of this space.
    #[error("unknown area: {0:?}")]
    UnknownArea(AreaHandle),
    /// The handle does not refer to a constraint of this space.
    #[error("unknown constraint: {0:?}")]
    UnknownConstraint(ConstraintHandle),
}
