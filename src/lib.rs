#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

extern crate nalgebra as na;
/// Re-export of the Rapier 3D physics engine.
///
/// Its geometry module provides the shapes bodies derive their mass properties from.
pub extern crate rapier3d as rapier;

/// Rigid-body dynamics: mass properties, environment resolution, integration and sleeping.
///
/// This module provides the per-body state and the per-tick operations the owning
/// [`PhysicsSpace`](crate::space::PhysicsSpace) drives.
pub mod dynamics;
/// Errors reported at the API boundary.
pub mod error;
/// Shapes attached to a rigid-body.
///
/// This module defines the [`BodyShape`](crate::shapes::BodyShape) collaborator trait and
/// the per-body shape set used to derive mass properties and swept bounds.
pub mod shapes;
/// The simulation space owning bodies, areas and constraints, and driving the step.
pub mod space;

pub use error::Error;

/// Mathematical types and utilities for physics simulation.
///
/// Re-exports Rapier's math types and defines the aliases specific to this crate.
pub mod math {
    /// Re-export all mathematical types from Rapier (vectors, matrices, etc.)
    pub use rapier::math::*;

    /// Angular inertia type for 3D simulations (3x3 matrix).
    pub type AngularInertia<N> = na::Matrix3<N>;

    /// Below this magnitude, angular velocities and rotation deltas are treated as zero.
    pub const ANGULAR_EPSILON: Real = 1.0e-5;
    /// Below this magnitude, gravity directions are treated as zero.
    pub const GRAVITY_EPSILON: Real = 1.0e-5;
}
