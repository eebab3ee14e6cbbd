//! Rigid-body dynamics (mass properties, forces, velocities, sleeping, etc.)

pub use area::{
    accumulate_area_overrides, Area, AreaGravity, AreaHandle, AreaMembership, AreaOverrideMode,
    AreaSet, Environment,
};
pub use body::{BodyChanges, BodyMode, LockedAxes, RigidBody};
pub use body_set::{BodyHandle, BodyList, BodyRegistries, BodySet};
pub use constraint::{Constraint, ConstraintHandle, ConstraintSet};
pub use params::SpaceParams;
pub use state::{BodyState, BodyStateObserver};

/// Force-field volumes and environment resolution.
pub mod area;
/// Rigid body definition and state accessors.
pub mod body;
/// Rigid body storage and registries.
pub mod body_set;
/// Constraint membership, used for wake propagation.
pub mod constraint;
/// Physics integration routines (force and velocity updates).
pub mod integrate;
/// Mass properties computation from shapes.
pub mod mass_properties;
/// Space-wide simulation parameters.
pub mod params;
/// Post-step state snapshots and observers.
pub mod state;

mod activation;
