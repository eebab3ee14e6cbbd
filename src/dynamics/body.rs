//! Rigid-body definition.

use crate::dynamics::area::{AreaMembership, Environment};
use crate::dynamics::constraint::ConstraintHandle;
use crate::dynamics::state::BodyStateObserver;
use crate::dynamics::BodyHandle;
use crate::error::Error;
use crate::math::{AngVector, AngularInertia, Isometry, Point, Real, Rotation, Vector};
use crate::shapes::{BodyShape, ShapeSet};

/// How a rigid-body takes part in the simulation.
///
/// Variants are ordered: every mode greater or equal to [`BodyMode::Dynamic`] responds to
/// forces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyMode {
    /// Never moves and is never part of the active set.
    #[default]
    Static,
    /// Moved by setting a target transform; its velocity is derived from the motion.
    Kinematic,
    /// Moved by forces, with both linear and rotational response.
    Dynamic,
    /// Moved by forces, without any rotational response.
    DynamicLinearOnly,
}

impl BodyMode {
    /// Is this [`BodyMode::Static`]?
    pub fn is_static(self) -> bool {
        self == BodyMode::Static
    }

    /// Is this [`BodyMode::Kinematic`]?
    pub fn is_kinematic(self) -> bool {
        self == BodyMode::Kinematic
    }

    /// Does this mode respond to forces?
    pub fn is_dynamic(self) -> bool {
        self >= BodyMode::Dynamic
    }

    /// Does this mode respond to torques?
    pub fn has_rotational_response(self) -> bool {
        self == BodyMode::Dynamic
    }
}

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    /// Translational and rotational axes along which a rigid-body is prevented from moving.
    pub struct LockedAxes: u8 {
        /// Flag indicating that the rigid-body cannot translate along the `X` axis.
        const TRANSLATION_X = 1 << 0;
        /// Flag indicating that the rigid-body cannot translate along the `Y` axis.
        const TRANSLATION_Y = 1 << 1;
        /// Flag indicating that the rigid-body cannot translate along the `Z` axis.
        const TRANSLATION_Z = 1 << 2;
        /// Flag indicating that the rigid-body cannot rotate along the `X` axis.
        const ROTATION_X = 1 << 3;
        /// Flag indicating that the rigid-body cannot rotate along the `Y` axis.
        const ROTATION_Y = 1 << 4;
        /// Flag indicating that the rigid-body cannot rotate along the `Z` axis.
        const ROTATION_Z = 1 << 5;
        /// Flag indicating that the rigid-body cannot translate along any direction.
        const TRANSLATION = Self::TRANSLATION_X.bits() | Self::TRANSLATION_Y.bits() | Self::TRANSLATION_Z.bits();
        /// Flag indicating that the rigid-body cannot rotate along any direction.
        const ROTATION = Self::ROTATION_X.bits() | Self::ROTATION_Y.bits() | Self::ROTATION_Z.bits();
    }
}

impl LockedAxes {
    /// The translation lock flag for the axis `i` (0, 1 or 2).
    pub fn translation_axis(i: usize) -> Self {
        Self::from_bits_truncate(1 << i)
    }

    /// The rotation lock flag for the axis `i` (0, 1 or 2).
    pub fn rotation_axis(i: usize) -> Self {
        Self::from_bits_truncate(1 << (i + 3))
    }
}

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    /// Flags describing which registrations a body requests from its space.
    ///
    /// Bodies never touch the space registries themselves: they record what changed and the
    /// space serializes the resulting registrations.
    pub struct BodyChanges: u8 {
        /// The body is already in its set's modified list.
        const MODIFIED        = 1 << 0;
        /// The active flag changed.
        const ACTIVATION      = 1 << 1;
        /// The mass properties must be recomputed before they are next read.
        const MASS_PROPERTIES = 1 << 2;
        /// The body has observers that must be notified at the end of the step.
        const STATE_QUERY     = 1 << 3;
        /// The dynamic bodies sharing a constraint with this body must be woken up.
        const NEIGHBOURS      = 1 << 4;
    }
}

/// A rigid-body: its mass properties, velocities, pending forces and sleep state.
///
/// Static bodies are the default. Every field derived from the mass properties (inverse mass,
/// inverse inertia, center-of-mass) is read-only; setters only flag them for recomputation.
pub struct RigidBody {
    pub(crate) handle: Option<BodyHandle>,
    pub(crate) changes: BodyChanges,
    pub(crate) mode: BodyMode,
    pub(crate) first_time_kinematic: bool,

    pub(crate) mass: Real,
    /// Per-axis inertia override, non-positive components are computed from the shapes.
    pub(crate) inertia: Vector<Real>,
    pub(crate) compute_inertia: bool,
    pub(crate) compute_center_of_mass: bool,
    pub(crate) center_of_mass_local: Point<Real>,
    pub(crate) center_of_mass_world: Point<Real>,
    pub(crate) principal_inertia_axes_local: Rotation<Real>,
    pub(crate) principal_inertia_axes_world: Rotation<Real>,
    pub(crate) inv_mass: Real,
    pub(crate) inv_inertia_diag: Vector<Real>,
    pub(crate) inv_inertia_tensor_world: AngularInertia<Real>,

    pub(crate) transform: Isometry<Real>,
    pub(crate) kinematic_target: Isometry<Real>,
    pub(crate) linear_velocity: Vector<Real>,
    pub(crate) angular_velocity: AngVector<Real>,
    pub(crate) constant_linear_velocity: Vector<Real>,
    pub(crate) constant_angular_velocity: AngVector<Real>,
    pub(crate) biased_linear_velocity: Vector<Real>,
    pub(crate) biased_angular_velocity: AngVector<Real>,
    pub(crate) applied_force: Vector<Real>,
    pub(crate) applied_torque: AngVector<Real>,
    pub(crate) locked_axes: LockedAxes,

    pub(crate) gravity_scale: Real,
    pub(crate) linear_damp: Real,
    pub(crate) angular_damp: Real,
    pub(crate) environment: Environment,
    pub(crate) omit_force_integration: bool,
    pub(crate) ccd_enabled: bool,

    pub(crate) active: bool,
    pub(crate) can_sleep: bool,
    pub(crate) still_time: Real,
    pub(crate) contact_count: usize,
    pub(crate) last_step: Real,

    pub(crate) areas: Vec<AreaMembership>,
    pub(crate) constraints: Vec<(ConstraintHandle, usize)>,
    pub(crate) shapes: ShapeSet,
    pub(crate) observers: Vec<Box<dyn BodyStateObserver>>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// A static body with unit mass, no shapes, outside of any space.
    pub fn new() -> Self {
        Self {
            handle: None,
            changes: BodyChanges::empty(),
            mode: BodyMode::Static,
            first_time_kinematic: false,
            mass: 1.0,
            inertia: Vector::zeros(),
            compute_inertia: true,
            compute_center_of_mass: true,
            center_of_mass_local: Point::origin(),
            center_of_mass_world: Point::origin(),
            principal_inertia_axes_local: Rotation::identity(),
            principal_inertia_axes_world: Rotation::identity(),
            inv_mass: 0.0,
            inv_inertia_diag: Vector::zeros(),
            inv_inertia_tensor_world: AngularInertia::zeros(),
            transform: Isometry::identity(),
            kinematic_target: Isometry::identity(),
            linear_velocity: Vector::zeros(),
            angular_velocity: AngVector::zeros(),
            constant_linear_velocity: Vector::zeros(),
            constant_angular_velocity: AngVector::zeros(),
            biased_linear_velocity: Vector::zeros(),
            biased_angular_velocity: AngVector::zeros(),
            applied_force: Vector::zeros(),
            applied_torque: AngVector::zeros(),
            locked_axes: LockedAxes::empty(),
            gravity_scale: 1.0,
            linear_damp: -1.0,
            angular_damp: -1.0,
            environment: Environment::default(),
            omit_force_integration: false,
            ccd_enabled: false,
            active: false,
            can_sleep: true,
            still_time: 0.0,
            contact_count: 0,
            last_step: 0.0,
            areas: Vec::new(),
            constraints: Vec::new(),
            shapes: ShapeSet::default(),
            observers: Vec::new(),
        }
    }

    /// A body of the given `mode` and `mass`, outside of any space.
    pub fn with_mode(mode: BodyMode, mass: Real) -> Result<Self, Error> {
        let mut body = Self::new();
        body.set_mass(mass)?;
        body.set_mode(mode);
        Ok(body)
    }

    /// The handle of this body in its space, if it is attached to one.
    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    /// Takes the pending changes. The mass-properties flag stays set until the recomputation.
    pub(crate) fn take_changes(&mut self) -> BodyChanges {
        let changes = self.changes;
        self.changes &= BodyChanges::MASS_PROPERTIES;
        changes
    }

    pub(crate) fn on_space_attached(&mut self, handle: BodyHandle) {
        self.handle = Some(handle);
        self.mass_properties_changed();
        self.active = !self.mode.is_static();
        self.changes |= BodyChanges::ACTIVATION;
    }

    pub(crate) fn on_space_detached(&mut self) {
        self.handle = None;
        self.changes = BodyChanges::empty();
        self.areas.clear();
        self.constraints.clear();
    }

    /*
     * Mode.
     */
    /// The current body mode.
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    /// Changes the body mode, resetting the state that doesn't apply to the new mode.
    pub fn set_mode(&mut self, mode: BodyMode) {
        let prev = self.mode;
        self.mode = mode;

        match mode {
            BodyMode::Static | BodyMode::Kinematic => {
                self.inv_mass = 0.0;
                self.inv_inertia_diag = Vector::zeros();
                self.set_active(mode.is_kinematic() && self.contact_count > 0);
                self.linear_velocity = Vector::zeros();
                self.angular_velocity = AngVector::zeros();
                if mode.is_kinematic() && prev != mode {
                    self.first_time_kinematic = true;
                }
                self.kinematic_target = self.transform;
                self.update_transform_dependent();
            }
            BodyMode::Dynamic => {
                self.inv_mass = inv(self.mass);
                if !self.compute_inertia {
                    self.principal_inertia_axes_local = Rotation::identity();
                    self.inv_inertia_diag = self.inertia.map(inv);
                    self.update_transform_dependent();
                }
                self.mass_properties_changed();
                self.set_active(true);
            }
            BodyMode::DynamicLinearOnly => {
                self.inv_mass = inv(self.mass);
                self.inv_inertia_diag = Vector::zeros();
                self.angular_velocity = AngVector::zeros();
                self.update_transform_dependent();
                self.set_active(true);
            }
        }
    }

    /*
     * Mass properties.
     */
    /// The mass of this body.
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// Sets the mass of this body.
    ///
    /// Non-positive masses are rejected and leave the body unchanged.
    pub fn set_mass(&mut self, mass: Real) -> Result<(), Error> {
        if !(mass > 0.0) {
            log::warn!("rejected non-positive rigid-body mass {mass}");
            return Err(Error::NonPositiveMass { mass });
        }

        self.mass = mass;
        if self.mode.is_dynamic() {
            self.inv_mass = inv(mass);
            self.mass_properties_changed();
        }
        Ok(())
    }

    /// The principal angular inertia of this body.
    ///
    /// This is zero for every mode other than [`BodyMode::Dynamic`].
    pub fn inertia(&self) -> Vector<Real> {
        if self.mode == BodyMode::Dynamic {
            self.inv_inertia_diag.map(inv)
        } else {
            Vector::zeros()
        }
    }

    /// Overrides the principal angular inertia of this body.
    ///
    /// If every component is positive the override applies as-is, along the body's local
    /// axes. Otherwise the positive components replace the matching diagonal entries of the
    /// inertia tensor computed from the shapes.
    pub fn set_inertia(&mut self, inertia: Vector<Real>) {
        self.inertia = inertia;

        if inertia.iter().any(|c| *c <= 0.0) {
            self.compute_inertia = true;
            if self.mode == BodyMode::Dynamic {
                self.mass_properties_changed();
            }
        } else {
            self.compute_inertia = false;
            if self.mode == BodyMode::Dynamic {
                self.principal_inertia_axes_local = Rotation::identity();
                self.inv_inertia_diag = inertia.map(inv);
                self.update_transform_dependent();
            }
        }
    }

    /// The center-of-mass, in the body's local frame.
    pub fn center_of_mass_local(&self) -> Point<Real> {
        self.center_of_mass_local
    }

    /// The center-of-mass, in world-space.
    pub fn center_of_mass(&self) -> Point<Real> {
        self.center_of_mass_world
    }

    /// Overrides the local center-of-mass, disabling its computation from the shapes.
    pub fn set_center_of_mass(&mut self, center_of_mass: Point<Real>) {
        self.compute_center_of_mass = false;
        self.center_of_mass_local = center_of_mass;
        self.update_transform_dependent();
        self.mass_properties_changed();
    }

    /// Discards the inertia and center-of-mass overrides.
    pub fn reset_mass_properties(&mut self) {
        self.compute_inertia = true;
        self.compute_center_of_mass = true;
        self.mass_properties_changed();
    }

    /// The inverse mass, zero for static and kinematic bodies.
    pub fn inv_mass(&self) -> Real {
        self.inv_mass
    }

    /// The inverse principal inertia, in the principal inertia frame.
    pub fn inv_inertia_diag(&self) -> Vector<Real> {
        self.inv_inertia_diag
    }

    /// The world-space inverse angular inertia tensor.
    pub fn inv_inertia_tensor(&self) -> &AngularInertia<Real> {
        &self.inv_inertia_tensor_world
    }

    /// The principal inertia axes, relative to the body.
    pub fn principal_inertia_axes_local(&self) -> Rotation<Real> {
        self.principal_inertia_axes_local
    }

    /// The principal inertia axes, in world-space.
    pub fn principal_inertia_axes(&self) -> Rotation<Real> {
        self.principal_inertia_axes_world
    }

    pub(crate) fn mass_properties_changed(&mut self) {
        if self.compute_inertia || self.compute_center_of_mass {
            self.changes |= BodyChanges::MASS_PROPERTIES;
        }
    }

    /// Does this body wait for a mass-properties recomputation?
    pub fn needs_mass_properties_update(&self) -> bool {
        self.changes.contains(BodyChanges::MASS_PROPERTIES)
    }

    pub(crate) fn update_transform_dependent(&mut self) {
        self.center_of_mass_world = self.transform * self.center_of_mass_local;
        self.principal_inertia_axes_world =
            self.transform.rotation * self.principal_inertia_axes_local;

        let axes = self.principal_inertia_axes_world.to_rotation_matrix();
        let axes = axes.matrix();
        self.inv_inertia_tensor_world =
            axes * AngularInertia::from_diagonal(&self.inv_inertia_diag) * axes.transpose();
    }

    /*
     * Shapes.
     */
    /// The shapes attached to this body.
    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    /// Attaches a shape at the given pose relative to the body, returning its index.
    pub fn add_shape(&mut self, shape: impl BodyShape + 'static, pose: Isometry<Real>) -> usize {
        let index = self.shapes.push(shape, pose);
        self.mass_properties_changed();
        index
    }

    /// Detaches the shape at `index`.
    pub fn remove_shape(&mut self, index: usize) -> bool {
        let removed = self.shapes.remove(index).is_some();
        if removed {
            self.mass_properties_changed();
        }
        removed
    }

    /// Enables or disables the shape at `index`.
    pub fn set_shape_disabled(&mut self, index: usize, disabled: bool) {
        if self.shapes.set_disabled(index, disabled) {
            self.mass_properties_changed();
        }
    }

    /// Moves the shape at `index` relative to the body.
    pub fn set_shape_pose(&mut self, index: usize, pose: Isometry<Real>) {
        if self.shapes.set_pose(index, pose) {
            self.mass_properties_changed();
        }
    }

    /*
     * Transform and velocities.
     */
    /// The world-space transform of this body.
    pub fn transform(&self) -> &Isometry<Real> {
        &self.transform
    }

    /// The transform a kinematic body will move to at the next velocity integration.
    pub fn kinematic_target(&self) -> &Isometry<Real> {
        &self.kinematic_target
    }

    /// Sets the world-space transform of this body.
    ///
    /// Kinematic bodies only record it as their target (except for the first write after
    /// becoming kinematic) and reach it at the next velocity integration. Static and kinematic
    /// bodies wake up the bodies they share constraints with.
    pub fn set_transform(&mut self, transform: Isometry<Real>) {
        match self.mode {
            BodyMode::Kinematic => {
                self.kinematic_target = transform;
                self.set_active(true);
                self.changes |= BodyChanges::NEIGHBOURS;
                if self.first_time_kinematic {
                    self.transform = transform;
                    self.first_time_kinematic = false;
                    self.update_transform_dependent();
                }
            }
            BodyMode::Static => {
                self.transform = transform;
                self.kinematic_target = transform;
                self.update_transform_dependent();
                self.changes |= BodyChanges::NEIGHBOURS;
            }
            BodyMode::Dynamic | BodyMode::DynamicLinearOnly => {
                let mut transform = transform;
                transform.rotation.renormalize();
                if transform == self.transform {
                    return;
                }
                self.transform = transform;
                self.kinematic_target = transform;
                self.update_transform_dependent();
            }
        }

        self.wakeup();
    }

    /// The linear velocity of this body.
    pub fn linear_velocity(&self) -> &Vector<Real> {
        &self.linear_velocity
    }

    /// Sets the linear velocity (and constant kinematic linear velocity) of this body.
    pub fn set_linear_velocity(&mut self, velocity: Vector<Real>) {
        self.linear_velocity = velocity;
        self.constant_linear_velocity = velocity;
        self.wakeup();
    }

    /// The angular velocity of this body.
    pub fn angular_velocity(&self) -> &AngVector<Real> {
        &self.angular_velocity
    }

    /// Sets the angular velocity (and constant kinematic angular velocity) of this body.
    pub fn set_angular_velocity(&mut self, velocity: AngVector<Real>) {
        self.angular_velocity = velocity;
        self.constant_angular_velocity = velocity;
        self.wakeup();
    }

    /// The user-set linear velocity a kinematic body keeps on top of its target motion.
    pub fn constant_linear_velocity(&self) -> &Vector<Real> {
        &self.constant_linear_velocity
    }

    /// The user-set angular velocity a kinematic body keeps on top of its target motion.
    pub fn constant_angular_velocity(&self) -> &AngVector<Real> {
        &self.constant_angular_velocity
    }

    /// The linear bias velocity injected by the constraints solver this step.
    pub fn biased_linear_velocity(&self) -> &Vector<Real> {
        &self.biased_linear_velocity
    }

    /// The angular bias velocity injected by the constraints solver this step.
    pub fn biased_angular_velocity(&self) -> &AngVector<Real> {
        &self.biased_angular_velocity
    }

    /// Adds a positional-correction velocity, applied once at the next velocity integration.
    pub fn apply_bias_velocity(&mut self, linear: Vector<Real>, angular: AngVector<Real>) {
        self.biased_linear_velocity += linear;
        self.biased_angular_velocity += angular;
    }

    /// The velocity of the material point of this body currently at `point` (world-space).
    pub fn velocity_at_point(&self, point: &Point<Real>) -> Vector<Real> {
        self.linear_velocity + self.angular_velocity.cross(&(*point - self.center_of_mass_world))
    }

    /*
     * Forces.
     */
    /// The force accumulated since the last force integration.
    pub fn applied_force(&self) -> &Vector<Real> {
        &self.applied_force
    }

    /// The torque accumulated since the last force integration.
    pub fn applied_torque(&self) -> &AngVector<Real> {
        &self.applied_torque
    }

    /// Adds a force applied at the center-of-mass for the next step.
    pub fn apply_force(&mut self, force: Vector<Real>) {
        self.applied_force += force;
        self.wakeup();
    }

    /// Adds a torque for the next step.
    pub fn apply_torque(&mut self, torque: AngVector<Real>) {
        self.applied_torque += torque;
        self.wakeup();
    }

    /// Adds a force applied at the world-space `point` for the next step.
    pub fn apply_force_at_point(&mut self, force: Vector<Real>, point: Point<Real>) {
        self.applied_force += force;
        self.applied_torque += (point - self.center_of_mass_world).cross(&force);
        self.wakeup();
    }

    /// Instantly changes the linear velocity by an impulse applied at the center-of-mass.
    pub fn apply_impulse(&mut self, impulse: Vector<Real>) {
        self.linear_velocity += impulse * self.inv_mass;
        self.wakeup();
    }

    /// Instantly changes the angular velocity by an angular impulse.
    pub fn apply_torque_impulse(&mut self, impulse: AngVector<Real>) {
        self.angular_velocity += self.inv_inertia_tensor_world * impulse;
        self.wakeup();
    }

    /// Instantly changes both velocities by an impulse applied at the world-space `point`.
    pub fn apply_impulse_at_point(&mut self, impulse: Vector<Real>, point: Point<Real>) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity +=
            self.inv_inertia_tensor_world * (point - self.center_of_mass_world).cross(&impulse);
        self.wakeup();
    }

    /// Is force integration handed over to an external driver?
    pub fn is_force_integration_omitted(&self) -> bool {
        self.omit_force_integration
    }

    /// When set, gravity, damping and applied forces are no longer integrated into the
    /// velocities: an external driver becomes responsible for them.
    pub fn set_omit_force_integration(&mut self, omit: bool) {
        self.omit_force_integration = omit;
    }

    /*
     * Environment parameters.
     */
    /// The multiplier applied to the environment gravity.
    pub fn gravity_scale(&self) -> Real {
        self.gravity_scale
    }

    /// Sets the multiplier applied to the environment gravity.
    pub fn set_gravity_scale(&mut self, scale: Real) {
        self.gravity_scale = scale;
    }

    /// The linear damping of this body, negative if the environment's is used.
    pub fn linear_damp(&self) -> Real {
        self.linear_damp
    }

    /// Sets the linear damping of this body. A negative value defers to the environment.
    pub fn set_linear_damp(&mut self, damp: Real) {
        self.linear_damp = damp;
    }

    /// The angular damping of this body, negative if the environment's is used.
    pub fn angular_damp(&self) -> Real {
        self.angular_damp
    }

    /// Sets the angular damping of this body. A negative value defers to the environment.
    pub fn set_angular_damp(&mut self, damp: Real) {
        self.angular_damp = damp;
    }

    /// The gravity and damping resolved at the last force integration.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /*
     * Axis locks.
     */
    /// The locked axes of this body.
    pub fn locked_axes(&self) -> LockedAxes {
        self.locked_axes
    }

    /// Locks or unlocks the given axes.
    pub fn set_axis_lock(&mut self, axes: LockedAxes, locked: bool) {
        self.locked_axes.set(axes, locked);
    }

    /// Are all the given axes locked?
    pub fn is_axis_locked(&self, axes: LockedAxes) -> bool {
        self.locked_axes.contains(axes)
    }

    /*
     * Continuous motion and contacts.
     */
    /// Is the swept motion tracked for broad-phase bounds?
    pub fn is_ccd_enabled(&self) -> bool {
        self.ccd_enabled
    }

    /// Enables the tracking of the swept motion of this body.
    pub fn set_ccd_enabled(&mut self, enabled: bool) {
        self.ccd_enabled = enabled;
    }

    /// Number of contacts reported for this body during the current step.
    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    /// Reports a live contact for the current step.
    pub fn add_contact(&mut self) {
        self.contact_count += 1;
    }

    /// The constraints this body takes part in, with the body's index in each of them.
    pub fn constraints(&self) -> &[(ConstraintHandle, usize)] {
        &self.constraints
    }

    /// The areas this body overlaps.
    pub fn areas(&self) -> &[AreaMembership] {
        &self.areas
    }

    /*
     * Observers.
     */
    /// Registers an observer notified with this body's state after each step it is active.
    pub fn add_state_observer(&mut self, observer: impl BodyStateObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Removes every registered observer.
    pub fn clear_state_observers(&mut self) {
        self.observers.clear();
    }

    /// Does this body have at least one observer?
    pub fn has_state_observers(&self) -> bool {
        !self.observers.is_empty()
    }
}

pub(crate) fn inv(x: Real) -> Real {
    if x != 0.0 {
        1.0 / x
    } else {
        0.0
    }
}
