//! The simulation space: storage for bodies, areas and constraints, and the step driver.

use crate::dynamics::{
    Area, AreaHandle, AreaSet, BodyChanges, BodyHandle, BodyRegistries, BodySet, Constraint,
    ConstraintHandle, ConstraintSet, RigidBody, SpaceParams,
};
use crate::error::Error;
use crate::math::Real;

/// The external constraints solver, run between force and velocity integration.
///
/// It may change the velocities of the active bodies, set their bias velocities, and report
/// contacts. Accesses through [`BodySet::get_mut`] are tracked, so wakeups and other
/// registrations requested by the solver are applied before velocity integration.
pub trait VelocitySolver {
    /// Solves the constraints for one step of length `dt`.
    fn solve(
        &mut self,
        bodies: &mut BodySet,
        constraints: &ConstraintSet,
        active_bodies: &[BodyHandle],
        dt: Real,
    );
}

/// A solver that leaves every velocity untouched.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoSolver;

impl VelocitySolver for NoSolver {
    fn solve(&mut self, _: &mut BodySet, _: &ConstraintSet, _: &[BodyHandle], _: Real) {}
}

/// Owns the simulated bodies, areas and constraints, and steps them.
pub struct PhysicsSpace {
    bodies: BodySet,
    registries: BodyRegistries,
    areas: AreaSet,
    constraints: ConstraintSet,
    params: SpaceParams,
    default_area: Area,
}

impl Default for PhysicsSpace {
    fn default() -> Self {
        Self::new(SpaceParams::default())
    }
}

impl PhysicsSpace {
    /// An empty space with the given parameters.
    pub fn new(params: SpaceParams) -> Self {
        Self {
            bodies: BodySet::new(),
            registries: BodyRegistries::default(),
            areas: AreaSet::new(),
            constraints: ConstraintSet::new(),
            default_area: params.default_area(),
            params,
        }
    }

    /// The simulation parameters.
    pub fn params(&self) -> &SpaceParams {
        &self.params
    }

    /// Replaces the simulation parameters, and the default environment derived from them.
    pub fn set_params(&mut self, params: SpaceParams) {
        self.default_area = params.default_area();
        self.params = params;
    }

    /// The implicit lowest-priority area applying the default gravity and damping.
    pub fn default_area(&self) -> &Area {
        &self.default_area
    }

    /// The bodies of this space.
    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    /// The areas of this space.
    pub fn areas(&self) -> &AreaSet {
        &self.areas
    }

    /// The constraints of this space.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// The body registries, as of the last synchronization.
    pub fn registries(&self) -> &BodyRegistries {
        &self.registries
    }

    /// The bodies integrated at the next step, as of the last synchronization.
    pub fn active_bodies(&self) -> &[BodyHandle] {
        self.registries.active.as_slice()
    }

    /*
     * Bodies.
     */
    /// Inserts a body, activating it unless it is static.
    pub fn insert_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get_mut_internal(handle) {
            body.on_space_attached(handle);
        }
        self.apply_changes(handle);
        handle
    }

    /// Removes a body, its registrations and every constraint it takes part in.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let mut body = self.bodies.remove(handle)?;
        self.registries.remove_body(handle);

        for (constraint, _) in body.constraints.clone() {
            self.remove_constraint(constraint).ok();
        }

        body.on_space_detached();
        body.active = false;
        Some(body)
    }

    /// The body with the given handle.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// The body with the given handle.
    ///
    /// The registrations its modifications request are applied at the next
    /// [`PhysicsSpace::sync_changes`] or step.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /*
     * Areas.
     */
    /// Inserts an area.
    pub fn insert_area(&mut self, area: Area) -> AreaHandle {
        self.areas.insert(area)
    }

    /// Removes an area, and every body membership referencing it.
    pub fn remove_area(&mut self, handle: AreaHandle) -> Option<Area> {
        let area = self.areas.remove(handle)?;

        let mut affected = Vec::new();
        for (body_handle, body) in self.bodies.iter_mut_internal() {
            if body.areas.iter().any(|m| m.area == handle) {
                body.forget_area(handle);
                body.wakeup();
                affected.push(body_handle);
            }
        }

        for body in affected {
            self.apply_changes(body);
        }

        Some(area)
    }

    /// The area with the given handle.
    ///
    /// Priority changes only apply to memberships started afterwards.
    pub fn area_mut(&mut self, handle: AreaHandle) -> Option<&mut Area> {
        self.areas.get_mut(handle)
    }

    /// Records one more overlap between a body and an area.
    pub fn add_body_to_area(&mut self, body: BodyHandle, area: AreaHandle) -> Result<(), Error> {
        let priority = self.areas.get(area).ok_or(Error::UnknownArea(area))?.priority;
        let rb = self
            .bodies
            .get_mut_internal(body)
            .ok_or(Error::UnknownBody(body))?;
        rb.add_area(area, priority);
        rb.wakeup();
        self.apply_changes(body);
        Ok(())
    }

    /// Records one less overlap between a body and an area.
    pub fn remove_body_from_area(
        &mut self,
        body: BodyHandle,
        area: AreaHandle,
    ) -> Result<(), Error> {
        let rb = self
            .bodies
            .get_mut_internal(body)
            .ok_or(Error::UnknownBody(body))?;
        rb.remove_area(area);
        rb.wakeup();
        self.apply_changes(body);
        Ok(())
    }

    /*
     * Constraints.
     */
    /// Inserts a constraint between the given bodies. Each body's role is its index in `bodies`.
    pub fn insert_constraint(
        &mut self,
        bodies: Vec<BodyHandle>,
    ) -> Result<ConstraintHandle, Error> {
        if let Some(unknown) = bodies.iter().find(|h| !self.bodies.contains(**h)) {
            return Err(Error::UnknownBody(*unknown));
        }

        let handle = self.constraints.insert(Constraint::new(bodies.clone()));
        for (role, body) in bodies.into_iter().enumerate() {
            if let Some(body) = self.bodies.get_mut_internal(body) {
                body.add_constraint(handle, role);
            }
        }

        Ok(handle)
    }

    /// Removes a constraint.
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Constraint, Error> {
        let constraint = self
            .constraints
            .remove(handle)
            .ok_or(Error::UnknownConstraint(handle))?;
        for body in constraint.bodies() {
            if let Some(body) = self.bodies.get_mut_internal(*body) {
                body.remove_constraint(handle);
            }
        }
        Ok(constraint)
    }

    /*
     * Registrations.
     */
    /// Applies the registrations requested by every body modified since the last call.
    pub fn sync_changes(&mut self) {
        for handle in self.bodies.take_modified() {
            self.apply_changes(handle);
        }
    }

    fn apply_changes(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get_mut_internal(handle) else {
            return;
        };
        let changes = body.take_changes();
        let active = body.is_active();

        if changes.contains(BodyChanges::ACTIVATION) {
            if active {
                self.registries.active.insert(handle);
            } else {
                self.registries.active.remove(handle);
            }
        }

        if changes.contains(BodyChanges::MASS_PROPERTIES) {
            self.registries.mass_properties_update.insert(handle);
        }

        if changes.contains(BodyChanges::STATE_QUERY) {
            self.registries.state_query.insert(handle);
        }

        if changes.contains(BodyChanges::NEIGHBOURS) {
            self.wake_neighbours_of(handle);
        }
    }

    /// Recomputes the mass properties of every body waiting for it, once per body.
    pub fn flush_mass_properties(&mut self) {
        for handle in self.registries.mass_properties_update.take() {
            if let Some(body) = self.bodies.get_mut_internal(handle) {
                body.update_mass_properties();
            }
            self.apply_changes(handle);
        }
    }

    /// Wakes up the sleeping dynamic bodies sharing a constraint with the given body.
    ///
    /// This only goes one level deep.
    pub fn wakeup_neighbours(&mut self, handle: BodyHandle) -> Result<(), Error> {
        if !self.bodies.contains(handle) {
            return Err(Error::UnknownBody(handle));
        }
        self.wake_neighbours_of(handle);
        Ok(())
    }

    fn wake_neighbours_of(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get(handle) else {
            return;
        };

        let mut neighbours = Vec::new();
        for (constraint, role) in &body.constraints {
            let Some(constraint) = self.constraints.get(*constraint) else {
                continue;
            };

            for (i, other) in constraint.bodies().iter().enumerate() {
                if i == *role {
                    continue;
                }

                if let Some(other_body) = self.bodies.get(*other) {
                    if other_body.mode().is_dynamic() && !other_body.is_active() {
                        neighbours.push(*other);
                    }
                }
            }
        }

        for neighbour in neighbours {
            if let Some(body) = self.bodies.get_mut_internal(neighbour) {
                body.wakeup();
            }
            self.apply_changes(neighbour);
        }
    }

    /*
     * Step.
     */
    /// Advances the simulation by one step of length `self.params().dt`.
    pub fn step(&mut self, solver: &mut impl VelocitySolver) {
        let dt = self.params.dt;

        self.sync_changes();
        self.flush_mass_properties();

        let active = self.registries.active.as_slice().to_vec();
        for handle in &active {
            if let Some(body) = self.bodies.get_mut_internal(*handle) {
                body.integrate_forces(dt, &self.areas, &self.default_area);
            }
            self.apply_changes(*handle);
        }

        solver.solve(&mut self.bodies, &self.constraints, &active, dt);
        self.sync_changes();
        self.flush_mass_properties();

        for handle in &active {
            if let Some(body) = self.bodies.get_mut_internal(*handle) {
                body.integrate_velocities(dt);
            }
            self.apply_changes(*handle);
        }

        for handle in self.registries.active.as_slice().to_vec() {
            let Some(body) = self.bodies.get_mut_internal(handle) else {
                continue;
            };

            if body.mode().is_dynamic() && body.sleep_test(dt, &self.params) {
                log::debug!("body {:?} fell asleep", handle);
                body.set_sleeping(true);
            }
            self.apply_changes(handle);
        }

        self.sync_changes();

        for handle in self.registries.state_query.take() {
            if let Some(body) = self.bodies.get_mut_internal(handle) {
                body.call_queries();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::BodyMode;
    use crate::math::Isometry;
    use na::vector;
    use rapier::geometry::SharedShape;

    fn dynamic_body() -> RigidBody {
        RigidBody::with_mode(BodyMode::Dynamic, 1.0).unwrap()
    }

    #[test]
    fn insertion_activates_non_static_bodies() {
        let mut space = PhysicsSpace::default();
        let fixed = space.insert_body(RigidBody::new());
        let dynamic = space.insert_body(dynamic_body());

        assert_eq!(space.active_bodies(), &[dynamic]);
        assert!(!space.body(fixed).unwrap().is_active());
        assert_eq!(space.body(dynamic).unwrap().handle(), Some(dynamic));

        let removed = space.remove_body(dynamic).unwrap();
        assert!(space.active_bodies().is_empty());
        assert!(!removed.is_active());
        assert_eq!(removed.handle(), None);
    }

    #[test]
    fn mass_properties_are_recomputed_once() {
        let mut space = PhysicsSpace::default();
        let handle = space.insert_body(dynamic_body());
        space.flush_mass_properties();

        let body = space.body_mut(handle).unwrap();
        body.add_shape(SharedShape::ball(1.0), Isometry::identity());
        body.set_mass(2.0).unwrap();
        body.add_shape(SharedShape::ball(1.0), Isometry::translation(2.0, 0.0, 0.0));
        space.sync_changes();
        space.body_mut(handle).unwrap().set_mass(3.0).unwrap();
        space.sync_changes();

        assert_eq!(space.registries().mass_properties_update.as_slice(), &[handle]);
        space.flush_mass_properties();
        assert!(space.registries().mass_properties_update.is_empty());

        let body = space.body(handle).unwrap();
        assert!(!body.needs_mass_properties_update());
        assert_eq!(body.center_of_mass_local().x, 1.0);
    }

    #[test]
    fn static_transform_wakes_constrained_neighbours() {
        let mut space = PhysicsSpace::default();
        let anchor = space.insert_body(RigidBody::new());
        let a = space.insert_body(dynamic_body());
        let b = space.insert_body(dynamic_body());
        space.insert_constraint(vec![anchor, a]).unwrap();
        space.insert_constraint(vec![a, b]).unwrap();

        for handle in [a, b] {
            space.body_mut(handle).unwrap().set_sleeping(true);
        }
        space.sync_changes();
        assert!(space.active_bodies().is_empty());

        space
            .body_mut(anchor)
            .unwrap()
            .set_transform(Isometry::translation(0.0, 1.0, 0.0));
        space.sync_changes();

        // Only one level deep.
        assert_eq!(space.active_bodies(), &[a]);
        assert!(space.body(b).unwrap().is_sleeping());

        space.wakeup_neighbours(a).unwrap();
        assert!(space.body(b).unwrap().is_active());
    }

    #[test]
    fn kinematic_transform_wakes_constrained_neighbours() {
        let mut space = PhysicsSpace::default();
        let driver = space.insert_body(RigidBody::with_mode(BodyMode::Kinematic, 1.0).unwrap());
        let follower = space.insert_body(dynamic_body());
        space.insert_constraint(vec![driver, follower]).unwrap();

        space.body_mut(follower).unwrap().set_sleeping(true);
        space.sync_changes();
        assert!(space.body(follower).unwrap().is_sleeping());

        let body = space.body_mut(driver).unwrap();
        body.set_transform(Isometry::translation(0.0, 1.0, 0.0));
        body.set_transform(Isometry::translation(0.0, 2.0, 0.0));
        space.sync_changes();

        assert!(space.body(follower).unwrap().is_active());
        assert!(space.active_bodies().contains(&follower));
    }

    #[test]
    fn removing_a_body_drops_its_constraints() {
        let mut space = PhysicsSpace::default();
        let a = space.insert_body(dynamic_body());
        let b = space.insert_body(dynamic_body());
        let constraint = space.insert_constraint(vec![a, b]).unwrap();

        space.remove_body(a);
        assert!(space.constraints().get(constraint).is_none());
        assert_eq!(
            space.remove_constraint(constraint),
            Err(Error::UnknownConstraint(constraint))
        );
        assert!(space.body(b).unwrap().constraints().is_empty());
        assert_eq!(
            space.insert_constraint(vec![a, b]),
            Err(Error::UnknownBody(a))
        );
    }

    #[test]
    fn removing_an_area_forgets_memberships() {
        let mut space = PhysicsSpace::default();
        let body = space.insert_body(dynamic_body());
        let area = space.insert_area(Area::default().with_priority(3));

        space.add_body_to_area(body, area).unwrap();
        assert_eq!(space.body(body).unwrap().areas()[0].priority, 3);

        space.remove_area(area);
        assert!(space.body(body).unwrap().areas().is_empty());
        assert_eq!(
            space.add_body_to_area(body, area),
            Err(Error::UnknownArea(area))
        );
    }

    #[test]
    fn solver_wakeups_reach_the_active_registry() {
        struct Kick(BodyHandle);

        impl VelocitySolver for Kick {
            fn solve(
                &mut self,
                bodies: &mut BodySet,
                _: &ConstraintSet,
                _: &[BodyHandle],
                _: Real,
            ) {
                if let Some(body) = bodies.get_mut(self.0) {
                    body.add_contact();
                    body.set_linear_velocity(vector![1.0, 0.0, 0.0]);
                }
            }
        }

        let mut space = PhysicsSpace::default();
        let handle = space.insert_body(dynamic_body());
        space.body_mut(handle).unwrap().set_sleeping(true);
        space.sync_changes();

        space.step(&mut Kick(handle));
        let body = space.body(handle).unwrap();
        assert!(body.is_active());
        assert_eq!(body.contact_count(), 1);
        assert_eq!(space.active_bodies(), &[handle]);
    }
}
