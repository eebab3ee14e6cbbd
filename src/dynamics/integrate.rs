//! Force and velocity integration.

use num_traits::Zero;

use crate::dynamics::area::{Area, AreaSet};
use crate::dynamics::{BodyChanges, BodyMode, LockedAxes, RigidBody};
use crate::math::{AngVector, Matrix, Real, Rotation, Vector, ANGULAR_EPSILON};

impl RigidBody {
    /// Integrates the environment and applied forces into the velocities of this body.
    ///
    /// Kinematic bodies instead derive their velocities from the motion toward their target
    /// transform. The applied forces, bias velocities and contact counter are reset.
    pub fn integrate_forces(&mut self, dt: Real, areas: &AreaSet, default_area: &Area) {
        if self.mode.is_static() {
            return;
        }

        self.environment = self.resolve_environment(areas, default_area);

        let motion = match self.mode {
            BodyMode::Kinematic => {
                let motion = self.kinematic_target.translation.vector
                    - self.transform.translation.vector;
                self.linear_velocity = self.constant_linear_velocity;
                self.angular_velocity = self.constant_angular_velocity;

                // A zero-length step has no meaningful velocity for the target motion.
                if dt > 0.0 {
                    self.linear_velocity += motion / dt;

                    let delta = self.kinematic_target.rotation * self.transform.rotation.inverse();
                    let scaled_axis = delta.scaled_axis();
                    if scaled_axis.norm() > ANGULAR_EPSILON {
                        self.angular_velocity += scaled_axis / dt;
                    }
                }

                Some(motion)
            }
            BodyMode::Dynamic | BodyMode::DynamicLinearOnly => {
                if !self.omit_force_integration {
                    self.integrate_environment_and_applied_forces(dt);
                }

                self.ccd_enabled.then(|| self.linear_velocity * dt)
            }
            BodyMode::Static => None,
        };

        self.applied_force = Vector::zeros();
        self.applied_torque = AngVector::zeros();
        self.biased_linear_velocity = Vector::zeros();
        self.biased_angular_velocity = AngVector::zeros();

        if let Some(motion) = motion {
            self.shapes.update_with_motion(motion);
        }

        self.contact_count = 0;
        self.last_step = dt;
    }

    fn integrate_environment_and_applied_forces(&mut self, dt: Real) {
        let force = self.environment.gravity * self.mass + self.applied_force;
        let torque = self.applied_torque;

        let linear_damp = (1.0 - dt * self.environment.linear_damp).max(0.0);
        let angular_damp = (1.0 - dt * self.environment.angular_damp).max(0.0);

        self.linear_velocity *= linear_damp;
        self.angular_velocity *= angular_damp;

        self.linear_velocity += force * (self.inv_mass * dt);
        self.angular_velocity += self.inv_inertia_tensor_world * torque * dt;
    }

    /// Enforces the axis locks on the velocities, bias velocities and kinematic target.
    pub(crate) fn apply_axis_locks(&mut self) {
        if self.locked_axes.is_empty() {
            return;
        }

        for i in 0..3 {
            if self.locked_axes.contains(LockedAxes::translation_axis(i)) {
                self.linear_velocity[i] = 0.0;
                self.biased_linear_velocity[i] = 0.0;
                self.kinematic_target.translation.vector[i] = self.transform.translation.vector[i];
            }

            if self.locked_axes.contains(LockedAxes::rotation_axis(i)) {
                self.angular_velocity[i] = 0.0;
                self.biased_angular_velocity[i] = 0.0;
            }
        }
    }

    /// Advances the transform of this body by its velocities (plus the bias velocities set by
    /// the constraints solver since the force integration).
    ///
    /// Kinematic bodies jump to their target transform instead, and go idle when they stopped
    /// moving and touch nothing.
    pub fn integrate_velocities(&mut self, dt: Real) {
        if self.mode.is_static() {
            return;
        }

        if !self.observers.is_empty() {
            self.changes |= BodyChanges::STATE_QUERY;
        }

        self.apply_axis_locks();

        if self.mode.is_kinematic() {
            self.transform = self.kinematic_target;
            self.update_transform_dependent();

            if self.contact_count == 0
                && self.linear_velocity.is_zero()
                && self.angular_velocity.is_zero()
            {
                log::debug!("kinematic body {:?} stopped moving, deactivating", self.handle);
                self.set_active(false);
            }
            return;
        }

        let total_angular_velocity = self.angular_velocity + self.biased_angular_velocity;
        let angular_speed = total_angular_velocity.norm();

        if angular_speed > ANGULAR_EPSILON {
            let axis = total_angular_velocity / angular_speed;
            let delta = Rotation::from_scaled_axis(axis * (angular_speed * dt));

            // Rotate about the center-of-mass rather than the origin.
            let com_offset = self.transform.rotation * self.center_of_mass_local.coords;
            self.transform.translation.vector +=
                (Matrix::identity() - delta.to_rotation_matrix().into_inner()) * com_offset;
            self.transform.rotation = delta * self.transform.rotation;
            self.transform.rotation.renormalize();
        }

        let total_linear_velocity = self.linear_velocity + self.biased_linear_velocity;
        self.transform.translation.vector += total_linear_velocity * dt;
        self.kinematic_target = self.transform;

        self.update_transform_dependent();
    }
}
