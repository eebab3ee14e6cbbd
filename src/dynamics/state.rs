//! Post-step body state notifications.

use crate::dynamics::area::Environment;
use crate::dynamics::RigidBody;
use crate::math::{AngVector, AngularInertia, Isometry, Point, Real, Vector};

/// A read-only snapshot of a body, taken at the end of a step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyState {
    /// The world-space transform.
    pub transform: Isometry<Real>,
    /// The linear velocity.
    pub linear_velocity: Vector<Real>,
    /// The angular velocity.
    pub angular_velocity: AngVector<Real>,
    /// The world-space center-of-mass.
    pub center_of_mass: Point<Real>,
    /// The inverse mass.
    pub inv_mass: Real,
    /// The world-space inverse angular inertia tensor.
    pub inv_inertia_tensor: AngularInertia<Real>,
    /// The gravity and damping resolved at the last force integration.
    pub environment: Environment,
    /// Number of contacts reported during the step.
    pub contact_count: usize,
    /// Is the body sleeping?
    pub sleeping: bool,
    /// The length of the last step.
    pub step: Real,
}

/// A sink notified with a body's state after each step the body took part in.
pub trait BodyStateObserver {
    /// Called once per step, after velocity integration and sleep tests.
    fn body_state_changed(&mut self, state: &BodyState);
}

impl<F: FnMut(&BodyState)> BodyStateObserver for F {
    fn body_state_changed(&mut self, state: &BodyState) {
        self(state)
    }
}

impl RigidBody {
    /// A snapshot of the current state of this body.
    pub fn state(&self) -> BodyState {
        BodyState {
            transform: self.transform,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            center_of_mass: self.center_of_mass_world,
            inv_mass: self.inv_mass,
            inv_inertia_tensor: self.inv_inertia_tensor_world,
            environment: self.environment,
            contact_count: self.contact_count,
            sleeping: self.is_sleeping(),
            step: self.last_step,
        }
    }

    /// Notifies every observer of this body with its current state.
    pub(crate) fn call_queries(&mut self) {
        if self.observers.is_empty() {
            return;
        }

        let state = self.state();
        for observer in &mut self.observers {
            observer.body_state_changed(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::BodyMode;
    use na::vector;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_receive_snapshots() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut body = RigidBody::with_mode(BodyMode::Dynamic, 4.0).unwrap();
        body.set_linear_velocity(vector![1.0, 0.0, 0.0]);

        let sink = seen.clone();
        body.add_state_observer(move |state: &BodyState| sink.borrow_mut().push(*state));
        assert!(body.has_state_observers());

        body.call_queries();
        body.call_queries();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].linear_velocity, vector![1.0, 0.0, 0.0]);
        assert_eq!(seen[0].inv_mass, 0.25);
        assert_eq!(seen[0], body.state());
    }
}
