//! Active/sleeping lifecycle of a rigid-body.

use crate::dynamics::SpaceParams;
use crate::dynamics::{BodyChanges, BodyMode, RigidBody};
use crate::math::{AngVector, Real, Vector};

impl RigidBody {
    /// Is this body integrated at each step?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Is this body sleeping?
    ///
    /// Only non-static bodies can sleep: static bodies are inactive without sleeping.
    pub fn is_sleeping(&self) -> bool {
        !self.active && !self.mode.is_static()
    }

    /// Can this body fall asleep when it stays still long enough?
    pub fn can_sleep(&self) -> bool {
        self.can_sleep
    }

    /// For how long this body has been moving slower than the sleep thresholds.
    pub fn still_time(&self) -> Real {
        self.still_time
    }

    /// Activates or deactivates this body. Static bodies can never be active.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }

        if active && self.mode.is_static() {
            return;
        }

        self.active = active;
        self.changes |= BodyChanges::ACTIVATION;
    }

    /// Wakes this body up if it is sleeping, and restarts its still-time counter.
    ///
    /// This is a no-op for static and kinematic bodies and for bodies outside of a space.
    pub fn wakeup(&mut self) {
        if self.handle.is_none() || !self.mode.is_dynamic() {
            return;
        }

        if !self.active {
            log::debug!("waking up body {:?}", self.handle);
        }
        self.still_time = 0.0;
        self.set_active(true);
    }

    /// Puts this body to sleep (zeroing its velocities) or wakes it up.
    ///
    /// Ignored for static and kinematic bodies.
    pub fn set_sleeping(&mut self, sleeping: bool) {
        if !self.mode.is_dynamic() {
            return;
        }

        if sleeping {
            self.linear_velocity = Vector::zeros();
            self.angular_velocity = AngVector::zeros();
            self.set_active(false);
        } else {
            self.set_active(true);
        }
    }

    /// Allows or forbids this body to fall asleep. Forbidding it wakes the body up.
    pub fn set_can_sleep(&mut self, can_sleep: bool) {
        self.can_sleep = can_sleep;
        if self.mode >= BodyMode::Dynamic && !self.active && !can_sleep {
            self.set_active(true);
        }
    }

    /// Accumulates the time spent below the sleep thresholds and reports whether this body
    /// stayed still for long enough to fall asleep.
    ///
    /// Static and kinematic bodies may always sleep; bodies that can't sleep never do.
    pub fn sleep_test(&mut self, dt: Real, params: &SpaceParams) -> bool {
        if !self.mode.is_dynamic() {
            return true;
        } else if !self.can_sleep {
            return false;
        }

        let linear_threshold = params.sleep_linear_threshold;
        if self.angular_velocity.norm() < params.sleep_angular_threshold
            && self.linear_velocity.norm_squared() < linear_threshold * linear_threshold
        {
            self.still_time += dt;
            self.still_time > params.time_to_sleep
        } else {
            self.still_time = 0.0;
            false
        }
    }
}
