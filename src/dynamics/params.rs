//! Space-wide simulation parameters.

use crate::dynamics::area::{Area, AreaOverrideMode};
use crate::math::{Real, Vector};

/// Parameters shared by every body of a [`crate::space::PhysicsSpace`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpaceParams {
    /// The timestep length (default: `1.0 / 60.0`).
    pub dt: Real,
    /// The gravity applied where no area stops the accumulation (default: `(0, -9.8, 0)`).
    pub gravity: Vector<Real>,
    /// The linear damping applied where no area stops the accumulation (default: `0.1`).
    pub default_linear_damp: Real,
    /// The angular damping applied where no area stops the accumulation (default: `0.1`).
    pub default_angular_damp: Real,
    /// Linear speed below which a body counts as still (default: `0.1`).
    pub sleep_linear_threshold: Real,
    /// Angular speed, in radians per second, below which a body counts as still
    /// (default: 8 degrees per second).
    pub sleep_angular_threshold: Real,
    /// How long a body must stay still before it falls asleep (default: `0.5`).
    pub time_to_sleep: Real,
}

impl SpaceParams {
    /// The inverse of the time-stepping length, i.e. the steps per seconds (Hz).
    ///
    /// This is zero if `self.dt` is zero.
    #[inline(always)]
    pub fn inv_dt(&self) -> Real {
        if self.dt == 0.0 {
            0.0
        } else {
            1.0 / self.dt
        }
    }

    /// Sets the inverse time-stepping length (i.e. the frequency).
    ///
    /// This automatically recompute `self.dt`.
    #[inline]
    pub fn set_inv_dt(&mut self, inv_dt: Real) {
        if inv_dt == 0.0 {
            self.dt = 0.0
        } else {
            self.dt = 1.0 / inv_dt
        }
    }

    /// The implicit lowest-priority area applying the default gravity and damping.
    pub fn default_area(&self) -> Area {
        Area::directional(self.gravity, AreaOverrideMode::Combine)
            .with_damping(self.default_linear_damp, self.default_angular_damp)
            .with_priority(i32::MIN)
    }
}

impl Default for SpaceParams {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            gravity: Vector::new(0.0, -9.8, 0.0),
            default_linear_damp: 0.1,
            default_angular_damp: 0.1,
            sleep_linear_threshold: 0.1,
            sleep_angular_threshold: (8.0 as Real).to_radians(),
            time_to_sleep: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::{vector, Point3};

    #[test]
    fn inv_dt() {
        let mut params = SpaceParams::default();
        assert_relative_eq!(params.inv_dt(), 60.0, epsilon = 1.0e-3);
        params.set_inv_dt(0.0);
        assert_eq!(params.dt, 0.0);
        assert_eq!(params.inv_dt(), 0.0);
        params.set_inv_dt(50.0);
        assert_relative_eq!(params.dt, 0.02);
    }

    #[test]
    fn default_area_matches_params() {
        let params = SpaceParams {
            gravity: vector![0.0, 0.0, -3.0],
            default_linear_damp: 0.25,
            ..SpaceParams::default()
        };
        let area = params.default_area();
        assert_relative_eq!(area.gravity_at(&Point3::origin()), vector![0.0, 0.0, -3.0]);
        assert_eq!(area.linear_damp, 0.25);
        assert_eq!(area.override_mode, AreaOverrideMode::Combine);
    }
}
