//! Force-field volumes and the resolution of the environment they apply to a body.

use rapier::data::{Arena, Index};

use crate::dynamics::RigidBody;
use crate::math::{Isometry, Point, Real, Vector, GRAVITY_EPSILON};

/// The handle of an area in an [`AreaSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AreaHandle(pub Index);

/// How an area's gravity and damping combine with the other areas overlapping the same body.
///
/// Areas are visited by decreasing priority, the space's default environment coming last.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AreaOverrideMode {
    /// The area doesn't affect gravity nor damping.
    #[default]
    Disabled,
    /// Adds to what the higher-priority areas accumulated, then lets lower-priority areas add.
    Combine,
    /// Adds to what the higher-priority areas accumulated, then stops.
    CombineReplace,
    /// Discards what the higher-priority areas accumulated and stops.
    Replace,
    /// Discards what the higher-priority areas accumulated, then lets lower-priority areas add.
    ReplaceCombine,
}

/// The shape of an area's gravity field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AreaGravity {
    /// Uniform gravity along a direction.
    Directional {
        /// The gravity direction, scaled by the area's gravity magnitude.
        direction: Vector<Real>,
    },
    /// Gravity pulling toward a point.
    Point {
        /// The attraction center, in the area's local frame.
        center: Point<Real>,
        /// If positive, the distance at which the gravity equals the area's magnitude,
        /// decreasing with the squared distance beyond it. If zero, the magnitude is
        /// constant.
        unit_distance: Real,
    },
}

/// A force-field volume overriding gravity and damping for the bodies it overlaps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Area {
    /// The world-space pose of the area.
    pub transform: Isometry<Real>,
    /// The shape of the gravity field.
    pub gravity: AreaGravity,
    /// The gravity strength.
    pub gravity_magnitude: Real,
    /// The linear damping contributed by this area.
    pub linear_damp: Real,
    /// The angular damping contributed by this area.
    pub angular_damp: Real,
    /// Higher-priority areas are resolved first.
    pub priority: i32,
    /// How this area combines with the others.
    pub override_mode: AreaOverrideMode,
}

impl Default for Area {
    fn default() -> Self {
        Self {
            transform: Isometry::identity(),
            gravity: AreaGravity::Directional {
                direction: -Vector::y(),
            },
            gravity_magnitude: 9.8,
            linear_damp: 0.1,
            angular_damp: 0.1,
            priority: 0,
            override_mode: AreaOverrideMode::Disabled,
        }
    }
}

impl Area {
    /// An area applying a uniform `gravity` vector.
    pub fn directional(gravity: Vector<Real>, override_mode: AreaOverrideMode) -> Self {
        let magnitude = gravity.norm();
        let direction = if magnitude > GRAVITY_EPSILON {
            gravity / magnitude
        } else {
            Vector::zeros()
        };

        Self {
            gravity: AreaGravity::Directional { direction },
            gravity_magnitude: magnitude,
            override_mode,
            ..Default::default()
        }
    }

    /// Sets the damping contributed by this area.
    pub fn with_damping(mut self, linear_damp: Real, angular_damp: Real) -> Self {
        self.linear_damp = linear_damp;
        self.angular_damp = angular_damp;
        self
    }

    /// Sets the priority of this area.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The gravity this area applies at the world-space `point`.
    pub fn gravity_at(&self, point: &Point<Real>) -> Vector<Real> {
        match self.gravity {
            AreaGravity::Directional { direction } => {
                self.transform.rotation * direction * self.gravity_magnitude
            }
            AreaGravity::Point {
                center,
                unit_distance,
            } => {
                let to_center = (self.transform * center) - *point;
                let distance = to_center.norm();
                if distance <= GRAVITY_EPSILON {
                    return Vector::zeros();
                }

                let dir = to_center / distance;
                if unit_distance > 0.0 {
                    let falloff = unit_distance / distance;
                    dir * (self.gravity_magnitude * falloff * falloff)
                } else {
                    dir * self.gravity_magnitude
                }
            }
        }
    }
}

/// The gravity and damping applied to a body for one step.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Environment {
    /// The gravity acceleration.
    pub gravity: Vector<Real>,
    /// The linear damping coefficient.
    pub linear_damp: Real,
    /// The angular damping coefficient.
    pub angular_damp: Real,
}

impl Environment {
    fn accumulate(&mut self, area: &Area, point: &Point<Real>) {
        self.gravity += area.gravity_at(point);
        self.linear_damp += area.linear_damp;
        self.angular_damp += area.angular_damp;
    }
}

/// A body's overlap with one area.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AreaMembership {
    /// The overlapped area.
    pub area: AreaHandle,
    /// The priority of the area when the overlap started.
    pub priority: i32,
    /// Number of shape overlaps with that area.
    pub ref_count: u32,
}

/// Accumulates the gravity and damping of `areas` sampled at `point`, falling back to
/// `default_area` if no area stopped the accumulation.
///
/// The areas must be sorted by decreasing priority.
pub fn accumulate_area_overrides<'a>(
    areas: impl IntoIterator<Item = &'a Area>,
    point: &Point<Real>,
    default_area: &Area,
) -> Environment {
    let mut env = Environment::default();
    let mut stopped = false;

    for area in areas {
        match area.override_mode {
            AreaOverrideMode::Combine | AreaOverrideMode::CombineReplace => {
                env.accumulate(area, point);
                stopped = area.override_mode == AreaOverrideMode::CombineReplace;
            }
            AreaOverrideMode::Replace | AreaOverrideMode::ReplaceCombine => {
                env = Environment::default();
                env.accumulate(area, point);
                stopped = area.override_mode == AreaOverrideMode::Replace;
            }
            AreaOverrideMode::Disabled => {}
        }

        if stopped {
            break;
        }
    }

    if !stopped {
        env.accumulate(default_area, point);
    }

    env
}

/// A set of areas.
#[derive(Clone, Default)]
pub struct AreaSet {
    areas: Arena<Area>,
}

impl AreaSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of areas in this set.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.areas.len() == 0
    }

    pub(crate) fn insert(&mut self, area: Area) -> AreaHandle {
        AreaHandle(self.areas.insert(area))
    }

    pub(crate) fn remove(&mut self, handle: AreaHandle) -> Option<Area> {
        self.areas.remove(handle.0)
    }

    /// The area with the given handle.
    pub fn get(&self, handle: AreaHandle) -> Option<&Area> {
        self.areas.get(handle.0)
    }

    pub(crate) fn get_mut(&mut self, handle: AreaHandle) -> Option<&mut Area> {
        self.areas.get_mut(handle.0)
    }

    /// Iterates through all the areas.
    pub fn iter(&self) -> impl Iterator<Item = (AreaHandle, &Area)> {
        self.areas.iter().map(|(i, area)| (AreaHandle(i), area))
    }
}

impl RigidBody {
    /// Resolves the gravity and damping applied to this body at its current position.
    ///
    /// Sorts the area memberships by decreasing priority (ties keep their entry order), scales
    /// the gravity by the body's gravity scale, and lets the body's own non-negative damping
    /// values override the environment's.
    pub fn resolve_environment(&mut self, areas: &AreaSet, default_area: &Area) -> Environment {
        self.areas.sort_by(|a, b| b.priority.cmp(&a.priority));

        let origin = Point::from(self.transform.translation.vector);
        let overlapping = self.areas.iter().filter_map(|m| areas.get(m.area));
        let mut env = accumulate_area_overrides(overlapping, &origin, default_area);

        env.gravity *= self.gravity_scale;
        if self.linear_damp >= 0.0 {
            env.linear_damp = self.linear_damp;
        }
        if self.angular_damp >= 0.0 {
            env.angular_damp = self.angular_damp;
        }

        env
    }

    pub(crate) fn add_area(&mut self, area: AreaHandle, priority: i32) {
        match self.areas.iter_mut().find(|m| m.area == area) {
            Some(membership) => membership.ref_count += 1,
            None => self.areas.push(AreaMembership {
                area,
                priority,
                ref_count: 1,
            }),
        }
    }

    pub(crate) fn remove_area(&mut self, area: AreaHandle) {
        if let Some(i) = self.areas.iter().position(|m| m.area == area) {
            self.areas[i].ref_count -= 1;
            if self.areas[i].ref_count == 0 {
                self.areas.remove(i);
            }
        }
    }

    pub(crate) fn forget_area(&mut self, area: AreaHandle) {
        self.areas.retain(|m| m.area != area);
    }
}
