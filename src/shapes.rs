//! Shapes attached to a rigid-body.
//!
//! A rigid-body doesn't know anything about collision geometry: it only needs each shape's
//! area (used as a mass weight), its local center-of-mass and principal inertia for a given
//! mass, and its bounding box for swept broad-phase bounds. The [`BodyShape`] trait exposes
//! exactly that, and is implemented for Rapier/Parry's [`SharedShape`].

use rapier::geometry::{Shape, SharedShape};
use rapier::parry::bounding_volume::{Aabb, BoundingVolume};

use crate::math::{Isometry, Point, Real, Rotation, Vector};

/// The geometric queries a rigid-body needs from one of its shapes.
pub trait BodyShape {
    /// The area (or volume) of this shape, used as its weight when distributing the body mass.
    fn area(&self) -> Real;

    /// The center-of-mass of this shape, in its local frame.
    fn local_center_of_mass(&self) -> Point<Real>;

    /// The orientation of the principal inertia axes relative to the shape's local frame.
    fn principal_inertia_frame(&self) -> Rotation<Real>;

    /// The principal moment of inertia of this shape for the given `mass`, about its
    /// center-of-mass and along its [`BodyShape::principal_inertia_frame`].
    fn moment_of_inertia(&self, mass: Real) -> Vector<Real>;

    /// The world-space bounding box of this shape placed at `pose`.
    fn compute_aabb(&self, pose: &Isometry<Real>) -> Aabb;
}

impl BodyShape for SharedShape {
    fn area(&self) -> Real {
        Shape::mass_properties(&**self, 1.0).mass()
    }

    fn local_center_of_mass(&self) -> Point<Real> {
        Shape::mass_properties(&**self, 1.0).local_com
    }

    fn principal_inertia_frame(&self) -> Rotation<Real> {
        Shape::mass_properties(&**self, 1.0).principal_inertia_local_frame
    }

    fn moment_of_inertia(&self, mass: Real) -> Vector<Real> {
        let area = BodyShape::area(self);
        if area == 0.0 {
            return Vector::zeros();
        }

        Shape::mass_properties(&**self, mass / area).principal_inertia()
    }

    fn compute_aabb(&self, pose: &Isometry<Real>) -> Aabb {
        Shape::compute_aabb(&**self, pose)
    }
}

/// A shape attached to a body, with its pose relative to the body.
pub struct ShapeEntry {
    /// The shape geometry.
    pub shape: Box<dyn BodyShape>,
    /// The pose of the shape relative to the body's origin.
    ///
    /// Only the orientation and the translation are used for mass properties.
    pub pose: Isometry<Real>,
    /// Disabled shapes don't contribute to mass properties nor bounds.
    pub disabled: bool,
}

impl ShapeEntry {
    /// The center-of-mass of this shape, in the body frame.
    pub fn center_of_mass(&self) -> Point<Real> {
        self.pose * self.shape.local_center_of_mass()
    }

    /// The orientation of this shape's principal inertia axes, in the body frame.
    pub fn principal_inertia_frame(&self) -> Rotation<Real> {
        let mut rotation = self.pose.rotation;
        rotation.renormalize();
        rotation * self.shape.principal_inertia_frame()
    }
}

/// The set of shapes attached to one rigid-body.
#[derive(Default)]
pub struct ShapeSet {
    entries: Vec<ShapeEntry>,
    motion: Vector<Real>,
}

impl ShapeSet {
    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of shapes in this set, disabled ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends a shape and returns its index.
    pub fn push(&mut self, shape: impl BodyShape + 'static, pose: Isometry<Real>) -> usize {
        self.entries.push(ShapeEntry {
            shape: Box::new(shape),
            pose,
            disabled: false,
        });
        self.entries.len() - 1
    }

    /// Removes the shape at `index`, shifting the following ones.
    pub fn remove(&mut self, index: usize) -> Option<ShapeEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// The shape at `index`.
    pub fn get(&self, index: usize) -> Option<&ShapeEntry> {
        self.entries.get(index)
    }

    /// Enables or disables the shape at `index`.
    ///
    /// Returns `true` if this changed the shape's state.
    pub fn set_disabled(&mut self, index: usize, disabled: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.disabled != disabled => {
                entry.disabled = disabled;
                true
            }
            _ => false,
        }
    }

    /// Changes the pose of the shape at `index`.
    ///
    /// Returns `true` if the shape exists.
    pub fn set_pose(&mut self, index: usize, pose: Isometry<Real>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.pose = pose;
                true
            }
            None => false,
        }
    }

    /// Iterates through all the shapes, disabled ones included.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.entries.iter()
    }

    /// Iterates through the shapes that aren't disabled.
    pub fn enabled(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.entries.iter().filter(|entry| !entry.disabled)
    }

    /// Sum of the areas of every enabled shape.
    pub fn total_area(&self) -> Real {
        self.enabled().map(|entry| entry.shape.area()).sum()
    }

    /// The displacement the body is predicted to undergo during the current step.
    pub fn motion(&self) -> Vector<Real> {
        self.motion
    }

    pub(crate) fn update_with_motion(&mut self, motion: Vector<Real>) {
        self.motion = motion;
    }

    /// The world-space bounds of the enabled shapes when the body is at `body_pose`,
    /// extended by the current swept motion.
    ///
    /// Returns `None` if no shape is enabled.
    pub fn swept_aabb(&self, body_pose: &Isometry<Real>) -> Option<Aabb> {
        let mut result: Option<Aabb> = None;

        for entry in self.enabled() {
            let aabb = entry.shape.compute_aabb(&(body_pose * entry.pose));
            match &mut result {
                Some(total) => total.merge(&aabb),
                None => result = Some(aabb),
            }
        }

        result.map(|mut aabb| {
            aabb.mins += self.motion.inf(&Vector::zeros());
            aabb.maxs += self.motion.sup(&Vector::zeros());
            aabb
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::vector;

    #[test]
    fn ball_area_and_inertia() {
        let ball = SharedShape::ball(0.5);
        let volume = 4.0 / 3.0 * std::f32::consts::PI * 0.125;
        assert_relative_eq!(BodyShape::area(&ball), volume, epsilon = 1.0e-5);

        let inertia = ball.moment_of_inertia(2.0);
        assert_relative_eq!(inertia, Vector::repeat(0.4 * 2.0 * 0.25), epsilon = 1.0e-5);
    }

    #[test]
    fn offset_hull_exposes_its_center_of_mass() {
        let pose = Isometry::new(vector![5.0, 0.0, 0.0], vector![0.0, 0.0, 0.5]);
        let mut corners = Vec::new();
        for x in [-1.0, 1.0] {
            for y in [-2.0, 2.0] {
                for z in [-3.0, 3.0] {
                    corners.push(pose * Point::new(x, y, z));
                }
            }
        }
        let hull = SharedShape::convex_hull(&corners).unwrap();

        let mut shapes = ShapeSet::default();
        shapes.push(hull, Isometry::translation(0.0, 1.0, 0.0));
        let entry = shapes.get(0).unwrap();
        assert_relative_eq!(
            entry.center_of_mass(),
            Point::new(5.0, 1.0, 0.0),
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn disabled_shapes_are_skipped() {
        let mut shapes = ShapeSet::default();
        shapes.push(SharedShape::cuboid(1.0, 1.0, 1.0), Isometry::identity());
        let second = shapes.push(SharedShape::cuboid(1.0, 1.0, 1.0), Isometry::identity());
        assert_relative_eq!(shapes.total_area(), 16.0, epsilon = 1.0e-4);

        assert!(shapes.set_disabled(second, true));
        assert!(!shapes.set_disabled(second, true));
        assert_relative_eq!(shapes.total_area(), 8.0, epsilon = 1.0e-4);
        assert_eq!(shapes.enabled().count(), 1);
    }

    #[test]
    fn swept_aabb_includes_motion() {
        let mut shapes = ShapeSet::default();
        assert!(shapes.swept_aabb(&Isometry::identity()).is_none());

        shapes.push(SharedShape::cuboid(1.0, 1.0, 1.0), Isometry::identity());
        shapes.update_with_motion(vector![2.0, -3.0, 0.0]);

        let aabb = shapes
            .swept_aabb(&Isometry::translation(10.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(aabb.mins.coords, vector![9.0, -4.0, -1.0], epsilon = 1.0e-5);
        assert_relative_eq!(aabb.maxs.coords, vector![13.0, 1.0, 1.0], epsilon = 1.0e-5);
    }
}
