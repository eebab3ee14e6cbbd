//! Mass properties derived from a body's shapes.

use na::SymmetricEigen;

use crate::dynamics::body::inv;
use crate::dynamics::{BodyChanges, BodyMode, RigidBody};
use crate::math::{AngularInertia, Matrix, Point, Real, Rotation, Vector};
use crate::shapes::ShapeSet;

/// Maximum number of iterations allowed to diagonalize an inertia tensor.
const MAX_EIGEN_ITERATIONS: usize = 64;
/// Off-diagonal magnitude (relative to the diagonal) below which a tensor is already diagonal.
const DIAGONAL_EPSILON: Real = 1.0e-6;

/// The area-weighted centroid of the enabled shapes' centers-of-mass.
///
/// This is the local origin if the shapes have no area.
pub fn center_of_mass(shapes: &ShapeSet) -> Point<Real> {
    let total_area = shapes.total_area();
    if total_area == 0.0 {
        return Point::origin();
    }

    let weighted: Vector<Real> = shapes
        .enabled()
        .map(|entry| entry.center_of_mass().coords * (entry.shape.area() / total_area))
        .sum();
    Point::from(weighted)
}

/// The inertia tensor of the enabled shapes about `center_of_mass`, in the body frame, for a
/// body of mass `mass` distributed proportionally to the shape areas.
///
/// Returns `None` if no shape has a non-zero area.
pub fn assemble_inertia_tensor(
    shapes: &ShapeSet,
    mass: Real,
    center_of_mass: &Point<Real>,
) -> Option<AngularInertia<Real>> {
    let total_area = shapes.total_area();
    let mut tensor = AngularInertia::zeros();
    let mut inertia_set = false;

    for entry in shapes.enabled() {
        let area = entry.shape.area();
        if area == 0.0 {
            continue;
        }

        inertia_set = true;
        let shape_mass = area / total_area * mass;

        // The shape scale is ignored: only its orientation and position matter.
        let basis = entry.principal_inertia_frame().to_rotation_matrix();
        let basis = basis.matrix();
        let moment = AngularInertia::from_diagonal(&entry.shape.moment_of_inertia(shape_mass));
        let rotated = basis * moment * basis.transpose();

        let r = entry.center_of_mass() - center_of_mass;
        let parallel_axis =
            (AngularInertia::identity() * r.norm_squared() - r * r.transpose()) * shape_mass;
        tensor += rotated + parallel_axis;
    }

    inertia_set.then_some(tensor)
}

/// Splits a symmetric inertia tensor into its principal axes and principal inertia.
///
/// The returned rotation `R` satisfies `tensor = R * diag(inertia) * Rᵀ`. The principal
/// axes are matched to the closest body axes, so a tensor that is already diagonal keeps its
/// diagonal in place. If the eigen decomposition fails, the tensor is treated as diagonal.
pub fn diagonalize(tensor: &AngularInertia<Real>) -> (Rotation<Real>, Vector<Real>) {
    let diagonal = tensor.diagonal();
    let off_diagonal = tensor.m12.abs() + tensor.m13.abs() + tensor.m23.abs();
    if off_diagonal <= DIAGONAL_EPSILON * diagonal.amax().max(1.0) {
        return (Rotation::identity(), diagonal);
    }

    let Some(eigen) = SymmetricEigen::try_new(*tensor, Real::EPSILON, MAX_EIGEN_ITERATIONS)
    else {
        log::trace!("inertia tensor diagonalization failed, using its diagonal");
        return (Rotation::identity(), diagonal);
    };

    // Pick, for each body axis, the unused eigenvector that aligns best with it.
    let mut used = [false; 3];
    let mut axes = Matrix::zeros();
    let mut inertia = Vector::zeros();
    for i in 0..3 {
        let mut best = None;
        for j in (0..3).filter(|j| !used[*j]) {
            let alignment = eigen.eigenvectors[(i, j)].abs();
            if best.map_or(true, |(_, b)| alignment > b) {
                best = Some((j, alignment));
            }
        }

        let Some((j, _)) = best else {
            return (Rotation::identity(), diagonal);
        };
        used[j] = true;

        let mut axis = eigen.eigenvectors.column(j).into_owned();
        if axis[i] < 0.0 {
            axis = -axis;
        }
        axes.set_column(i, &axis);
        inertia[i] = eigen.eigenvalues[j];
    }

    if axes.determinant() < 0.0 {
        let flipped = -axes.column(2);
        axes.set_column(2, &flipped);
    }

    let rotation = na::Rotation3::from_matrix_unchecked(axes);
    (Rotation::from_rotation_matrix(&rotation), inertia)
}

impl RigidBody {
    /// Recomputes the mass properties of this body from its shapes, mass and overrides, then
    /// refreshes every quantity depending on its transform.
    pub fn update_mass_properties(&mut self) {
        self.changes.remove(BodyChanges::MASS_PROPERTIES);

        match self.mode {
            BodyMode::Dynamic => {
                if self.compute_center_of_mass {
                    self.center_of_mass_local = center_of_mass(&self.shapes);
                }

                if self.compute_inertia {
                    let mut tensor = assemble_inertia_tensor(
                        &self.shapes,
                        self.mass,
                        &self.center_of_mass_local,
                    )
                    .unwrap_or_else(AngularInertia::identity);

                    for i in 0..3 {
                        if self.inertia[i] > 0.0 {
                            tensor[(i, i)] = self.inertia[i];
                        }
                    }

                    let (axes, inertia) = diagonalize(&tensor);
                    self.principal_inertia_axes_local = axes;
                    self.inv_inertia_diag = inertia.map(inv);
                }

                self.inv_mass = inv(self.mass);
                log::trace!(
                    "recomputed mass properties: com {:?}, inv inertia {:?}",
                    self.center_of_mass_local,
                    self.inv_inertia_diag
                );
            }
            BodyMode::DynamicLinearOnly => {
                self.inv_inertia_diag = Vector::zeros();
                self.inv_mass = inv(self.mass);
            }
            BodyMode::Static | BodyMode::Kinematic => {
                self.inv_inertia_diag = Vector::zeros();
                self.inv_mass = 0.0;
            }
        }

        self.update_transform_dependent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Isometry;
    use approx::assert_relative_eq;
    use na::vector;
    use rapier::geometry::SharedShape;

    fn dynamic_body(mass: Real) -> RigidBody {
        RigidBody::with_mode(BodyMode::Dynamic, mass).unwrap()
    }

    #[test]
    fn single_ball_matches_closed_form() {
        let mut body = dynamic_body(3.0);
        body.add_shape(SharedShape::ball(2.0), Isometry::translation(1.0, 2.0, 3.0));
        body.update_mass_properties();

        let expected = 0.4 * 3.0 * 4.0;
        assert_relative_eq!(body.inertia(), Vector::repeat(expected), epsilon = 1.0e-4);
        assert_relative_eq!(
            body.center_of_mass_local(),
            Point::new(1.0, 2.0, 3.0),
            epsilon = 1.0e-5
        );
        assert_relative_eq!(body.inv_mass(), 1.0 / 3.0);
    }

    #[test]
    fn two_balls_use_parallel_axis_theorem() {
        let mut body = dynamic_body(2.0);
        body.add_shape(SharedShape::ball(0.5), Isometry::translation(-1.0, 0.0, 0.0));
        body.add_shape(SharedShape::ball(0.5), Isometry::translation(1.0, 0.0, 0.0));
        body.update_mass_properties();

        let ball = 0.4 * 1.0 * 0.25;
        assert_relative_eq!(body.center_of_mass_local(), Point::origin(), epsilon = 1.0e-5);
        assert_relative_eq!(
            body.inertia(),
            vector![2.0 * ball, 2.0 * (ball + 1.0), 2.0 * (ball + 1.0)],
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn no_shape_falls_back_to_identity() {
        let mut body = dynamic_body(5.0);
        body.update_mass_properties();
        assert_eq!(body.center_of_mass_local(), Point::origin());
        assert_relative_eq!(body.inertia(), Vector::repeat(1.0));

        let index = body.add_shape(SharedShape::ball(1.0), Isometry::translation(4.0, 0.0, 0.0));
        body.set_shape_disabled(index, true);
        body.update_mass_properties();
        assert_eq!(body.center_of_mass_local(), Point::origin());
        assert_relative_eq!(body.inertia(), Vector::repeat(1.0));
    }

    #[test]
    fn partial_inertia_override() {
        let mut body = dynamic_body(1.0);
        body.add_shape(SharedShape::cuboid(1.0, 2.0, 3.0), Isometry::identity());
        body.update_mass_properties();
        let computed = body.inv_inertia_diag();

        body.set_inertia(vector![10.0, 0.0, -1.0]);
        assert!(body.needs_mass_properties_update());
        body.update_mass_properties();
        assert!(!body.needs_mass_properties_update());

        let inv = body.inv_inertia_diag();
        assert_relative_eq!(inv.x, 0.1, epsilon = 1.0e-6);
        assert_relative_eq!(inv.y, computed.y, epsilon = 1.0e-6);
        assert_relative_eq!(inv.z, computed.z, epsilon = 1.0e-6);
        assert_eq!(body.principal_inertia_axes_local(), Rotation::identity());
    }

    #[test]
    fn rotated_shape_is_diagonalized() {
        let mut body = dynamic_body(1.0);
        let rotation = Rotation::from_euler_angles(0.0, 0.0, 0.3);
        body.add_shape(
            SharedShape::cuboid(1.0, 2.0, 3.0),
            Isometry::from_parts(na::Translation3::identity(), rotation),
        );
        body.update_mass_properties();

        let mut reference = dynamic_body(1.0);
        reference.add_shape(SharedShape::cuboid(1.0, 2.0, 3.0), Isometry::identity());
        reference.update_mass_properties();

        let mut sorted = body.inv_inertia_diag();
        let mut expected = reference.inv_inertia_diag();
        sorted.as_mut_slice().sort_by(|a, b| a.total_cmp(b));
        expected.as_mut_slice().sort_by(|a, b| a.total_cmp(b));
        assert_relative_eq!(sorted, expected, epsilon = 1.0e-4);

        // The world inverse tensor reconstructs the rotated one.
        let tensor = body.inv_inertia_tensor();
        let basis = rotation.to_rotation_matrix();
        let expected_tensor = basis.matrix()
            * AngularInertia::from_diagonal(&reference.inv_inertia_diag())
            * basis.matrix().transpose();
        assert_relative_eq!(*tensor, expected_tensor, epsilon = 1.0e-4);
    }

    #[test]
    fn offset_hull_matches_placed_cuboid() {
        let pose = Isometry::new(vector![5.0, 0.0, 0.0], vector![0.0, 0.0, 0.5]);
        let mut corners = Vec::new();
        for x in [-1.0, 1.0] {
            for y in [-2.0, 2.0] {
                for z in [-3.0, 3.0] {
                    corners.push(pose * Point::new(x, y, z));
                }
            }
        }

        let mut hull = dynamic_body(1.0);
        hull.add_shape(
            SharedShape::convex_hull(&corners).unwrap(),
            Isometry::identity(),
        );
        hull.update_mass_properties();

        let mut reference = dynamic_body(1.0);
        reference.add_shape(SharedShape::cuboid(1.0, 2.0, 3.0), pose);
        reference.update_mass_properties();

        assert_relative_eq!(
            hull.center_of_mass_local(),
            reference.center_of_mass_local(),
            epsilon = 1.0e-4
        );
        assert_relative_eq!(
            *hull.inv_inertia_tensor(),
            *reference.inv_inertia_tensor(),
            epsilon = 1.0e-3
        );
    }

    #[test]
    fn diagonalize_keeps_diagonal_tensors_in_place() {
        let tensor = AngularInertia::from_diagonal(&vector![3.0, 1.0, 2.0]);
        let (axes, inertia) = diagonalize(&tensor);
        assert_eq!(axes, Rotation::identity());
        assert_eq!(inertia, vector![3.0, 1.0, 2.0]);
    }

    #[test]
    fn static_mass_properties_are_zero() {
        let mut body = RigidBody::new();
        body.add_shape(SharedShape::ball(1.0), Isometry::identity());
        body.update_mass_properties();
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(*body.inv_inertia_tensor(), AngularInertia::zeros());
    }
}
