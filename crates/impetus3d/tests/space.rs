use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use impetus3d::dynamics::{Area, AreaOverrideMode, BodyMode, BodyState, RigidBody, SpaceParams};
use impetus3d::math::{Isometry, Vector};
use impetus3d::rapier::geometry::SharedShape;
use impetus3d::space::{NoSolver, PhysicsSpace};
use nalgebra::vector;

fn space_with_gravity(gravity: Vector<f32>) -> PhysicsSpace {
    PhysicsSpace::new(SpaceParams {
        gravity,
        default_linear_damp: 0.0,
        default_angular_damp: 0.0,
        ..SpaceParams::default()
    })
}

#[test]
fn free_fall_for_one_second() {
    let mut space = space_with_gravity(vector![0.0, -10.0, 0.0]);
    let mut body = RigidBody::with_mode(BodyMode::Dynamic, 1.0).unwrap();
    body.add_shape(SharedShape::ball(0.5), Isometry::identity());
    let handle = space.insert_body(body);

    for _ in 0..60 {
        space.step(&mut NoSolver);
    }

    let body = space.body(handle).unwrap();
    assert!(body.is_active());
    assert_relative_eq!(*body.linear_velocity(), vector![0.0, -10.0, 0.0], epsilon = 1.0e-3);

    // Semi-implicit Euler falls slightly further than the analytic 5m.
    let fallen = -body.transform().translation.vector.y;
    assert_relative_eq!(fallen, 5.0 + 5.0 / 60.0, epsilon = 1.0e-2);
}

#[test]
fn replace_area_overrides_the_default_gravity() {
    let mut space = space_with_gravity(vector![0.0, -10.0, 0.0]);
    let body = space.insert_body(RigidBody::with_mode(BodyMode::Dynamic, 1.0).unwrap());

    let replace = space.insert_area(
        Area::directional(vector![2.0, 0.0, 0.0], AreaOverrideMode::Replace).with_priority(2),
    );
    let combine = space.insert_area(
        Area::directional(vector![0.0, 0.0, 3.0], AreaOverrideMode::Combine).with_priority(1),
    );
    space.add_body_to_area(body, combine).unwrap();
    space.add_body_to_area(body, replace).unwrap();

    space.step(&mut NoSolver);
    let env = space.body(body).unwrap().environment();
    assert_relative_eq!(env.gravity, vector![2.0, 0.0, 0.0]);

    space.area_mut(replace).unwrap().override_mode = AreaOverrideMode::ReplaceCombine;
    space.step(&mut NoSolver);
    let env = space.body(body).unwrap().environment();
    assert_relative_eq!(env.gravity, vector![2.0, -10.0, 3.0]);
}

#[test]
fn still_bodies_fall_asleep_and_wake_up_on_force() {
    let mut space = space_with_gravity(Vector::zeros());
    let handle = space.insert_body(RigidBody::with_mode(BodyMode::Dynamic, 1.0).unwrap());

    for _ in 0..20 {
        space.step(&mut NoSolver);
    }
    assert!(space.body(handle).unwrap().is_active());

    for _ in 0..20 {
        space.step(&mut NoSolver);
    }
    assert!(space.body(handle).unwrap().is_sleeping());
    assert!(space.active_bodies().is_empty());

    space
        .body_mut(handle)
        .unwrap()
        .apply_force(vector![10.0, 0.0, 0.0]);
    space.step(&mut NoSolver);

    let body = space.body(handle).unwrap();
    assert!(body.is_active());
    assert!(body.linear_velocity().x > 0.0);
    assert_eq!(body.still_time(), 0.0);
}

#[test]
fn bodies_that_cannot_sleep_stay_active() {
    let mut space = space_with_gravity(Vector::zeros());
    let mut body = RigidBody::with_mode(BodyMode::Dynamic, 1.0).unwrap();
    body.set_can_sleep(false);
    let handle = space.insert_body(body);

    for _ in 0..120 {
        space.step(&mut NoSolver);
    }
    assert!(space.body(handle).unwrap().is_active());
}

#[test]
fn kinematic_target_applies_at_the_next_step() {
    let mut space = space_with_gravity(vector![0.0, -10.0, 0.0]);
    let handle = space.insert_body(RigidBody::with_mode(BodyMode::Kinematic, 1.0).unwrap());

    let start = Isometry::translation(0.0, 1.0, 0.0);
    let target = Isometry::translation(0.5, 1.0, 0.0);
    let body = space.body_mut(handle).unwrap();
    body.set_transform(start);
    body.set_transform(target);
    assert_eq!(*space.body(handle).unwrap().transform(), start);

    space.step(&mut NoSolver);
    let body = space.body(handle).unwrap();
    assert_relative_eq!(*body.transform(), target);
    assert_relative_eq!(*body.linear_velocity(), vector![30.0, 0.0, 0.0], epsilon = 1.0e-3);
    assert_eq!(body.inv_mass(), 0.0);

    // Not moving anymore: the body goes idle.
    space.step(&mut NoSolver);
    space.step(&mut NoSolver);
    assert!(!space.body(handle).unwrap().is_active());
    assert_relative_eq!(*space.body(handle).unwrap().transform(), target);
}

#[test]
fn zero_length_steps_keep_kinematic_velocities_finite() {
    let mut params = SpaceParams::default();
    params.set_inv_dt(0.0);
    let mut space = PhysicsSpace::new(params);
    let handle = space.insert_body(RigidBody::with_mode(BodyMode::Kinematic, 1.0).unwrap());

    space
        .body_mut(handle)
        .unwrap()
        .set_transform(Isometry::translation(0.0, 1.0, 0.0));
    space.step(&mut NoSolver);

    let body = space.body(handle).unwrap();
    assert!(body.linear_velocity().iter().all(|v| v.is_finite()));
    assert!(body.angular_velocity().iter().all(|v| v.is_finite()));
    assert_eq!(*body.transform(), Isometry::translation(0.0, 1.0, 0.0));
    // Resting and touching nothing: it goes idle.
    assert!(!body.is_active());
}

#[test]
fn observers_are_notified_once_per_step() {
    let mut space = space_with_gravity(vector![0.0, -10.0, 0.0]);
    let states = Rc::new(RefCell::new(Vec::new()));

    let mut body = RigidBody::with_mode(BodyMode::Dynamic, 2.0).unwrap();
    let sink = states.clone();
    body.add_state_observer(move |state: &BodyState| sink.borrow_mut().push(*state));
    let handle = space.insert_body(body);

    for _ in 0..3 {
        space.step(&mut NoSolver);
    }

    let states = states.borrow();
    assert_eq!(states.len(), 3);
    assert!(states[2].linear_velocity.y < states[0].linear_velocity.y);
    assert_eq!(states[2], space.body(handle).unwrap().state());
    assert_relative_eq!(states[0].inv_mass, 0.5);
    assert!(!states[0].sleeping);
}

#[test]
fn static_bodies_never_move() {
    let mut space = space_with_gravity(vector![0.0, -10.0, 0.0]);
    let mut body = RigidBody::new();
    body.add_shape(SharedShape::cuboid(1.0, 1.0, 1.0), Isometry::identity());
    let handle = space.insert_body(body);

    space.body_mut(handle).unwrap().apply_force(vector![0.0, 100.0, 0.0]);
    for _ in 0..10 {
        space.step(&mut NoSolver);
    }

    let body = space.body(handle).unwrap();
    assert_eq!(*body.transform(), Isometry::identity());
    assert_eq!(body.inv_mass(), 0.0);
    assert!(!body.is_active());
    assert!(!body.is_sleeping());
    assert!(!body.state().sleeping);
}
