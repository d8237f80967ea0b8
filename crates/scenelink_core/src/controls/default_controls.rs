//! Built-in move/look controls.
//!
//! Moves translate along the node's own axes; `forward` is local `-Z`.
//! Looks rotate about local axes by `amount` degrees.

use crate::controls::{ActuationSpec, SceneNodeControl};
use crate::model::transform::{Transform, Vector3};

const X_AXIS: Vector3 = Vector3::new(1.0, 0.0, 0.0);
const Y_AXIS: Vector3 = Vector3::new(0.0, 1.0, 0.0);
const Z_AXIS: Vector3 = Vector3::new(0.0, 0.0, 1.0);

/// Translation along one local axis, signed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAlong {
    axis: Vector3,
    sign: f32,
    body_action: bool,
}

impl SceneNodeControl for MoveAlong {
    fn apply(&self, transform: &mut Transform, spec: &ActuationSpec) {
        transform.translate_along(self.axis, self.sign * spec.amount);
    }

    fn body_action(&self) -> bool {
        self.body_action
    }
}

/// Rotation about one local axis, signed, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateLocal {
    axis: Vector3,
    sign: f32,
    body_action: bool,
}

impl SceneNodeControl for RotateLocal {
    fn apply(&self, transform: &mut Transform, spec: &ActuationSpec) {
        transform.rotate_local(self.axis, self.sign * spec.amount);
    }

    fn body_action(&self) -> bool {
        self.body_action
    }
}

fn move_along(axis: Vector3, sign: f32, body_action: bool) -> MoveAlong {
    MoveAlong {
        axis,
        sign,
        body_action,
    }
}

fn rotate_local(axis: Vector3, sign: f32, body_action: bool) -> RotateLocal {
    RotateLocal {
        axis,
        sign,
        body_action,
    }
}

pub const MOVE_FORWARD: &str = "move_forward";
pub const MOVE_BACKWARD: &str = "move_backward";
pub const MOVE_LEFT: &str = "move_left";
pub const MOVE_RIGHT: &str = "move_right";
pub const MOVE_UP: &str = "move_up";
pub const MOVE_DOWN: &str = "move_down";
pub const LOOK_LEFT: &str = "look_left";
pub const LOOK_RIGHT: &str = "look_right";
pub const LOOK_UP: &str = "look_up";
pub const LOOK_DOWN: &str = "look_down";
pub const TURN_LEFT: &str = "turn_left";
pub const TURN_RIGHT: &str = "turn_right";

fn entry(
    name: &'static str,
    control: impl SceneNodeControl + 'static,
) -> (&'static str, Box<dyn SceneNodeControl>) {
    (name, Box::new(control))
}

/// Returns every built-in control with its registry name.
pub fn default_controls() -> Vec<(&'static str, Box<dyn SceneNodeControl>)> {
    vec![
        entry(MOVE_BACKWARD, move_along(Z_AXIS, 1.0, true)),
        entry(MOVE_FORWARD, move_along(Z_AXIS, -1.0, true)),
        entry(MOVE_RIGHT, move_along(X_AXIS, 1.0, true)),
        entry(MOVE_LEFT, move_along(X_AXIS, -1.0, true)),
        entry(MOVE_UP, move_along(Y_AXIS, 1.0, false)),
        entry(MOVE_DOWN, move_along(Y_AXIS, -1.0, false)),
        entry(LOOK_LEFT, rotate_local(Y_AXIS, 1.0, false)),
        entry(LOOK_RIGHT, rotate_local(Y_AXIS, -1.0, false)),
        entry(TURN_LEFT, rotate_local(Y_AXIS, 1.0, true)),
        entry(TURN_RIGHT, rotate_local(Y_AXIS, -1.0, true)),
        entry(LOOK_UP, rotate_local(X_AXIS, 1.0, false)),
        entry(LOOK_DOWN, rotate_local(X_AXIS, -1.0, false)),
    ]
}

#[cfg(test)]
mod tests {
    use super::{default_controls, MOVE_FORWARD, MOVE_UP, TURN_LEFT};
    use crate::controls::ActuationSpec;
    use crate::model::transform::{Transform, Vector3};

    fn apply_named(name: &str, transform: &mut Transform, amount: f32) -> bool {
        let controls = default_controls();
        let (_, control) = controls
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .expect("built-in control");
        control.apply(transform, &ActuationSpec { amount });
        control.body_action()
    }

    #[test]
    fn move_forward_goes_along_negative_z() {
        let mut transform = Transform::IDENTITY;
        assert!(apply_named(MOVE_FORWARD, &mut transform, 0.25));
        assert!((transform.translation - Vector3::new(0.0, 0.0, -0.25)).length() < 1e-6);
    }

    #[test]
    fn turn_left_then_forward_moves_left() {
        let mut transform = Transform::IDENTITY;
        assert!(apply_named(TURN_LEFT, &mut transform, 90.0));
        apply_named(MOVE_FORWARD, &mut transform, 1.0);
        assert!((transform.translation - Vector3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn move_up_is_not_a_body_action() {
        let mut transform = Transform::IDENTITY;
        assert!(!apply_named(MOVE_UP, &mut transform, 1.0));
        assert!((transform.translation.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_control_names_are_unique() {
        let controls = default_controls();
        let mut names = controls.iter().map(|(name, _)| *name).collect::<Vec<_>>();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), controls.len());
    }
}
