//! Rigid transform math for scene nodes.
//!
//! Frame convention: `+Y` is up and `-Z` is front. Rotations are unit
//! quaternions; callers renormalize after accumulating rotations.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 3D vector in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns the unit vector, or zero for a zero-length input.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON {
            return Self::ZERO;
        }
        self * (1.0 / length)
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// World up axis.
pub const UP: Vector3 = Vector3::new(0.0, 1.0, 0.0);
/// Gravity direction.
pub const GRAVITY: Vector3 = Vector3::new(0.0, -1.0, 0.0);
/// Forward axis.
pub const FRONT: Vector3 = Vector3::new(0.0, 0.0, -1.0);
pub const BACK: Vector3 = Vector3::new(0.0, 0.0, 1.0);
pub const LEFT: Vector3 = Vector3::new(-1.0, 0.0, 0.0);
pub const RIGHT: Vector3 = Vector3::new(1.0, 0.0, 0.0);

/// Rotation quaternion stored as vector part `(x, y, z)` and scalar `w`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Builds a rotation of `radians` about `axis` (normalized internally).
    pub fn from_axis_angle(axis: Vector3, radians: f32) -> Self {
        let axis = axis.normalized();
        let half = radians * 0.5;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    fn vector(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn norm(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Returns the unit quaternion; degenerate input collapses to identity.
    pub fn normalized(self) -> Self {
        let norm = self.norm();
        if norm <= f32::EPSILON {
            return Self::IDENTITY;
        }
        let inv = 1.0 / norm;
        Self {
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
            w: self.w * inv,
        }
    }

    /// Inverse rotation for unit quaternions.
    pub fn conjugate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Rotates `v` by this (unit) quaternion.
    pub fn rotate_vector(self, v: Vector3) -> Vector3 {
        let q = self.vector();
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

/// Local rigid transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vector3::ZERO,
        rotation: Quaternion::IDENTITY,
    };

    pub fn new(translation: Vector3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Returns `parent * child`: `child` expressed in `parent`'s frame.
    pub fn compose(parent: &Self, child: &Self) -> Self {
        Self {
            translation: parent.translation + parent.rotation.rotate_vector(child.translation),
            rotation: (parent.rotation * child.rotation).normalized(),
        }
    }

    /// Transform undoing `self`, so `compose(&self.inverse(), &self)` is identity.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            translation: -rotation.rotate_vector(self.translation),
            rotation,
        }
    }

    /// Unit local `axis` expressed in the parent frame.
    pub fn local_axis(&self, axis: Vector3) -> Vector3 {
        self.rotation.rotate_vector(axis)
    }

    /// Moves the node by `distance` along its local `axis`.
    pub fn translate_along(&mut self, axis: Vector3, distance: f32) {
        let direction = self.local_axis(axis);
        self.translation += direction * distance;
    }

    /// Rotates the node about its local `axis` and renormalizes.
    pub fn rotate_local(&mut self, axis: Vector3, degrees: f32) {
        let delta = Quaternion::from_axis_angle(axis, degrees.to_radians());
        self.rotation = (self.rotation * delta).normalized();
    }
}
