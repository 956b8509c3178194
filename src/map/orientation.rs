use glam::{DMat3, DQuat, DVec3};
use std::ops::Mul;

use crate::geo::GeoPoint;

/// Attitude of the globe relative to the viewer.
///
/// Maps view space (+Z towards the viewer, +Y up, +X right) into world
/// space. The world point under the screen center is `rotate(DVec3::Z)`.
/// Always kept at unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation(DQuat);

impl Orientation {
    pub const IDENTITY: Self = Self(DQuat::IDENTITY);

    /// Wrap a quaternion, renormalizing it. Degenerate input falls back to
    /// the identity.
    pub fn from_quat(q: DQuat) -> Self {
        let len = q.length();
        if !len.is_finite() || len <= f64::EPSILON {
            return Self::IDENTITY;
        }
        Self(q / len)
    }

    /// Yaw about +Y, then pitch about the yawed +X, then roll about the
    /// viewing axis. Positive pitch tilts the view south.
    pub fn from_yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::from_quat(
            DQuat::from_rotation_y(yaw) * DQuat::from_rotation_x(pitch) * DQuat::from_rotation_z(roll),
        )
    }

    /// Orientation that puts `center` in the middle of the screen with
    /// north up.
    pub fn from_geo(center: &GeoPoint) -> Self {
        Self::from_yaw_pitch_roll(center.lon(), -center.lat(), 0.0)
    }

    pub fn from_matrix(m: &DMat3) -> Self {
        Self::from_quat(DQuat::from_mat3(m))
    }

    pub fn to_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.0)
    }

    #[inline(always)]
    pub fn quat(&self) -> DQuat {
        self.0
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self(self.0.conjugate())
    }

    /// Rotate a direction from view space into world space.
    #[inline(always)]
    pub fn rotate(&self, v: DVec3) -> DVec3 {
        self.0 * v
    }

    /// World-space direction the viewer looks at.
    #[inline]
    pub fn forward(&self) -> DVec3 {
        self.rotate(DVec3::Z)
    }

    /// Longitude of the view center.
    pub fn yaw(&self) -> f64 {
        let f = self.forward();
        f.x.atan2(f.z)
    }

    /// Negated latitude of the view center: positive when looking at the
    /// southern hemisphere.
    pub fn pitch(&self) -> f64 {
        -self.forward().y.clamp(-1.0, 1.0).asin()
    }

    /// Geographic point under the screen center.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::from_vector(self.forward())
    }

    /// Spin the globe in view space: `yaw` about the screen's vertical axis,
    /// then `pitch` about its horizontal axis.
    pub fn rotated_in_view(&self, yaw: f64, pitch: f64) -> Self {
        *self * Self(DQuat::from_rotation_y(yaw)) * Self(DQuat::from_rotation_x(pitch))
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Orientation {
    type Output = Orientation;

    /// Compose two rotations, renormalizing to bound drift.
    fn mul(self, rhs: Orientation) -> Orientation {
        Orientation::from_quat(self.0 * rhs.0)
    }
}
