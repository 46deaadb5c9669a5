//! Column-major 4x4 matrices
//!
//! Element `i` lives at column `i / 4`, row `i % 4`, so elements 12..15 hold
//! the translation column. Operations mutate in place and compose by
//! post-multiplication, the way a GL-style shader expects `P * V * M * p`.

use std::ops::{Index, IndexMut};

use bytemuck::{Pod, Zeroable};
#[cfg(test)]
use glam::{Vec3, Vec4};

use crate::error::MatrixError;

/// A 4x4 transform stored as 16 floats in column-major order
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Matrix4(pub [f32; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<usize> for Matrix4 {
    type Output = f32;

    #[inline]
    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Matrix4 {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.0[i]
    }
}

impl Matrix4 {
    pub const ZERO: Self = Self([0.0; 16]);

    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Zero-filled matrix, ready to be overwritten by one of the setters
    pub const fn new() -> Self {
        Self::ZERO
    }

    /// Element at (row, col)
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    /// Reset to the multiplicative identity
    pub fn identity(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// Overwrite with a perspective projection.
    ///
    /// Produces GL clip space (depth in `[-w, w]`). Requires `near > 0`,
    /// `far > near` and `aspect > 0`; other inputs give a meaningless matrix.
    pub fn perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        self.0 = [0.0; 16];
        self[0] = f / aspect;
        self[5] = f;
        self[10] = (far + near) * nf;
        self[11] = -1.0;
        self[14] = 2.0 * far * near * nf;
        self
    }

    /// Translate along the matrix's current basis (post-multiply)
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        for row in 0..4 {
            self[12 + row] += self[row] * x + self[4 + row] * y + self[8 + row] * z;
        }
        self
    }

    /// Rotate about the Y axis, combined with the current basis (post-multiply)
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        let (s, c) = angle.sin_cos();
        for row in 0..4 {
            let m0 = self[row];
            let m2 = self[8 + row];
            self[row] = m0 * c + m2 * s;
            self[8 + row] = m2 * c - m0 * s;
        }
        self
    }

    /// `self * other`
    #[cfg(test)]
    pub(crate) fn mul(&self, other: &Matrix4) -> Matrix4 {
        let mut out = Matrix4::ZERO;
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| self.at(row, k) * other.at(k, col)).sum::<f32>();
            }
        }
        out
    }

    /// Apply to a point (w = 1), returning homogeneous coordinates
    #[cfg(test)]
    pub(crate) fn transform_point(&self, p: Vec3) -> Vec4 {
        let v = [p.x, p.y, p.z, 1.0];
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| self.at(row, k) * v[k]).sum::<f32>();
        }
        Vec4::from_array(out)
    }
}

/// Write the inverse of `a` into `out` by cofactor expansion.
///
/// Fails with [`MatrixError::Singular`] when the determinant is zero or not finite;
/// `out` is left untouched in that case.
pub fn invert(out: &mut Matrix4, a: &Matrix4) -> Result<(), MatrixError> {
    #[rustfmt::skip]
    let [
        a00, a01, a02, a03,
        a10, a11, a12, a13,
        a20, a21, a22, a23,
        a30, a31, a32, a33,
    ] = a.0;

    let b00 = a00 * a11 - a01 * a10;
    let b01 = a00 * a12 - a02 * a10;
    let b02 = a00 * a13 - a03 * a10;
    let b03 = a01 * a12 - a02 * a11;
    let b04 = a01 * a13 - a03 * a11;
    let b05 = a02 * a13 - a03 * a12;
    let b06 = a20 * a31 - a21 * a30;
    let b07 = a20 * a32 - a22 * a30;
    let b08 = a20 * a33 - a23 * a30;
    let b09 = a21 * a32 - a22 * a31;
    let b10 = a21 * a33 - a23 * a31;
    let b11 = a22 * a33 - a23 * a32;

    let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
    if det == 0.0 || !det.is_finite() {
        return Err(MatrixError::Singular);
    }
    let inv_det = 1.0 / det;

    out.0 = [
        (a11 * b11 - a12 * b10 + a13 * b09) * inv_det,
        (a02 * b10 - a01 * b11 - a03 * b09) * inv_det,
        (a31 * b05 - a32 * b04 + a33 * b03) * inv_det,
        (a22 * b04 - a21 * b05 - a23 * b03) * inv_det,
        (a12 * b08 - a10 * b11 - a13 * b07) * inv_det,
        (a00 * b11 - a02 * b08 + a03 * b07) * inv_det,
        (a32 * b02 - a30 * b05 - a33 * b01) * inv_det,
        (a20 * b05 - a22 * b02 + a23 * b01) * inv_det,
        (a10 * b10 - a11 * b08 + a13 * b06) * inv_det,
        (a01 * b08 - a00 * b10 - a03 * b06) * inv_det,
        (a30 * b04 - a31 * b02 + a33 * b00) * inv_det,
        (a21 * b02 - a20 * b04 - a23 * b00) * inv_det,
        (a11 * b07 - a10 * b09 - a12 * b06) * inv_det,
        (a00 * b09 - a01 * b07 + a02 * b06) * inv_det,
        (a31 * b01 - a30 * b03 - a32 * b00) * inv_det,
        (a20 * b03 - a21 * b01 + a22 * b00) * inv_det,
    ];
    Ok(())
}

/// Write the transpose of `a` into `out`
pub fn transpose(out: &mut Matrix4, a: &Matrix4) {
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = a[row * 4 + col];
        }
    }
}

/// Transpose in place, swapping the six off-diagonal pairs
pub fn transpose_in_place(m: &mut Matrix4) {
    let (a01, a02, a03) = (m[1], m[2], m[3]);
    let (a12, a13) = (m[6], m[7]);
    let a23 = m[11];

    m[1] = m[4];
    m[2] = m[8];
    m[3] = m[12];
    m[4] = a01;
    m[6] = m[9];
    m[7] = m[13];
    m[8] = a02;
    m[9] = a12;
    m[11] = m[14];
    m[12] = a03;
    m[13] = a13;
    m[14] = a23;
}

/// Inverse-transpose of `model`, for transforming surface normals
pub fn normal_matrix(model: &Matrix4) -> Result<Matrix4, MatrixError> {
    let mut out = Matrix4::ZERO;
    invert(&mut out, model)?;
    transpose_in_place(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "expected {a} to be close to {b}");
    }

    fn assert_matrix_close(a: &Matrix4, b: &[f32; 16]) {
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-4, "element {i}: {} vs {}", a[i], b[i]);
        }
    }

    #[test]
    fn test_identity() {
        let mut m = Matrix4::new();
        m.identity();
        for row in 0..4 {
            for col in 0..4 {
                let expected = if row == col { 1.0 } else { 0.0 };
                assert_eq!(m.at(row, col), expected);
            }
        }
    }

    #[test]
    fn test_perspective_focal_length() {
        let mut m = Matrix4::new();
        m.perspective(FRAC_PI_4, 1.0, 0.1, 100.0);
        assert!(m[5] != 0.0);
        assert_close(m.at(1, 1), 1.0 / (FRAC_PI_4 / 2.0).tan());
        assert_eq!(m[11], -1.0);
        assert_eq!(m[15], 0.0);
    }

    #[test]
    fn test_perspective_matches_gl_convention() {
        let mut m = Matrix4::new();
        m.perspective(1.1, 16.0 / 9.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh_gl(1.1, 16.0 / 9.0, 0.1, 100.0);
        assert_matrix_close(&m, &expected.to_cols_array());
    }

    #[test]
    fn test_translate_identity() {
        let mut m = Matrix4::IDENTITY;
        m.translate(1.0, 2.0, 3.0);
        assert_eq!(m[12], 1.0);
        assert_eq!(m[13], 2.0);
        assert_eq!(m[14], 3.0);
        assert_eq!(m[15], 1.0);
    }

    #[test]
    fn test_translate_uses_current_basis() {
        let mut m = Matrix4::IDENTITY;
        m.rotate_y(FRAC_PI_2);
        let rotated = m;
        m.translate(1.0, 2.0, 3.0);

        let mut t = Matrix4::IDENTITY;
        t[12] = 1.0;
        t[13] = 2.0;
        t[14] = 3.0;
        assert_matrix_close(&m, &rotated.mul(&t).0);
    }

    #[test]
    fn test_rotate_y_half_turn() {
        let mut m = Matrix4::IDENTITY;
        m.rotate_y(PI);
        assert_close(m[0], -1.0);
        assert_close(m[2], 0.0);
        assert_close(m[8], 0.0);
        assert_close(m[10], -1.0);
        assert_eq!(m[5], 1.0);
    }

    #[test]
    fn test_rotate_y_post_multiplies() {
        let mut base = Matrix4::IDENTITY;
        base.translate(0.5, -1.0, 2.0);
        let mut m = base;
        m.rotate_y(0.7);

        let mut r = Matrix4::IDENTITY;
        r.rotate_y(0.7);
        assert_matrix_close(&m, &base.mul(&r).0);
        // Positive angles turn +X toward +Z
        assert_matrix_close(&r, &Mat4::from_rotation_y(-0.7).to_cols_array());
    }

    #[test]
    fn test_invert_round_trip() {
        let mut m = Matrix4::IDENTITY;
        m.translate(0.3, -2.0, -3.0).rotate_y(1.2);
        let mut inv = Matrix4::new();
        invert(&mut inv, &m).unwrap();
        assert_matrix_close(&m.mul(&inv), &Matrix4::IDENTITY.0);

        let expected = Mat4::from_cols_array(&m.0).inverse();
        assert_matrix_close(&inv, &expected.to_cols_array());
    }

    #[test]
    fn test_invert_projection() {
        let mut p = Matrix4::new();
        p.perspective(FRAC_PI_4, 1.5, 0.1, 100.0);
        let mut inv = Matrix4::new();
        invert(&mut inv, &p).unwrap();
        assert_matrix_close(&p.mul(&inv), &Matrix4::IDENTITY.0);
    }

    #[test]
    fn test_invert_singular_leaves_output() {
        let mut out = Matrix4::IDENTITY;
        out[12] = 7.0;
        let before = out;
        assert_eq!(invert(&mut out, &Matrix4::ZERO), Err(MatrixError::Singular));
        assert_eq!(out, before);
    }

    #[test]
    fn test_invert_non_finite_leaves_output() {
        let mut nan = Matrix4::IDENTITY;
        nan[5] = f32::NAN;
        let mut huge = Matrix4::IDENTITY;
        huge[0] = f32::INFINITY;

        for m in [nan, huge] {
            let mut out = Matrix4::IDENTITY;
            assert_eq!(invert(&mut out, &m), Err(MatrixError::Singular));
            assert_eq!(out, Matrix4::IDENTITY);
        }
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_rotation() {
        let mut model = Matrix4::IDENTITY;
        model.rotate_y(0.9);
        let normal = normal_matrix(&model).unwrap();
        assert_matrix_close(&normal, &model.0);
    }

    #[test]
    fn test_normal_matrix_singular() {
        assert_eq!(normal_matrix(&Matrix4::ZERO), Err(MatrixError::Singular));
    }

    #[test]
    fn test_transform_point() {
        let mut m = Matrix4::IDENTITY;
        m.translate(0.0, 0.0, -3.0);
        let p = m.transform_point(Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(p, Vec4::new(1.0, 2.0, -3.0, 1.0));
    }

    fn any_matrix() -> impl Strategy<Value = Matrix4> {
        prop::array::uniform16(-100.0f32..100.0).prop_map(Matrix4)
    }

    proptest! {
        #[test]
        fn prop_transpose_twice_is_identity(m in any_matrix()) {
            let mut once = Matrix4::new();
            let mut twice = Matrix4::new();
            transpose(&mut once, &m);
            transpose(&mut twice, &once);
            prop_assert_eq!(twice, m);
        }

        #[test]
        fn prop_in_place_transpose_matches(m in any_matrix()) {
            let mut expected = Matrix4::new();
            transpose(&mut expected, &m);
            let mut in_place = m;
            transpose_in_place(&mut in_place);
            prop_assert_eq!(in_place, expected);
            transpose_in_place(&mut in_place);
            prop_assert_eq!(in_place, m);
        }
    }
}
