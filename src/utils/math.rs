// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Matrix3, Vector3};

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Convert degrees to radians
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Convert radians to degrees
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Mach angle in radians; 90 degrees at or below Mach 1
pub fn mach_angle(mach: f64) -> f64 {
    if mach <= 1.0 {
        std::f64::consts::FRAC_PI_2
    } else {
        (1.0 / mach).asin()
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lerp(start, end, 0.5)],
        _ => (0..n)
            .map(|i| lerp(start, end, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Outer product v v^T
pub fn outer(v: &Vector3<f64>) -> Matrix3<f64> {
    v * v.transpose()
}

/// Inertia tensor from a second-moment (covariance) matrix: I = tr(C) E - C
pub fn inertia_from_covariance(cov: &Matrix3<f64>) -> Matrix3<f64> {
    Matrix3::identity() * cov.trace() - cov
}

/// Second-moment matrix from an inertia tensor: C = tr(I)/2 E - I
pub fn covariance_from_inertia(inertia: &Matrix3<f64>) -> Matrix3<f64> {
    Matrix3::identity() * (inertia.trace() * 0.5) - inertia
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }

    #[test]
    fn test_linspace_inclusive() {
        let v = linspace(1.0, 2.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[4], 2.0);
        assert_eq!(linspace(1.0, 3.0, 1), vec![2.0]);
    }

    #[test]
    fn test_mach_angle() {
        assert_relative_eq!(mach_angle(0.8), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(mach_angle(2.0), deg_to_rad(30.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inertia_covariance_inverse() {
        let cov = Matrix3::new(2.0, 0.3, -0.1, 0.3, 1.0, 0.2, -0.1, 0.2, 0.5);
        let inertia = inertia_from_covariance(&cov);
        assert_relative_eq!(covariance_from_inertia(&inertia), cov, epsilon = 1e-12);
    }
}
