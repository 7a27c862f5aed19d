//! SPH smoothing kernels: `W_poly6`, `∇W_spiky`, `∇²W_viscosity`.
//!
//! All three are defined for `|r| <= h` only; callers guarantee this
//! (neighbor enumeration already filters by `h`), so none of these
//! functions retest the radius — that branch is saved inside the
//! neighbor inner loop, per the original `particle_system.h` kernel
//! comment.

use glam::Vec3;
use std::f32::consts::PI;

/// Precomputed coefficients for a given kernel radius `h`.
///
/// Recomputed only when `h` changes (see
/// [`KernelCoefficients::update`]), mirroring the "cached, recomputed
/// only when h changes" requirement in spec §4.1.
#[derive(Clone, Copy, Debug)]
pub struct KernelCoefficients {
    h: f32,
    h2: f32,
    poly6_coeff: f32,
    spiky_grad_coeff: f32,
    viscosity_lap_coeff: f32,
}

impl KernelCoefficients {
    pub fn new(h: f32) -> Self {
        let mut c = Self {
            h: 0.0,
            h2: 0.0,
            poly6_coeff: 0.0,
            spiky_grad_coeff: 0.0,
            viscosity_lap_coeff: 0.0,
        };
        c.update(h);
        c
    }

    pub fn h(&self) -> f32 {
        self.h
    }

    pub fn h2(&self) -> f32 {
        self.h2
    }

    /// Recompute cached coefficients for a new kernel radius.
    pub fn update(&mut self, h: f32) {
        if h == self.h {
            return;
        }
        self.h = h;
        self.h2 = h * h;
        let h3 = self.h2 * h;
        let h6 = h3 * h3;
        let h9 = h6 * h3;
        self.poly6_coeff = 315.0 / (64.0 * PI * h9);
        self.spiky_grad_coeff = -45.0 / (PI * h6);
        self.viscosity_lap_coeff = 45.0 / (PI * h6);
    }

    /// `W_poly6(r) = (315 / (64 pi h^9)) * (h^2 - |r|^2)^3`
    #[inline]
    pub fn poly6(&self, r_len_sq: f32) -> f32 {
        let diff = self.h2 - r_len_sq;
        self.poly6_coeff * diff * diff * diff
    }

    /// `∇W_spiky(r) = (-45 / (pi h^6)) * (h - |r|)^2 * r/|r|`, `0` at `r=0`.
    #[inline]
    pub fn spiky_gradient(&self, r: Vec3, r_len: f32) -> Vec3 {
        if r_len <= 1e-8 {
            return Vec3::ZERO;
        }
        let diff = self.h - r_len;
        (r / r_len) * (self.spiky_grad_coeff * diff * diff)
    }

    /// `∇²W_viscosity(r) = (45 / (pi h^6)) * (h - |r|)`
    #[inline]
    pub fn viscosity_laplacian(&self, r_len: f32) -> f32 {
        self.viscosity_lap_coeff * (self.h - r_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `integral of W_poly6 dV` over a ball of radius h should be 1
    /// (spec §8), checked within relative error 1e-3 via a coarse
    /// Riemann sum over a regular grid of sample points.
    #[test]
    fn poly6_integrates_to_one() {
        let h = 0.2_f32;
        let k = KernelCoefficients::new(h);
        let step = h / 40.0;
        let mut sum = 0.0_f64;
        let mut x = -h;
        while x <= h {
            let mut y = -h;
            while y <= h {
                let mut z = -h;
                while z <= h {
                    let r2 = x * x + y * y + z * z;
                    if r2 < h * h {
                        sum += k.poly6(r2) as f64;
                    }
                    z += step;
                }
                y += step;
            }
            x += step;
        }
        let cell_volume = (step as f64).powi(3);
        let integral = sum * cell_volume;
        assert!(
            (integral - 1.0).abs() < 1e-3,
            "integral of poly6 over ball(h) = {integral}, expected ~1.0"
        );
    }

    #[test]
    fn spiky_gradient_zero_at_origin() {
        let k = KernelCoefficients::new(0.1);
        assert_eq!(k.spiky_gradient(Vec3::ZERO, 0.0), Vec3::ZERO);
    }

    #[test]
    fn spiky_gradient_points_away_from_neighbor_direction() {
        let h = 0.1_f32;
        let k = KernelCoefficients::new(h);
        let r = Vec3::new(0.05, 0.0, 0.0);
        let grad = k.spiky_gradient(r, r.length());
        // coefficient is negative, so the gradient opposes r
        assert!(grad.x < 0.0);
        assert_eq!(grad.y, 0.0);
        assert_eq!(grad.z, 0.0);
    }

    #[test]
    fn viscosity_laplacian_positive_within_radius_zero_at_radius() {
        let h = 0.1_f32;
        let k = KernelCoefficients::new(h);
        assert!(k.viscosity_laplacian(0.0) > 0.0);
        assert!((k.viscosity_laplacian(h)).abs() < 1e-6);
    }

    #[test]
    fn coefficients_recompute_only_when_h_changes() {
        let mut k = KernelCoefficients::new(0.1);
        let before = k.poly6_coeff;
        k.update(0.1);
        assert_eq!(k.poly6_coeff, before);
        k.update(0.2);
        assert_ne!(k.poly6_coeff, before);
    }
}
