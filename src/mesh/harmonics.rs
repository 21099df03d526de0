//! Real spherical harmonics radius deformation.
//!
//! Basis functions come from `sphrs` (`RealSH::Spherical`), with Z as the
//! polar axis, ordered by `(l, m)` with `m` running from `-l` to `l`:
//! `Y00, Y1-1, Y10, Y11, Y2-2, ...`.

use glam::Vec3;
use sphrs::{Coordinates, HarmonicsSet, RealSH};

use super::data::MeshData;
use super::generators::subdivided_sphere;
use crate::error::{ViewerError, ViewerResult};

/// Highest accepted harmonic degree.
pub const MAX_DEGREE: u32 = 8;

/// Number of coefficients for a band-limited expansion of `degree`.
pub fn coefficient_count(degree: u32) -> usize {
    ((degree + 1) * (degree + 1)) as usize
}

/// Degree implied by a coefficient count, if it is a supported one.
pub fn degree_for(count: usize) -> Option<u32> {
    (0..=MAX_DEGREE).find(|&degree| coefficient_count(degree) == count)
}

fn coordinates(direction: Vec3) -> Coordinates<f32> {
    let d = direction.try_normalize().unwrap_or(Vec3::Z);
    Coordinates::cartesian(d.x, d.y, d.z)
}

/// Evaluate every basis function up to `degree` at a direction.
pub fn evaluate_basis(degree: u32, direction: Vec3) -> Vec<f32> {
    HarmonicsSet::<f32, _>::new(degree as usize, RealSH::Spherical).eval(&coordinates(direction))
}

/// A validated coefficient vector with its harmonics set.
pub struct HarmonicExpansion {
    set: HarmonicsSet<f32, RealSH>,
    degree: u32,
    coefficients: Vec<f32>,
}

impl HarmonicExpansion {
    /// Accepts `(l + 1)^2` finite coefficients for some `l <= MAX_DEGREE`.
    pub fn new(coefficients: &[f32]) -> ViewerResult<Self> {
        let degree = degree_for(coefficients.len()).ok_or_else(|| {
            ViewerError::shape(
                "coefficients",
                format!(
                    "expected (l+1)^2 coefficients with l <= {MAX_DEGREE}, got {}",
                    coefficients.len()
                ),
            )
        })?;
        if let Some(c) = coefficients.iter().find(|c| !c.is_finite()) {
            return Err(ViewerError::shape(
                "coefficients",
                format!("coefficient {c} is not finite"),
            ));
        }

        Ok(Self {
            set: HarmonicsSet::new(degree as usize, RealSH::Spherical),
            degree,
            coefficients: coefficients.to_vec(),
        })
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Absolute value of `sum(c_k * Y_k(direction))`.
    pub fn radius(&self, direction: Vec3) -> f32 {
        self.set
            .eval_with_coefficients(&coordinates(direction), &self.coefficients)
            .iter()
            .sum::<f32>()
            .abs()
    }
}

/// Subdivided sphere whose radius follows a spherical harmonic expansion.
pub fn harmonic_sphere(depth: u32, coefficients: &[f32]) -> ViewerResult<MeshData> {
    let expansion = HarmonicExpansion::new(coefficients)?;
    log::debug!(
        "Harmonic sphere: degree {}, depth {}",
        expansion.degree(),
        depth
    );
    Ok(subdivided_sphere(depth, |d| expansion.radius(d))?.with_label("harmonic"))
}
