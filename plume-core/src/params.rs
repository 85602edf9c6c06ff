use crate::boundary::Boundary;
use serde::{Deserialize, Serialize};

/// Scalar model parameters, fixed for the lifetime of a model.
///
/// Signs and ranges are not checked: a negative diffusion coefficient or a
/// non-positive timestep is accepted and simply produces whatever numbers
/// follow from the scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dy: f64,
    pub dt: f64,
    /// Diffusion coefficient `D`.
    pub diffusion: f64,
    /// Decay rate `lambda`, per unit time.
    pub decay: f64,
    pub boundary: Boundary,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            nx: 200,
            ny: 120,
            dx: 1.0,
            dy: 1.0,
            dt: 1.0,
            diffusion: 0.1,
            decay: 0.001,
            boundary: Boundary::Open,
        }
    }
}

impl ModelParams {
    pub fn cells(&self) -> usize {
        self.nx * self.ny
    }

    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }
}
