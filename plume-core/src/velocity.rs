use crate::error::{ModelError, Result};

/// Default drift applied to every cell when no velocity is supplied.
pub const DEFAULT_VELOCITY: (f64, f64) = (0.5, 0.0);

/// Dense `(ux, uy)` field over an `nx * ny` grid, row-major like the
/// concentration field (cell `(i, j)` at `i * ny + j`).
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityField {
    nx: usize,
    ny: usize,
    data: Vec<[f64; 2]>,
}

impl VelocityField {
    pub fn uniform(nx: usize, ny: usize, ux: f64, uy: f64) -> VelocityField {
        VelocityField {
            nx,
            ny,
            data: vec![[ux, uy]; nx * ny],
        }
    }

    /// Evaluates `f(i, j)` exactly once per cell, `i` outer and `j` inner.
    pub fn from_fn<F>(nx: usize, ny: usize, mut f: F) -> VelocityField
    where
        F: FnMut(usize, usize) -> (f64, f64),
    {
        let mut data = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let (ux, uy) = f(i, j);
                data.push([ux, uy]);
            }
        }
        VelocityField { nx, ny, data }
    }

    pub fn from_vec(nx: usize, ny: usize, data: Vec<[f64; 2]>) -> Result<VelocityField> {
        if data.len() != nx * ny {
            return Err(ModelError::VelocityShape {
                expected: nx * ny,
                actual: data.len(),
            });
        }
        Ok(VelocityField { nx, ny, data })
    }

    /// Builds from interleaved `ux, uy` pairs, the layout of a `(nx, ny, 2)` array.
    pub fn from_interleaved(nx: usize, ny: usize, flat: &[f64]) -> Result<VelocityField> {
        if flat.len() != nx * ny * 2 {
            return Err(ModelError::VelocityShape {
                expected: nx * ny,
                actual: flat.len() / 2,
            });
        }
        let data = flat.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
        Ok(VelocityField { nx, ny, data })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn get(&self, i: usize, j: usize) -> Option<(f64, f64)> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        let [ux, uy] = self.data[i * self.ny + j];
        Some((ux, uy))
    }

    pub fn as_slice(&self) -> &[[f64; 2]] {
        &self.data
    }

    pub(crate) fn ensure_shape(&self, nx: usize, ny: usize) -> Result<()> {
        if self.nx != nx || self.ny != ny {
            return Err(ModelError::VelocityShape {
                expected: nx * ny,
                actual: self.nx * self.ny,
            });
        }
        Ok(())
    }
}
