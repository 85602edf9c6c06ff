use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge policy of the grid.
///
/// The same variant drives both the inline neighbour lookup used by
/// advection/diffusion and the post-step edge correction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Outflow leaves the domain and is lost.
    #[default]
    Open,
    /// Opposite edges are joined.
    Periodic,
    /// Edge rows/columns mirror their interior neighbour after each step.
    /// Outflow removed during advection is not returned.
    Reflective,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Open => "open",
            Boundary::Periodic => "periodic",
            Boundary::Reflective => "reflective",
        }
    }

    /// Index of the cell `offset` away from `k` on an axis of length `len`,
    /// or `None` when that cell is off-grid and the mode does not wrap.
    #[inline]
    pub(crate) fn neighbor(&self, k: usize, offset: isize, len: usize) -> Option<usize> {
        let target = k as isize + offset;
        if target >= 0 && (target as usize) < len {
            return Some(target as usize);
        }
        match self {
            Boundary::Periodic => Some(target.rem_euclid(len as isize) as usize),
            Boundary::Open | Boundary::Reflective => None,
        }
    }

    /// Post-step edge correction on a row-major `nx * ny` field.
    pub(crate) fn correct(&self, field: &mut [f64], nx: usize, ny: usize) {
        match self {
            Boundary::Open | Boundary::Periodic => {}
            Boundary::Reflective => {
                // rows first, then columns; corners end up with the column copy
                field.copy_within(ny..2 * ny, 0);
                field.copy_within((nx - 2) * ny..(nx - 1) * ny, (nx - 1) * ny);
                for i in 0..nx {
                    let row = i * ny;
                    field[row] = field[row + 1];
                    field[row + ny - 1] = field[row + ny - 2];
                }
            }
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Boundary {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Boundary::Open),
            "periodic" => Ok(Boundary::Periodic),
            "reflective" => Ok(Boundary::Reflective),
            other => Err(ModelError::UnknownBoundary(other.to_string())),
        }
    }
}
