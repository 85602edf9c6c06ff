mod boundary;
mod error;
mod params;
mod velocity;

pub use boundary::Boundary;
pub use error::{ModelError, Result};
pub use params::ModelParams;
pub use velocity::{DEFAULT_VELOCITY, VelocityField};

use tracing::{debug, trace};

/// A point release `(i, j, amount)`. Indices are signed so callers may pass
/// speculative positions; anything off-grid is ignored.
pub type SourcePoint = (isize, isize, f64);

const RIGHT: usize = 0;
const LEFT: usize = 1;
const DOWN: usize = 2;
const UP: usize = 3;

/// Pollutant concentration on an `nx * ny` grid, advanced one `dt` at a time
/// by advection, diffusion, decay and point sources.
#[derive(Clone, Debug)]
pub struct PollutantModel {
    params: ModelParams,
    velocity: VelocityField,
    field: Vec<f64>,
    next: Vec<f64>,
    moves: Vec<[f64; 4]>,
}

impl PollutantModel {
    /// Model with the default uniform drift in every cell.
    pub fn new(params: ModelParams) -> Result<PollutantModel> {
        validate_grid(&params)?;
        let (ux, uy) = DEFAULT_VELOCITY;
        let velocity = VelocityField::uniform(params.nx, params.ny, ux, uy);
        Ok(Self::build(params, velocity))
    }

    pub fn with_velocity(params: ModelParams, velocity: VelocityField) -> Result<PollutantModel> {
        validate_grid(&params)?;
        velocity.ensure_shape(params.nx, params.ny)?;
        Ok(Self::build(params, velocity))
    }

    /// Evaluates `f(i, j)` once per cell to build the velocity field.
    pub fn with_velocity_fn<F>(params: ModelParams, f: F) -> Result<PollutantModel>
    where
        F: FnMut(usize, usize) -> (f64, f64),
    {
        validate_grid(&params)?;
        let velocity = VelocityField::from_fn(params.nx, params.ny, f);
        Ok(Self::build(params, velocity))
    }

    fn build(params: ModelParams, velocity: VelocityField) -> PollutantModel {
        let size = params.cells();
        debug!(
            nx = params.nx,
            ny = params.ny,
            boundary = %params.boundary,
            diffusion = params.diffusion,
            decay = params.decay,
            "pollutant model created"
        );
        PollutantModel {
            params,
            velocity,
            field: vec![0.0; size],
            next: vec![0.0; size],
            moves: vec![[0.0; 4]; size],
        }
    }

    // ---- Accessors ----

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn nx(&self) -> usize {
        self.params.nx
    }

    pub fn ny(&self) -> usize {
        self.params.ny
    }

    /// Row-major concentration, cell `(i, j)` at `i * ny + j`.
    pub fn field(&self) -> &[f64] {
        &self.field
    }

    pub fn concentration(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.params.nx || j >= self.params.ny {
            return None;
        }
        Some(self.field[i * self.params.ny + j])
    }

    pub fn velocity(&self) -> &VelocityField {
        &self.velocity
    }

    /// Replaces the whole velocity field; takes effect on the next step.
    pub fn set_velocity(&mut self, velocity: VelocityField) -> Result<()> {
        velocity.ensure_shape(self.params.nx, self.params.ny)?;
        debug!(nx = self.params.nx, ny = self.params.ny, "velocity field replaced");
        self.velocity = velocity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.field.fill(0.0);
    }

    // ---- Sources ----

    /// Adds `amount` at `(i, j)`; a no-op when the cell is off-grid.
    pub fn add_source_point(&mut self, i: isize, j: isize, amount: f64) {
        if let Some(idx) = self.index(i, j) {
            self.field[idx] += amount;
        }
    }

    fn index(&self, i: isize, j: isize) -> Option<usize> {
        if i < 0 || j < 0 {
            return None;
        }
        let (i, j) = (i as usize, j as usize);
        if i >= self.params.nx || j >= self.params.ny {
            return None;
        }
        Some(i * self.params.ny + j)
    }

    // ---- Diagnostics ----

    pub fn total_mass(&self) -> f64 {
        self.field.iter().sum::<f64>() * self.params.dx * self.params.dy
    }

    pub fn max_concentration(&self) -> f64 {
        self.field.iter().copied().fold(0.0, f64::max)
    }

    // ---- Core: advance by one dt ----

    pub fn step(&mut self) -> &[f64] {
        self.step_with(std::iter::empty::<SourcePoint>)
    }

    /// Advances one step, calling `sources` exactly once to collect the
    /// releases injected after decay.
    pub fn step_with<F, I>(&mut self, sources: F) -> &[f64]
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = SourcePoint>,
    {
        self.advect();
        self.diffuse();
        self.apply_decay();

        for (i, j, amount) in sources() {
            if let Some(idx) = self.index(i, j) {
                self.field[idx] += amount;
            }
        }

        for c in self.field.iter_mut() {
            if *c < 0.0 {
                *c = 0.0;
            }
        }
        self.params
            .boundary
            .correct(&mut self.field, self.params.nx, self.params.ny);

        trace!(mass = self.total_mass(), "step complete");
        &self.field
    }

    // ---- Internal numeric routines ----

    /// Flux-splitting upwind transport, `field` -> `next`.
    fn advect(&mut self) {
        let ModelParams {
            nx, ny, dx, dy, dt, boundary, ..
        } = self.params;

        // fx and fy are clamped separately, so remain may go negative
        for (k, (&c, &[ux, uy])) in self
            .field
            .iter()
            .zip(self.velocity.as_slice())
            .enumerate()
        {
            let fx = (ux * dt / dx).clamp(-1.0, 1.0);
            let fy = (uy * dt / dy).clamp(-1.0, 1.0);
            let right = c * fx.max(0.0);
            let left = c * (-fx).max(0.0);
            let down = c * fy.max(0.0);
            let up = c * (-fy).max(0.0);
            self.moves[k] = [right, left, down, up];
            self.next[k] = c - (right + left + down + up);
        }

        for i in 0..nx {
            let row = i * ny;
            for j in 0..ny {
                let mut acc = self.next[row + j];
                if let Some(s) = boundary.neighbor(i, -1, nx) {
                    acc += self.moves[s * ny + j][RIGHT];
                }
                if let Some(s) = boundary.neighbor(i, 1, nx) {
                    acc += self.moves[s * ny + j][LEFT];
                }
                if let Some(s) = boundary.neighbor(j, -1, ny) {
                    acc += self.moves[row + s][DOWN];
                }
                if let Some(s) = boundary.neighbor(j, 1, ny) {
                    acc += self.moves[row + s][UP];
                }
                self.next[row + j] = acc;
            }
        }
    }

    /// Explicit 4-neighbour diffusion, `next` -> `field`. The Laplacian is
    /// normalised by `dx * dy`.
    fn diffuse(&mut self) {
        let ModelParams {
            nx,
            ny,
            dx,
            dy,
            dt,
            diffusion,
            boundary,
            ..
        } = self.params;
        let area = dx * dy;
        let src = &self.next;
        let dst = &mut self.field;

        match boundary {
            Boundary::Periodic => {
                for i in 0..nx {
                    let up_row = ((i + nx - 1) % nx) * ny;
                    let down_row = ((i + 1) % nx) * ny;
                    let row = i * ny;
                    for j in 0..ny {
                        let jm = (j + ny - 1) % ny;
                        let jp = (j + 1) % ny;
                        let c = src[row + j];
                        let lap = (src[up_row + j] + src[down_row + j] + src[row + jm]
                            + src[row + jp]
                            - 4.0 * c)
                            / area;
                        dst[row + j] = c + diffusion * dt * lap;
                    }
                }
            }
            Boundary::Open | Boundary::Reflective => {
                for i in 0..nx {
                    let row = i * ny;
                    for j in 0..ny {
                        let c = src[row + j];
                        let interior = i > 0 && i + 1 < nx && j > 0 && j + 1 < ny;
                        let lap = if interior {
                            (src[row + ny + j] + src[row - ny + j] + src[row + j + 1]
                                + src[row + j - 1]
                                - 4.0 * c)
                                / area
                        } else {
                            0.0
                        };
                        dst[row + j] = c + diffusion * dt * lap;
                    }
                }
            }
        }
    }

    fn apply_decay(&mut self) {
        let factor = (-self.params.decay * self.params.dt).exp();
        for c in self.field.iter_mut() {
            *c *= factor;
        }
    }
}

fn validate_grid(params: &ModelParams) -> Result<()> {
    let (nx, ny) = (params.nx, params.ny);
    if nx == 0 || ny == 0 {
        return Err(ModelError::EmptyGrid { nx, ny });
    }
    if params.boundary == Boundary::Reflective && (nx < 2 || ny < 2) {
        return Err(ModelError::ReflectiveTooSmall { nx, ny });
    }
    Ok(())
}
