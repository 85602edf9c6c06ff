use plume_core::{Boundary, ModelParams, PollutantModel, SourcePoint, VelocityField};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct Simulation {
    inner: PollutantModel,
}

#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        dt: f64,
        diffusion: f64,
        decay: f64,
        boundary: &str,
    ) -> Result<Simulation, JsValue> {
        let boundary: Boundary = boundary.parse().map_err(to_js)?;
        let params = ModelParams {
            nx,
            ny,
            dx,
            dy,
            dt,
            diffusion,
            decay,
            boundary,
        };
        let inner = PollutantModel::new(params).map_err(to_js)?;
        Ok(Simulation { inner })
    }

    /// Builds from a JSON object of model parameters; missing keys take defaults.
    pub fn from_config(json: &str) -> Result<Simulation, JsValue> {
        let params: ModelParams = serde_json::from_str(json).map_err(to_js)?;
        let inner = PollutantModel::new(params).map_err(to_js)?;
        Ok(Simulation { inner })
    }

    pub fn nx(&self) -> usize { self.inner.nx() }
    pub fn ny(&self) -> usize { self.inner.ny() }

    pub fn clear(&mut self) { self.inner.clear(); }

    pub fn add_source_point(&mut self, i: isize, j: isize, amount: f64) {
        self.inner.add_source_point(i, j, amount);
    }

    /// Replaces the velocity field with interleaved `ux, uy` pairs, row-major.
    pub fn set_velocity(&mut self, flat: Vec<f64>) -> Result<(), JsValue> {
        let v = VelocityField::from_interleaved(self.inner.nx(), self.inner.ny(), &flat)
            .map_err(to_js)?;
        self.inner.set_velocity(v).map_err(to_js)
    }

    // Copy-based JS access (reliable)
    pub fn get_field(&self) -> Vec<f64> {
        self.inner.field().to_vec()
    }

    pub fn total_mass(&self) -> f64 { self.inner.total_mass() }
    pub fn max_concentration(&self) -> f64 { self.inner.max_concentration() }

    // Step + timing (WASM-only)
    pub fn step(&mut self) -> StepInfo {
        let t0 = now_ms();
        self.inner.step();
        let t1 = now_ms();
        self.info(t1 - t0)
    }

    /// Steps with this frame's releases as flat `i, j, amount` triples.
    pub fn step_with_sources(&mut self, triples: Vec<f64>) -> StepInfo {
        let t0 = now_ms();
        self.inner.step_with(|| triples.chunks_exact(3).map(to_source).collect::<Vec<_>>());
        let t1 = now_ms();
        self.info(t1 - t0)
    }
}

impl Simulation {
    fn info(&self, compute_ms: f64) -> StepInfo {
        StepInfo {
            compute_ms,
            total_mass: self.inner.total_mass(),
            max: self.inner.max_concentration(),
        }
    }
}

#[wasm_bindgen]
pub struct StepInfo {
    compute_ms: f64,
    total_mass: f64,
    max: f64,
}

#[wasm_bindgen]
impl StepInfo {
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
    pub fn total_mass(&self) -> f64 { self.total_mass }
    pub fn max(&self) -> f64 { self.max }
}

// JS numbers arrive as f64; fractional indices truncate toward zero.
fn to_source(t: &[f64]) -> SourcePoint {
    (t[0] as isize, t[1] as isize, t[2])
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
