use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;
use std::env;
use std::sync::OnceLock;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Environment variable overriding `inter_threads`
pub const INTER_THREADS_ENV: &str = "SYMPTOM_DX_INTER_THREADS";
/// Environment variable overriding `intra_threads`
pub const INTRA_THREADS_ENV: &str = "SYMPTOM_DX_INTRA_THREADS";

/// ONNX Runtime session settings. A thread count of 0 lets the runtime decide.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0,
            intra_threads: 0,
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

impl RuntimeConfig {
    /// Reads thread counts from the environment, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        Self {
            inter_threads: read_threads(INTER_THREADS_ENV),
            intra_threads: read_threads(INTRA_THREADS_ENV),
            ..Self::default()
        }
    }
}

fn read_threads(var: &str) -> usize {
    match env::var(var) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {}={:?}: not a thread count", var, value);
            0
        }),
        Err(_) => 0,
    }
}

// GraphOptimizationLevel is neither Clone nor Copy.
fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
    }
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init()
        .with_name("symptom-dx")
        .commit()?;
    Ok(())
}

/// Initializes the process-wide ONNX Runtime environment once.
///
/// A failed initialization is remembered and reported to every caller.
pub fn ensure_initialized() -> Result<(), String> {
    INIT.get_or_init(|| init_onnx_environment().map_err(|e| e.to_string()))
        .clone()
}

pub fn create_session_builder(config: &RuntimeConfig) -> OrtResult<SessionBuilder> {
    if let Err(reason) = ensure_initialized() {
        log::error!("ONNX Runtime environment unavailable: {}", reason);
    }
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }

    builder = builder.with_optimization_level(copy_level(&config.optimization_level))?;

    Ok(builder)
}
