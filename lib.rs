#![allow(non_snake_case,non_upper_case_globals,mixed_script_confusables,uncommon_codepoints)]
pub mod model;
pub use model::{Map, Observation, Field, Comparison, Threshold, State, Equilibrium};
pub mod scan;
pub use scan::{Scanner, ScanResult, Crossing, OrderingViolation};
pub mod mixture;
pub use mixture::{Fuel, Mixture, linspace};
pub mod engine;
pub use engine::{Engine, Reactor, Trajectory, Replay};
pub mod study;
pub mod yaml;
#[cfg(feature="cantera")] pub mod cantera;

pub const one_atm : f64 = 101325.; // Pa
pub const ppm : f64 = 1e6;

/// Colored backtraces, then logs on standard error filtered by `RUST_LOG` (info by default)
pub fn init_logging() {
	color_backtrace::install();
	use tracing_subscriber::{fmt, EnvFilter};
	fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).with_target(false).with_writer(std::io::stderr).init();
}
