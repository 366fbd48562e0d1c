//! Study configuration, recorded trajectories and report export
use {fehler::throws, anyhow::{Error, Result, Context, ensure}, serde::{Serialize, de::DeserializeOwned}};
use crate::{Trajectory, model::Study};

#[throws] pub fn read<T: DeserializeOwned>(path: &str) -> T {
	serde_yaml::from_str(&std::fs::read_to_string(path).context(path.to_owned())?).with_context(|| format!("Parse {path}"))?
}

fn positive(value: f64) -> bool { value.is_finite() && value > 0. }

pub fn validate(study: &Study) -> Result<()> {
	ensure!(positive(study.temperature) && positive(study.pressure), "Initial temperature and pressure must be positive");
	ensure!(study.nitrogen_oxygen_ratio >= 0., "Negative nitrogen to oxygen ratio");
	for sweep in study.equilibrium.iter().chain(study.series.values()) {
		let ratios = sweep.ratios.values();
		ensure!(!ratios.is_empty(), "No equivalence ratio to equilibrate");
		for φ in ratios.iter() { ensure!(positive(*φ), "Equivalence ratio must be positive (was {φ})"); }
		if let Some(species) = &sweep.species { ensure!(!species.is_empty(), "Equilibrium restricted to no species"); }
	}
	if let Some(kinetics) = &study.kinetics {
		ensure!(kinetics.steps >= 2 && positive(kinetics.duration), "Time grid needs at least 2 steps over a positive duration");
		ensure!(!kinetics.cases.is_empty(), "No kinetics case");
		for case in kinetics.cases.iter() {
			ensure!(positive(case.equivalence_ratio), "Equivalence ratio must be positive (was {})", case.equivalence_ratio);
			ensure!(case.start_time.is_finite() && case.start_time >= 0., "Start time must not be negative (was {})", case.start_time);
		}
	}
	Ok(())
}

pub fn study(path: &str) -> Result<Study> {
	let study : Study = read(path)?;
	validate(&study).with_context(|| path.to_owned())?;
	Ok(study)
}

/// Empty or unordered recordings are rejected while parsing
pub fn trajectory(path: &str) -> Result<Trajectory> { read(path) }

pub fn to_string(value: &impl Serialize) -> Result<String> { Ok(serde_yaml::to_string(value)?) }

/// Writes to `output`, or standard output
#[throws] pub fn write(value: &impl Serialize, output: Option<&str>) {
	let yaml = to_string(value)?;
	match output {
		Some(path) => std::fs::write(path, yaml).context(path.to_owned())?,
		None => print!("{yaml}"),
	}
}
