use {fehler::throws, anyhow::Error, tracing::info, flame::{yaml, study, cantera::Cantera}};
#[throws] fn main() {
	flame::init_logging();
	let path = std::env::args().skip(1).next().unwrap_or("propane.yaml".to_string());
	let study = yaml::study(&path)?;
	info!(mechanism=%study.mechanism, fuel=%study.fuel.specie, "T={} K, P={} Pa", study.temperature, study.pressure);
	let ref mut engine = Cantera::new(&study.mechanism, study.phase.as_deref())?;
	let report = study::run(engine, &study)?;
	yaml::write(&report, study.output.as_deref())?
}
