use {fehler::throws, anyhow::{Error, Context}, flame::{yaml, study::{self, Report}}};
/// replay <study.yaml> <trajectory.yaml>...
#[throws] fn main() {
	flame::init_logging();
	let mut args = std::env::args().skip(1);
	let path = args.next().unwrap_or("propane.yaml".to_string());
	let study = yaml::study(&path)?;
	let (thresholds, recorded) = (study.thresholds(), study.kinetics.as_ref().and_then(|kinetics| kinetics.recorded.clone()).unwrap_or_else(|| study::recorded(&study.mixture())));
	let kinetics = args.map(|path| -> anyhow::Result<_> {
		let trajectory = yaml::trajectory(&path)?;
		study::replay(&trajectory, study.kinetics.as_ref(), &thresholds, &recorded).with_context(|| path.clone())
	}).collect::<anyhow::Result<Box<_>>>()?;
	yaml::write(&Report{kinetics: Some(kinetics), ..Report::default()}, study.output.as_deref())?
}
