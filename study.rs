//! Equivalence ratio sweeps: equilibrium flame temperature and NO, then ignition, fuel depletion and quench timings
use {anyhow::{Result, Context, anyhow}, serde::Serialize, tracing::{info, debug, warn, info_span}};
use crate::{ppm, Map, Observation, Threshold, State, Engine, Reactor, Trajectory, Scanner, ScanResult, Mixture, mixture::round, model::{Study, EquilibriumSweep, Kinetics, Case, default_precedence}};

#[derive(Serialize, Debug, Clone, PartialEq)] pub struct Equilibrated {
	pub equivalence_ratio: f64,
	pub temperature: f64, // K
	pub ppm: Map<String, f64>,
}

pub fn equilibrium(engine: &mut impl Engine, mixture: &Mixture, temperature: f64, pressure: f64, sweep: &EquilibriumSweep) -> Result<Box<[Equilibrated]>> {
	let tracked = sweep.tracked.clone().unwrap_or_else(|| Box::new([mixture.spelled("no")]));
	sweep.ratios.values().iter().map(|&φ| -> Result<Equilibrated> {
		let state = State{temperature, pressure, composition: mixture.amounts(φ, sweep.rounded.then_some(2))?};
		let equilibrium = engine.equilibrate(&state, sweep.mode, sweep.species.as_deref()).with_context(|| format!("Equilibrate {} at φ={φ}", state.composition_string()))?;
		let fractions = tracked.iter().map(|specie| -> Result<_> { Ok((specie.clone(), equilibrium.mole_fraction(specie).ok_or_else(|| anyhow!("{specie} missing from equilibrium composition"))?*ppm)) }).collect::<Result<Map<_,_>>>()?;
		if sweep.reported.is_empty() || sweep.reported.iter().any(|&reported| round(reported, 1) == round(φ, 1)) {
			info!(phi=round(φ, 1), "adiabatic flame temperature is {} K", round(equilibrium.temperature, 0));
			for (specie, x) in &fractions { info!(phi=round(φ, 1), "{specie} = {} ppm", x.trunc()); }
		} else {
			debug!(phi=φ, temperature=equilibrium.temperature);
		}
		Ok(Equilibrated{equivalence_ratio: φ, temperature: equilibrium.temperature, ppm: fractions})
	}).collect()
}

/// Mole fractions in ppm of the species kept for plotting, at time relative to the scan start
#[derive(Serialize, Debug, Clone, PartialEq)] pub struct Point {
	pub time: f64,
	pub temperature: f64,
	pub ppm: Map<String, f64>,
}

/// Advances the reactor through `times` (from t=0 when the first is later), feeding each observation to the scanner
pub fn scan(reactor: &mut impl Reactor, times: &[f64], scanner: &mut Scanner, recorded: &[String], φ: f64) -> Result<Box<[Point]>> {
	let start = times.first().copied().unwrap_or(0.);
	let mut trajectory = Vec::with_capacity(times.len());
	for &time in times {
		if time > 0. { reactor.advance(time).with_context(|| format!("Advance φ={φ} to {time} s"))?; }
		let observation = Observation{time, ..reactor.observe()?};
		debug!(phi=φ, time, temperature=observation.temperature);
		for (name, _) in scanner.feed(&observation)?.into_vec() { info!(phi=φ, threshold=%name, "{name} at {} s", round(time, 6)); }
		trajectory.push(Point{
			time: time-start,
			temperature: observation.temperature,
			ppm: recorded.iter().filter_map(|specie| Some((specie.clone(), observation.mole_fraction(specie)?*ppm))).collect(),
		});
	}
	Ok(trajectory.into_boxed_slice())
}

/// Whether an event (quenching to cap NO) comes before a reference (fuel depletion)
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)] pub enum Precedence { Before, Simultaneous, After }

impl Precedence {
	pub fn of(result: &ScanResult, event: &str, reference: &str) -> Option<Self> {
		use std::cmp::Ordering::*;
		Some(match result.time(event)?.partial_cmp(&result.time(reference)?)? { Less => Precedence::Before, Equal => Precedence::Simultaneous, Greater => Precedence::After })
	}
}

#[derive(Serialize, Debug, Clone, PartialEq)] pub struct Ignition {
	pub equivalence_ratio: f64,
	pub start_time: f64,
	pub result: ScanResult,
	pub quench: Option<Precedence>,
	pub trajectory: Box<[Point]>,
}

fn ignition(reactor: &mut impl Reactor, times: &[f64], thresholds: &[Threshold], recorded: &[String], [event, reference]: &[String; 2], Case{equivalence_ratio: φ, start_time}: &Case) -> Result<Ignition> {
	let mut scanner = Scanner::with(thresholds.iter().cloned());
	let trajectory = scan(reactor, times, &mut scanner, recorded, *φ)?;
	let result = scanner.finalize();
	for (name, crossing) in result.iter() { if crossing.time().is_none() { warn!(phi=φ, "{name} {crossing} within {} s", times.last().copied().unwrap_or(0.)-start_time); } }
	let quench = Precedence::of(&result, event, reference);
	if let Some(quench) = quench { info!(phi=φ, "{event} {quench:?} {reference}"); }
	Ok(Ignition{equivalence_ratio: *φ, start_time: *start_time, result, quench, trajectory})
}

/// Fuel, NO and the radicals
pub fn recorded(mixture: &Mixture) -> Box<[String]> {
	[mixture.fuel.specie.clone()].into_iter().chain(["no","oh","o","h"].map(|specie| mixture.spelled(specie))).collect()
}

pub fn kinetics(engine: &mut impl Engine, mixture: &Mixture, temperature: f64, pressure: f64, kinetics: &Kinetics, thresholds: &[Threshold]) -> Result<Box<[Ignition]>> {
	let recorded = kinetics.recorded.clone().unwrap_or_else(|| self::recorded(mixture));
	for name in &kinetics.precedence { if !thresholds.iter().any(|threshold| &threshold.name == name) { warn!("No threshold named {name} to order crossings"); } }
	kinetics.cases.iter().map(|case| -> Result<Ignition> {
		let state = mixture.state(case.equivalence_ratio, temperature, pressure)?;
		let mut reactor = engine.reactor(&state).with_context(|| format!("Reactor for {}", state.composition_string()))?;
		ignition(&mut reactor, &kinetics.times(case), thresholds, &recorded, &kinetics.precedence, case)
	}).collect()
}

/// Scans a recorded trajectory, on its own times unless a case of the same equivalence ratio defines the grid
pub fn replay(trajectory: &Trajectory, kinetics: Option<&Kinetics>, thresholds: &[Threshold], recorded: &[String]) -> Result<Ignition> {
	let φ = trajectory.equivalence_ratio.unwrap_or(f64::NAN);
	let case = kinetics.and_then(|kinetics| Some((kinetics, kinetics.cases.iter().find(|case| case.equivalence_ratio == φ)?)));
	let (case, times) = match case {
		Some((kinetics, case)) => (case.clone(), kinetics.times(case)),
		None => {
			let times = trajectory.times();
			let start_time = *times.first().context("Empty trajectory")?;
			(Case{equivalence_ratio: φ, start_time}, times)
		}
	};
	let precedence = kinetics.map_or_else(default_precedence, |kinetics| kinetics.precedence.clone());
	ignition(&mut trajectory.replay(), &times, thresholds, recorded, &precedence, &case)
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)] pub struct Report {
	#[serde(skip_serializing_if="Option::is_none")] pub equilibrium: Option<Box<[Equilibrated]>>,
	#[serde(skip_serializing_if="Map::is_empty")] pub series: Map<String, Box<[Equilibrated]>>,
	#[serde(skip_serializing_if="Option::is_none")] pub kinetics: Option<Box<[Ignition]>>,
}

pub fn run(engine: &mut impl Engine, study: &Study) -> Result<Report> {
	let mixture = study.mixture();
	let Study{temperature, pressure, ..} = *study;
	Ok(Report{
		equilibrium: study.equilibrium.as_ref().map(|sweep| equilibrium(engine, &mixture, temperature, pressure, sweep)).transpose()?,
		series: study.series.iter().map(|(name, sweep)| -> Result<_> {
			let _series = info_span!("series", %name).entered();
			Ok((name.clone(), equilibrium(engine, &mixture, temperature, pressure, sweep).with_context(|| format!("Series {name}"))?))
		}).collect::<Result<_>>()?,
		kinetics: study.kinetics.as_ref().map(|kinetics| self::kinetics(engine, &mixture, temperature, pressure, kinetics, &study.thresholds())).transpose()?,
	})
}
