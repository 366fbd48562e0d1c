//! Boundary with the chemistry engine that solves equilibria and integrates the reacting flow
use {anyhow::{Result, ensure, bail}, serde::{Serialize, Deserialize}};
use crate::{Observation, State, Equilibrium};

/// Constant volume reactor owned by the engine, starting at t=0 from the state it was built with
pub trait Reactor {
	fn advance(&mut self, time: f64) -> Result<()>;
	fn observe(&self) -> Result<Observation>;
}

pub trait Engine {
	type Reactor: Reactor;
	/// Equilibrium temperature and composition of `state` holding `mode` fixed, among `species` only when given
	fn equilibrate(&mut self, state: &State, mode: Equilibrium, species: Option<&[String]>) -> Result<Observation>;
	fn reactor(&mut self, state: &State) -> Result<Self::Reactor>;
}

/// Observations recorded from an earlier simulation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] #[serde(try_from="Recording")] pub struct Trajectory {
	#[serde(default)] pub equivalence_ratio: Option<f64>,
	pub observations: Box<[Observation]>,
}

#[derive(Deserialize)] struct Recording {
	#[serde(default)] equivalence_ratio: Option<f64>,
	observations: Box<[Observation]>,
}
impl TryFrom<Recording> for Trajectory {
	type Error = anyhow::Error;
	fn try_from(Recording{equivalence_ratio, observations}: Recording) -> Result<Self> { Self::new(equivalence_ratio, observations) }
}

impl Trajectory {
	pub fn new(equivalence_ratio: Option<f64>, observations: Box<[Observation]>) -> Result<Self> {
		ensure!(!observations.is_empty(), "Empty trajectory");
		ensure!(observations.windows(2).all(|w| w[0].time <= w[1].time), "Trajectory is not in time order");
		Ok(Self{equivalence_ratio, observations})
	}
	pub fn times(&self) -> Box<[f64]> { self.observations.iter().map(|o| o.time).collect() }
	pub fn replay(&self) -> Replay<'_> { Replay{observations: &self.observations, time: 0.} }
}

/// Replays a recorded trajectory as a reactor, interpolating linearly between records.
/// The first record holds before its time, past the last record is an error.
pub struct Replay<'t> {
	observations: &'t [Observation],
	time: f64,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 { a + (b-a)*t }

impl Reactor for Replay<'_> {
	fn advance(&mut self, time: f64) -> Result<()> {
		ensure!(time >= self.time, "Cannot advance back from {} s to {time} s", self.time);
		self.time = time;
		Ok(())
	}
	fn observe(&self) -> Result<Observation> {
		let time = self.time;
		let next = self.observations.partition_point(|o| o.time < time);
		let observation = match (next.checked_sub(1).map(|i| &self.observations[i]), self.observations.get(next)) {
			(_, Some(b)) if b.time == time => b.clone(),
			(None, Some(first)) => Observation{time, ..first.clone()},
			(Some(a), Some(b)) => {
				let t = (time-a.time)/(b.time-a.time);
				Observation{
					time,
					temperature: lerp(a.temperature, b.temperature, t),
					mole_fractions: a.mole_fractions.iter().filter_map(|(specie, &x)| Some((specie.clone(), lerp(x, b.mole_fraction(specie)?, t)))).collect(),
				}
			}
			(Some(last), None) => bail!("{time} s is past the recorded horizon ({} s)", last.time),
			(None, None) => bail!("Empty trajectory"),
		};
		Ok(observation)
	}
}
