use {serde::{Serialize, Deserialize}, strum_macros::{EnumString, IntoStaticStr}, itertools::Itertools};
pub use linear_map::LinearMap as Map;
use crate::{ppm, mixture::Fuel};

/// Scalar state of the reacting flow at one time step
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] pub struct Observation {
	pub time: f64, // s
	pub temperature: f64, // K
	#[serde(default)] pub mole_fractions: Map<String, f64>,
}

impl Observation {
	pub fn mole_fraction(&self, specie: &str) -> Option<f64> { self.mole_fractions.get(specie).copied() }
}

/// Selects the observed value a threshold compares, in the threshold's unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)] #[serde(try_from="String", into="String")] pub enum Field {
	Temperature,
	MoleFraction(String),
	PartsPerMillion(String),
}

impl Field {
	pub fn value(&self, observation: &Observation) -> Option<f64> { use Field::*; match self {
		Temperature => Some(observation.temperature),
		MoleFraction(specie) => observation.mole_fraction(specie),
		PartsPerMillion(specie) => observation.mole_fraction(specie).map(|x| x*ppm),
	}}
	pub fn specie(&self) -> Option<&str> { use Field::*; match self { Temperature => None, MoleFraction(specie)|PartsPerMillion(specie) => Some(specie) } }
}

impl std::fmt::Display for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result { use Field::*; match self {
		Temperature => f.write_str("temperature"),
		MoleFraction(specie) => write!(f, "X:{specie}"),
		PartsPerMillion(specie) => write!(f, "ppm:{specie}"),
	}}
}

impl std::str::FromStr for Field {
	type Err = anyhow::Error;
	fn from_str(field: &str) -> anyhow::Result<Self> {
		use Field::*;
		Ok(match field.trim().split_once(':').map(|(unit, specie)| (unit.trim(), specie.trim())) {
			None if matches!(field.trim(), "temperature"|"T") => Temperature,
			Some(("X", specie)) if !specie.is_empty() => MoleFraction(specie.to_owned()),
			Some(("ppm", specie)) if !specie.is_empty() => PartsPerMillion(specie.to_owned()),
			_ => anyhow::bail!("Unknown field '{field}' (expected temperature, X:<specie> or ppm:<specie>)"),
		})
	}
}
impl TryFrom<String> for Field { type Error = anyhow::Error; fn try_from(field: String) -> anyhow::Result<Self> { field.parse() } }
impl From<Field> for String { fn from(field: Field) -> String { field.to_string() } }

/// Ignition compares temperature strictly, quench compares NO inclusively
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize, Deserialize)] #[serde(try_from="String", into="&'static str")] pub enum Comparison {
	#[strum(serialize=">")] Above,
	#[strum(serialize=">=")] AtLeast,
	#[strum(serialize="<")] Below,
}

impl Comparison {
	pub fn holds(self, value: f64, limit: f64) -> bool { use Comparison::*; match self { Above => value > limit, AtLeast => value >= limit, Below => value < limit } }
}
impl TryFrom<String> for Comparison { type Error = strum::ParseError; fn try_from(comparison: String) -> Result<Self, Self::Error> { comparison.trim().parse() } }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] pub struct Threshold {
	pub name: String,
	pub field: Field,
	pub comparison: Comparison,
	pub limit: f64,
}

impl Threshold {
	pub fn new(name: impl Into<String>, field: Field, comparison: Comparison, limit: f64) -> Self { Self{name: name.into(), field, comparison, limit} }
	/// Temperature above 1000 K
	pub fn ignition() -> Self { Self::new("ignition", Field::Temperature, Comparison::Above, 1000.) }
	/// Fuel below 100 ppm
	pub fn depletion(fuel: &str) -> Self { Self::new("depletion", Field::PartsPerMillion(fuel.into()), Comparison::Below, 100.) }
	/// NO at 1000 ppm
	pub fn quench(pollutant: &str) -> Self { Self::new("quench", Field::PartsPerMillion(pollutant.into()), Comparison::AtLeast, 1000.) }
	/// A species missing from the observation never satisfies the comparison
	pub fn holds(&self, observation: &Observation) -> bool { self.field.value(observation).map_or(false, |value| self.comparison.holds(value, self.limit)) }
}

impl std::fmt::Display for Threshold {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let comparison : &str = self.comparison.into();
		write!(f, "{}: {} {comparison} {}", self.name, self.field, self.limit)
	}
}

/// Initial thermodynamic state handed to the engine for one case
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] pub struct State {
	pub temperature: f64, // K
	pub pressure: f64, // Pa
	pub composition: Map<String, f64>, // mole proportions
}

impl State {
	/// "c3h8:1.0,o2:6.25,n2:23.63"
	pub fn composition_string(&self) -> String { self.composition.iter().format_with(",", |(specie, amount), f| f(&format_args!("{specie}:{amount:?}"))).to_string() }
}

/// Equilibrium solve holding either internal energy and volume or enthalpy and pressure fixed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)] pub enum Equilibrium { #[default] UV, HP }

/// Equivalence ratios either listed or evenly spaced
#[derive(Serialize, Deserialize, Debug, Clone)] #[serde(untagged)] pub enum Ratios {
	List(Box<[f64]>),
	Range { from: f64, to: f64, count: usize },
}

impl Ratios {
	pub fn values(&self) -> Box<[f64]> { match self { Ratios::List(ratios) => ratios.clone(), Ratios::Range{from, to, count} => crate::linspace(*from, *to, *count) } }
}

#[derive(Serialize, Deserialize, Debug, Clone)] pub struct EquilibriumSweep {
	#[serde(default)] pub mode: Equilibrium,
	pub ratios: Ratios,
	/// Ratios logged as they are solved (all when empty)
	#[serde(default)] pub reported: Box<[f64]>,
	/// Species reported in ppm at equilibrium
	#[serde(default)] pub tracked: Option<Box<[String]>>,
	/// Equilibrium restricted to these species (complete combustion), all the mechanism's otherwise
	#[serde(default)] pub species: Option<Box<[String]>>,
	/// Oxidizer amounts rounded to 2 decimals
	#[serde(default="yes")] pub rounded: bool,
}

fn yes() -> bool { true }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] pub struct Case {
	pub equivalence_ratio: f64,
	/// Scanning begins here rather than at t=0
	#[serde(default)] pub start_time: f64,
}

fn default_duration() -> f64 { 0.05 }
fn default_steps() -> usize { 251 }

#[derive(Serialize, Deserialize, Debug, Clone)] pub struct Kinetics {
	#[serde(default="default_duration")] pub duration: f64, // s
	#[serde(default="default_steps")] pub steps: usize,
	pub cases: Box<[Case]>,
	#[serde(default)] pub thresholds: Option<Box<[Threshold]>>,
	/// Species retained in the exported trajectories
	#[serde(default)] pub recorded: Option<Box<[String]>>,
	/// Thresholds whose first crossings are ordered against each other
	#[serde(default="default_precedence")] pub precedence: [String; 2],
}

pub fn default_precedence() -> [String; 2] { ["quench".to_owned(), "depletion".to_owned()] }

impl Kinetics {
	pub fn times(&self, Case{start_time, ..}: &Case) -> Box<[f64]> { crate::linspace(*start_time, start_time+self.duration, self.steps) }
}

fn default_nitrogen_oxygen_ratio() -> f64 { 3.78 }

#[derive(Serialize, Deserialize, Debug, Clone)] pub struct Study {
	pub mechanism: String,
	#[serde(default)] pub phase: Option<String>,
	pub fuel: Fuel,
	#[serde(default="default_nitrogen_oxygen_ratio")] pub nitrogen_oxygen_ratio: f64,
	pub temperature: f64, // K
	pub pressure: f64, // Pa
	#[serde(default)] pub equilibrium: Option<EquilibriumSweep>,
	/// Further named equilibrium sweeps
	#[serde(default)] pub series: Map<String, EquilibriumSweep>,
	#[serde(default)] pub kinetics: Option<Kinetics>,
	#[serde(default)] pub output: Option<String>,
}

impl Study {
	pub fn mixture(&self) -> crate::Mixture { crate::Mixture{fuel: self.fuel.clone(), nitrogen_oxygen_ratio: self.nitrogen_oxygen_ratio} }
	/// Configured thresholds, or ignition, fuel depletion and NO quench
	pub fn thresholds(&self) -> Box<[Threshold]> {
		let mixture = self.mixture();
		self.kinetics.as_ref().and_then(|kinetics| kinetics.thresholds.clone())
			.unwrap_or_else(|| Box::new([Threshold::ignition(), Threshold::depletion(&self.fuel.specie), Threshold::quench(&mixture.spelled("no"))]))
	}
}
