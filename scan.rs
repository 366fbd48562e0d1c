//! First-crossing detection over a time ordered sequence of observations
use {serde::{Serialize, Deserialize}, derive_more::{Display, Error}};
use crate::{Map, Observation, Threshold};

#[derive(Debug, Clone, Copy, PartialEq, Display, Error)] #[display("observation at {time} s fed after one at {previous} s")]
pub struct OrderingViolation { pub previous: f64, pub time: f64 }

/// When a threshold was first satisfied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)] #[serde(untagged)] pub enum Crossing {
	At(f64),
	NotReached,
}

impl Crossing {
	pub fn time(self) -> Option<f64> { if let Crossing::At(time) = self { Some(time) } else { None } }
}

impl std::fmt::Display for Crossing {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result { match self {
		Crossing::At(time) => write!(f, "{} s", float_pretty_print::PrettyPrintFloat(*time)),
		Crossing::NotReached => f.write_str("not reached"),
	}}
}

/// Crossing of every registered threshold, in registration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)] #[serde(transparent)] pub struct ScanResult(pub Map<String, Crossing>);

impl ScanResult {
	pub fn get(&self, name: &str) -> Option<Crossing> { self.0.get(name).copied() }
	pub fn time(&self, name: &str) -> Option<f64> { self.get(name)?.time() }
	pub fn iter(&self) -> impl Iterator<Item=(&str, Crossing)> { self.0.iter().map(|(name, &crossing)| (name.as_str(), crossing)) }
}

struct Watch {
	threshold: Threshold,
	fired: Option<f64>,
}

/// Watches thresholds over one scan. Each fires once, at its first satisfying observation.
#[derive(Default)] pub struct Scanner {
	watches: Map<String, Watch>,
	previous: Option<f64>,
}

impl Scanner {
	pub fn new() -> Self { Self::default() }
	pub fn with(thresholds: impl IntoIterator<Item=Threshold>) -> Self {
		let mut scanner = Self::new();
		for threshold in thresholds { scanner.register(threshold); }
		scanner
	}
	/// Replaces (and unfires) a previously registered threshold of the same name
	pub fn register(&mut self, threshold: Threshold) { self.watches.insert(threshold.name.clone(), Watch{threshold, fired: None}); }
	pub fn thresholds(&self) -> impl Iterator<Item=&Threshold> { self.watches.values().map(|watch| &watch.threshold) }
	/// Thresholds newly crossed at this observation. Fired thresholds are not evaluated again.
	/// A time before the previous one (or NaN) is rejected without changing the scan.
	pub fn feed(&mut self, observation: &Observation) -> Result<Box<[(String, bool)]>, OrderingViolation> {
		let time = observation.time;
		let previous = self.previous.unwrap_or(f64::NEG_INFINITY);
		if !(time >= previous) { return Err(OrderingViolation{previous, time}) } // NaN is never in order
		self.previous = Some(time);
		Ok(self.watches.iter_mut()
			.filter(|(_, watch)| watch.fired.is_none() && watch.threshold.holds(observation))
			.map(|(name, watch)| { watch.fired = Some(time); (name.clone(), true) })
			.collect())
	}
	/// Every threshold has fired: further observations cannot change the result
	pub fn is_complete(&self) -> bool { self.watches.values().all(|watch| watch.fired.is_some()) }
	pub fn finalize(&self) -> ScanResult {
		ScanResult(self.watches.iter().map(|(name, watch)| (name.clone(), watch.fired.map_or(Crossing::NotReached, Crossing::At))).collect())
	}
	/// Starts a new scan over the same thresholds
	pub fn reset(&mut self) {
		for (_, watch) in self.watches.iter_mut() { watch.fired = None; }
		self.previous = None;
	}
}

#[cfg(test)] mod test;
