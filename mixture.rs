use {std::str::FromStr, anyhow::{Result, Context, ensure, bail}, serde::{Serialize, Deserialize}, strum_macros::EnumString};
use crate::{Map, State};

#[derive(Debug, PartialEq, Eq, Clone, Copy, EnumString)] #[strum(ascii_case_insensitive)] enum Element { C, H, O, N }

/// Moles of O2 to burn one mole of a CxHyOz specie to CO2 and H2O
fn stoichiometric_oxygen(specie: &str) -> Result<f64> {
	let formula = specie.trim_start_matches(['n','i','N','I']).trim_start_matches('-');
	let formula = if formula.starts_with(['c','C']) { formula } else { specie };
	let mut composition = Map::<Element, u32>::new();
	let mut chars = formula.chars().peekable();
	while let Some(symbol) = chars.next() {
		let element = Element::from_str(&symbol.to_string()).with_context(|| format!("Unknown element '{symbol}' in {specie}"))?;
		let mut count = String::new();
		while let Some(digit) = chars.next_if(|c| c.is_ascii_digit()) { count.push(digit); }
		*composition.entry(element).or_insert(0) += if count.is_empty() { 1 } else { count.parse()? };
	}
	let count = |element| *composition.get(&element).unwrap_or(&0) as f64;
	let oxygen = count(Element::C) + count(Element::H)/4. - count(Element::O)/2.;
	ensure!(oxygen > 0., "{specie} does not burn in oxygen");
	Ok(oxygen)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] #[serde(try_from="String", into="String")] pub struct Fuel {
	pub specie: String,
	pub stoichiometric_oxygen: f64,
}

impl FromStr for Fuel {
	type Err = anyhow::Error;
	fn from_str(specie: &str) -> Result<Self> { let specie = specie.trim(); Ok(Fuel{specie: specie.to_owned(), stoichiometric_oxygen: stoichiometric_oxygen(specie)?}) }
}
impl TryFrom<String> for Fuel { type Error = anyhow::Error; fn try_from(specie: String) -> Result<Self> { specie.parse() } }
impl From<Fuel> for String { fn from(fuel: Fuel) -> String { fuel.specie } }

pub fn round(x: f64, decimals: i32) -> f64 { let scale = f64::powi(10., decimals); f64::round(x*scale)/scale }

/// `count` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Box<[f64]> {
	match count {
		0 => Box::new([]),
		1 => Box::new([start]),
		_ => {
			let step = (end-start)/((count-1) as f64);
			(0..count).map(|i| if i == count-1 { end } else { start + step*(i as f64) }).collect()
		}
	}
}

/// Fuel with air where nitrogen comes in a fixed proportion to oxygen
#[derive(Debug, Clone, PartialEq)] pub struct Mixture {
	pub fuel: Fuel,
	pub nitrogen_oxygen_ratio: f64,
}

impl Mixture {
	pub fn air(fuel: Fuel) -> Self { Self{fuel, nitrogen_oxygen_ratio: 3.78} }
	/// Follows the mechanism's case convention, taken from the fuel name
	pub fn spelled(&self, specie: &str) -> String { if self.fuel.specie.chars().any(|c| c.is_ascii_uppercase()) { specie.to_uppercase() } else { specie.to_lowercase() } }
	/// One mole of fuel and oxidizer amounts, rounded to `decimals` when given
	pub fn amounts(&self, φ: f64, decimals: Option<i32>) -> Result<Map<String, f64>> {
		if !(φ.is_finite() && φ > 0.) { bail!("Equivalence ratio must be positive (was {φ})") }
		let oxygen = self.fuel.stoichiometric_oxygen / φ;
		let nitrogen = self.nitrogen_oxygen_ratio * oxygen;
		let rounded = |x: f64| decimals.map_or(x, |decimals| round(x, decimals));
		Ok([(self.fuel.specie.clone(), 1.), (self.spelled("o2"), rounded(oxygen)), (self.spelled("n2"), rounded(nitrogen))].into_iter().collect())
	}
	/// Oxidizer amounts rounded to 2 decimals
	pub fn composition(&self, φ: f64) -> Result<Map<String, f64>> { self.amounts(φ, Some(2)) }
	pub fn state(&self, φ: f64, temperature: f64, pressure: f64) -> Result<State> { Ok(State{temperature, pressure, composition: self.composition(φ)?}) }
}

pub fn mole_fractions(composition: &Map<String, f64>) -> Map<String, f64> {
	let total = composition.values().sum::<f64>();
	composition.iter().map(|(specie, amount)| (specie.clone(), amount/total)).collect()
}

#[cfg(test)] mod test {
	use super::*;
	fn propane() -> Mixture { Mixture::air("c3h8".parse().unwrap()) }

	#[test] fn oxygen_demand() {
		for (specie, oxygen) in [("c3h8", 5.), ("CH4", 2.), ("nc7h16", 11.), ("NC7H16", 11.), ("h2", 0.5), ("CH3OH", 1.5), ("c2h5oh", 3.)] {
			assert_eq!(specie.parse::<Fuel>().unwrap().stoichiometric_oxygen, oxygen, "{specie}");
		}
		assert!("ar".parse::<Fuel>().is_err());
		assert!("co2".parse::<Fuel>().is_err());
	}

	#[test] fn propane_compositions() {
		let mixture = propane();
		for (φ, expected) in [(0.5, "c3h8:1.0,o2:10.0,n2:37.8"), (0.8, "c3h8:1.0,o2:6.25,n2:23.63"), (1.0, "c3h8:1.0,o2:5.0,n2:18.9"), (1.3, "c3h8:1.0,o2:3.85,n2:14.54")] {
			assert_eq!(mixture.state(φ, 750., 1e5).unwrap().composition_string(), expected);
		}
	}

	#[test] fn spelling_follows_fuel() {
		let methane = Mixture{fuel: "CH4".parse().unwrap(), nitrogen_oxygen_ratio: 3.76};
		let composition = methane.composition(1.).unwrap();
		assert_eq!(composition.keys().map(|s| s.as_str()).collect::<Vec<_>>(), ["CH4", "O2", "N2"]);
		assert_eq!(composition["N2"], 7.52);
		assert_eq!(propane().spelled("NO"), "no");
	}

	#[test] fn unrounded() {
		let methane = Mixture{fuel: "CH4".parse().unwrap(), nitrogen_oxygen_ratio: 3.76};
		let φ = linspace(0.5, 2., 100)[1];
		let amounts = methane.amounts(φ, None).unwrap();
		assert_eq!((amounts["O2"], amounts["N2"]), (2./φ, 3.76*(2./φ)));
		assert_ne!(amounts["O2"], round(amounts["O2"], 2));
		assert_eq!(methane.amounts(φ, Some(2)).unwrap(), methane.composition(φ).unwrap());
	}

	#[test] fn invalid_equivalence_ratio() {
		for φ in [0., -1., f64::NAN, f64::INFINITY] { assert!(propane().composition(φ).is_err(), "{φ}"); }
	}

	#[test] fn normalized() {
		let x = mole_fractions(&propane().composition(1.).unwrap());
		assert!((x.values().sum::<f64>()-1.).abs() < 1e-12);
		assert!((x["c3h8"] - 1./24.9).abs() < 1e-12);
	}

	#[test] fn grid() {
		assert_eq!(&*linspace(0., 1., 5), &[0., 0.25, 0.5, 0.75, 1.]);
		assert_eq!(&*linspace(2., 3., 1), &[2.]);
		assert!(linspace(0., 1., 0).is_empty());
		let times = linspace(25.30, 25.35, 251);
		assert_eq!((times[0], times[250]), (25.30, 25.35));
	}
}
