//! Cantera C library as the chemistry engine
use {std::ffi::{CString, CStr}, std::os::raw::c_char, anyhow::{Result, Context, bail}, serde::Serialize, tracing::debug};
use crate::{Map, Observation, State, Equilibrium, Engine, Reactor};

#[link(name = "cantera")] extern "C" {
	fn ct_getCanteraError(buflen: i32, buf: *mut c_char) -> i32;
	fn thermo_newFromFile(file_name: *const c_char, phase_name: *const c_char) -> i32;
	fn thermo_del(n: i32) -> i32;
	fn thermo_nSpecies(n: i32) -> usize;
	fn thermo_getSpeciesName(n: i32, m: usize, len: usize, buffer: *mut c_char) -> i32;
	fn thermo_setTemperature(n: i32, t: f64) -> i32;
	fn thermo_setMoleFractionsByName(n: i32, x: *const c_char) -> i32;
	fn thermo_setPressure(n: i32, p: f64) -> i32;
	fn thermo_temperature(n: i32) -> f64;
	fn thermo_getMoleFractions(n: i32, len: usize, x: *mut f64) -> i32;
	fn thermo_equilibrate(n: i32, XY: *const c_char, solver: *const c_char, rtol: f64, maxsteps: i32, maxiter: i32, loglevel: i32) -> i32;
	fn kin_newFromFile(file_name: *const c_char, phase_name: *const c_char, reactingPhase: i32, neighbor0: i32, neighbor1: i32, neighbor2: i32, neighbor3: i32) -> i32;
	fn kin_del(n: i32) -> i32;
	fn reactor_new(type_: *const c_char) -> i32;
	fn reactor_del(i: i32) -> i32;
	fn reactor_setThermoMgr(i: i32, n: i32) -> i32;
	fn reactor_setKineticsMgr(i: i32, n: i32) -> i32;
	fn reactornet_new() -> i32;
	fn reactornet_del(i: i32) -> i32;
	fn reactornet_addreactor(i: i32, n: i32) -> i32;
	fn reactornet_advance(i: i32, t: f64) -> i32;
}

fn error() -> String {
	let mut buffer = [0 as c_char; 1024];
	unsafe{ct_getCanteraError(buffer.len() as i32, buffer.as_mut_ptr())};
	unsafe{CStr::from_ptr(buffer.as_ptr())}.to_string_lossy().trim().to_owned()
}

/// Cantera handles are non negative, failures are reported as negative status
fn check(status: i32, call: &str) -> Result<i32> {
	if status < 0 { bail!("{call}: {}", error()) }
	Ok(status)
}

/// One gas phase with its species names in mechanism order
struct Phase { thermo: i32, species: Box<[String]> }

impl Phase {
	fn new(file: &CStr, phase: &CStr) -> Result<Self> {
		let thermo = check(unsafe{thermo_newFromFile(file.as_ptr(), phase.as_ptr())}, "thermo_newFromFile")?;
		let species = (0..unsafe{thermo_nSpecies(thermo)}).map(|k| -> Result<String> {
			let mut specie = [0 as c_char; 32];
			check(unsafe{thermo_getSpeciesName(thermo, k, specie.len(), specie.as_mut_ptr())}, "thermo_getSpeciesName")?;
			Ok(unsafe{CStr::from_ptr(specie.as_ptr())}.to_str()?.to_owned())
		}).collect::<Result<_>>();
		match species {
			Ok(species) => Ok(Self{thermo, species}),
			Err(error) => { unsafe{thermo_del(thermo)}; Err(error) }
		}
	}
	fn set(&self, state: &State) -> Result<()> {
		for specie in state.composition.keys() { if !self.species.contains(specie) { bail!("{specie} is not a species of the mechanism") } }
		let composition = CString::new(state.composition_string())?;
		check(unsafe{thermo_setTemperature(self.thermo, state.temperature)}, "thermo_setTemperature")?;
		check(unsafe{thermo_setMoleFractionsByName(self.thermo, composition.as_ptr())}, "thermo_setMoleFractions")?; // /!\ Needs to be set before pressure
		check(unsafe{thermo_setPressure(self.thermo, state.pressure)}, "thermo_setPressure")?;
		Ok(())
	}
	fn observe(&self) -> Result<Observation> {
		let mut mole_fractions = vec![0.; self.species.len()];
		check(unsafe{thermo_getMoleFractions(self.thermo, mole_fractions.len(), mole_fractions.as_mut_ptr())}, "thermo_getMoleFractions")?;
		Ok(Observation{
			time: 0.,
			temperature: unsafe{thermo_temperature(self.thermo)},
			mole_fractions: self.species.iter().cloned().zip(mole_fractions).collect::<Map<_,_>>(),
		})
	}
}

impl Drop for Phase { fn drop(&mut self) { unsafe{thermo_del(self.thermo)}; } }

/// Ideal gas phase definition taking a subset of the mechanism's species
#[derive(Serialize)] struct Subset<'t> { name: &'t str, thermo: &'t str, species: [Map<String, &'t [String]>; 1] }
#[derive(Serialize)] struct Phases<'t> { phases: [Subset<'t>; 1] }

/// Loads `mechanism` (or the file of that name in Cantera's data directory)
pub struct Cantera { path: String, file: CString, phase_name: CString, equilibrium: Phase, restricted: Map<Box<[String]>, Phase> }

impl Cantera {
	pub fn new(mechanism: &str, phase: Option<&str>) -> Result<Self> {
		let path = match std::fs::canonicalize(mechanism) { Ok(path) => path.to_string_lossy().into_owned(), Err(_) => format!("/usr/share/cantera/data/{mechanism}") };
		let phase = phase.unwrap_or(if path.contains("gri30.") { "gri30" } else { "gas" });
		let (file, phase_name) = (CString::new(path.as_str())?, CString::new(phase)?);
		let equilibrium = Phase::new(&file, &phase_name).with_context(|| format!("Load {path} ({phase})"))?;
		debug!(mechanism=%path, species=equilibrium.species.len());
		Ok(Self{path, file, phase_name, equilibrium, restricted: Map::new()})
	}
	/// Only YAML mechanisms can be subset
	fn restricted(&mut self, species: &[String]) -> Result<&Phase> {
		if !self.restricted.contains_key(species) {
			let definition = serde_yaml::to_string(&Phases{phases: [Subset{name: "restricted", thermo: "ideal-gas", species: [[(format!("{}/species", self.path), species)].into_iter().collect()]}]})?;
			let path = std::env::temp_dir().join(format!("flame-{}-{}.yaml", std::process::id(), self.restricted.len()));
			std::fs::write(&path, definition).with_context(|| path.display().to_string())?;
			let phase = Phase::new(&CString::new(path.to_string_lossy().as_bytes())?, &CString::new("restricted")?);
			std::fs::remove_file(&path)?;
			let phase = phase.with_context(|| format!("Restrict {} to {}", self.path, species.join(" ")))?;
			debug!(species=phase.species.len(), "restricted phase");
			self.restricted.insert(species.into(), phase);
		}
		self.restricted.get(species).context("restricted phase")
	}
}

impl Engine for Cantera {
	type Reactor = CanteraReactor;
	fn equilibrate(&mut self, state: &State, mode: Equilibrium, species: Option<&[String]>) -> Result<Observation> {
		let phase = match species { Some(species) => self.restricted(species)?, None => &self.equilibrium };
		phase.set(state)?;
		let mode : &str = mode.into();
		let (mode, solver) = (CString::new(mode)?, CString::new("auto")?);
		check(unsafe{thermo_equilibrate(phase.thermo, mode.as_ptr(), solver.as_ptr(), 1e-9, 50000, 100, 0)}, "thermo_equilibrate")?;
		phase.observe()
	}
	/// Each reactor owns its phase so that several may coexist
	fn reactor(&mut self, state: &State) -> Result<CanteraReactor> {
		let phase = Phase::new(&self.file, &self.phase_name)?;
		phase.set(state)?;
		let kinetics = check(unsafe{kin_newFromFile(self.file.as_ptr(), self.phase_name.as_ptr(), phase.thermo, -1, -1, -1, -1)}, "kin_newFromFile")?;
		let mut reactor = CanteraReactor{phase, kinetics, reactor: -1, network: -1};
		let kind = CString::new("IdealGasReactor")?;
		reactor.reactor = check(unsafe{reactor_new(kind.as_ptr())}, "reactor_new")?;
		check(unsafe{reactor_setThermoMgr(reactor.reactor, reactor.phase.thermo)}, "reactor_setThermoMgr")?;
		check(unsafe{reactor_setKineticsMgr(reactor.reactor, reactor.kinetics)}, "reactor_setKineticsMgr")?;
		reactor.network = check(unsafe{reactornet_new()}, "reactornet_new")?;
		check(unsafe{reactornet_addreactor(reactor.network, reactor.reactor)}, "reactornet_addreactor")?;
		Ok(reactor)
	}
}

/// Constant volume ideal gas reactor in its own network
pub struct CanteraReactor { phase: Phase, kinetics: i32, reactor: i32, network: i32 }

impl Reactor for CanteraReactor {
	fn advance(&mut self, time: f64) -> Result<()> { check(unsafe{reactornet_advance(self.network, time)}, "reactornet_advance")?; Ok(()) }
	/// The network leaves its phase in the reactor state after each advance
	fn observe(&self) -> Result<Observation> { self.phase.observe() }
}

impl Drop for CanteraReactor {
	fn drop(&mut self) {
		unsafe{
			if self.network >= 0 { reactornet_del(self.network); }
			if self.reactor >= 0 { reactor_del(self.reactor); }
			kin_del(self.kinetics);
		}
	}
}
