use {super::*, crate::{Field, Comparison}};

fn observation(time: f64, temperature: f64, mole_fractions: &[(&str, f64)]) -> Observation {
	Observation{time, temperature, mole_fractions: mole_fractions.iter().map(|&(specie, x)| (specie.to_owned(), x)).collect()}
}
/// Feeds the whole sequence, asserting each crossing is reported once
fn scan(scanner: &mut Scanner, observations: &[Observation]) -> ScanResult {
	let mut reported = Vec::new();
	for observation in observations {
		for (name, crossed_now) in scanner.feed(observation).unwrap().into_vec() { assert!(crossed_now); assert!(!reported.contains(&name), "{name}"); reported.push(name); }
	}
	scanner.finalize()
}

#[test] fn ignition() {
	let observations = [(0.00, 500.), (0.02, 500.), (0.04, 1050.), (0.06, 1400.)].map(|(t, T)| observation(t, T, &[]));
	assert_eq!(scan(&mut Scanner::with([Threshold::ignition()]), &observations).get("ignition"), Some(Crossing::At(0.04)));
}

#[test] fn depletion() {
	let observations = [(0.00, 50000.), (0.01, 5000.), (0.02, 150.), (0.03, 80.)].map(|(t, x)| observation(t, 750., &[("c3h8", x/1e6)]));
	assert_eq!(scan(&mut Scanner::with([Threshold::depletion("c3h8")]), &observations).time("depletion"), Some(0.03));
}

#[test] fn quench_does_not_unfire() {
	let observations = [(0.00, 0.), (0.01, 200.), (0.02, 1200.), (0.03, 900.)].map(|(t, x)| observation(t, 2000., &[("no", x/1e6)]));
	assert_eq!(scan(&mut Scanner::with([Threshold::quench("no")]), &observations).time("quench"), Some(0.02));
}

#[test] fn strict_and_inclusive_limits() {
	let at_limit = [observation(0., 1000., &[("no", 1e-3)]), observation(1., 1000., &[("no", 1e-3)])];
	let mut scanner = Scanner::with([Threshold::ignition(), Threshold::new("quench", Field::MoleFraction("no".into()), Comparison::AtLeast, 1e-3)]);
	let result = scan(&mut scanner, &at_limit);
	assert_eq!(result.get("ignition"), Some(Crossing::NotReached));
	assert_eq!(result.time("quench"), Some(0.));
}

#[test] fn not_reached_is_explicit() {
	let observations = [(0., 600.), (1., 700.), (2., 900.)].map(|(t, T)| observation(t, T, &[("no", 1e-4)]));
	let result = scan(&mut Scanner::with([Threshold::ignition(), Threshold::quench("no")]), &observations);
	assert_eq!(result.iter().collect::<Vec<_>>(), [("ignition", Crossing::NotReached), ("quench", Crossing::NotReached)]);
	assert_eq!(result.time("ignition"), None);
	assert_eq!(Crossing::NotReached.to_string(), "not reached");
}

#[test] fn missing_specie_never_fires() {
	let observations = [observation(0., 750., &[]), observation(1., 750., &[("c3h8", 0.)])];
	let mut scanner = Scanner::with([Threshold::depletion("c3h8")]);
	assert!(scanner.feed(&observations[0]).unwrap().is_empty());
	assert_eq!(&*scanner.feed(&observations[1]).unwrap(), &[("depletion".to_owned(), true)]);
}

#[test] fn ordering() {
	let mut scanner = Scanner::with([Threshold::ignition()]);
	scanner.feed(&observation(0.02, 500., &[])).unwrap();
	scanner.feed(&observation(0.02, 500., &[])).unwrap();
	assert_eq!(scanner.feed(&observation(0.01, 1500., &[])), Err(OrderingViolation{previous: 0.02, time: 0.01}));
	assert_eq!(scanner.finalize().get("ignition"), Some(Crossing::NotReached), "an out of order observation must not fire");
	scanner.feed(&observation(0.03, 1500., &[])).unwrap();
	assert_eq!(scanner.finalize().time("ignition"), Some(0.03));
}

#[test] fn undefined_time() {
	let mut scanner = Scanner::with([Threshold::ignition()]);
	assert!(matches!(scanner.feed(&observation(f64::NAN, 1500., &[])), Err(OrderingViolation{time, ..}) if time.is_nan()));
	scanner.feed(&observation(0.02, 500., &[])).unwrap();
	assert!(matches!(scanner.feed(&observation(f64::NAN, 1500., &[])), Err(OrderingViolation{previous, ..}) if previous == 0.02));
	assert_eq!(scanner.feed(&observation(0.01, 1500., &[])), Err(OrderingViolation{previous: 0.02, time: 0.01}));
	assert_eq!(scanner.finalize().get("ignition"), Some(Crossing::NotReached));
}

#[test] fn independent_thresholds() {
	let observations = [(0., 750., 0.04, 0.), (1., 1100., 0.01, 0.), (2., 2400., 0., 5e-4), (3., 2500., 0., 2e-3)]
		.map(|(t, T, fuel, no)| observation(t, T, &[("c3h8", fuel), ("no", no)]));
	let mut scanner = Scanner::with([Threshold::ignition(), Threshold::depletion("c3h8"), Threshold::quench("no")]);
	assert!(scanner.feed(&observations[0]).unwrap().is_empty());
	assert_eq!(&*scanner.feed(&observations[1]).unwrap(), &[("ignition".to_owned(), true)]);
	assert_eq!(&*scanner.feed(&observations[2]).unwrap(), &[("depletion".to_owned(), true)]);
	assert!(!scanner.is_complete());
	assert_eq!(&*scanner.feed(&observations[3]).unwrap(), &[("quench".to_owned(), true)]);
	assert!(scanner.is_complete());
	let result = scanner.finalize();
	assert_eq!([result.time("ignition"), result.time("depletion"), result.time("quench")], [Some(1.), Some(2.), Some(3.)]);
}

#[test] fn last_registration_wins() {
	let mut scanner = Scanner::new();
	scanner.register(Threshold::ignition());
	scanner.register(Threshold::new("ignition", Field::Temperature, Comparison::Above, 1200.));
	assert_eq!(scanner.thresholds().count(), 1);
	let observations = [(0., 1100.), (1., 1300.)].map(|(t, T)| observation(t, T, &[]));
	assert_eq!(scan(&mut scanner, &observations).time("ignition"), Some(1.));
}

#[test] fn reset() {
	let mut scanner = Scanner::with([Threshold::ignition()]);
	scan(&mut scanner, &[observation(5., 1500., &[])]);
	scanner.reset();
	assert_eq!(scanner.finalize().get("ignition"), Some(Crossing::NotReached));
	assert_eq!(scan(&mut scanner, &[observation(1., 1500., &[])]).time("ignition"), Some(1.));
}

#[test] fn deterministic() {
	let observations = [(0., 700.), (0.5, 1001.), (1., 900.), (1.5, 1200.)].map(|(t, T)| observation(t, T, &[]));
	let [a, b] = [(); 2].map(|_| scan(&mut Scanner::with([Threshold::ignition()]), &observations));
	assert_eq!(a, b);
}

mod properties {
	use {proptest::prelude::*, super::*};
	fn comparison() -> impl Strategy<Value=Comparison> { prop_oneof![Just(Comparison::Above), Just(Comparison::AtLeast), Just(Comparison::Below)] }

	proptest! {
		#[test] fn first_satisfying_observation(values in proptest::collection::vec(0f64..3000., 1..64), limit in 0f64..3000., comparison in comparison()) {
			let observations : Vec<_> = values.iter().enumerate().map(|(i, &T)| observation(i as f64, T, &[])).collect();
			let result = scan(&mut Scanner::with([Threshold::new("T", Field::Temperature, comparison, limit)]), &observations);
			let expected = observations.iter().find(|o| comparison.holds(o.temperature, limit)).map_or(Crossing::NotReached, |o| Crossing::At(o.time));
			prop_assert_eq!(result.get("T"), Some(expected));
		}

		#[test] fn monotonic_rise(increments in proptest::collection::vec(0f64..100., 1..64), limit in 300f64..3000.) {
			let observations : Vec<_> = increments.iter().scan(300., |T, dT| { *T += dT; Some(*T) }).enumerate().map(|(i, T)| observation(i as f64*1e-3, T, &[])).collect();
			let result = scan(&mut Scanner::with([Threshold::new("T", Field::Temperature, Comparison::AtLeast, limit)]), &observations);
			match result.get("T").unwrap() {
				Crossing::At(time) => {
					let i = observations.iter().position(|o| o.time == time).unwrap();
					prop_assert!(observations[i].temperature >= limit);
					prop_assert!(observations[..i].iter().all(|o| o.temperature < limit));
				}
				Crossing::NotReached => prop_assert!(observations.iter().all(|o| o.temperature < limit)),
			}
		}

		#[test] fn out_of_order_is_rejected(times in proptest::collection::vec(0f64..1., 2..32)) {
			let mut scanner = Scanner::with([Threshold::ignition()]);
			let mut latest = f64::NEG_INFINITY;
			for &time in &times {
				let fed = scanner.feed(&observation(time, 0., &[]));
				prop_assert_eq!(fed.is_err(), time < latest);
				latest = latest.max(time);
			}
		}
	}
}
