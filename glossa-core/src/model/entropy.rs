use rand::Rng;

/// Source of uniform random values in `[0, 1)`.
///
/// Every random choice of the engine (phoneme draws, word type selection,
/// replacement selection, sticky resolution) goes through an `Entropy`
/// passed by the caller, so a test can pin the outcome of a draw by
/// handing in a fixed source.
pub trait Entropy {
	/// Returns the next value, expected in `[0, 1)`.
	fn next_unit(&mut self) -> f64;
}

/// Entropy backed by any `rand` generator.
///
/// `RngEntropy::new(rand::rng())` for everyday use,
/// `RngEntropy::new(StdRng::seed_from_u64(n))` for reproducible runs.
#[derive(Debug, Clone)]
pub struct RngEntropy<R: Rng> {
	rng: R,
}

impl<R: Rng> RngEntropy<R> {
	pub fn new(rng: R) -> Self {
		Self { rng }
	}
}

impl<R: Rng> Entropy for RngEntropy<R> {
	fn next_unit(&mut self) -> f64 {
		self.rng.random::<f64>()
	}
}

/// Entropy that always returns the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEntropy(pub f64);

impl Entropy for FixedEntropy {
	fn next_unit(&mut self) -> f64 {
		self.0
	}
}

/// Entropy cycling through a fixed list of values.
///
/// An empty list behaves like `FixedEntropy(0.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEntropy {
	values: Vec<f64>,
	position: usize,
}

impl SequenceEntropy {
	pub fn new(values: Vec<f64>) -> Self {
		Self { values, position: 0 }
	}
}

impl Entropy for SequenceEntropy {
	fn next_unit(&mut self) -> f64 {
		if self.values.is_empty() {
			return 0.0;
		}
		let value = self.values[self.position % self.values.len()];
		self.position += 1;
		value
	}
}

/// Draws an integer in `0..total` from one entropy draw: `floor(v * total)`.
///
/// The result is clamped to `total - 1` so an out-of-range source cannot
/// land past the end. Returns `None` when `total` is 0 (no draw is made).
pub fn draw_below(total: u64, entropy: &mut dyn Entropy) -> Option<u64> {
	if total == 0 {
		return None;
	}
	let value = entropy.next_unit();
	let drawn = if value.is_finite() && value > 0.0 {
		(value * total as f64) as u64
	} else {
		0
	};
	Some(drawn.min(total - 1))
}

/// Picks an index in `0..len`, see [`draw_below`].
pub fn choose_index(len: usize, entropy: &mut dyn Entropy) -> Option<usize> {
	draw_below(len as u64, entropy).map(|index| index as usize)
}

/// Picks one element of `items`, see [`choose_index`].
pub fn choose<'a, T>(items: &'a [T], entropy: &mut dyn Entropy) -> Option<&'a T> {
	choose_index(items.len(), entropy).map(|index| &items[index])
}
