use std::path::PathBuf;

/// Tuning switches, fixed for the lifetime of one processor.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
	/// Always resolve merge cache collisions with the exact set comparison.
	/// Off by default: large candidate sets are then matched on size alone,
	/// which may merge distinct sets and over-approximate reachability.
	pub precise_merge: bool,

	/// Candidate sets up to this size are still compared exactly even when
	/// `precise_merge` is off.
	pub exact_compare_max: usize,

	/// Ceiling for the per-color fan-in counter.
	pub incoming_max: u32,

	/// Report heavily connected bridge-free components as their own node
	/// instead of multiplying their incoming and outgoing edges.
	pub promote_heavy: bool,

	/// Write a DOT rendering of the color graph here after every pass.
	pub dump_path: Option<PathBuf>,

	/// Recompute every pass with the naive closure and compare the results.
	/// Checked passes always merge with the exact set comparison, the
	/// size-only approximation may widen reachability past the reference.
	pub crosscheck: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		BridgeConfigBuilder::new().build()
	}
}

pub struct BridgeConfigBuilder(BridgeConfig);

impl BridgeConfigBuilder {
	pub fn new() -> Self {
		Self(BridgeConfig {
			precise_merge: false,
			exact_compare_max: 16,
			incoming_max: 255,
			promote_heavy: true,
			dump_path: None,
			crosscheck: false,
		})
	}

	/// Return the config that has been built, consuming the builder.
	pub fn build(self) -> BridgeConfig {
		self.0
	}

	pub fn precise_merge(mut self, precise_merge: bool) -> Self {
		self.0.precise_merge = precise_merge;
		self
	}

	pub fn exact_compare_max(mut self, exact_compare_max: usize) -> Self {
		self.0.exact_compare_max = exact_compare_max;
		self
	}

	pub fn incoming_max(mut self, incoming_max: u32) -> Self {
		self.0.incoming_max = incoming_max;
		self
	}

	pub fn promote_heavy(mut self, promote_heavy: bool) -> Self {
		self.0.promote_heavy = promote_heavy;
		self
	}

	pub fn dump_path(mut self, dump_path: PathBuf) -> Self {
		self.0.dump_path = Some(dump_path);
		self
	}

	pub fn crosscheck(mut self, crosscheck: bool) -> Self {
		self.0.crosscheck = crosscheck;
		self
	}
}
