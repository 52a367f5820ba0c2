use ahash::{HashMap, HashMapExt};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace, warn};

use crate::callback;
use crate::color::{ColorId, ColorStore};
use crate::compare;
use crate::dump;
use crate::scan::{ScanId, ScanStore};
use crate::tarjan::SccScan;
use crate::{BridgeClient, BridgeConfig, CallbackData, ClassKind, ObjectGraph};

/// Class classification cache. Classification is immutable per class, so the
/// client is asked once per class and never again.
pub(crate) struct ClassKinds<K: Copy + Eq + Hash + Debug> {
	kinds: HashMap<K, ClassKind>,
}

impl<K: Copy + Eq + Hash + Debug> ClassKinds<K> {
	fn new() -> ClassKinds<K> {
		ClassKinds {
			kinds: HashMap::new(),
		}
	}

	pub(crate) fn get_or_classify(
		&mut self,
		class: K,
		classify: impl FnOnce(K) -> ClassKind,
	) -> ClassKind {
		*self.kinds.entry(class).or_insert_with(|| classify(class))
	}
}

/// Everything scoped to a single pass. Dropped wholesale when the pass
/// finishes, which is the teardown.
pub(crate) struct PassState<G: ObjectGraph> {
	pub(crate) scan: ScanStore<G::Handle>,
	pub(crate) colors: ColorStore<G::Handle>,
	pub(crate) scan_stack: Vec<ScanId<G::Handle>>,
	pub(crate) loop_stack: Vec<ScanId<G::Handle>>,
	pub(crate) merge_scratch: Vec<ColorId<G::Handle>>,
	pub(crate) next_index: u32,
	pub(crate) roots: Vec<G::Handle>,
	pub(crate) data: Option<CallbackData<G::Handle>>,
}

/// Counters of one finished pass.
#[derive(Debug, Clone)]
pub struct PassStatistics {
	pub registered_bridges: usize,
	pub objects_scanned: usize,
	pub colors_created: usize,
	pub cache_hits: usize,
	pub cache_misses: usize,
	pub sccs_reported: usize,
	pub xrefs_reported: usize,
	pub live_sccs: usize,
	pub dead_sccs: usize,
	pub dead_objects: usize,
}

/// The bridge processor. Owned by the collector and driven by it from inside
/// the collection pause, strictly in the order `run_scc_pass`,
/// `build_callback_data`, `finish`. No internal synchronization, the pause is
/// the mutual exclusion.
pub struct BridgeProcessor<G: ObjectGraph, C: BridgeClient<G>> {
	client: C,
	config: BridgeConfig,
	registered: Vec<G::Handle>,
	kinds: ClassKinds<G::Class>,
	pass: Option<PassState<G>>,
	passes: u64,
}

impl<G: ObjectGraph, C: BridgeClient<G>> BridgeProcessor<G, C> {
	pub fn new(client: C) -> BridgeProcessor<G, C> {
		Self::with_config(client, BridgeConfig::default())
	}

	pub fn with_config(client: C, config: BridgeConfig) -> BridgeProcessor<G, C> {
		BridgeProcessor {
			client,
			config,
			registered: Vec::new(),
			kinds: ClassKinds::new(),
			pass: None,
			passes: 0,
		}
	}

	pub fn client(&self) -> &C {
		&self.client
	}

	/// Queues an object for the next pass. Only legal between passes.
	pub fn register_bridge_object(&mut self, obj: G::Handle) {
		if self.pass.is_some() {
			panic!("Bridge object registered while a pass is running");
		}
		trace!("Registered bridge object {obj:?}");
		self.registered.push(obj);
	}

	/// Drops the queued registrations without processing them.
	pub fn reset(&mut self) {
		if self.pass.is_some() {
			panic!("A running pass cannot be abandoned");
		}
		self.registered.clear();
	}

	/// Classifies a class through the client, caching the answer.
	pub fn classify(&mut self, class: G::Class) -> ClassKind {
		let client = &self.client;
		self.kinds.get_or_classify(class, |class| client.classify_class(class))
	}

	/// Walks the graph from every registered object and condenses it into
	/// colors. The graph must not change until `finish` returns.
	pub fn run_scc_pass(&mut self, graph: &G) {
		if self.pass.is_some() {
			panic!("The previous pass was never finished");
		}
		self.passes += 1;
		let roots = std::mem::take(&mut self.registered);
		debug!("Starting bridge pass {} with {} registered objects", self.passes, roots.len());

		let mut config = self.config.clone();
		if config.crosscheck {
			// The reference closure is exact, a size-only merge could widen
			// reachability past it and fail the check.
			config.precise_merge = true;
		}

		let mut pass = PassState {
			scan: ScanStore::new(),
			colors: ColorStore::new(config),
			scan_stack: Vec::new(),
			loop_stack: Vec::new(),
			merge_scratch: Vec::new(),
			next_index: 0,
			roots: Vec::new(),
			data: None,
		};

		let mut scan = SccScan {
			graph,
			client: &self.client,
			kinds: &mut self.kinds,
			pass: &mut pass,
		};
		scan.run(&roots);

		debug_assert!(pass.scan_stack.is_empty());
		debug_assert!(pass.loop_stack.is_empty());
		debug!(
			"Scanned {} objects into {} colors ({} cache hits, {} misses)",
			pass.scan.len(),
			pass.colors.len(),
			pass.colors.cache_hits,
			pass.colors.cache_misses
		);

		pass.roots = roots;
		self.pass = Some(pass);
	}

	/// Reduces the color graph to the component and xref arrays the callback
	/// will see. Borrow the result, it stays owned by the pass.
	pub fn build_callback_data(&mut self, graph: &G) -> &CallbackData<G::Handle> {
		let pass = self.pass.as_mut().expect("No pass has been run");
		if pass.data.is_some() {
			panic!("Callback data was already built for this pass");
		}
		let data = callback::build(&mut pass.colors);

		if self.config.crosscheck {
			debug!("Crosschecking the pass against the naive closure");
			if let Err(error) = compare::crosscheck(graph, &self.client, &pass.roots, &data) {
				panic!("Bridge pass diverged from the reference result: {error}");
			}
		}
		if let Some(path) = &self.config.dump_path {
			if let Err(error) = dump::write_dot(&pass.colors, &data, path) {
				warn!("Failed to dump the color graph to {}: {error}", path.display());
			}
		}

		pass.data = Some(data);
		pass.data.as_ref().unwrap()
	}

	/// Invokes the liveness callback, sweeps the dead components and tears
	/// the pass down.
	pub fn finish(&mut self, graph: &mut G) -> PassStatistics {
		let mut pass = self.pass.take().expect("No pass to finish");
		let mut data = pass.data.take().expect("Callback data was never built");

		if pass.roots.is_empty() {
			trace!("Nothing was registered, skipping the callback");
		} else {
			debug!("Dispatching {} sccs to the client", data.sccs.len());
			self.client.cross_references(&mut data.sccs, &data.xrefs);
		}

		let live_sccs = data.sccs.iter().filter(|scc| scc.is_alive).count();
		let (dead_sccs, dead_objects) = callback::sweep_dead(graph, &data);

		let statistics = PassStatistics {
			registered_bridges: pass.roots.len(),
			objects_scanned: pass.scan.len(),
			colors_created: pass.colors.len(),
			cache_hits: pass.colors.cache_hits,
			cache_misses: pass.colors.cache_misses,
			sccs_reported: data.sccs.len(),
			xrefs_reported: data.xrefs.len(),
			live_sccs,
			dead_sccs,
			dead_objects,
		};
		debug!(
			"Finished bridge pass {}: {} live sccs, {} dead sccs, {} objects swept",
			self.passes, live_sccs, dead_sccs, dead_objects
		);
		statistics
	}
}
