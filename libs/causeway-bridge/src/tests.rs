use rand::{thread_rng, Rng};
use std::collections::HashSet;
use std::fs;
use tracing::info;

use crate::{
	crosscheck, BridgeClient, BridgeConfig, BridgeConfigBuilder, BridgeProcessor, CallbackData,
	ClassKind, ObjectGraph, PassStatistics, SccRecord, XrefRecord,
};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub(crate) struct Obj(pub(crate) usize);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum TestClass {
	Plain,
	Bridge,
	Opaque,
}

struct TestObject {
	class: TestClass,
	live: bool,
	forward: Option<usize>,
	refs: Vec<usize>,
}

/// A heap of numbered objects with adjustable liveness, forwarding and weak
/// slots. Plays the collector side of the processor.
pub(crate) struct TestHeap {
	objects: Vec<TestObject>,
	weaks: Vec<Option<usize>>,
	finalized: Vec<usize>,
}

impl TestHeap {
	pub(crate) fn new() -> TestHeap {
		causeway_core::init();
		TestHeap {
			objects: vec![],
			weaks: vec![],
			finalized: vec![],
		}
	}

	pub(crate) fn alloc(&mut self, class: TestClass) -> Obj {
		self.objects.push(TestObject {
			class,
			live: true,
			forward: None,
			refs: vec![],
		});
		Obj(self.objects.len() - 1)
	}

	pub(crate) fn bridge(&mut self) -> Obj {
		self.alloc(TestClass::Bridge)
	}

	pub(crate) fn plain(&mut self) -> Obj {
		self.alloc(TestClass::Plain)
	}

	pub(crate) fn link(&mut self, from: Obj, to: Obj) {
		self.objects[from.0].refs.push(to.0);
	}

	/// Connects `from` to `to` through a run of fresh plain objects.
	pub(crate) fn chain(&mut self, from: Obj, to: Obj, length: usize) {
		let mut prev = from;
		for _ in 0..length {
			let node = self.plain();
			self.link(prev, node);
			prev = node;
		}
		self.link(prev, to);
	}

	pub(crate) fn weak(&mut self, target: Obj) -> usize {
		self.weaks.push(Some(target.0));
		self.weaks.len() - 1
	}

	pub(crate) fn weak_target(&self, slot: usize) -> Option<Obj> {
		self.weaks[slot].map(Obj)
	}

	pub(crate) fn kill(&mut self, obj: Obj) {
		self.objects[obj.0].live = false;
	}

	pub(crate) fn forward(&mut self, from: Obj, to: Obj) {
		self.objects[from.0].forward = Some(to.0);
	}

	pub(crate) fn finalized(&self) -> &[usize] {
		&self.finalized
	}
}

impl ObjectGraph for TestHeap {
	type Handle = Obj;
	type Class = TestClass;

	fn resolve(&self, obj: Obj) -> Obj {
		let mut current = obj.0;
		while let Some(next) = self.objects[current].forward {
			current = next;
		}
		Obj(current)
	}

	fn is_live(&self, obj: Obj) -> bool {
		self.objects[obj.0].live
	}

	fn class_of(&self, obj: Obj) -> TestClass {
		self.objects[obj.0].class
	}

	fn traverse_references(&self, obj: Obj, mut visitor: impl FnMut(Obj)) {
		for &child in &self.objects[obj.0].refs {
			visitor(Obj(child));
		}
	}

	fn null_weak_references_in(&mut self, dead: &[Obj]) {
		for slot in self.weaks.iter_mut() {
			if let Some(target) = *slot {
				if dead.contains(&Obj(target)) {
					*slot = None;
				}
			}
		}
	}

	fn mark_for_finalization(&mut self, obj: Obj) {
		self.finalized.push(obj.0);
	}
}

/// Records everything the callback is shown and marks the components holding
/// a retained object alive.
pub(crate) struct TestClient {
	retained: Vec<Obj>,
	pub(crate) invocations: usize,
	pub(crate) seen_sccs: Vec<Vec<Obj>>,
	pub(crate) seen_xrefs: Vec<(u32, u32)>,
}

impl TestClient {
	pub(crate) fn new() -> TestClient {
		Self::retaining(&[])
	}

	pub(crate) fn retaining(retained: &[Obj]) -> TestClient {
		TestClient {
			retained: retained.to_vec(),
			invocations: 0,
			seen_sccs: vec![],
			seen_xrefs: vec![],
		}
	}
}

impl BridgeClient<TestHeap> for TestClient {
	fn classify_class(&self, class: TestClass) -> ClassKind {
		match class {
			TestClass::Plain => ClassKind::Transparent,
			TestClass::Bridge => ClassKind::Bridge,
			TestClass::Opaque => ClassKind::Opaque,
		}
	}

	fn cross_references(&mut self, sccs: &mut [SccRecord<Obj>], xrefs: &[XrefRecord]) {
		self.invocations += 1;
		self.seen_sccs = sccs
			.iter()
			.map(|scc| {
				let mut objects = scc.objects.clone();
				objects.sort();
				objects
			})
			.collect();
		self.seen_xrefs = xrefs.iter().map(|xref| (xref.src, xref.dst)).collect();

		for scc in sccs.iter_mut() {
			if scc.objects.iter().any(|obj| self.retained.contains(obj)) {
				scc.is_alive = true;
			}
		}
	}
}

fn run_pass(
	heap: &mut TestHeap,
	client: TestClient,
	bridges: &[Obj],
) -> (BridgeProcessor<TestHeap, TestClient>, PassStatistics) {
	run_pass_with(BridgeConfig::default(), heap, client, bridges)
}

fn run_pass_with(
	config: BridgeConfig,
	heap: &mut TestHeap,
	client: TestClient,
	bridges: &[Obj],
) -> (BridgeProcessor<TestHeap, TestClient>, PassStatistics) {
	let mut processor = BridgeProcessor::with_config(client, config);
	for &obj in bridges {
		processor.register_bridge_object(obj);
	}
	processor.run_scc_pass(heap);
	processor.build_callback_data(heap);
	let statistics = processor.finish(heap);
	(processor, statistics)
}

fn scc_of(client: &TestClient, obj: Obj) -> u32 {
	client
		.seen_sccs
		.iter()
		.position(|scc| scc.contains(&obj))
		.unwrap_or_else(|| panic!("{obj:?} was not reported in any scc")) as u32
}

fn assert_dag(xrefs: &[(u32, u32)], scc_count: usize) {
	let mut adjacent = vec![Vec::new(); scc_count];
	for &(src, dst) in xrefs {
		assert_ne!(src, dst, "Self edge on scc {src}");
		adjacent[src as usize].push(dst as usize);
	}
	for start in 0..scc_count {
		let mut seen = vec![false; scc_count];
		let mut stack = vec![start];
		while let Some(scc) = stack.pop() {
			for &next in &adjacent[scc] {
				assert_ne!(next, start, "Xref cycle through scc {start}");
				if !seen[next] {
					seen[next] = true;
					stack.push(next);
				}
			}
		}
	}
}

#[test]
fn cycle_through_plain_objects_forms_one_scc() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	let c = heap.bridge();
	let x = heap.plain();
	heap.link(a, x);
	heap.link(x, b);
	heap.link(b, c);
	heap.link(c, a);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b, c]);
	let client = processor.client();
	assert_eq!(client.invocations, 1);
	assert_eq!(client.seen_sccs, vec![vec![a, b, c]]);
	assert!(client.seen_xrefs.is_empty());
	assert_eq!(statistics.objects_scanned, 4);
	assert_eq!(statistics.sccs_reported, 1);
	assert_eq!(statistics.xrefs_reported, 0);
}

#[test]
fn acyclic_bridges_report_one_edge() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	let x = heap.plain();
	heap.link(a, x);
	heap.link(x, b);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![b], vec![a]]);
	assert_eq!(client.seen_xrefs, vec![(1, 0)]);
	assert_eq!(statistics.objects_scanned, 3);
	assert_eq!(statistics.colors_created, 2);
	assert_eq!(statistics.cache_misses, 0);
}

#[test]
fn long_chain_collapses_to_one_edge() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	heap.chain(a, b, 1000);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![b], vec![a]]);
	assert_eq!(client.seen_xrefs, vec![(1, 0)]);
	assert_eq!(statistics.objects_scanned, 1002);
	// Every chain link reuses the next link's color, only the two bridged
	// components allocate.
	assert_eq!(statistics.colors_created, 2);
	assert_eq!(statistics.cache_hits, 0);
	assert_eq!(statistics.cache_misses, 0);
}

#[test]
fn self_loops_close_as_single_sccs() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	heap.link(a, a);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![a]]);
	assert!(client.seen_xrefs.is_empty());
	assert_eq!(statistics.sccs_reported, 1);
}

#[test]
fn nested_cycles_condense_into_one_component() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.plain();
	let c = heap.plain();
	let d = heap.bridge();
	heap.link(a, b);
	heap.link(b, c);
	heap.link(c, a);
	heap.link(b, d);
	heap.link(d, b);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, d]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![a, d]]);
	assert!(client.seen_xrefs.is_empty());
	assert_eq!(statistics.objects_scanned, 4);
}

#[test]
fn opaque_objects_stop_the_scan() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let o = heap.alloc(TestClass::Opaque);
	let b = heap.bridge();
	heap.link(a, o);
	heap.link(o, b);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![a], vec![b]]);
	assert!(client.seen_xrefs.is_empty());
	assert_eq!(statistics.objects_scanned, 2);
}

#[test]
fn dead_targets_are_skipped() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let x = heap.plain();
	let b = heap.bridge();
	heap.link(a, x);
	heap.link(x, b);
	heap.kill(x);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![a], vec![b]]);
	assert!(client.seen_xrefs.is_empty());
	assert_eq!(statistics.objects_scanned, 2);
}

#[test]
fn dead_roots_are_skipped() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let d = heap.bridge();
	heap.kill(d);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, d]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![a]]);
	assert_eq!(statistics.registered_bridges, 2);
	assert_eq!(statistics.objects_scanned, 1);
}

#[test]
fn forwarded_handles_resolve_to_their_targets() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b_old = heap.bridge();
	let b_new = heap.bridge();
	heap.forward(b_old, b_new);
	heap.link(a, b_old);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b_old]);
	let client = processor.client();
	assert_eq!(client.seen_sccs, vec![vec![b_new], vec![a]]);
	assert_eq!(client.seen_xrefs, vec![(1, 0)]);
	assert_eq!(statistics.objects_scanned, 2);
}

#[test]
fn duplicate_roots_are_scanned_once() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[a, a, a]);
	let client = processor.client();
	assert_eq!(client.invocations, 1);
	assert_eq!(client.seen_sccs, vec![vec![a]]);
	assert_eq!(statistics.registered_bridges, 3);
	assert_eq!(statistics.objects_scanned, 1);
}

#[test]
fn merge_cache_shares_equal_reachability_sets() {
	let mut heap = TestHeap::new();
	let b1 = heap.bridge();
	let b2 = heap.bridge();
	let j1 = heap.plain();
	let j2 = heap.plain();
	let r1 = heap.bridge();
	let r2 = heap.bridge();
	heap.link(j1, b1);
	heap.link(j1, b2);
	heap.link(j2, b1);
	heap.link(j2, b2);
	heap.link(r1, j1);
	heap.link(r2, j2);

	let (processor, statistics) = run_pass(&mut heap, TestClient::new(), &[r1, r2]);
	let client = processor.client();

	// Both junctions reach exactly {b1, b2}, the second one must hit the
	// cache and share the first one's color.
	assert_eq!(statistics.colors_created, 5);
	assert_eq!(statistics.cache_misses, 1);
	assert_eq!(statistics.cache_hits, 1);

	let expected: HashSet<(u32, u32)> = [
		(scc_of(client, r1), scc_of(client, b1)),
		(scc_of(client, r1), scc_of(client, b2)),
		(scc_of(client, r2), scc_of(client, b1)),
		(scc_of(client, r2), scc_of(client, b2)),
	]
	.into_iter()
	.collect();
	let reported: HashSet<(u32, u32)> = client.seen_xrefs.iter().copied().collect();
	assert_eq!(reported, expected);
}

fn junction_heap() -> (TestHeap, Vec<Obj>) {
	let mut heap = TestHeap::new();
	let junction = heap.plain();
	let mut bridges = Vec::new();
	for _ in 0..8 {
		let upstream = heap.bridge();
		heap.link(upstream, junction);
		bridges.push(upstream);
		let downstream = heap.bridge();
		heap.link(junction, downstream);
		bridges.push(downstream);
	}
	(heap, bridges)
}

#[test]
fn heavy_junctions_get_their_own_record() {
	let (mut heap, bridges) = junction_heap();
	let config = BridgeConfigBuilder::new().crosscheck(true).build();
	let (processor, statistics) = run_pass_with(config, &mut heap, TestClient::new(), &bridges);
	let client = processor.client();

	assert_eq!(statistics.sccs_reported, 17);
	assert_eq!(statistics.xrefs_reported, 16);
	let empty = client.seen_sccs.iter().filter(|scc| scc.is_empty()).count();
	assert_eq!(empty, 1);
	assert_dag(&client.seen_xrefs, statistics.sccs_reported);
}

#[test]
fn heavy_junctions_can_be_collapsed() {
	let (mut heap, bridges) = junction_heap();
	let config = BridgeConfigBuilder::new()
		.promote_heavy(false)
		.crosscheck(true)
		.build();
	let (processor, statistics) = run_pass_with(config, &mut heap, TestClient::new(), &bridges);
	let client = processor.client();

	// The junction is elided, every upstream scc points at every downstream
	// one directly.
	assert_eq!(statistics.sccs_reported, 16);
	assert_eq!(statistics.xrefs_reported, 64);
	assert!(client.seen_sccs.iter().all(|scc| !scc.is_empty()));
}

#[test]
fn dead_sccs_lose_weak_references_and_finalize_once() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	heap.link(a, b);
	let weak_a = heap.weak(a);
	let weak_b = heap.weak(b);

	let (_, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	assert_eq!(statistics.live_sccs, 0);
	assert_eq!(statistics.dead_sccs, 2);
	assert_eq!(statistics.dead_objects, 2);

	assert_eq!(heap.weak_target(weak_a), None);
	assert_eq!(heap.weak_target(weak_b), None);
	let mut finalized = heap.finalized().to_vec();
	finalized.sort();
	assert_eq!(finalized, vec![a.0, b.0]);
}

#[test]
fn dead_cycles_finalize_each_member_once() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	heap.link(a, b);
	heap.link(b, a);

	let (_, statistics) = run_pass(&mut heap, TestClient::new(), &[a, b]);
	assert_eq!(statistics.dead_sccs, 1);
	assert_eq!(statistics.dead_objects, 2);
	let mut finalized = heap.finalized().to_vec();
	finalized.sort();
	assert_eq!(finalized, vec![a.0, b.0]);
}

#[test]
fn live_sccs_keep_weak_references() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	heap.link(a, b);
	let weak_a = heap.weak(a);
	let weak_b = heap.weak(b);

	let (_, statistics) = run_pass(&mut heap, TestClient::retaining(&[a]), &[a, b]);
	assert_eq!(statistics.live_sccs, 1);
	assert_eq!(statistics.dead_sccs, 1);

	assert_eq!(heap.weak_target(weak_a), Some(a));
	assert_eq!(heap.weak_target(weak_b), None);
	assert_eq!(heap.finalized(), &[b.0]);
}

#[test]
fn empty_passes_skip_the_callback() {
	let mut heap = TestHeap::new();
	let mut processor = BridgeProcessor::new(TestClient::new());
	for _ in 0..3 {
		processor.run_scc_pass(&heap);
		processor.build_callback_data(&heap);
		let statistics = processor.finish(&mut heap);
		assert_eq!(statistics.registered_bridges, 0);
		assert_eq!(statistics.objects_scanned, 0);
		assert_eq!(statistics.sccs_reported, 0);
	}
	assert_eq!(processor.client().invocations, 0);
}

#[test]
fn reset_abandons_queued_registrations() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();

	let mut processor: BridgeProcessor<TestHeap, TestClient> =
		BridgeProcessor::new(TestClient::new());
	processor.register_bridge_object(a);
	processor.reset();

	processor.run_scc_pass(&heap);
	processor.build_callback_data(&heap);
	let statistics = processor.finish(&mut heap);
	assert_eq!(statistics.registered_bridges, 0);
	assert_eq!(processor.client().invocations, 0);
}

#[test]
#[should_panic(expected = "while a pass is running")]
fn registering_during_a_pass_panics() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();

	let mut processor = BridgeProcessor::new(TestClient::new());
	processor.register_bridge_object(a);
	processor.run_scc_pass(&heap);
	processor.register_bridge_object(a);
}

#[test]
#[should_panic(expected = "Callback data was never built")]
fn finishing_before_building_panics() {
	let mut heap = TestHeap::new();
	let mut processor = BridgeProcessor::new(TestClient::new());
	processor.run_scc_pass(&heap);
	processor.finish(&mut heap);
}

#[test]
#[should_panic(expected = "already built")]
fn building_twice_panics() {
	let mut heap = TestHeap::new();
	let mut processor = BridgeProcessor::new(TestClient::new());
	processor.run_scc_pass(&heap);
	processor.build_callback_data(&heap);
	processor.build_callback_data(&heap);
}

#[test]
fn crosscheck_rejects_tampered_reports() {
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	let x = heap.plain();
	heap.link(a, x);
	heap.link(x, b);
	let client = TestClient::new();

	let good = CallbackData {
		sccs: vec![
			SccRecord { is_alive: false, objects: vec![a] },
			SccRecord { is_alive: false, objects: vec![b] },
		],
		xrefs: vec![XrefRecord { src: 0, dst: 1 }],
	};
	assert!(crosscheck(&heap, &client, &[a, b], &good).is_ok());

	// Two independent objects folded into one scc.
	let merged = CallbackData {
		sccs: vec![SccRecord { is_alive: false, objects: vec![a, b] }],
		xrefs: vec![],
	};
	assert!(crosscheck(&heap, &client, &[a, b], &merged).is_err());

	// The reachability edge dropped.
	let unlinked = CallbackData {
		sccs: vec![
			SccRecord { is_alive: false, objects: vec![a] },
			SccRecord { is_alive: false, objects: vec![b] },
		],
		xrefs: vec![],
	};
	assert!(crosscheck(&heap, &client, &[a, b], &unlinked).is_err());

	// An edge the object graph does not have.
	let inverted = CallbackData {
		sccs: vec![
			SccRecord { is_alive: false, objects: vec![a] },
			SccRecord { is_alive: false, objects: vec![b] },
		],
		xrefs: vec![XrefRecord { src: 0, dst: 1 }, XrefRecord { src: 1, dst: 0 }],
	};
	assert!(crosscheck(&heap, &client, &[a, b], &inverted).is_err());

	// An object the walk cannot reach.
	let foreign = Obj(999);
	let unexpected = CallbackData {
		sccs: vec![
			SccRecord { is_alive: false, objects: vec![a] },
			SccRecord { is_alive: false, objects: vec![b, foreign] },
		],
		xrefs: vec![XrefRecord { src: 0, dst: 1 }],
	};
	assert!(crosscheck(&heap, &client, &[a, b], &unexpected).is_err());
}

#[test]
fn dump_writes_a_graph_file() {
	let path = std::env::temp_dir().join(format!("bridge-dump-{}.dot", std::process::id()));
	let mut heap = TestHeap::new();
	let a = heap.bridge();
	let b = heap.bridge();
	let x = heap.plain();
	heap.link(a, x);
	heap.link(x, b);

	let config = BridgeConfigBuilder::new().dump_path(path.clone()).build();
	run_pass_with(config, &mut heap, TestClient::new(), &[a, b]);

	let text = fs::read_to_string(&path).unwrap();
	assert!(text.contains("digraph"));
	assert!(text.contains("scc0"));
	assert!(text.contains("scc1"));
	fs::remove_file(&path).unwrap();
}

fn random_heap(rng: &mut impl Rng) -> (TestHeap, Vec<Obj>) {
	let mut heap = TestHeap::new();
	let count = rng.gen_range(4..40);
	let mut objects = Vec::new();
	for _ in 0..count {
		let roll: f64 = rng.gen();
		let class = if roll < 0.35 {
			TestClass::Bridge
		} else if roll < 0.45 {
			TestClass::Opaque
		} else {
			TestClass::Plain
		};
		objects.push(heap.alloc(class));
	}
	for _ in 0..rng.gen_range(0..count * 3) {
		let from = objects[rng.gen_range(0..count)];
		let to = objects[rng.gen_range(0..count)];
		heap.link(from, to);
	}
	for _ in 0..count / 8 {
		let victim = objects[rng.gen_range(0..count)];
		heap.kill(victim);
	}

	let bridges = objects
		.iter()
		.copied()
		.filter(|obj| heap.class_of(*obj) == TestClass::Bridge)
		.collect();
	(heap, bridges)
}

#[test]
fn random_graphs_match_the_reference() {
	let mut rng = thread_rng();
	for i in 0..40 {
		let (mut heap, bridges) = random_heap(&mut rng);
		info!("Random pass {i}: {} bridge objects", bridges.len());

		let config = BridgeConfigBuilder::new().crosscheck(true).build();
		let (processor, statistics) =
			run_pass_with(config, &mut heap, TestClient::new(), &bridges);
		let client = processor.client();
		if !bridges.is_empty() {
			assert_eq!(client.invocations, 1);
		}
		assert_dag(&client.seen_xrefs, statistics.sccs_reported);
	}
}

#[test]
fn random_graphs_respect_visibility() {
	let mut rng = thread_rng();
	for _ in 0..40 {
		let (mut heap, bridges) = random_heap(&mut rng);
		let config = BridgeConfigBuilder::new()
			.promote_heavy(false)
			.crosscheck(true)
			.build();
		let (processor, statistics) =
			run_pass_with(config, &mut heap, TestClient::new(), &bridges);
		let client = processor.client();

		// With promotion off, visibility means holding a bridge object.
		assert!(client.seen_sccs.iter().all(|scc| !scc.is_empty()));
		assert_dag(&client.seen_xrefs, statistics.sccs_reported);
	}
}

#[test]
fn crosscheck_allows_approximate_configs() {
	let mut rng = thread_rng();
	for _ in 0..20 {
		let (mut heap, bridges) = random_heap(&mut rng);

		// Every candidate set is past the exact ceiling here, but a checked
		// pass merges with the exact comparison anyway, so the closure can
		// never widen past the reference.
		let config = BridgeConfigBuilder::new()
			.exact_compare_max(0)
			.crosscheck(true)
			.build();
		run_pass_with(config, &mut heap, TestClient::new(), &bridges);
	}
}

#[test]
fn precise_and_approximate_merging_agree() {
	let mut rng = thread_rng();
	for _ in 0..20 {
		let (mut heap, bridges) = random_heap(&mut rng);

		let (fast, _) = run_pass(&mut heap, TestClient::new(), &bridges);
		let precise = BridgeConfigBuilder::new().precise_merge(true).build();
		let (slow, _) = run_pass_with(precise, &mut heap, TestClient::new(), &bridges);

		assert_eq!(fast.client().seen_sccs, slow.client().seen_sccs);
		assert_eq!(fast.client().seen_xrefs, slow.client().seen_xrefs);
	}
}
