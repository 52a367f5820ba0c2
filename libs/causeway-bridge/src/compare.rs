use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use thiserror::Error;

use crate::callback::CallbackData;
use crate::{BridgeClient, ClassKind, ObjectGraph};

/// Ways a pass result can disagree with the naive closure. The checker
/// expects the exact reachability closure, which is why checked passes merge
/// with the exact set comparison. Everything listed is a real defect.
#[derive(Error, Debug)]
pub enum CompareError {
	#[error("Bridge object {0} is missing from the report")]
	MissingObject(String),
	#[error("Reported object {0} is not a reachable bridge object")]
	UnexpectedObject(String),
	#[error("Objects {a} and {b} form a cycle but were reported separately")]
	SplitScc { a: String, b: String },
	#[error("Objects {a} and {b} were reported together but do not form a cycle")]
	MergedScc { a: String, b: String },
	#[error("Scc of {src} keeps {dst} alive but the report has no path between them")]
	MissingDependency { src: String, dst: String },
	#[error("The report connects {src} to {dst} without a path in the object graph")]
	SpuriousDependency { src: String, dst: String },
	#[error("Reported scc {scc} can reach itself, the xrefs must form a DAG")]
	CyclicReport { scc: usize },
}

/// Checks a pass report against a from-scratch reachability closure over the
/// same region: identical bridge grouping, identical liveness dependencies,
/// acyclic xrefs. Quadratic in the number of bridge objects, which is why it
/// hides behind the crosscheck switch.
pub fn crosscheck<G: ObjectGraph, C: BridgeClient<G>>(
	graph: &G,
	client: &C,
	roots: &[G::Handle],
	data: &CallbackData<G::Handle>,
) -> Result<(), CompareError> {
	let (bridges, edges) = walk_region(graph, client, roots);
	let bridge_set: HashSet<G::Handle> = bridges.iter().copied().collect();

	let mut reach: HashMap<G::Handle, HashSet<G::Handle>> = HashMap::new();
	for &bridge in &bridges {
		reach.insert(bridge, reachable_bridges(bridge, &edges, &bridge_set));
	}

	let mut reported: HashMap<G::Handle, usize> = HashMap::new();
	for (i, scc) in data.sccs.iter().enumerate() {
		for &obj in &scc.objects {
			if !bridge_set.contains(&obj) {
				return Err(CompareError::UnexpectedObject(format!("{obj:?}")));
			}
			reported.insert(obj, i);
		}
	}
	for &obj in &bridges {
		if !reported.contains_key(&obj) {
			return Err(CompareError::MissingObject(format!("{obj:?}")));
		}
	}

	for (i, &a) in bridges.iter().enumerate() {
		for &b in bridges.iter().skip(i + 1) {
			let cycle = reach[&a].contains(&b) && reach[&b].contains(&a);
			let together = reported[&a] == reported[&b];
			if cycle && !together {
				return Err(CompareError::SplitScc {
					a: format!("{a:?}"),
					b: format!("{b:?}"),
				});
			}
			if !cycle && together {
				return Err(CompareError::MergedScc {
					a: format!("{a:?}"),
					b: format!("{b:?}"),
				});
			}
		}
	}

	let closure = xref_closure(data);
	for (scc, reachable) in closure.iter().enumerate() {
		if reachable.contains(&scc) {
			return Err(CompareError::CyclicReport { scc });
		}
	}

	for &a in &bridges {
		for &b in &bridges {
			if a == b {
				continue;
			}
			let reaches = reach[&a].contains(&b);
			let src = reported[&a];
			let dst = reported[&b];
			let reported_reaches = src == dst || closure[src].contains(&dst);
			if reaches && !reported_reaches {
				return Err(CompareError::MissingDependency {
					src: format!("{a:?}"),
					dst: format!("{b:?}"),
				});
			}
			if !reaches && reported_reaches {
				return Err(CompareError::SpuriousDependency {
					src: format!("{a:?}"),
					dst: format!("{b:?}"),
				});
			}
		}
	}

	Ok(())
}

/// Walks the region a pass would walk, with the same filters, and returns the
/// reachable bridge objects plus the resolved adjacency of the region.
fn walk_region<G: ObjectGraph, C: BridgeClient<G>>(
	graph: &G,
	client: &C,
	roots: &[G::Handle],
) -> (Vec<G::Handle>, HashMap<G::Handle, Vec<G::Handle>>) {
	let mut edges: HashMap<G::Handle, Vec<G::Handle>> = HashMap::new();
	let mut bridges = Vec::new();
	let mut stack = Vec::new();

	for &root in roots {
		let root = graph.resolve(root);
		if client.classify_class(graph.class_of(root)) == ClassKind::Opaque {
			continue;
		}
		if edges.contains_key(&root) || !graph.is_live(root) {
			continue;
		}
		edges.insert(root, Vec::new());
		stack.push(root);

		while let Some(obj) = stack.pop() {
			if client.classify_class(graph.class_of(obj)) == ClassKind::Bridge {
				bridges.push(obj);
			}

			let mut children = Vec::new();
			graph.traverse_references(obj, |child| {
				let child = graph.resolve(child);
				if client.classify_class(graph.class_of(child)) == ClassKind::Opaque {
					return;
				}
				if !edges.contains_key(&child) && !graph.is_live(child) {
					return;
				}
				children.push(child);
			});

			for &child in &children {
				if !edges.contains_key(&child) {
					edges.insert(child, Vec::new());
					stack.push(child);
				}
			}
			edges.insert(obj, children);
		}
	}
	(bridges, edges)
}

fn reachable_bridges<H: Copy + Eq + std::hash::Hash>(
	start: H,
	edges: &HashMap<H, Vec<H>>,
	bridges: &HashSet<H>,
) -> HashSet<H> {
	let mut seen = HashSet::new();
	let mut reached = HashSet::new();
	let mut stack = vec![start];
	seen.insert(start);

	while let Some(obj) = stack.pop() {
		if bridges.contains(&obj) {
			reached.insert(obj);
		}
		if let Some(children) = edges.get(&obj) {
			for &child in children {
				if seen.insert(child) {
					stack.push(child);
				}
			}
		}
	}
	reached
}

/// Reachable scc indices per scc, straight over the reported xrefs.
fn xref_closure<H>(data: &CallbackData<H>) -> Vec<HashSet<usize>> {
	let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); data.sccs.len()];
	for xref in &data.xrefs {
		adjacent[xref.src as usize].push(xref.dst as usize);
	}

	(0..data.sccs.len())
		.map(|start| {
			let mut seen = HashSet::new();
			let mut stack = vec![start];
			while let Some(scc) = stack.pop() {
				for &next in &adjacent[scc] {
					if seen.insert(next) {
						stack.push(next);
					}
				}
			}
			seen
		})
		.collect()
}
