use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::color::ColorStore;
use crate::xref;
use crate::ObjectGraph;

/// One strongly connected component as the embedder sees it.
#[derive(Debug)]
pub struct SccRecord<H> {
	/// Liveness verdict, filled in by the embedder during the callback.
	/// Components it leaves untouched are dead.
	pub is_alive: bool,
	/// The bridge objects unified into this component. Empty for components
	/// that are only reported for their connectivity.
	pub objects: Vec<H>,
}

/// A reachability edge between two reported components: the source can keep
/// the destination alive. Indices into the component array.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct XrefRecord {
	pub src: u32,
	pub dst: u32,
}

/// The two arrays handed to the liveness callback.
#[derive(Debug)]
pub struct CallbackData<H> {
	pub sccs: Vec<SccRecord<H>>,
	pub xrefs: Vec<XrefRecord>,
}

/// Sequences the visible colors, materializes their records and rewrites the
/// reachability edges in terms of the new sequence numbers.
pub(crate) fn build<H: Copy + Eq + Hash + Debug>(colors: &mut ColorStore<H>) -> CallbackData<H> {
	let mut data = CallbackData {
		sccs: Vec::new(),
		xrefs: Vec::new(),
	};

	for id in colors.ids() {
		if !colors.is_visible(id) {
			continue;
		}
		let api_index = data.sccs.len() as u32;
		let record = colors.get_mut(id);
		record.api_index = Some(api_index);
		data.sccs.push(SccRecord {
			is_alive: false,
			objects: record.bridges.clone(),
		});
	}

	let mut gathered = Vec::new();
	for id in colors.ids() {
		let Some(src) = colors.get(id).api_index() else {
			continue;
		};
		gathered.clear();
		xref::gather(colors, id, &mut gathered);
		for &target in &gathered {
			let dst = colors
				.get(target)
				.api_index()
				.expect("Gather returned an invisible color");
			debug_assert_ne!(src, dst);
			data.xrefs.push(XrefRecord { src, dst });
		}
		xref::reset(colors, id);
	}

	debug!("Built callback data: {} sccs, {} xrefs", data.sccs.len(), data.xrefs.len());
	data
}

/// Nulls the weak references into the dead components in one batch, then
/// queues every dead bridge object for finalization. Each object belongs to
/// exactly one component, so nothing is queued twice.
pub(crate) fn sweep_dead<G: ObjectGraph>(
	graph: &mut G,
	data: &CallbackData<G::Handle>,
) -> (usize, usize) {
	let mut dead = Vec::new();
	let mut dead_sccs = 0;
	for scc in &data.sccs {
		if scc.is_alive {
			continue;
		}
		dead_sccs += 1;
		dead.extend_from_slice(&scc.objects);
	}

	if !dead.is_empty() {
		trace!("Sweeping {} dead bridge objects", dead.len());
		graph.null_weak_references_in(&dead);
		for &obj in &dead {
			graph.mark_for_finalization(obj);
		}
	}
	(dead_sccs, dead.len())
}
