use tracing::trace;

use crate::processor::{ClassKinds, PassState};
use crate::scan::{ScanId, ScanState};
use crate::{BridgeClient, ClassKind, ObjectGraph};

/// One Tarjan scan over the live graph. Borrows the pass state so everything
/// it builds survives into the callback phase.
///
/// The scan is a double-pop scheme over an explicit stack: the first pop of
/// an object assigns its visitation index and queues its children on top of a
/// second entry of itself, the second pop computes the low index from the
/// by-then finished children and closes the component where index and low
/// index meet.
pub(crate) struct SccScan<'p, G: ObjectGraph, C: BridgeClient<G>> {
	pub(crate) graph: &'p G,
	pub(crate) client: &'p C,
	pub(crate) kinds: &'p mut ClassKinds<G::Class>,
	pub(crate) pass: &'p mut PassState<G>,
}

impl<'p, G: ObjectGraph, C: BridgeClient<G>> SccScan<'p, G, C> {
	pub(crate) fn run(&mut self, roots: &[G::Handle]) {
		for &root in roots {
			let obj = self.graph.resolve(root);
			if self.pass.scan.is_visited(&obj) {
				trace!("Root {obj:?} already covered");
				continue;
			}
			self.push_object(obj);
			self.dfs();
		}
	}

	/// Filters and queues one object. Forwarding is chased here, at the point
	/// of use.
	fn push_object(&mut self, obj: G::Handle) {
		let obj = self.graph.resolve(obj);

		let class = self.graph.class_of(obj);
		let client = self.client;
		let kind = self.kinds.get_or_classify(class, |class| client.classify_class(class));
		if kind == ClassKind::Opaque {
			return;
		}

		if let Some(id) = self.pass.scan.lookup(&obj) {
			if self.pass.scan.get(id).state == ScanState::Initial {
				self.pass.scan_stack.push(id);
			}
			return;
		}

		// An unvisited object that is not live has nothing to contribute.
		// Bridge objects are live by contract, so this never drops one.
		if !self.graph.is_live(obj) {
			trace!("Skipping dead {obj:?}");
			return;
		}

		let id = self.pass.scan.create(obj, kind == ClassKind::Bridge);
		self.pass.scan_stack.push(id);
	}

	fn dfs(&mut self) {
		while let Some(id) = self.pass.scan_stack.pop() {
			match self.pass.scan.get(id).state {
				ScanState::Initial => self.open_object(id),
				ScanState::Scanning => self.finish_object(id),
				// An object reached on several paths before its first pop
				// sits on the scan stack more than once. Only the topmost
				// entry of those does any work, the rest surface here after
				// the object already finished.
				ScanState::FinishedOnStack | ScanState::FinishedOffStack => {}
			}
		}
	}

	/// First pop: assign the visitation index, then requeue this object below
	/// its children so it finishes once all of them have.
	fn open_object(&mut self, id: ScanId<G::Handle>) {
		let index = self.pass.next_index;
		self.pass.next_index += 1;

		let record = self.pass.scan.get_mut(id);
		record.state = ScanState::Scanning;
		record.index = index;
		record.low_index = index;
		let obj = record.obj;
		trace!("Opened {obj:?} at index {index}");

		self.pass.scan_stack.push(id);
		self.pass.loop_stack.push(id);

		let graph = self.graph;
		graph.traverse_references(obj, |child| self.push_object(child));
	}

	/// Second pop: the children are all done, so one more sweep over them
	/// settles the low index and collects the colors of closed ones.
	fn finish_object(&mut self, id: ScanId<G::Handle>) {
		let obj = self.pass.scan.get(id).obj;
		let graph = self.graph;
		graph.traverse_references(obj, |child| self.absorb_child(id, child));

		let record = self.pass.scan.get_mut(id);
		record.state = ScanState::FinishedOnStack;
		let index = record.index;
		let low_index = record.low_index;
		trace!("Finished {obj:?} index {index} low {low_index}");
		if index == low_index {
			self.close_component(id);
		}
	}

	fn absorb_child(&mut self, id: ScanId<G::Handle>, child: G::Handle) {
		let child = self.graph.resolve(child);
		let Some(child_id) = self.pass.scan.lookup(&child) else {
			// Skipped at push time: opaque or dead.
			return;
		};

		let (child_state, child_low, child_color) = {
			let child = self.pass.scan.get(child_id);
			(child.state, child.low_index, child.color)
		};
		debug_assert_ne!(child_state, ScanState::Initial);

		// A child that is still on the loop stack is part of an open
		// component, its low index pulls ours down.
		if child_state == ScanState::Scanning || child_state == ScanState::FinishedOnStack {
			let record = self.pass.scan.get_mut(id);
			if child_low < record.low_index {
				record.low_index = child_low;
			}
		}

		// A child in a closed component is summarized by its color. Buffer
		// it until our own component closes and consumes the candidates.
		if child_state == ScanState::Scanning {
			return;
		}
		let Some(color) = child_color else { return };
		let record = self.pass.scan.get_mut(id);
		if !record.pending.contains(&color) {
			record.pending.push(color);
		}
	}

	/// Tarjan close at a component root: everything from the root upwards on
	/// the loop stack is one maximal cycle group.
	fn close_component(&mut self, root: ScanId<G::Handle>) {
		let position = self
			.pass
			.loop_stack
			.iter()
			.rposition(|member| *member == root)
			.expect("Component root is not on the loop stack");

		// First walk: does the component hold bridge objects, and what is
		// the deduplicated union of the members' buffered candidates.
		let mut has_bridge = false;
		for i in position..self.pass.loop_stack.len() {
			let member = self.pass.loop_stack[i];
			has_bridge |= self.pass.scan.get(member).is_bridge;
			let pending = std::mem::take(&mut self.pass.scan.get_mut(member).pending);
			for color in pending {
				if !self.pass.colors.get(color).visited() {
					self.pass.colors.get_mut(color).set_visited(true);
					self.pass.merge_scratch.push(color);
				}
			}
		}
		for i in 0..self.pass.merge_scratch.len() {
			let color = self.pass.merge_scratch[i];
			self.pass.colors.get_mut(color).set_visited(false);
		}

		let color = if has_bridge {
			// Bridged components never share a color, each must stay
			// individually addressable in the callback.
			let color = self.pass.colors.new_color();
			for i in 0..self.pass.merge_scratch.len() {
				let candidate = self.pass.merge_scratch[i];
				self.pass.colors.add_edge(color, candidate);
			}
			Some(color)
		} else {
			self.pass.colors.reduce(&self.pass.merge_scratch)
		};

		// Second walk: pop the members, hand them their color and gather the
		// bridge objects into it.
		let members = self.pass.loop_stack.split_off(position);
		trace!("Closed a component of {} members (bridged: {has_bridge})", members.len());
		for member in members {
			let record = self.pass.scan.get_mut(member);
			debug_assert_eq!(record.state, ScanState::FinishedOnStack);
			record.state = ScanState::FinishedOffStack;
			record.color = color;
			let is_bridge = record.is_bridge;
			let obj = record.obj;
			if is_bridge {
				let color = color.expect("A bridged component must have a color");
				self.pass.colors.get_mut(color).bridges.push(obj);
			}
		}
		self.pass.merge_scratch.clear();
	}
}
