use causeway_core::{Id, Storage, StorageValue};
use std::fmt::Debug;
use std::hash::Hash;

use crate::color::ColorId;

/// Index value of a record that has not been opened yet.
pub(crate) const UNSET_INDEX: u32 = u32::MAX;

/// Where an object is in its scan lifecycle. States only ever move forward.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScanState {
	/// Queued on the scan stack, not expanded yet.
	Initial,
	/// Expanded: index assigned, children queued, the finishing entry is
	/// still below them on the scan stack.
	Scanning,
	/// Scan complete, but the component is still open on the loop stack.
	FinishedOnStack,
	/// The component closed and this object left the loop stack with it.
	FinishedOffStack,
}

pub type ScanId<H> = Id<ScanRecord<H>>;

/// Per-object scan state for one pass. Lives in a side table, the object
/// itself is never tagged, so there is nothing to revert when the pass ends.
pub struct ScanRecord<H> {
	pub(crate) obj: H,
	pub(crate) state: ScanState,
	pub(crate) is_bridge: bool,
	pub(crate) index: u32,
	pub(crate) low_index: u32,
	/// The color this object's component ended up with, once closed.
	pub(crate) color: Option<ColorId<H>>,
	/// Colors of already closed children, buffered here until this object's
	/// own component closes and consumes them.
	pub(crate) pending: Vec<ColorId<H>>,
}

impl<H> StorageValue for ScanRecord<H> {
	type Idx = u32;
}

pub struct ScanStore<H: Copy + Eq + Hash + Debug> {
	records: Storage<H, ScanRecord<H>>,
}

impl<H: Copy + Eq + Hash + Debug> ScanStore<H> {
	pub fn new() -> ScanStore<H> {
		ScanStore {
			records: Storage::new(),
		}
	}

	/// Creates the record for a newly discovered object.
	pub(crate) fn create(&mut self, obj: H, is_bridge: bool) -> ScanId<H> {
		if self.records.contains(&obj) {
			panic!("Double insertion!");
		}
		self.records.insert(
			obj,
			ScanRecord {
				obj,
				state: ScanState::Initial,
				is_bridge,
				index: UNSET_INDEX,
				low_index: UNSET_INDEX,
				color: None,
				pending: Vec::new(),
			},
		)
	}

	pub fn is_visited(&self, obj: &H) -> bool {
		self.records.contains(obj)
	}

	pub(crate) fn lookup(&self, obj: &H) -> Option<ScanId<H>> {
		self.records.get_id(obj)
	}

	pub(crate) fn get(&self, id: ScanId<H>) -> &ScanRecord<H> {
		self.records.get(id)
	}

	pub(crate) fn get_mut(&mut self, id: ScanId<H>) -> &mut ScanRecord<H> {
		self.records.get_mut(id)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
