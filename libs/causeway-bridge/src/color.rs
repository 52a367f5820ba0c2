use bitflags::bitflags;
use causeway_core::{Id, Pool, StorageValue};
use rand::random;
use std::fmt::Debug;
use std::hash::Hash;

use crate::BridgeConfig;

/// Fan-in and fan-out a bridge-free color must both exceed before heaviness
/// is even considered.
pub(crate) const HEAVY_REFS_MIN: u32 = 2;
/// Fan-in times fan-out above which eliding the color would cost more edges
/// than reporting it.
pub(crate) const HEAVY_COMBINED_REFS_MIN: u32 = 60;

const CACHE_BUCKETS: usize = 8192;
const ELEMENTS_PER_BUCKET: usize = 8;

bitflags! {
	pub(crate) struct ColorFlags: u8 {
		/// Scratch mark for candidate deduplication and xref gathering.
		/// Always cleared again before the operation returns.
		const VISITED = 1;
	}
}

pub type ColorId<H> = Id<ColorRecord<H>>;

/// One closed component in summarized form: the colors it can reach and the
/// bridge objects it contains. Everything else about the component is
/// forgotten the moment it closes.
pub struct ColorRecord<H> {
	pub(crate) other_colors: Vec<ColorId<H>>,
	pub(crate) bridges: Vec<H>,
	/// Position in the callback arrays, assigned to visible colors only.
	pub(crate) api_index: Option<u32>,
	pub(crate) incoming: u32,
	pub(crate) flags: ColorFlags,
}

impl<H> StorageValue for ColorRecord<H> {
	type Idx = u32;
}

impl<H> ColorRecord<H> {
	fn new() -> ColorRecord<H> {
		ColorRecord {
			other_colors: Vec::new(),
			bridges: Vec::new(),
			api_index: None,
			incoming: 0,
			flags: ColorFlags::empty(),
		}
	}

	pub fn other_colors(&self) -> &[ColorId<H>] {
		&self.other_colors
	}

	pub fn bridges(&self) -> &[H] {
		&self.bridges
	}

	pub fn api_index(&self) -> Option<u32> {
		self.api_index
	}

	pub(crate) fn visited(&self) -> bool {
		self.flags.contains(ColorFlags::VISITED)
	}

	pub(crate) fn set_visited(&mut self, visited: bool) {
		self.flags.set(ColorFlags::VISITED, visited);
	}
}

#[derive(Copy, Clone)]
struct CacheEntry<H> {
	hash: u32,
	color: ColorId<H>,
}

/// Color arena plus the merge cache that resolves equal reachability sets to
/// one shared color.
pub struct ColorStore<H: Copy + Eq + Hash + Debug> {
	colors: Pool<ColorRecord<H>>,
	cache: Vec<[Option<CacheEntry<H>>; ELEMENTS_PER_BUCKET]>,
	/// Folded into every set hash. Freshly randomized per pass, so a
	/// colliding pair of sets does not keep colliding in later passes.
	hash_perturb: u32,
	config: BridgeConfig,
	pub(crate) cache_hits: usize,
	pub(crate) cache_misses: usize,
}

impl<H: Copy + Eq + Hash + Debug> ColorStore<H> {
	pub fn new(config: BridgeConfig) -> ColorStore<H> {
		ColorStore {
			colors: Pool::new(),
			cache: vec![[None; ELEMENTS_PER_BUCKET]; CACHE_BUCKETS],
			hash_perturb: random(),
			config,
			cache_hits: 0,
			cache_misses: 0,
		}
	}

	/// Allocates a fresh, uninterned color. Components holding bridge objects
	/// always get one of these so they stay individually addressable.
	pub(crate) fn new_color(&mut self) -> ColorId<H> {
		self.colors.alloc(ColorRecord::new())
	}

	/// Records that `color` can reach `target` and bumps the target's fan-in,
	/// saturating at the configured ceiling.
	pub(crate) fn add_edge(&mut self, color: ColorId<H>, target: ColorId<H>) {
		debug_assert_ne!(color, target);
		self.colors.get_mut(color).other_colors.push(target);

		let target = self.colors.get_mut(target);
		if target.incoming < self.config.incoming_max {
			target.incoming += 1;
		}
	}

	/// Picks the color for a closing bridge-free component from its
	/// deduplicated candidate set: no candidates means the component is
	/// irrelevant and gets none, a single candidate is reused as-is, anything
	/// larger goes through the merge cache.
	pub(crate) fn reduce(&mut self, candidates: &[ColorId<H>]) -> Option<ColorId<H>> {
		match candidates {
			[] => None,
			[single] => Some(*single),
			_ => Some(self.intern(candidates)),
		}
	}

	fn intern(&mut self, candidates: &[ColorId<H>]) -> ColorId<H> {
		let hash = self.set_hash(candidates);
		let bucket = (hash as usize) & (CACHE_BUCKETS - 1);

		let mut found = None;
		for entry in self.cache[bucket].iter().flatten() {
			if entry.hash == hash && self.sets_match(candidates, entry.color) {
				found = Some(entry.color);
				break;
			}
		}
		if let Some(color) = found {
			self.cache_hits += 1;
			return color;
		}

		self.cache_misses += 1;
		let color = self.new_color();
		for &candidate in candidates {
			self.add_edge(color, candidate);
		}

		// Newest entry in front, the oldest one falls off the end.
		let bucket = &mut self.cache[bucket];
		bucket.rotate_right(1);
		bucket[0] = Some(CacheEntry { hash, color });
		color
	}

	/// Order-independent hash of a candidate set.
	fn set_hash(&self, candidates: &[ColorId<H>]) -> u32 {
		let mut hash = self.hash_perturb;
		for candidate in candidates {
			hash = hash.wrapping_add(mix_hash(candidate.idx()));
		}
		hash
	}

	fn sets_match(&self, candidates: &[ColorId<H>], color: ColorId<H>) -> bool {
		let other = &self.colors.get(color).other_colors;
		if other.len() != candidates.len() {
			return false;
		}
		if self.config.precise_merge || candidates.len() <= self.config.exact_compare_max {
			// Both sides are deduplicated, so equal length plus containment
			// is set equality.
			candidates.iter().all(|candidate| other.contains(candidate))
		} else {
			// Size-only match. Distinct sets may merge, which only ever
			// over-approximates reachability.
			true
		}
	}

	/// A bridge-free color whose elision would multiply its incoming edges
	/// across its outgoing ones is cheaper to report as a node of its own.
	pub(crate) fn is_heavy(&self, color: ColorId<H>) -> bool {
		if !self.config.promote_heavy {
			return false;
		}
		let record = self.colors.get(color);
		let fan_in = record.incoming;
		let fan_out = record.other_colors.len() as u32;
		fan_in > HEAVY_REFS_MIN
			&& fan_out > HEAVY_REFS_MIN
			&& fan_in.saturating_mul(fan_out) >= HEAVY_COMBINED_REFS_MIN
	}

	pub(crate) fn is_visible(&self, color: ColorId<H>) -> bool {
		!self.colors.get(color).bridges.is_empty() || self.is_heavy(color)
	}

	pub fn get(&self, id: ColorId<H>) -> &ColorRecord<H> {
		self.colors.get(id)
	}

	pub(crate) fn get_mut(&mut self, id: ColorId<H>) -> &mut ColorRecord<H> {
		self.colors.get_mut(id)
	}

	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = ColorId<H>> {
		self.colors.ids()
	}
}

fn mix_hash(source: u32) -> u32 {
	(source.wrapping_mul(215_497) >> 16) ^ source.wrapping_mul(1_823_231).wrapping_add(source)
}
