use ahash::{HashMap, HashMapExt};
use num_traits::ToPrimitive;
use num_traits::{NumCast, PrimInt};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Keyed arena. Values are reached through a cheap typed index, the key is
/// only consulted on insertion and lookup.
pub struct Storage<K: Hash + Eq + Debug, V: StorageValue> {
	lookup: HashMap<K, Id<V>>,
	values: Vec<V>,
}

impl<K: Hash + Eq + Debug, V: StorageValue> Storage<K, V> {
	pub fn new() -> Storage<K, V> {
		Storage {
			lookup: HashMap::new(),
			values: vec![],
		}
	}

	pub fn insert(&mut self, key: K, value: V) -> Id<V> {
		match self.lookup.entry(key) {
			Entry::Occupied(entry) => {
				// replace value
				let idx = *entry.get();
				*unsafe { self.values.get_unchecked_mut(idx.0.to_usize().unwrap() - 1) } = value;
				idx
			}
			Entry::Vacant(entry) => {
				let idx = unsafe { Id::new(self.values.len() + 1) };
				entry.insert(idx);
				self.values.push(value);
				idx
			}
		}
	}

	pub fn contains(&self, key: &K) -> bool {
		self.lookup.contains_key(key)
	}

	pub fn contains_id(&self, id: Id<V>) -> bool {
		id.0.to_usize().unwrap() <= self.values.len()
	}

	pub fn get_id<Q: ?Sized>(&self, key: &Q) -> Option<Id<V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq,
	{
		self.lookup.get(key).copied()
	}

	pub fn get_keyed<Q: ?Sized>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Hash + Eq,
	{
		let id = self.get_id(key)?;
		Some(self.get(id))
	}

	pub fn get_mut_keyed<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
	where
		K: Borrow<Q>,
		Q: Hash + Eq,
	{
		let id = self.get_id(key)?;
		Some(self.get_mut(id))
	}

	pub fn get(&self, id: Id<V>) -> &V {
		unsafe { self.values.get_unchecked(id.0.to_usize().unwrap() - 1) }
	}

	pub fn get_mut(&mut self, id: Id<V>) -> &mut V {
		unsafe { self.values.get_unchecked_mut(id.0.to_usize().unwrap() - 1) }
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> &[V] {
		self.values.as_slice()
	}
}

/// Unkeyed arena for values that are only ever addressed by the `Id` handed
/// out at allocation.
pub struct Pool<V: StorageValue> {
	values: Vec<V>,
}

impl<V: StorageValue> Pool<V> {
	pub fn new() -> Pool<V> {
		Pool { values: vec![] }
	}

	pub fn alloc(&mut self, value: V) -> Id<V> {
		let idx = unsafe { Id::new(self.values.len() + 1) };
		self.values.push(value);
		idx
	}

	pub fn get(&self, id: Id<V>) -> &V {
		unsafe { self.values.get_unchecked(id.0.to_usize().unwrap() - 1) }
	}

	pub fn get_mut(&mut self, id: Id<V>) -> &mut V {
		unsafe { self.values.get_unchecked_mut(id.0.to_usize().unwrap() - 1) }
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Ids in allocation order.
	pub fn ids(&self) -> impl Iterator<Item = Id<V>> {
		(1..=self.values.len()).map(|idx| unsafe { Id::new(idx) })
	}

	pub fn iter(&self) -> &[V] {
		self.values.as_slice()
	}
}

pub struct Id<V: StorageValue>(V::Idx);

impl<V: StorageValue> Id<V> {
	/// The index is trusted to point at an existing value, hence unsafe.
	pub unsafe fn new(idx: usize) -> Id<V> {
		Id((<V::Idx as NumCast>::from(idx)).unwrap())
	}

	pub fn idx(&self) -> V::Idx {
		self.0
	}
}

impl<V: StorageValue> Clone for Id<V> {
	fn clone(&self) -> Self {
		Id(self.0)
	}
}

impl<V: StorageValue> Debug for Id<V> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Id<{}>", self.0)
	}
}

impl<V: StorageValue> Copy for Id<V> {}

impl<V: StorageValue> PartialEq for Id<V> {
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl<V: StorageValue> Eq for Id<V> {}
impl<V: StorageValue> PartialOrd for Id<V> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.0.partial_cmp(&other.0)
	}
}

impl<V: StorageValue> Ord for Id<V> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.cmp(&other.0)
	}
}

impl<V: StorageValue> Hash for Id<V> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.hash(state)
	}
}

pub trait StorageValue {
	type Idx: PrimInt + Hash + Display;
}
