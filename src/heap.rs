use std::collections::HashMap;

use bitflags::bitflags;
use causeway_bridge::{BridgeClient, ClassKind, ObjectGraph, SccRecord, XrefRecord};
use eyre::{bail, eyre, Result, WrapErr};

/// Class of a demo object, fixed at definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DemoClass {
	Plain,
	Bridge,
	Opaque,
}

bitflags! {
	struct ObjectFlags: u8 {
		const LIVE = 1;
		/// Externally retained, the demo client keeps its component alive.
		const RETAINED = 2;
	}
}

struct DemoObject {
	name: String,
	class: DemoClass,
	flags: ObjectFlags,
	refs: Vec<usize>,
}

/// A weak reference held by `holder`. Nulled when its target dies.
pub struct WeakSlot {
	pub holder: usize,
	pub target: Option<usize>,
}

/// In-memory heap built from a line-oriented graph description:
///
/// ```text
/// obj NAME        # plain object
/// bridge NAME     # bridge object
/// opaque NAME     # object the scan never enters
/// edge SRC DST    # strong reference
/// weak SRC DST    # weak reference
/// dead NAME       # the collector already found NAME dead
/// extern NAME     # externally retained
/// ```
pub struct DemoHeap {
	objects: Vec<DemoObject>,
	names: HashMap<String, usize>,
	weaks: Vec<WeakSlot>,
	finalized: Vec<usize>,
}

impl DemoHeap {
	pub fn parse(text: &str) -> Result<DemoHeap> {
		let mut heap = DemoHeap {
			objects: Vec::new(),
			names: HashMap::new(),
			weaks: Vec::new(),
			finalized: Vec::new(),
		};

		for (number, raw) in text.lines().enumerate() {
			let line = raw.split('#').next().unwrap_or("").trim();
			if line.is_empty() {
				continue;
			}
			let mut words = line.split_whitespace();
			let directive = words.next().unwrap();
			let result = match directive {
				"obj" => heap.define(words.next(), DemoClass::Plain),
				"bridge" => heap.define(words.next(), DemoClass::Bridge),
				"opaque" => heap.define(words.next(), DemoClass::Opaque),
				"edge" => heap.link(words.next(), words.next()),
				"weak" => heap.link_weak(words.next(), words.next()),
				"dead" => heap.kill(words.next()),
				"extern" => heap.retain(words.next()),
				other => Err(eyre!("Unknown directive {other}")),
			};
			result.wrap_err_with(|| format!("Line {}: {raw}", number + 1))?;
		}
		Ok(heap)
	}

	fn define(&mut self, name: Option<&str>, class: DemoClass) -> Result<()> {
		let name = name.ok_or_else(|| eyre!("Missing object name"))?;
		if self.names.contains_key(name) {
			bail!("Object {name} is already defined");
		}
		self.names.insert(name.to_string(), self.objects.len());
		self.objects.push(DemoObject {
			name: name.to_string(),
			class,
			flags: ObjectFlags::LIVE,
			refs: Vec::new(),
		});
		Ok(())
	}

	fn lookup(&self, name: Option<&str>) -> Result<usize> {
		let name = name.ok_or_else(|| eyre!("Missing object name"))?;
		self.names
			.get(name)
			.copied()
			.ok_or_else(|| eyre!("Unknown object {name}"))
	}

	fn link(&mut self, src: Option<&str>, dst: Option<&str>) -> Result<()> {
		let src = self.lookup(src)?;
		let dst = self.lookup(dst)?;
		self.objects[src].refs.push(dst);
		Ok(())
	}

	fn link_weak(&mut self, holder: Option<&str>, target: Option<&str>) -> Result<()> {
		let holder = self.lookup(holder)?;
		let target = self.lookup(target)?;
		self.weaks.push(WeakSlot {
			holder,
			target: Some(target),
		});
		Ok(())
	}

	fn kill(&mut self, name: Option<&str>) -> Result<()> {
		let obj = self.lookup(name)?;
		self.objects[obj].flags.remove(ObjectFlags::LIVE);
		Ok(())
	}

	fn retain(&mut self, name: Option<&str>) -> Result<()> {
		let obj = self.lookup(name)?;
		self.objects[obj].flags.insert(ObjectFlags::RETAINED);
		Ok(())
	}

	pub fn name(&self, obj: usize) -> &str {
		&self.objects[obj].name
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn bridge_objects(&self) -> Vec<usize> {
		(0..self.objects.len())
			.filter(|&obj| self.objects[obj].class == DemoClass::Bridge)
			.collect()
	}

	pub fn retained(&self) -> Vec<usize> {
		(0..self.objects.len())
			.filter(|&obj| self.objects[obj].flags.contains(ObjectFlags::RETAINED))
			.collect()
	}

	pub fn weak_slots(&self) -> &[WeakSlot] {
		&self.weaks
	}

	pub fn finalized(&self) -> &[usize] {
		&self.finalized
	}
}

impl ObjectGraph for DemoHeap {
	type Handle = usize;
	type Class = DemoClass;

	// The demo heap never moves objects.
	fn resolve(&self, obj: usize) -> usize {
		obj
	}

	fn is_live(&self, obj: usize) -> bool {
		self.objects[obj].flags.contains(ObjectFlags::LIVE)
	}

	fn class_of(&self, obj: usize) -> DemoClass {
		self.objects[obj].class
	}

	fn traverse_references(&self, obj: usize, mut visitor: impl FnMut(usize)) {
		for &child in &self.objects[obj].refs {
			visitor(child);
		}
	}

	fn null_weak_references_in(&mut self, dead: &[usize]) {
		for slot in self.weaks.iter_mut() {
			if let Some(target) = slot.target {
				if dead.contains(&target) {
					slot.target = None;
				}
			}
		}
	}

	fn mark_for_finalization(&mut self, obj: usize) {
		self.finalized.push(obj);
	}
}

/// Marks every component holding a retained object alive and keeps a copy of
/// the report for printing after the pass.
pub struct DemoClient {
	retained: Vec<usize>,
	pub sccs: Vec<(Vec<usize>, bool)>,
	pub xrefs: Vec<(u32, u32)>,
}

impl DemoClient {
	pub fn new(retained: Vec<usize>) -> DemoClient {
		DemoClient {
			retained,
			sccs: Vec::new(),
			xrefs: Vec::new(),
		}
	}
}

impl BridgeClient<DemoHeap> for DemoClient {
	fn classify_class(&self, class: DemoClass) -> ClassKind {
		match class {
			DemoClass::Plain => ClassKind::Transparent,
			DemoClass::Bridge => ClassKind::Bridge,
			DemoClass::Opaque => ClassKind::Opaque,
		}
	}

	fn cross_references(&mut self, sccs: &mut [SccRecord<usize>], xrefs: &[XrefRecord]) {
		for scc in sccs.iter_mut() {
			if scc.objects.iter().any(|obj| self.retained.contains(obj)) {
				scc.is_alive = true;
			}
		}
		self.sccs = sccs
			.iter()
			.map(|scc| (scc.objects.clone(), scc.is_alive))
			.collect();
		self.xrefs = xrefs.iter().map(|xref| (xref.src, xref.dst)).collect();
	}
}
