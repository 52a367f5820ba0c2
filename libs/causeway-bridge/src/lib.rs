//! Bridge processing for a runtime whose object graph is co-owned by an
//! external ownership system.
//!
//! Some managed objects ("bridge objects") have an external counterpart that
//! the collector cannot see. During a collection pause the processor walks the
//! managed graph from every registered bridge object, condenses it into its
//! strongly connected components, and reports the components plus the
//! reachability edges between them to the embedder. The embedder answers with
//! a liveness verdict per component, after which the dead ones lose their weak
//! references and are queued for finalization.

mod callback;
mod color;
mod compare;
mod config;
mod dump;
mod processor;
mod scan;
mod tarjan;
mod xref;

pub use callback::*;
pub use color::*;
pub use compare::*;
pub use config::*;
pub use dump::*;
pub use processor::*;
pub use scan::*;
use std::fmt::Debug;
use std::hash::Hash;

#[cfg(test)]
mod tests;

/// How the processor treats instances of a class.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClassKind {
	/// Instances may lead to bridge objects and are traversed.
	Transparent,
	/// Instances can never lead to a bridge object, the scan does not enter them.
	Opaque,
	/// Instances have an external counterpart and anchor the scan.
	Bridge,
}

/// The managed heap as the processor sees it. All of this runs inside a
/// collection pause, so the graph is expected not to change between
/// `run_scc_pass` and `finish`.
pub trait ObjectGraph {
	type Handle: Copy + Eq + Hash + Debug;
	type Class: Copy + Eq + Hash + Debug;

	/// Chases the forwarding pointer of a possibly moved object. Handles are
	/// resolved at every point of use, never stored unresolved.
	fn resolve(&self, obj: Self::Handle) -> Self::Handle;

	fn is_live(&self, obj: Self::Handle) -> bool;

	fn class_of(&self, obj: Self::Handle) -> Self::Class;

	// Go through all the references which this object contains.
	fn traverse_references(&self, obj: Self::Handle, visitor: impl FnMut(Self::Handle));

	/// Clears every weak reference whose target is one of the given objects.
	fn null_weak_references_in(&mut self, dead: &[Self::Handle]);

	fn mark_for_finalization(&mut self, obj: Self::Handle);
}

/// The external ownership system.
pub trait BridgeClient<G: ObjectGraph> {
	/// Classification is immutable per class and may be cached.
	fn classify_class(&self, class: G::Class) -> ClassKind;

	/// The liveness callback. `sccs` arrives with `is_alive` unset, the
	/// client sets it on every component the external side still holds.
	fn cross_references(&mut self, sccs: &mut [SccRecord<G::Handle>], xrefs: &[XrefRecord]);
}
