use std::fmt::Debug;
use std::hash::Hash;

use crate::color::{ColorId, ColorStore};

/// Collects the visible frontier reachable from `from`: visible neighbors are
/// recorded, invisible ones are elided and their own neighbors walked in
/// their place. `from` itself is never recorded, the color graph has no
/// cycles to bring the walk back to it.
pub(crate) fn gather<H: Copy + Eq + Hash + Debug>(
	colors: &mut ColorStore<H>,
	from: ColorId<H>,
	out: &mut Vec<ColorId<H>>,
) {
	for i in 0..colors.get(from).other_colors().len() {
		let next = colors.get(from).other_colors()[i];
		if colors.get(next).visited() {
			continue;
		}
		colors.get_mut(next).set_visited(true);
		if colors.is_visible(next) {
			out.push(next);
		} else {
			gather(colors, next, out);
		}
	}
}

/// Clears the marks a `gather` from the same color left behind.
pub(crate) fn reset<H: Copy + Eq + Hash + Debug>(colors: &mut ColorStore<H>, from: ColorId<H>) {
	for i in 0..colors.get(from).other_colors().len() {
		let next = colors.get(from).other_colors()[i];
		if !colors.get(next).visited() {
			continue;
		}
		colors.get_mut(next).set_visited(false);
		if !colors.is_visible(next) {
			reset(colors, next);
		}
	}
}
