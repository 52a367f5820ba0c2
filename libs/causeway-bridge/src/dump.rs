use dot_writer::{Attributes, DotWriter};
use std::fmt::Debug;
use std::fs;
use std::hash::Hash;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::callback::CallbackData;
use crate::color::ColorStore;

#[derive(Error, Debug)]
pub enum DumpError {
	#[error("Failed to write the graph file")]
	Io(#[from] io::Error),
}

/// Renders the full color graph next to the reduced view the client was
/// given, for offline inspection with Graphviz.
pub fn write_dot<H: Copy + Eq + Hash + Debug>(
	colors: &ColorStore<H>,
	data: &CallbackData<H>,
	path: &Path,
) -> Result<(), DumpError> {
	let mut output = Vec::new();
	{
		let mut writer = DotWriter::from(&mut output);
		writer.set_pretty_print(false);
		let mut graph = writer.digraph();

		for id in colors.ids() {
			let record = colors.get(id);
			let name = format!("c{}", id.idx());
			let label = match record.api_index() {
				Some(api_index) => format!(
					"color {} / scc {} ({} bridges)",
					id.idx(),
					api_index,
					record.bridges().len()
				),
				None => format!("color {}", id.idx()),
			};
			graph.node_named(name.as_str()).set_label(label.as_str());
		}
		for id in colors.ids() {
			let from = format!("c{}", id.idx());
			for target in colors.get(id).other_colors() {
				let to = format!("c{}", target.idx());
				graph.edge(from.as_str(), to.as_str());
			}
		}

		for (i, scc) in data.sccs.iter().enumerate() {
			let name = format!("scc{i}");
			let label = format!("scc {i}: {:?}", scc.objects);
			graph.node_named(name.as_str()).set_label(label.as_str());
		}
		for xref in &data.xrefs {
			let from = format!("scc{}", xref.src);
			let to = format!("scc{}", xref.dst);
			graph.edge(from.as_str(), to.as_str());
		}
	}

	fs::write(path, output)?;
	Ok(())
}
