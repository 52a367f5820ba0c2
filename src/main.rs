use std::path::PathBuf;
use std::{env, fs};

use eyre::{eyre, Result, WrapErr};
use time::macros::format_description;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use causeway_bridge::{BridgeConfigBuilder, BridgeProcessor};

use crate::heap::{DemoClient, DemoHeap};

mod heap;

fn main() -> Result<()> {
	let timer = UtcTime::new(format_description!(
		"[hour]:[minute]:[second].[subsecond digits:3]"
	));
	let format = tracing_subscriber::fmt::format()
		.with_timer(timer)
		.compact();
	let fmt_layer = tracing_subscriber::fmt::layer().event_format(format);
	tracing_subscriber::registry().with(fmt_layer).init();

	let mut args = env::args().skip(1);
	let path = args
		.next()
		.ok_or_else(|| eyre!("Usage: causeway <graph file> [dot output]"))?;
	let text = fs::read_to_string(&path).wrap_err_with(|| format!("Failed to read {path}"))?;
	let mut heap = DemoHeap::parse(&text).wrap_err_with(|| format!("Failed to parse {path}"))?;

	let mut config = BridgeConfigBuilder::new();
	if let Some(dot) = args.next() {
		config = config.dump_path(PathBuf::from(dot));
	}

	let bridges = heap.bridge_objects();
	info!(
		"Loaded {} objects, {} of them bridge objects",
		heap.len(),
		bridges.len()
	);

	let client = DemoClient::new(heap.retained());
	let mut processor = BridgeProcessor::with_config(client, config.build());
	for obj in bridges {
		processor.register_bridge_object(obj);
	}
	processor.run_scc_pass(&heap);
	processor.build_callback_data(&heap);
	let statistics = processor.finish(&mut heap);

	let client = processor.client();
	for (i, (objects, alive)) in client.sccs.iter().enumerate() {
		let verdict = if *alive { "live" } else { "dead" };
		let names: Vec<&str> = objects.iter().map(|&obj| heap.name(obj)).collect();
		println!("scc {i} ({verdict}): {names:?}");
	}
	for &(src, dst) in &client.xrefs {
		println!("xref {src} -> {dst}");
	}
	for slot in heap.weak_slots() {
		match slot.target {
			Some(target) => println!("weak {} -> {}", heap.name(slot.holder), heap.name(target)),
			None => println!("weak {} -> (nulled)", heap.name(slot.holder)),
		}
	}
	for &obj in heap.finalized() {
		println!("finalize {}", heap.name(obj));
	}
	println!(
		"{} objects scanned, {} colors ({} cache hits, {} misses), {} sccs, {} xrefs, {} live, {} dead, {} objects swept",
		statistics.objects_scanned,
		statistics.colors_created,
		statistics.cache_hits,
		statistics.cache_misses,
		statistics.sccs_reported,
		statistics.xrefs_reported,
		statistics.live_sccs,
		statistics.dead_sccs,
		statistics.dead_objects
	);
	Ok(())
}
