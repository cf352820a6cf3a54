use anyhow::{Context, Result};
use gk3_walker::PathOutcome;
use glam::Vec3;

mod cli;
mod overlay;
mod report;
mod scene;

use cli::{Query, RunArgs};
use overlay::Overlay;
use report::{write_json, NearestReport, PathReport, ProbeReport};
use scene::SceneBoundary;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;
    run(args)
}

fn run(args: RunArgs) -> Result<()> {
    let mut scene = SceneBoundary::load(&args.scene)?;
    scene.apply_overrides(&args.overrides);
    scene.block_regions(&args.block_regions);
    scene.add_exclusions(&args.exclusions);

    println!(
        "Walker boundary: {} (size {:.1}x{:.1}, offset {:.1},{:.1}, {} exclusion rect(s))",
        scene.config.mask.display(),
        scene.config.size[0],
        scene.config.size[1],
        scene.config.offset[0],
        scene.config.offset[1],
        scene.region.unwalkable_rects().len()
    );

    let mut drawn_path: Option<PathOutcome> = None;
    for query in &args.queries {
        match *query {
            Query::Probe(point) => {
                let probe = ProbeReport::new(&scene.region, ground(&scene, point));
                println!(
                    "probe {:.2},{:.2}: cell {},{} walkable={} region={}",
                    point[0],
                    point[1],
                    probe.cell[0],
                    probe.cell[1],
                    probe.walkable,
                    probe
                        .region
                        .map(|index| index.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            Query::Nearest(point) => {
                let nearest = NearestReport::new(&scene.region, ground(&scene, point));
                if nearest.moved {
                    println!(
                        "nearest {:.2},{:.2} -> {:.2},{:.2} (cell {},{})",
                        point[0],
                        point[1],
                        nearest.snapped[0],
                        nearest.snapped[2],
                        nearest.cell[0],
                        nearest.cell[1]
                    );
                } else {
                    println!("nearest {:.2},{:.2} is already walkable", point[0], point[1]);
                }
            }
            Query::Path { from, to } => {
                let from = ground(&scene, from);
                let to = ground(&scene, to);
                let outcome = scene.region.find_path(from, to);
                print_path_summary(&outcome, from, args.verbose);
                if let Some(path) = args.path_json.as_deref() {
                    let report = PathReport::new(&args.scene, &scene.region, from, to, &outcome);
                    write_json(path, &report)
                        .with_context(|| format!("writing path report {}", path.display()))?;
                    println!("Saved path report to {}", path.display());
                }
                drawn_path = Some(outcome);
            }
        }
    }

    if let Some(path) = args.dump_overlay.as_deref() {
        let mut overlay = Overlay::render(&scene.region)?;
        if let Some(outcome) = drawn_path.as_ref() {
            overlay.draw_path(&scene.region, outcome.start_cell, &outcome.path);
        }
        overlay.save(path)?;
        println!("Saved walker overlay to {}", path.display());
    }

    Ok(())
}

fn ground(scene: &SceneBoundary, point: [f32; 2]) -> Vec3 {
    Vec3::new(point[0], scene.region.floor_height(), point[1])
}

fn print_path_summary(outcome: &PathOutcome, from: Vec3, verbose: bool) {
    let stats = &outcome.stats;
    if !outcome.found {
        eprintln!(
            "[gk3_engine] no path found after {} attempt(s), {} expansion(s){}",
            stats.attempts,
            stats.expanded,
            if stats.capped { " (expansion cap hit)" } else { "" }
        );
        return;
    }
    println!(
        "path: {} waypoint(s), length {:.2}, {} attempt(s), final node skip {}, {} expansion(s)",
        outcome.path.len(),
        outcome.path.length_from(from),
        stats.attempts,
        stats.node_skip,
        stats.expanded
    );
    if verbose {
        for (index, point) in outcome.path.waypoints().iter().enumerate() {
            println!("  {:>3}: {:.2},{:.2}", index, point.x, point.z);
        }
    } else if let Some(goal) = outcome.path.destination() {
        println!("  ends at {:.2},{:.2}", goal.x, goal.z);
    }
}
