use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use gk3_walker::{NamedRect, SearchStrategy, WorldRect};

#[derive(Parser, Debug)]
#[command(
    about = "Loads a scene's walker boundary and answers pathfinding queries",
    version
)]
pub struct Args {
    /// Walker boundary config (JSON) describing the scene's mask, size and offset
    #[arg(long)]
    pub scene: PathBuf,

    /// World position (X,Z) to start walking from (requires --to)
    #[arg(long, value_parser = parse_ground_point, allow_hyphen_values = true)]
    pub from: Option<[f32; 2]>,

    /// World position (X,Z) to walk to (requires --from)
    #[arg(long, value_parser = parse_ground_point, allow_hyphen_values = true)]
    pub to: Option<[f32; 2]>,

    /// Snap a world position (X,Z) onto the nearest walkable floor
    #[arg(long, value_parser = parse_ground_point, allow_hyphen_values = true)]
    pub nearest: Option<[f32; 2]>,

    /// Report walkability and region index at a world position (X,Z); repeatable
    #[arg(long = "probe", value_parser = parse_ground_point, allow_hyphen_values = true)]
    pub probes: Vec<[f32; 2]>,

    /// Path to write the path query result as JSON (requires --from/--to)
    #[arg(long)]
    pub path_json: Option<PathBuf>,

    /// Path to write the mask, blocking and path as a PNG overlay
    #[arg(long)]
    pub dump_overlay: Option<PathBuf>,

    /// Override the configured search strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override the configured starting node skip
    #[arg(long)]
    pub node_skip: Option<u32>,

    /// Override the configured expansion cap
    #[arg(long)]
    pub max_expansions: Option<usize>,

    /// Block a region and its boundary band before querying (REGION,BOUNDARY); repeatable
    #[arg(long = "block-region", value_parser = parse_region_pair)]
    pub block_regions: Vec<(u8, u8)>,

    /// Add a named unwalkable rect before querying (NAME:X,Z,WIDTH,DEPTH); repeatable
    #[arg(long = "exclude", value_parser = parse_exclusion, allow_hyphen_values = true)]
    pub exclusions: Vec<NamedRect>,

    /// Print every waypoint instead of the compact summary
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    AStar,
    BreadthFirst,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::AStar => SearchStrategy::AStar,
            StrategyArg::BreadthFirst => SearchStrategy::BreadthFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    Path { from: [f32; 2], to: [f32; 2] },
    Nearest([f32; 2]),
    Probe([f32; 2]),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOverrides {
    pub strategy: Option<SearchStrategy>,
    pub node_skip: Option<u32>,
    pub max_expansions: Option<usize>,
}

#[derive(Debug)]
pub struct RunArgs {
    pub scene: PathBuf,
    pub queries: Vec<Query>,
    pub overrides: SearchOverrides,
    pub block_regions: Vec<(u8, u8)>,
    pub exclusions: Vec<NamedRect>,
    pub path_json: Option<PathBuf>,
    pub dump_overlay: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse() -> Result<RunArgs> {
    let args = Args::parse();
    args.into_run_args()
}

impl Args {
    fn into_run_args(self) -> Result<RunArgs> {
        let path_query = match (self.from, self.to) {
            (Some(from), Some(to)) => Some(Query::Path { from, to }),
            (None, None) => None,
            _ => bail!("--from and --to must be given together"),
        };
        if path_query.is_none() && self.path_json.is_some() {
            bail!("--path-json requires --from and --to");
        }
        if self.node_skip == Some(0) {
            bail!("--node-skip must be at least 1");
        }

        let mut queries: Vec<Query> = self.probes.into_iter().map(Query::Probe).collect();
        if let Some(point) = self.nearest {
            queries.push(Query::Nearest(point));
        }
        if let Some(query) = path_query {
            queries.push(query);
        }
        if queries.is_empty() && self.dump_overlay.is_none() {
            bail!("nothing to do: pass --from/--to, --nearest, --probe or --dump-overlay");
        }

        Ok(RunArgs {
            scene: self.scene,
            queries,
            overrides: SearchOverrides {
                strategy: self.strategy.map(SearchStrategy::from),
                node_skip: self.node_skip,
                max_expansions: self.max_expansions,
            },
            block_regions: self.block_regions,
            exclusions: self.exclusions,
            path_json: self.path_json,
            dump_overlay: self.dump_overlay,
            verbose: self.verbose,
        })
    }
}

fn parse_floats<const N: usize>(raw: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma-separated numbers, got '{raw}'"));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(&parts) {
        let value: f32 = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number"))?;
        if !value.is_finite() {
            return Err(format!("'{part}' is not finite"));
        }
        *slot = value;
    }
    Ok(out)
}

fn parse_ground_point(raw: &str) -> Result<[f32; 2], String> {
    parse_floats::<2>(raw)
}

fn parse_region_pair(raw: &str) -> Result<(u8, u8), String> {
    let (region, boundary) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected REGION,BOUNDARY, got '{raw}'"))?;
    let region = region
        .trim()
        .parse()
        .map_err(|_| format!("'{region}' is not a region index (0-255)"))?;
    let boundary = boundary
        .trim()
        .parse()
        .map_err(|_| format!("'{boundary}' is not a region index (0-255)"))?;
    Ok((region, boundary))
}

fn parse_exclusion(raw: &str) -> Result<NamedRect, String> {
    let (name, rect) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:X,Z,WIDTH,DEPTH, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("exclusion name must not be empty".to_string());
    }
    let [x, z, width, depth] = parse_floats::<4>(rect)?;
    let rect = WorldRect::new(x, z, width, depth);
    if !rect.has_area() {
        return Err(format!(
            "exclusion '{name}' needs positive width and depth (got {width}, {depth})"
        ));
    }
    Ok(NamedRect {
        name: name.to_string(),
        rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Result<RunArgs> {
        let mut argv = vec!["gk3_engine", "--scene", "scene.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)?.into_run_args()
    }

    #[test]
    fn parses_path_query() {
        let run = args(&["--from", "5,5", "--to", "-95.5, 95"]).expect("args");
        assert_eq!(
            run.queries,
            vec![Query::Path {
                from: [5.0, 5.0],
                to: [-95.5, 95.0]
            }]
        );
    }

    #[test]
    fn from_without_to_is_rejected() {
        let err = args(&["--from", "5,5"]).unwrap_err();
        assert!(err.to_string().contains("--from and --to"));
    }

    #[test]
    fn path_json_requires_a_path_query() {
        let err = args(&["--nearest", "1,1", "--path-json", "out.json"]).unwrap_err();
        assert!(err.to_string().contains("--path-json"));
    }

    #[test]
    fn needs_at_least_one_query() {
        assert!(args(&[]).is_err());
        assert!(args(&["--dump-overlay", "mask.png"]).is_ok());
    }

    #[test]
    fn collects_blocking_and_overrides() {
        let run = args(&[
            "--probe",
            "1,2",
            "--probe",
            "3,4",
            "--block-region",
            "3,4",
            "--exclude",
            "cart:10,-20,5,6",
            "--strategy",
            "breadth-first",
            "--node-skip",
            "4",
        ])
        .expect("args");
        assert_eq!(run.queries.len(), 2);
        assert_eq!(run.block_regions, vec![(3, 4)]);
        assert_eq!(run.exclusions[0].name, "cart");
        assert_eq!(run.exclusions[0].rect, WorldRect::new(10.0, -20.0, 5.0, 6.0));
        assert_eq!(run.overrides.strategy, Some(SearchStrategy::BreadthFirst));
        assert_eq!(run.overrides.node_skip, Some(4));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_ground_point("1").is_err());
        assert!(parse_ground_point("a,b").is_err());
        assert!(parse_ground_point("inf,0").is_err());
        assert!(parse_region_pair("300,1").is_err());
        assert!(parse_exclusion(":1,2,3,4").is_err());
        assert!(parse_exclusion("cart:1,2,3").is_err());
        assert!(parse_exclusion("cart:1,2,0,4").is_err());
        assert!(parse_exclusion("cart:1,2,3,-4").is_err());
        assert!(parse_exclusion("cart:-1,-2,3,4").is_ok());
        assert!(args(&["--from", "1,1", "--to", "2,2", "--node-skip", "0"]).is_err());
    }
}
