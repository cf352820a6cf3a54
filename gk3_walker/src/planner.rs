//! Path search over a walker boundary.
//!
//! Start and goal are snapped onto walkable cells, then a search runs over
//! the 8-connected raster. The weighted A* scales both the step length and
//! the distance-to-goal estimate by the palette index of the cell being
//! entered, so higher indices read as more expensive floor. The estimate is
//! therefore not admissible; paths lean towards cheap floor rather than the
//! strict optimum.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use glam::{IVec2, Vec3};
use log::debug;

use crate::config::{PathfindingSettings, SearchStrategy};
use crate::region::WalkableRegion;

const DIRECTIONS: [IVec2; 8] = [
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
];

/// Waypoints from just after the start to the goal, in walking order.
///
/// The start position itself is not included; an empty path means the
/// walker is already where it needs to be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkPath {
    waypoints: Vec<Vec3>,
}

impl WalkPath {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }

    /// Goal-first order, for callers that pop waypoints off the back.
    pub fn goal_first(&self) -> impl Iterator<Item = &Vec3> {
        self.waypoints.iter().rev()
    }

    /// Ground distance covered when walking the path from `start`.
    pub fn length_from(&self, start: Vec3) -> f32 {
        let mut previous = start;
        let mut total = 0.0;
        for &point in &self.waypoints {
            total += (point - previous).length();
            previous = point;
        }
        total
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Searches run, including retries at a finer node skip.
    pub attempts: u32,
    /// Nodes expanded across all attempts.
    pub expanded: usize,
    /// Node skip of the last attempt.
    pub node_skip: u32,
    /// Whether any attempt hit the expansion cap.
    pub capped: bool,
}

/// Result of a path query. `found == false` is an ordinary answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    pub found: bool,
    pub path: WalkPath,
    pub start_cell: Option<IVec2>,
    pub goal_cell: Option<IVec2>,
    pub stats: SearchStats,
}

/// Raster-space search result: cells after the start, ending at the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPath {
    pub cells: Option<Vec<IVec2>>,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    parent: IVec2,
    g: f32,
    h: f32,
    rank: u64,
}

impl SearchNode {
    fn f(&self) -> f32 {
        self.g + self.h
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    rank: u64,
    cell: IVec2,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: lowest f first, then the node that entered the open set first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

struct Attempt {
    cells: Option<Vec<IVec2>>,
    expanded: usize,
    capped: bool,
}

impl Attempt {
    fn found(cells: Vec<IVec2>, expanded: usize) -> Self {
        Self {
            cells: Some(cells),
            expanded,
            capped: false,
        }
    }

    fn exhausted(expanded: usize) -> Self {
        Self {
            cells: None,
            expanded,
            capped: false,
        }
    }

    fn capped(expanded: usize) -> Self {
        Self {
            cells: None,
            expanded,
            capped: true,
        }
    }
}

pub struct PathPlanner<'a> {
    region: &'a WalkableRegion,
    settings: PathfindingSettings,
}

impl<'a> PathPlanner<'a> {
    pub fn new(region: &'a WalkableRegion) -> Self {
        Self {
            region,
            settings: region.pathfinding().clone(),
        }
    }

    pub fn with_settings(mut self, settings: PathfindingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn find_path(&self, from: Vec3, to: Vec3) -> PathOutcome {
        if self.region.mask().is_none() {
            debug!("walker path without boundary mask, heading straight to target");
            return PathOutcome {
                found: true,
                path: WalkPath::new(vec![to]),
                start_cell: None,
                goal_cell: None,
                stats: SearchStats::default(),
            };
        }

        let goal = self.region.nearest_walkable_raster(to);
        let start = self.region.nearest_walkable_raster(from);
        let CellPath { cells, stats } = self.find_cell_path(start, goal);

        let found = cells.is_some();
        let waypoints = cells
            .unwrap_or_default()
            .into_iter()
            .map(|cell| self.region.raster_to_world(cell))
            .collect();
        PathOutcome {
            found,
            path: WalkPath::new(waypoints),
            start_cell: Some(start),
            goal_cell: Some(goal),
            stats,
        }
    }

    /// Searches between two cells, retrying at half the node skip until a
    /// search at skip 1 has failed.
    pub fn find_cell_path(&self, start: IVec2, goal: IVec2) -> CellPath {
        let mut skip = self.settings.node_skip.max(1);
        let mut stats = SearchStats {
            node_skip: skip,
            ..SearchStats::default()
        };
        if start == goal {
            return CellPath {
                cells: Some(Vec::new()),
                stats,
            };
        }

        loop {
            stats.attempts += 1;
            stats.node_skip = skip;
            let attempt = match self.settings.strategy {
                SearchStrategy::AStar => self.a_star(start, goal, skip as i32),
                SearchStrategy::BreadthFirst => self.breadth_first(start, goal, skip as i32),
            };
            stats.expanded += attempt.expanded;
            stats.capped |= attempt.capped;
            debug!(
                "walker {:?} {} -> {} skip {}: {} after {} expansions",
                self.settings.strategy,
                start,
                goal,
                skip,
                match (&attempt.cells, attempt.capped) {
                    (Some(_), _) => "found",
                    (None, true) => "capped",
                    (None, false) => "no path",
                },
                attempt.expanded
            );

            if let Some(cells) = attempt.cells {
                return CellPath {
                    cells: Some(cells),
                    stats,
                };
            }
            if skip <= 1 {
                return CellPath { cells: None, stats };
            }
            skip /= 2;
        }
    }

    fn a_star(&self, start: IVec2, goal: IVec2, skip: i32) -> Attempt {
        let mut nodes: HashMap<IVec2, SearchNode> = HashMap::new();
        let mut closed: HashSet<IVec2> = HashSet::new();
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        let mut next_rank: u64 = 0;
        let mut expanded = 0;

        nodes.insert(
            start,
            SearchNode {
                parent: start,
                g: 0.0,
                h: 0.0,
                rank: next_rank,
            },
        );
        closed.insert(start);
        let mut current = start;

        while current != goal {
            expanded += 1;
            if self.over_budget(expanded) {
                return Attempt::capped(expanded);
            }

            let current_g = nodes.get(&current).map(|node| node.g).unwrap_or(0.0);
            for neighbor in self.neighbors(current, goal, skip) {
                if closed.contains(&neighbor) {
                    continue;
                }
                let Some(index) = self.region.cell_value(neighbor) else {
                    continue;
                };
                let weight = f32::from(index);
                let g = current_g + (neighbor - current).as_vec2().length() * weight;

                if let Some(node) = nodes.get_mut(&neighbor) {
                    if g < node.g {
                        node.parent = current;
                        node.g = g;
                        open.push(OpenEntry {
                            f: node.f(),
                            rank: node.rank,
                            cell: neighbor,
                        });
                    }
                } else {
                    next_rank += 1;
                    let node = SearchNode {
                        parent: current,
                        g,
                        h: (goal - neighbor).as_vec2().length() * weight,
                        rank: next_rank,
                    };
                    open.push(OpenEntry {
                        f: node.f(),
                        rank: node.rank,
                        cell: neighbor,
                    });
                    nodes.insert(neighbor, node);
                }
            }

            // Re-parented nodes leave their older entries behind; those pop
            // after the cell is already closed.
            let next = loop {
                match open.pop() {
                    Some(entry) if closed.contains(&entry.cell) => continue,
                    Some(entry) => break entry.cell,
                    None => return Attempt::exhausted(expanded),
                }
            };
            closed.insert(next);
            current = next;
        }

        let cells = reconstruct(start, goal, |cell| nodes.get(&cell).map(|node| node.parent));
        Attempt::found(cells, expanded)
    }

    fn breadth_first(&self, start: IVec2, goal: IVec2, skip: i32) -> Attempt {
        let mut parents: HashMap<IVec2, IVec2> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut expanded = 0;
        parents.insert(start, start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let cells = reconstruct(start, goal, |cell| parents.get(&cell).copied());
                return Attempt::found(cells, expanded);
            }
            expanded += 1;
            if self.over_budget(expanded) {
                return Attempt::capped(expanded);
            }
            for neighbor in self.neighbors(current, goal, skip) {
                if parents.contains_key(&neighbor) {
                    continue;
                }
                parents.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
        Attempt::exhausted(expanded)
    }

    fn over_budget(&self, expanded: usize) -> bool {
        self.settings
            .max_expansions
            .is_some_and(|limit| expanded > limit)
    }

    /// Cells reachable in one step of `skip` cells. Every cell crossed by a
    /// step must be walkable. With a coarse skip the goal is also offered
    /// directly once it is in range, so it can be landed on exactly.
    fn neighbors(&self, current: IVec2, goal: IVec2, skip: i32) -> Vec<IVec2> {
        let mut out = Vec::with_capacity(DIRECTIONS.len() + 1);
        for direction in DIRECTIONS {
            let clear = (1..=skip).all(|step| {
                self.region
                    .is_raster_walkable(current + direction * step)
            });
            if clear {
                out.push(current + direction * skip);
            }
        }
        if skip > 1 && !out.contains(&goal) {
            let delta = goal - current;
            if delta.abs().max_element() <= skip && self.line_walkable(current, goal) {
                out.push(goal);
            }
        }
        out
    }

    fn line_walkable(&self, from: IVec2, to: IVec2) -> bool {
        let delta = (to - from).as_vec2();
        let steps = (to - from).abs().max_element();
        (1..=steps).all(|step| {
            let t = step as f32 / steps as f32;
            let cell = (from.as_vec2() + delta * t).round().as_ivec2();
            self.region.is_raster_walkable(cell)
        })
    }
}

fn reconstruct<F>(start: IVec2, goal: IVec2, parent_of: F) -> Vec<IVec2>
where
    F: Fn(IVec2) -> Option<IVec2>,
{
    let mut cells = Vec::new();
    let mut cell = goal;
    while cell != start {
        cells.push(cell);
        match parent_of(cell) {
            Some(parent) => cell = parent,
            None => break,
        }
    }
    cells.reverse();
    cells
}

impl WalkableRegion {
    /// Plans a walk between two world positions using the region's own
    /// pathfinding settings.
    pub fn find_path(&self, from: Vec3, to: Vec3) -> PathOutcome {
        PathPlanner::new(self).find_path(from, to)
    }
}
