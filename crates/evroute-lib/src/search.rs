//! Battery-constrained best-first search over the charging-station network.
//!
//! The network is the complete graph on stations: any station may follow any
//! other as long as the road distance between them fits in the vehicle's
//! maximum range. A search state is a station plus the remaining range on
//! arrival. Both strategies share one core and differ only in the priority
//! used to order the frontier:
//!
//! - [`RouteAlgorithm::UniformCost`]: accumulated road distance.
//! - [`RouteAlgorithm::AStar`]: accumulated road distance plus the road-scaled
//!   straight-line distance to the goal.
//!
//! States are deduplicated on `(station, range bucket)` where the bucket is the
//! remaining range divided by `range_bucket_km`, rounded down. With candidate
//! pruning enabled only the `max_candidates` feasible neighbours closest to the
//! goal are expanded, so neither strategy is guaranteed to return the shortest
//! itinerary; setting `max_candidates` to `None` searches the full
//! neighbourhood.
//!
//! The search only runs behind [`crate::plan_trip`], which snaps every station
//! id from the table itself:
//!
//! ```compile_fail
//! use evroute_lib::search::search_route;
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::charging::plan_leg_charge;
use crate::config::PlannerConfig;
use crate::geo::GeoPoint;
use crate::stations::{StationId, StationTable};

/// Supported search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RouteAlgorithm {
    /// Uniform-cost search ordered by accumulated road distance.
    #[serde(rename = "ucs")]
    UniformCost,
    /// A* search guided by the road-scaled distance to the goal.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
}

impl RouteAlgorithm {
    fn uses_heuristic(self) -> bool {
        matches!(self, RouteAlgorithm::AStar)
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::UniformCost => "ucs",
            RouteAlgorithm::AStar => "a-star",
        };
        f.write_str(value)
    }
}

/// Inputs of a single station-to-station search.
#[derive(Debug, Clone)]
pub(crate) struct SearchRequest {
    pub start: StationId,
    pub goal: StationId,
    /// Range on arrival at the start station.
    pub initial_range_km: f64,
    pub max_range_km: f64,
    pub algorithm: RouteAlgorithm,
    /// Directed station pairs that must not be used as transitions.
    pub blocked_edges: HashSet<(StationId, StationId)>,
}

/// One visited station of a search result, in path order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeLogEntry {
    pub station: StationId,
    /// Range left on arrival at this station.
    pub range_km: f64,
    /// Range added at the previous station before driving here; zero for the first entry.
    pub charged_km: f64,
    pub location: GeoPoint,
}

/// Successful search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPath {
    pub stations: Vec<StationId>,
    pub log: Vec<ChargeLogEntry>,
    /// Road distance between the first and last station.
    pub distance_km: f64,
    pub expansions: usize,
}

/// Reasons a search ends without a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// The wall-clock budget ran out.
    Timeout,
    /// Every reachable state was expanded without reaching the goal.
    Exhausted,
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailure::Timeout => f.write_str("search time budget exceeded"),
            SearchFailure::Exhausted => f.write_str("search frontier exhausted"),
        }
    }
}

struct SearchNode {
    station: StationId,
    range_km: f64,
    distance_km: f64,
    charged_km: f64,
    parent: Option<usize>,
}

struct Candidate {
    station: StationId,
    road_km: f64,
    to_goal_km: f64,
}

/// Find a station sequence from `request.start` to `request.goal` that never
/// lets the remaining range drop below zero.
///
/// Station ids in `request` must come from `stations`.
pub(crate) fn search_route(
    stations: &StationTable,
    request: &SearchRequest,
    config: &PlannerConfig,
) -> Result<StationPath, SearchFailure> {
    let started = Instant::now();
    let budget = config.search.time_budget();
    let road_factor = config.road_factor;
    let goal_location = stations.station(request.goal).location;

    let heuristic = |station: StationId| -> f64 {
        if request.algorithm.uses_heuristic() {
            stations
                .station(station)
                .location
                .road_km(&goal_location, road_factor)
        } else {
            0.0
        }
    };

    let mut nodes = vec![SearchNode {
        station: request.start,
        range_km: request.initial_range_km,
        distance_km: 0.0,
        charged_km: 0.0,
        parent: None,
    }];
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry::new(0, heuristic(request.start), 0.0));

    let mut visited: HashMap<(StationId, i64), f64> = HashMap::new();
    let mut expansions = 0usize;
    let mut pruned = 0usize;

    loop {
        if started.elapsed() >= budget {
            warn!(
                algorithm = %request.algorithm,
                expansions,
                frontier = frontier.len(),
                budget_secs = budget.as_secs_f64(),
                "route search timed out"
            );
            return Err(SearchFailure::Timeout);
        }

        let Some(entry) = frontier.pop() else {
            warn!(
                algorithm = %request.algorithm,
                expansions,
                "route search exhausted the frontier"
            );
            return Err(SearchFailure::Exhausted);
        };

        let (station, range_km, distance_km) = {
            let node = &nodes[entry.node];
            (node.station, node.range_km, node.distance_km)
        };

        let key = (station, range_bucket(range_km, config.search.range_bucket_km));
        if let Some(best) = visited.get(&key) {
            if *best <= distance_km {
                continue;
            }
        }
        visited.insert(key, distance_km);

        if station == request.goal {
            debug!(
                algorithm = %request.algorithm,
                expansions,
                pruned,
                states = nodes.len(),
                distance_km,
                "route search reached goal"
            );
            return Ok(reconstruct_path(stations, &nodes, entry.node, expansions));
        }
        expansions += 1;

        let mut candidates = neighbours(stations, station, request, &goal_location, road_factor);
        if let Some(limit) = config.search.max_candidates {
            if candidates.len() > limit {
                pruned += candidates.len() - limit;
                candidates.truncate(limit);
            }
        }

        for candidate in candidates {
            let Some(decision) = plan_leg_charge(
                range_km,
                candidate.road_km,
                request.max_range_km,
                &config.charging,
            ) else {
                continue;
            };

            let next_distance = distance_km + candidate.road_km;
            let index = nodes.len();
            nodes.push(SearchNode {
                station: candidate.station,
                range_km: decision.arrival_range_km,
                distance_km: next_distance,
                charged_km: decision.charged_km,
                parent: Some(entry.node),
            });
            frontier.push(FrontierEntry::new(
                index,
                next_distance + heuristic(candidate.station),
                next_distance,
            ));
        }
    }
}

/// Feasible next stations, closest to the goal first.
fn neighbours(
    stations: &StationTable,
    current: StationId,
    request: &SearchRequest,
    goal_location: &GeoPoint,
    road_factor: f64,
) -> Vec<Candidate> {
    let origin = stations.station(current).location;
    let mut candidates: Vec<Candidate> = stations
        .iter()
        .filter(|next| next.id != current)
        .filter(|next| !request.blocked_edges.contains(&(current, next.id)))
        .filter_map(|next| {
            let road_km = origin.road_km(&next.location, road_factor);
            if road_km > request.max_range_km {
                return None;
            }
            Some(Candidate {
                station: next.id,
                road_km,
                to_goal_km: next.location.haversine_km(goal_location),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.to_goal_km
            .total_cmp(&b.to_goal_km)
            .then_with(|| a.station.cmp(&b.station))
    });
    candidates
}

fn range_bucket(range_km: f64, bucket_km: f64) -> i64 {
    (range_km / bucket_km).floor() as i64
}

fn reconstruct_path(
    stations: &StationTable,
    nodes: &[SearchNode],
    goal_node: usize,
    expansions: usize,
) -> StationPath {
    let mut chain = Vec::new();
    let mut current = Some(goal_node);
    while let Some(index) = current {
        chain.push(index);
        current = nodes[index].parent;
    }
    chain.reverse();

    let log: Vec<ChargeLogEntry> = chain
        .iter()
        .map(|&index| {
            let node = &nodes[index];
            ChargeLogEntry {
                station: node.station,
                range_km: node.range_km,
                charged_km: node.charged_km,
                location: stations.station(node.station).location,
            }
        })
        .collect();

    StationPath {
        stations: log.iter().map(|entry| entry.station).collect(),
        distance_km: nodes[goal_node].distance_km,
        log,
        expansions,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FrontierEntry {
    node: usize,
    priority: FloatOrd,
    distance: FloatOrd,
}

impl FrontierEntry {
    fn new(node: usize, priority: f64, distance: f64) -> Self {
        Self {
            node,
            priority: FloatOrd(priority),
            distance: FloatOrd(distance),
        }
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by priority.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.distance.cmp(&self.distance))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::StationRecord;

    fn line_table() -> StationTable {
        // Stations spaced ~0.5 degrees of longitude apart along the equator (~69.5 km road).
        StationTable::new([
            StationRecord::new("S0", "", 0.0, 0.0),
            StationRecord::new("S1", "", 0.0, 0.5),
            StationRecord::new("S2", "", 0.0, 1.0),
            StationRecord::new("S3", "", 0.0, 1.5),
        ])
        .unwrap()
    }

    fn request(table: &StationTable, from: &str, to: &str, range: f64, max: f64) -> SearchRequest {
        SearchRequest {
            start: table.id_by_name(from).unwrap(),
            goal: table.id_by_name(to).unwrap(),
            initial_range_km: range,
            max_range_km: max,
            algorithm: RouteAlgorithm::AStar,
            blocked_edges: HashSet::new(),
        }
    }

    #[test]
    fn start_equal_to_goal_returns_single_station() {
        let table = line_table();
        let req = request(&table, "S1", "S1", 100.0, 300.0);
        let path = search_route(&table, &req, &PlannerConfig::default()).unwrap();
        assert_eq!(path.stations, vec![1]);
        assert_eq!(path.distance_km, 0.0);
        assert_eq!(path.log.len(), 1);
    }

    #[test]
    fn short_range_forces_intermediate_stops() {
        let table = line_table();
        // Max range 100 km: a direct S0 -> S3 jump (~208 km road) is impossible.
        let req = request(&table, "S0", "S3", 100.0, 100.0);
        let path = search_route(&table, &req, &PlannerConfig::default()).unwrap();
        assert_eq!(path.stations, vec![0, 1, 2, 3]);
        for entry in &path.log {
            assert!(entry.range_km >= 0.0 && entry.range_km <= 100.0);
        }
    }

    #[test]
    fn blocked_edges_are_never_used() {
        let table = line_table();
        let mut req = request(&table, "S0", "S2", 300.0, 300.0);
        req.blocked_edges.insert((0, 2));
        let path = search_route(&table, &req, &PlannerConfig::default()).unwrap();
        assert_eq!(path.stations.first(), Some(&0));
        assert_eq!(path.stations.last(), Some(&2));
        for pair in path.stations.windows(2) {
            assert_ne!((pair[0], pair[1]), (0, 2));
        }
    }

    #[test]
    fn disconnected_network_exhausts() {
        let table = line_table();
        let req = request(&table, "S0", "S3", 50.0, 50.0);
        let err = search_route(&table, &req, &PlannerConfig::default()).unwrap_err();
        assert_eq!(err, SearchFailure::Exhausted);
    }

    #[test]
    fn zero_budget_times_out_immediately() {
        let table = line_table();
        let req = request(&table, "S0", "S3", 300.0, 300.0);
        let mut config = PlannerConfig::default();
        config.search.time_budget_secs = 0.0;
        let err = search_route(&table, &req, &config).unwrap_err();
        assert_eq!(err, SearchFailure::Timeout);
    }

    #[test]
    fn strategies_agree_without_pruning() {
        let table = line_table();
        let mut config = PlannerConfig::default();
        config.search.max_candidates = None;

        let mut req = request(&table, "S0", "S3", 100.0, 100.0);
        let astar = search_route(&table, &req, &config).unwrap();
        req.algorithm = RouteAlgorithm::UniformCost;
        let ucs = search_route(&table, &req, &config).unwrap();

        assert_eq!(astar.stations, ucs.stations);
        assert!((astar.distance_km - ucs.distance_km).abs() < 1e-9);
        for pair in ucs.stations.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn charge_is_recorded_on_the_following_entry() {
        let table = line_table();
        // 100 km start range reaches S1 with ~30.5 km left; S1 -> S2 then needs a charge to 90.
        let req = request(&table, "S0", "S2", 100.0, 100.0);
        let path = search_route(&table, &req, &PlannerConfig::default()).unwrap();
        assert_eq!(path.stations, vec![0, 1, 2]);
        assert_eq!(path.log[0].charged_km, 0.0);
        assert_eq!(path.log[1].charged_km, 0.0);
        assert!(path.log[2].charged_km > 0.0);
        let departure = path.log[1].range_km + path.log[2].charged_km;
        assert!((departure - 90.0).abs() < 1e-9);
    }

    #[test]
    fn algorithm_names_are_kebab_case() {
        assert_eq!(RouteAlgorithm::UniformCost.to_string(), "ucs");
        assert_eq!(RouteAlgorithm::AStar.to_string(), "a-star");
        assert_eq!(
            serde_json::to_string(&RouteAlgorithm::AStar).unwrap(),
            "\"a-star\""
        );
    }

    #[test]
    fn range_buckets_floor_to_width() {
        assert_eq!(range_bucket(10.9, 1.0), 10);
        assert_eq!(range_bucket(10.9, 5.0), 2);
        assert_eq!(range_bucket(0.0, 1.0), 0);
    }

    #[test]
    fn near_identical_ranges_share_a_visited_state() {
        // Two slightly offset detours reach X with ranges well under 1 km apart.
        let table = StationTable::new([
            StationRecord::new("S", "", 0.0, 0.0),
            StationRecord::new("M1", "", 0.01, 0.5),
            StationRecord::new("M2", "", -0.012, 0.5),
            StationRecord::new("X", "", 0.0, 1.0),
            StationRecord::new("G", "", 0.0, 1.5),
        ])
        .unwrap();
        let mut req = request(&table, "S", "G", 1000.0, 1000.0);
        req.algorithm = RouteAlgorithm::UniformCost;

        let mut coarse = PlannerConfig::default();
        coarse.search.max_candidates = None;
        let mut fine = coarse.clone();
        fine.search.range_bucket_km = 1e-9;

        let merged = search_route(&table, &req, &coarse).unwrap();
        let separate = search_route(&table, &req, &fine).unwrap();

        assert_eq!(merged.stations, separate.stations);
        assert_eq!(merged.stations, vec![0, 4]);
        assert!((merged.distance_km - separate.distance_km).abs() < 1e-9);
        assert!(
            merged.expansions < separate.expansions,
            "coarse buckets expanded {} states, fine buckets {}",
            merged.expansions,
            separate.expansions
        );
    }

    #[test]
    fn frontier_pops_lowest_priority_first() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry::new(0, 5.0, 1.0));
        heap.push(FrontierEntry::new(1, 2.0, 2.0));
        heap.push(FrontierEntry::new(2, 2.0, 1.0));
        assert_eq!(heap.pop().unwrap().node, 2);
        assert_eq!(heap.pop().unwrap().node, 1);
        assert_eq!(heap.pop().unwrap().node, 0);
    }
}
