mod common;

use common::{fixture_stations, fixture_tolls, fixture_vehicle, HOA_BINH, HO_CHI_MINH_CITY};
use evroute_lib::{
    plan_trip, Error, InfeasibleLeg, Itinerary, LegKind, PlannerConfig, RouteAlgorithm,
    TripInputs, TripRequest,
};

fn plan_corridor(algorithm: RouteAlgorithm, config: &PlannerConfig) -> Itinerary {
    let stations = fixture_stations();
    let vehicle = fixture_vehicle("VinFast VF8");
    let inputs = TripInputs::new(&vehicle, &stations);
    let request = TripRequest::new(HOA_BINH, HO_CHI_MINH_CITY, 80.0).with_algorithm(algorithm);
    plan_trip(&inputs, &request, config).expect("corridor trip is feasible")
}

fn assert_consistent(itinerary: &Itinerary, max_range_km: f64) {
    assert_eq!(itinerary.legs.first().map(|leg| leg.kind), Some(LegKind::Departure));
    assert_eq!(itinerary.legs.last().map(|leg| leg.kind), Some(LegKind::Arrival));

    let distance: f64 = itinerary.legs.iter().map(|leg| leg.distance_km).sum();
    let fee: f64 = itinerary.legs.iter().map(|leg| leg.fee()).sum();
    assert!((itinerary.totals.distance_km - distance).abs() < 1e-6);
    assert!((itinerary.totals.fee - fee).abs() < 1e-6);

    for (index, leg) in itinerary.legs.iter().enumerate() {
        assert_eq!(leg.index, index);
        assert!(leg.distance_km >= 0.0);
        assert!(leg.arrival_range_km >= 0.0 && leg.arrival_range_km <= max_range_km);
        if let Some(charge) = leg.charge {
            assert!(charge.charged_km > 0.0);
            assert!(charge.range_after_km <= max_range_km + 1e-9);
            assert!(charge.range_after_km >= leg.distance_km - 1e-9);
        }
    }

    for pair in itinerary.legs.windows(2) {
        assert_ne!(pair[1].from, pair[1].to, "no station repeats consecutively");
        if pair[1].kind == LegKind::Station {
            assert_eq!(pair[0].to, pair[1].from, "legs chain end to end");
        }
    }
}

#[test]
fn a_star_plans_the_corridor() {
    let itinerary = plan_corridor(RouteAlgorithm::AStar, &PlannerConfig::default());
    assert_eq!(itinerary.algorithm, RouteAlgorithm::AStar);
    assert_eq!(itinerary.start_station, "VinFast Hoa Binh");
    assert_eq!(itinerary.goal_station, "VinFast Landmark 81");
    assert!(itinerary.totals.charging_stops >= 1);
    assert!(itinerary.totals.distance_km > 1400.0);
    assert_consistent(&itinerary, 400.0);
}

#[test]
fn uniform_cost_plans_the_corridor() {
    let itinerary = plan_corridor(RouteAlgorithm::UniformCost, &PlannerConfig::default());
    assert_eq!(itinerary.algorithm, RouteAlgorithm::UniformCost);
    assert_consistent(&itinerary, 400.0);
}

#[test]
fn strategies_agree_without_pruning() {
    let mut config = PlannerConfig::default();
    config.search.max_candidates = None;
    let astar = plan_corridor(RouteAlgorithm::AStar, &config);
    let ucs = plan_corridor(RouteAlgorithm::UniformCost, &config);
    assert!((astar.totals.distance_km - ucs.totals.distance_km).abs() < 1e-6);
}

#[test]
fn short_range_vehicle_stops_more_often() {
    let stations = fixture_stations();
    let runabout = fixture_vehicle("City Runabout");
    let inputs = TripInputs::new(&runabout, &stations);
    let request = TripRequest::new(HOA_BINH, HO_CHI_MINH_CITY, 80.0);
    let itinerary = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
    assert_consistent(&itinerary, runabout.max_range_km);

    let long_range = plan_corridor(RouteAlgorithm::AStar, &PlannerConfig::default());
    assert!(itinerary.totals.charging_stops > long_range.totals.charging_stops);
    assert!(itinerary.totals.charge_minutes > 0.0);
}

#[test]
fn toll_avoidance_skips_flagged_edges() {
    let stations = fixture_stations();
    let tolls = fixture_tolls();
    let vehicle = fixture_vehicle("VinFast VF5");
    let inputs = TripInputs::new(&vehicle, &stations).with_tolls(&tolls);
    let request = TripRequest::new((20.995, 105.868), (20.541, 105.913), 90.0);

    let direct = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
    let avoiding = plan_trip(
        &inputs,
        &request.clone().avoiding_tolls(true),
        &PlannerConfig::default(),
    )
    .unwrap();

    assert!(avoiding.avoid_tolls);
    for leg in avoiding.legs.iter().filter(|leg| leg.kind == LegKind::Station) {
        assert!(!tolls.is_toll(&leg.from, &leg.to), "{} -> {} is tolled", leg.from, leg.to);
    }
    assert!(avoiding.totals.distance_km > direct.totals.distance_km);
}

#[test]
fn zero_battery_is_infeasible_before_search() {
    let stations = fixture_stations();
    let vehicle = fixture_vehicle("VinFast VF8");
    let inputs = TripInputs::new(&vehicle, &stations);
    let request = TripRequest::new(HOA_BINH, HO_CHI_MINH_CITY, 0.0);
    let err = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap_err();
    match err {
        Error::Infeasible {
            leg,
            required_km,
            available_km,
        } => {
            assert_eq!(leg, InfeasibleLeg::FirstStation);
            assert_eq!(available_km, 0.0);
            assert!(required_km > 0.0);
        }
        other => panic!("expected Infeasible, got {other:?}"),
    }
}

#[test]
fn offshore_destination_beyond_starting_range_is_infeasible_before_search() {
    // ~292 km of road from VinFast Landmark 81; a half-charged VF8 holds 200 km.
    let mut config = PlannerConfig::default();
    config.search.time_budget_secs = 0.0;
    let stations = fixture_stations();
    let vehicle = fixture_vehicle("VinFast VF8");
    let inputs = TripInputs::new(&vehicle, &stations);
    let request = TripRequest::new(HOA_BINH, (8.7, 106.6), 50.0);
    let err = plan_trip(&inputs, &request, &config).unwrap_err();
    match err {
        Error::Infeasible {
            leg,
            required_km,
            available_km,
        } => {
            assert_eq!(leg, InfeasibleLeg::Destination);
            assert_eq!(available_km, 200.0);
            assert!((required_km - 291.67).abs() < 0.1, "got {required_km}");
        }
        other => panic!("expected Infeasible, got {other:?}"),
    }
}

#[test]
fn zero_time_budget_reports_no_feasible_path() {
    let mut config = PlannerConfig::default();
    config.search.time_budget_secs = 0.0;
    let stations = fixture_stations();
    let vehicle = fixture_vehicle("VinFast VF8");
    let inputs = TripInputs::new(&vehicle, &stations);
    let request = TripRequest::new(HOA_BINH, HO_CHI_MINH_CITY, 80.0);
    let err = plan_trip(&inputs, &request, &config).unwrap_err();
    assert!(matches!(err, Error::NoFeasiblePath { .. }));
    assert!(err.to_string().contains("VinFast Hoa Binh"));
}

#[test]
fn same_station_trip_has_no_hops() {
    let stations = fixture_stations();
    let vehicle = fixture_vehicle("VinFast VF8");
    let inputs = TripInputs::new(&vehicle, &stations);
    let request = TripRequest::new((16.054, 108.202), (16.06, 108.21), 50.0);
    let itinerary = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
    assert_eq!(itinerary.hop_count(), 0);
    assert_eq!(itinerary.legs.len(), 2);
    assert_eq!(itinerary.start_station, itinerary.goal_station);
}
