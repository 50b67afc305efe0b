use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use pullcalc_engine::numbers::decimal;
use pullcalc_engine::{
    EngineConfig, PitySchedule, Pmf, Precision, PullEngine, ResourceConfig, ResourceId,
    SelectionWeights,
};

fn assert_unit_mass(dist: &Pmf, precision: Precision, context: &str) {
    let error = (dist.total() - BigDecimal::one()).abs();
    assert!(
        error < precision.tolerance(20),
        "{context}: mass drifted by {error}"
    );
}

#[test]
fn primary_hazard_reference_points() {
    let hazards = PitySchedule::primary().hazards().unwrap();
    assert_eq!(hazards.len(), 90);
    assert!(hazards.iter().take(72).all(|h| *h == decimal(6, 3)));
    assert_eq!(hazards[73], decimal(66, 3));
    assert_eq!(hazards[88], decimal(966, 3));
    assert_eq!(hazards[89], BigDecimal::one());
}

#[test]
fn secondary_hazard_reference_points() {
    let schedule = PitySchedule::secondary();
    assert_eq!(schedule.guaranteed_index, 76);
    let hazards = schedule.hazards().unwrap();
    assert!(hazards.iter().take(61).all(|h| *h == decimal(7, 3)));
    assert_eq!(hazards[62], decimal(77, 3));
    assert!(hazards.iter().skip(76).all(|h| *h == BigDecimal::one()));
}

#[test]
fn preset_selection_weights_are_exact() {
    let fifty = SelectionWeights::fifty_fifty();
    assert_eq!(fifty.total(), BigDecimal::one());

    let fate = SelectionWeights::fate_point_preset().unwrap();
    assert_eq!(fate.weight_at(0), Some(&decimal(375, 3)));
    assert_eq!(fate.weight_at(1), Some(&decimal(265_625, 6)));
    assert_eq!(fate.weight_at(2), Some(&decimal(359_375, 6)));
    assert_eq!(fate.total(), BigDecimal::one());
}

#[test]
fn primary_levels_are_proper_distributions() {
    let config = EngineConfig::default();
    let precision = config.precision;
    let mut engine = PullEngine::new(config).unwrap();
    let tables = engine.compute_resource(ResourceId::Primary).unwrap();

    assert_unit_mass(tables.occurrence(), precision, "primary occurrence");
    assert_eq!(tables.cycle_len(), 180);
    assert_eq!(tables.levels().len(), 7);
    assert_eq!(
        tables.levels().level(0).unwrap()[0],
        decimal(5, 1) * &tables.occurrence()[0]
    );
    for (k, level) in tables.levels().iter().enumerate() {
        assert_eq!(level.len(), (k + 1) * 180, "level {k}");
        assert_unit_mass(level, precision, &format!("primary level {k}"));
        assert!(
            level.as_slice()[..k].iter().all(Zero::is_zero),
            "level {k} has mass below index {k}"
        );
        assert_eq!(level.support_start(), Some(k));
    }
}

#[test]
fn secondary_levels_are_proper_distributions() {
    let config = EngineConfig::default();
    let precision = config.precision;
    let mut engine = PullEngine::new(config).unwrap();
    let tables = engine.compute_secondary().unwrap();

    assert_unit_mass(tables.occurrence(), precision, "secondary occurrence");
    assert_eq!(tables.weights().horizon(), 3);
    assert_eq!(tables.cycle_len(), 240);
    assert_eq!(tables.levels().len(), 5);
    assert_eq!(tables.levels().max_span(), 1200);
    for (k, level) in tables.levels().iter().enumerate() {
        assert!(level.len() <= (k + 1) * 240, "level {k}");
        assert_unit_mass(level, precision, &format!("secondary level {k}"));
        assert!(level.as_slice()[..k].iter().all(Zero::is_zero), "level {k}");
    }
}

#[test]
fn custom_resource_config_round_trips_through_json() {
    let config = ResourceConfig::secondary();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"kind\":\"fate_point\""));
    let back: ResourceConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
