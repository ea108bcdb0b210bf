//! Dispersion Model Validation Test Suite
//!
//! Validates the Gaussian plume implementation against the published
//! Pasquill-Gifford/Martin coefficient tables and the numeric-safety
//! guarantees the scheduling layers rely on.
//!
//! # Test Categories
//! 1. Sigma coefficient table validation against Martin (1976)
//! 2. Stability-class ordering properties
//! 3. Concentration finiteness, sign, and decay properties
//! 4. Plume rise behavior
//! 5. Degenerate-input clamping
//! 6. Catalog and class parsing errors
//!
//! # References
//! - Martin (1976): JAPCA 26(2), power-law sigma fits
//! - Briggs (1975): plume rise predictions
//! - Turner (1970): Workbook of Atmospheric Dispersion Estimates
//!
//! Run with: `cargo test --test dispersion_validation`

use burn_plan_core::physics::dispersion::{plume_rise, sigma_y, sigma_z};
use burn_plan_core::{
    build_profile, BurnRequest, CoreError, Degrees, DispersionConfig, DispersionProfile, FuelKind,
    GeoPoint, Hectares, KilogramsPerSquareMeter, MetersPerSecond, StabilityClass,
    WeatherObservation,
};
use chrono::{NaiveDate, NaiveTime};

fn reference_burn(area_ha: f64) -> BurnRequest {
    BurnRequest {
        id: "validation-burn".to_string(),
        location: GeoPoint::new(-35.0, 147.0),
        area: Hectares::new(area_ha),
        fuel: FuelKind::CerealStubble,
        fuel_load: KilogramsPerSquareMeter::new(0.45),
        requested_date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        requested_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        duration_hours: 4.0,
        priority: 5.0,
    }
}

fn observation(wind: f64, stability: StabilityClass) -> WeatherObservation {
    WeatherObservation::daily(
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        MetersPerSecond::new(wind),
        Degrees::new(270.0),
        stability,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 1: SIGMA COEFFICIENT TABLE VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Martin (1976) gives σy = a·x^0.894 with a = 68 for class D.
/// At exactly 1 km the power term vanishes and σy must equal `a`.
#[test]
fn test_sigma_y_matches_published_multipliers_at_one_km() {
    let expected = [
        (StabilityClass::A, 213.0),
        (StabilityClass::B, 156.0),
        (StabilityClass::C, 104.0),
        (StabilityClass::D, 68.0),
        (StabilityClass::E, 50.5),
        (StabilityClass::F, 34.0),
    ];
    for (class, a) in expected {
        let got = sigma_y(class, 1000.0);
        assert!(
            (got - a).abs() < 1e-9,
            "sigma_y({class:?}, 1 km) = {got}, published multiplier {a}"
        );
    }
}

/// σz at 1 km downwind must reproduce c·1^d + f from the near-field
/// coefficient rows.
#[test]
fn test_sigma_z_matches_published_rows_at_one_km() {
    let expected = [
        (StabilityClass::A, 440.8 + 9.27),
        (StabilityClass::B, 106.6 + 3.3),
        (StabilityClass::C, 61.0),
        (StabilityClass::D, 33.2 - 1.7),
        (StabilityClass::E, 22.8 - 1.3),
        (StabilityClass::F, 14.35 - 0.35),
    ];
    for (class, reference) in expected {
        let got = sigma_z(class, 1000.0);
        assert!(
            (got - reference).abs() < 1e-9,
            "sigma_z({class:?}, 1 km) = {got}, table value {reference}"
        );
    }
}

/// The stable-class offset terms go negative very near the source; the
/// implementation must clamp to a positive floor, never return a
/// negative or zero sigma.
#[test]
fn test_sigma_z_clamped_positive_near_source() {
    for class in StabilityClass::ALL {
        for x_m in [1.0, 5.0, 20.0, 50.0] {
            let sz = sigma_z(class, x_m);
            assert!(sz > 0.0, "sigma_z({class:?}, {x_m} m) = {sz} must be positive");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 2: STABILITY ORDERING PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Increasing stability (A → F) strictly decreases vertical spread at
/// any fixed distance: a more stable atmosphere mixes less.
#[test]
fn test_vertical_spread_strictly_decreases_a_to_f() {
    for x_m in [200.0, 600.0, 1000.0, 3000.0, 10_000.0, 25_000.0] {
        for pair in StabilityClass::ALL.windows(2) {
            assert!(
                sigma_z(pair[0], x_m) > sigma_z(pair[1], x_m),
                "ordering violated at {x_m} m between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 3: CONCENTRATION PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

/// For every stability class and a range of winds, concentration is
/// finite and non-negative over a wide sweep of evaluation points.
#[test]
fn test_concentration_finite_and_nonnegative_for_all_classes() {
    let config = DispersionConfig::default();
    for class in StabilityClass::ALL {
        for wind in [0.0, 0.5, 2.0, 5.0, 15.0] {
            let profile = build_profile(&reference_burn(20.0), &observation(wind, class), &config);
            for x in [-1000.0, 0.0, 50.0, 500.0, 5000.0, 50_000.0] {
                for y in [0.0, 100.0, 2000.0] {
                    let c = profile.concentration(x, y);
                    assert!(
                        c.value().is_finite() && c.value() >= 0.0,
                        "C({x}, {y}) = {c} for class {class:?}, wind {wind}"
                    );
                }
            }
        }
    }
}

/// A ground-level release decays strictly monotonically along the
/// centerline: every meter downwind dilutes.
#[test]
fn test_ground_level_centerline_strictly_decreasing() {
    for class in StabilityClass::ALL {
        let profile = DispersionProfile {
            emission_rate: 50.0,
            effective_height: 0.0,
            wind_speed: 4.0,
            stability: class,
        };
        let mut previous = f64::INFINITY;
        let mut x = 50.0;
        while x <= 25_000.0 {
            let c = profile.centerline_concentration(x).value();
            assert!(
                c < previous,
                "class {class:?}: C({x}) = {c} did not decrease from {previous}"
            );
            previous = c;
            x += 50.0;
        }
    }
}

/// Doubling the emission rate doubles concentration everywhere: the
/// plume equation is linear in Q.
#[test]
fn test_concentration_linear_in_emission_rate() {
    let base = DispersionProfile {
        emission_rate: 30.0,
        effective_height: 40.0,
        wind_speed: 5.0,
        stability: StabilityClass::D,
    };
    let doubled = DispersionProfile {
        emission_rate: 60.0,
        ..base.clone()
    };
    for x in [500.0, 2000.0, 8000.0] {
        let ratio = doubled.centerline_concentration(x).value()
            / base.centerline_concentration(x).value();
        assert!((ratio - 2.0).abs() < 1e-9, "ratio {ratio} at {x} m");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 4: PLUME RISE
// ═══════════════════════════════════════════════════════════════════════════════

/// Briggs rise is inversely proportional to wind speed and vanishes for
/// non-buoyant sources.
#[test]
fn test_plume_rise_briggs_behavior() {
    assert_eq!(plume_rise(0.0, 5.0), 0.0);
    assert_eq!(plume_rise(-3.0, 5.0), 0.0);

    // Inverse proportionality in u within one flux regime.
    let rise_2 = plume_rise(30.0, 2.0);
    let rise_8 = plume_rise(30.0, 8.0);
    assert!((rise_2 / rise_8 - 4.0).abs() < 1e-9);

    // More buoyancy, more rise, across the 55 m⁴/s³ regime split.
    assert!(plume_rise(80.0, 5.0) > plume_rise(30.0, 5.0));
}

/// Stronger wind bends the column over: effective height decreases
/// toward the source height as wind grows.
#[test]
fn test_effective_height_degrades_with_wind() {
    let config = DispersionConfig::default();
    let light = build_profile(
        &reference_burn(20.0),
        &observation(1.0, StabilityClass::D),
        &config,
    );
    let fresh = build_profile(
        &reference_burn(20.0),
        &observation(6.0, StabilityClass::D),
        &config,
    );
    let gale = build_profile(
        &reference_burn(20.0),
        &observation(20.0, StabilityClass::D),
        &config,
    );
    assert!(light.effective_height > fresh.effective_height);
    assert!(fresh.effective_height > gale.effective_height);
    assert!(gale.effective_height > config.source_height);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 5: DEGENERATE-INPUT CLAMPING
// ═══════════════════════════════════════════════════════════════════════════════

/// Calm air never divides by zero: the wind floor applies before the
/// flux and concentration divisions.
#[test]
fn test_calm_air_clamps_to_wind_floor() {
    let config = DispersionConfig::default();
    let profile = build_profile(
        &reference_burn(20.0),
        &observation(0.0, StabilityClass::F),
        &config,
    );
    assert_eq!(profile.wind_speed, config.min_wind_speed);
    assert!(profile.effective_height.is_finite());
    assert!(profile.centerline_concentration(500.0).value().is_finite());
}

/// An absurd area × load combination hits the emission ceiling instead
/// of overflowing downstream exponentials.
#[test]
fn test_extreme_burn_clamps_to_emission_ceiling() {
    let config = DispersionConfig::default();
    let profile = build_profile(
        &reference_burn(1_000_000.0),
        &observation(5.0, StabilityClass::D),
        &config,
    );
    assert_eq!(profile.emission_rate, config.max_emission_rate);
    for x in [100.0, 1000.0, 30_000.0] {
        let c = profile.centerline_concentration(x);
        assert!(c.value().is_finite() && c.value() >= 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 6: PARSING ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Unknown fuel categories and stability letters fail loudly with the
/// offending token, never with a silent default.
#[test]
fn test_unknown_catalog_entries_are_rejected() {
    match FuelKind::from_name("peat_bog") {
        Err(CoreError::InvalidFuelType(name)) => assert_eq!(name, "peat_bog"),
        other => panic!("expected InvalidFuelType, got {other:?}"),
    }

    match StabilityClass::from_letter("X") {
        Err(CoreError::InvalidStabilityClass(letter)) => assert_eq!(letter, "X"),
        other => panic!("expected InvalidStabilityClass, got {other:?}"),
    }

    // All valid letters still parse.
    for (letter, class) in [("A", StabilityClass::A), ("f", StabilityClass::F)] {
        assert_eq!(StabilityClass::from_letter(letter).unwrap(), class);
    }
}
