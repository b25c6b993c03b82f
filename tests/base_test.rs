mod common;

use std::f64::consts::{PI, TAU};

use common::{cosine_samples, noisy_cosine_samples};
use wavefit::{Base, Error, FitConfig, Sample};

fn alternating(len: usize) -> Vec<Sample> {
    (0..len)
        .map(|k| Sample::new(k as f64, if k % 2 == 0 { 1.0 } else { -1.0 }))
        .collect()
}

#[test]
fn test_period_two_scenario() {
    let samples = alternating(20);

    let mut base = Base::from_wavelengths(&[2.0]).unwrap();
    base.fit(&samples, 8, 20, 0.0005).unwrap();

    assert!(base.offset().abs() < 1e-9);
    assert_eq!(base.len(), 1);

    let component = &base.components()[0];
    assert_eq!(component.wavelength(), 2.0);
    assert!((component.amplitude() - 1.0).abs() < 1e-3);
    let phase = component.phase_init();
    let near_zero = phase.min((phase - TAU).abs());
    let near_pi = (phase - PI).abs();
    assert!(near_zero < 0.05 || near_pi < 0.05, "phase_init = {}", phase);

    assert!(base.calc_mse(&samples) < 1e-4);
}

#[test]
fn test_period_two_with_default_search() {
    let samples = alternating(20);
    let mut base = Base::from_wavelengths(&[2.0]).unwrap();
    base.fit(&samples, 4, 10, 0.0005).unwrap();
    assert!(base.calc_mse(&samples) < 1e-4);
}

#[test]
fn test_decomposes_offset_and_two_terms() {
    // both terms reach a crest on a sampled position, so max |residual| bounds them
    let samples = cosine_samples(48, 3.0, &[(PI / 3.0, 2.0, 12.0), (PI, 0.7, 4.0)]);

    let mut base = Base::from_wavelengths(&[4.0, 12.0]).unwrap();
    base.fit(&samples, 8, 25, 0.0005).unwrap();

    assert!((base.offset() - 3.0).abs() < 1e-9);
    assert_eq!(base.wavelengths(), vec![12.0, 4.0]);
    assert!((base.components()[0].amplitude() - 2.0).abs() < 1e-3);
    assert!((base.components()[1].amplitude() - 0.7).abs() < 1e-3);
    assert!(base.calc_mse(&samples) < 1e-5);
}

#[test]
fn test_pruning_removes_small_components() {
    let samples = noisy_cosine_samples(36, 1.0, &[(0.3, 2.0, 12.0)], 0.05, 11);
    let dropout = 0.1;

    let mut base = Base::from_wavelengths(&[12.0, 5.0, 3.0]).unwrap();
    base.fit(&samples, 6, 12, dropout).unwrap();

    assert!(base.wavelengths().contains(&12.0));
    for component in base.components() {
        assert!(component.amplitude() > dropout);
    }
}

#[test]
fn test_negative_dropout_keeps_everything() {
    let samples = cosine_samples(24, 0.0, &[(0.0, 1.0, 6.0)]);
    let mut base = Base::from_wavelengths(&[6.0, 2.5, 3.0]).unwrap();
    base.fit(&samples, 4, 6, -1.0).unwrap();
    assert_eq!(base.len(), 3);
}

#[test]
fn test_calc_mse_degenerate_cases() {
    let samples = cosine_samples(10, 0.0, &[(0.0, 1.0, 5.0)]);

    let no_components = Base::new(&[], 2.0).unwrap();
    assert_eq!(no_components.calc_mse(&samples), 0.0);

    let unfitted = Base::from_wavelengths(&[5.0]).unwrap();
    assert_eq!(unfitted.calc_mse(&[]), 0.0);
}

#[test]
fn test_fit_empty_samples() {
    let mut base = Base::from_wavelengths(&[7.0, 3.5]).unwrap();
    base.fit(&[], 4, 10, -1.0).unwrap();

    assert_eq!(base.offset(), 0.0);
    assert_eq!(base.len(), 2);
    for component in base.components() {
        assert_eq!(component.amplitude(), 0.0);
    }
    assert!(base.samples().is_empty());
}

#[test]
fn test_fit_constant_signal() {
    let samples: Vec<Sample> = (0..14).map(|i| Sample::new(i as f64, 4.5)).collect();

    let mut base = Base::from_wavelengths(&[7.0, 14.0]).unwrap();
    base.fit(&samples, 4, 10, 0.0005).unwrap();

    assert_eq!(base.offset(), 4.5);
    assert!(base.is_empty());
    assert!((base.get(100.0) - 4.5).abs() < 1e-12);
}

#[test]
fn test_fit_retains_input_samples() {
    let samples = cosine_samples(10, 2.0, &[(0.0, 1.0, 5.0)]);
    let mut base = Base::from_wavelengths(&[5.0]).unwrap();
    base.fit(&samples, 4, 5, 0.0005).unwrap();
    assert_eq!(base.samples(), samples.as_slice());
}

#[test]
fn test_as_object_layout() {
    let base = Base::new(&[(0.25, 2.0, 8.0)], 1.5).unwrap();
    let records = base.as_object();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].phase_init, 0.0);
    assert_eq!(records[0].amplitude, 1.5);
    assert!(records[0].wavelength.is_infinite());
    assert_eq!(records[1].phase_init, 0.25);
    assert_eq!(records[1].wavelength, 8.0);
}

#[test]
fn test_snapshot_is_json_safe() {
    let samples = cosine_samples(16, 1.0, &[(0.0, 1.0, 8.0)]);
    let mut base = Base::from_wavelengths(&[8.0]).unwrap();
    base.fit(&samples, 6, 10, 0.0005).unwrap();

    let json = serde_json::to_string(&base.snapshot()).unwrap();
    assert!(json.contains("\"offset\""));
    assert!(!json.contains("null"));
}

#[test]
fn test_invalid_construction() {
    assert!(matches!(Base::from_wavelengths(&[3.0, 0.0]), Err(Error::InvalidConfig(_))));
    assert!(matches!(Base::new(&[(0.0, 1.0, -2.0)], 0.0), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_fit_with_config() {
    let samples = cosine_samples(21, 0.0, &[(0.0, 1.0, 7.0)]);
    let config = FitConfig {
        wavelengths: vec![7.0],
        max_slit: 6,
        step: 15,
        dropout: 0.0005,
    };

    let mut base = Base::from_wavelengths(&config.wavelengths).unwrap();
    base.fit_with(&samples, &config).unwrap();
    assert!(base.calc_mse(&samples) < 1e-5);

    let bad = FitConfig {
        step: 0,
        ..config
    };
    assert!(base.fit_with(&samples, &bad).is_err());
}

#[test]
fn test_fit_values_near_f64_max() {
    let samples: Vec<Sample> = (0..8)
        .map(|k| Sample::new(k as f64, if k % 2 == 0 { 1e308 } else { 9e307 }))
        .collect();

    let mut base = Base::from_wavelengths(&[2.0]).unwrap();
    base.fit(&samples, 4, 10, 0.0005).unwrap();

    assert!(base.offset().is_finite());
    assert!((base.offset() / 9.5e307 - 1.0).abs() < 1e-12);
    assert_eq!(base.samples(), samples.as_slice());
}

#[test]
fn test_failed_fit_leaves_model_untouched() {
    // the spread between these values exceeds the f64 range
    let samples = vec![
        Sample::new(0.0, -1.7e308),
        Sample::new(1.0, 1.7e308),
        Sample::new(2.0, 1.7e308),
    ];

    let mut base = Base::from_wavelengths(&[2.0, 8.0]).unwrap();
    let before = base.clone();

    assert!(matches!(base.fit(&samples, 4, 10, 0.0005), Err(Error::InvalidInput(_))));
    assert_eq!(base, before);
    assert_eq!(base.wavelengths(), vec![2.0, 8.0]);
}
