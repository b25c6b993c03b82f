//! Candidate cycle lengths searched by the walk-forward forecaster.

/// Period the automatic candidate set is built around (one week of daily data)
pub const WEEKLY_PERIOD: f64 = 7.0;

/// `base/1, base/2, …, base/floor(base)`
pub fn sub_harmonics(base: f64) -> Vec<f64> {
    let count = if base.is_finite() && base >= 1.0 {
        base.floor() as usize
    } else {
        0
    };
    (1..=count).map(|i| base / i as f64).collect()
}

/// Multiples of `base` strictly below `max`
pub fn multiples_below(base: f64, max: f64) -> Vec<f64> {
    if !(base > 0.0) {
        return Vec::new();
    }
    let mut ret = Vec::new();
    let mut value = base;
    while value < max {
        ret.push(value);
        value += base;
    }
    ret
}

pub fn double_and_quadruple(max: f64) -> Vec<f64> {
    vec![max * 2.0, max * 4.0]
}

/// Automatic candidate set for history position `i` with a window of `tail`.
///
/// Union of the weekly sub-harmonics, the weekly multiples shorter than the
/// window, and twice and four times the window length. Duplicates are removed
/// keeping the first occurrence.
pub fn candidate_wavelengths(i: usize, tail: usize) -> Vec<f64> {
    let window = (i + 1).min(tail) as f64;

    let mut ret: Vec<f64> = Vec::new();
    let all = sub_harmonics(WEEKLY_PERIOD)
        .into_iter()
        .chain(multiples_below(WEEKLY_PERIOD, window))
        .chain(double_and_quadruple(window));
    for wavelength in all {
        if !ret.contains(&wavelength) {
            ret.push(wavelength);
        }
    }
    ret
}
