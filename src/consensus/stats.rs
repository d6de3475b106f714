//! Descriptive statistics over confidence samples.

pub fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance around a precomputed `mean`. Empty and singleton
/// samples have zero variance.
pub fn calculate_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn calculate_std_dev(values: &[f64]) -> f64 {
    let mean = calculate_mean(values);
    calculate_variance(values, mean).sqrt()
}

/// Standard deviation relative to the mean. `None` when the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let mean = calculate_mean(values);
    if mean == 0.0 {
        return None;
    }

    Some(calculate_variance(values, mean).sqrt() / mean.abs())
}
