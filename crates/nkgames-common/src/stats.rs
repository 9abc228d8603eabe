//! Summary statistics over trial values

/// Arithmetic mean; `0.0` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`); `0.0` for an empty slice
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean and population standard deviation in one call
pub fn summarize(values: &[f64]) -> (f64, f64) {
    (mean(values), population_std(values))
}

/// Maximum; `0.0` for an empty slice
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Index of the first maximum; `None` for an empty slice
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(summarize(&[]), (0.0, 0.0));
        assert_eq!(max(&[]), 0.0);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        assert_eq!(population_std(&[0.42]), 0.0);
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.3]), Some(1));
    }
}
