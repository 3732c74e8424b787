/// Output for every element of a constant input.
pub const SCALE_MIDPOINT: f64 = 50.0;

/// Min-max rescales `values` onto `[0, 100]`. A constant input maps to
/// [`SCALE_MIDPOINT`] everywhere.
pub fn scale(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = bounds(values) else {
        return Vec::new();
    };

    if max == min {
        return vec![SCALE_MIDPOINT; values.len()];
    }

    let span = max - min;
    values
        .iter()
        .map(|value| ((value - min) / span * 100.0).clamp(0.0, 100.0))
        .collect()
}

/// Scales one field projected out of a slice of records.
pub fn scale_by<T>(items: &[T], field: impl Fn(&T) -> f64) -> Vec<f64> {
    let values: Vec<f64> = items.iter().map(field).collect();
    scale(&values)
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), value| {
        (min.min(value), max.max(value))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_range_onto_zero_to_hundred() {
        assert_eq!(scale(&[500.0, 1000.0, 1500.0]), vec![0.0, 50.0, 100.0]);
        assert_eq!(scale(&[-10.0, 0.0, 10.0]), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn constant_input_maps_to_midpoint() {
        assert_eq!(scale(&[7.0, 7.0, 7.0]), vec![50.0, 50.0, 50.0]);
        assert_eq!(scale(&[3.0]), vec![50.0]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(scale(&[]).is_empty());
    }

    #[test]
    fn output_stays_within_bounds_for_mixed_magnitudes() {
        let values = [0.1, 14_999.0, 3.0, 1e-9, 42.5, 7_500.25, 0.0];
        let scaled = scale(&values);
        assert_eq!(scaled.len(), values.len());
        assert!(scaled.iter().all(|value| (0.0..=100.0).contains(value)));
        assert_eq!(scaled[1], 100.0);
        assert_eq!(scaled[6], 0.0);
    }

    #[test]
    fn scale_by_projects_fields() {
        let pairs = [(1, 2.0), (2, 4.0)];
        assert_eq!(scale_by(&pairs, |pair| pair.1), vec![0.0, 100.0]);
    }
}
