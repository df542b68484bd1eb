use nalgebra::Point3;

/// Whether any point of `first` lies within `cutoff` of any point of `second`.
///
/// Distances are compared after the square root so that values exactly on the
/// cutoff behave the same as a plain Euclidean comparison.
pub fn any_within_distance(first: &[Point3<f64>], second: &[Point3<f64>], cutoff: f64) -> bool {
    first
        .iter()
        .any(|a| second.iter().any(|b| nalgebra::distance(a, b) <= cutoff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_exactly_at_cutoff_count_as_within() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        let b = [Point3::new(5.0, 0.0, 0.0)];
        assert!(any_within_distance(&a, &b, 5.0));
        assert!(!any_within_distance(&a, &b, 4.999));
    }

    #[test]
    fn empty_inputs_are_never_within_distance() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        assert!(!any_within_distance(&a, &[], 10.0));
        assert!(!any_within_distance(&[], &a, 10.0));
    }
}
