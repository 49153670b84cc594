use serde::Serialize;

/// Per-position uncertainty over the mutable segment, indexed relative to its start.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct UncertaintyVector(Vec<f64>);

impl UncertaintyVector {
    /// `1 - p` for every self-probability `p`.
    ///
    /// Probabilities are clamped to `[0, 1]` first and NaN is read as `0`, so every value
    /// ends up in `[0, 1]` and a nonsensical score counts as maximally uncertain.
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        Self(
            probabilities
                .iter()
                .map(|&p| {
                    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
                    1.0 - p
                })
                .collect(),
        )
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.0.is_empty()).then(|| self.0.iter().sum::<f64>() / self.0.len() as f64)
    }
}

impl From<Vec<f64>> for UncertaintyVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncertainty_is_one_minus_probability() {
        let u = UncertaintyVector::from_probabilities(&[0.9, 0.25, 1.0, 0.0]);
        let expected = [0.1, 0.75, 0.0, 1.0];
        for (got, want) in u.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn out_of_range_and_nan_scores_are_clamped() {
        let u = UncertaintyVector::from_probabilities(&[1.4, -0.2, f64::NAN]);
        assert_eq!(u.values(), &[0.0, 1.0, 1.0]);
        assert!(u.iter().all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn mean_of_empty_vector_is_none() {
        assert_eq!(UncertaintyVector::default().mean(), None);
        let u = UncertaintyVector::from(vec![0.2, 0.4]);
        assert!((u.mean().unwrap() - 0.3).abs() < 1e-12);
    }
}
