//! Small numeric helpers shared by the scaler, the classifier and the generator.

use std::cmp::Ordering;

/// Median of the finite values, averaging the middle pair for even counts.
/// NaN entries are treated as missing and skipped.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut finite: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return None;
    }

    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Logistic link, evaluated on the branch that cannot overflow.
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
