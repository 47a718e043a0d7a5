/// Mean of `values`, `0.0` when empty.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Median of `values`, `0.0` when empty.
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentage change from `old` to `new`; `0.0` when there is no base.
pub(crate) fn pct_change(new: f64, old: f64) -> f64 {
    if old == 0.0 {
        0.0
    } else {
        (new - old) / old * 100.0
    }
}

/// The `n` items with the largest `metric`, ties kept in input order.
pub(crate) fn top_by<T, F>(items: &[T], n: usize, metric: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
    ranked.truncate(n);
    ranked
}
