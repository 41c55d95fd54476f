use medians::Medianf64;

/// Summary over a set of distances in kilometers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: Option<f64>,
}

impl Summary {
    /// Non-finite values are ignored. Returns `None` if nothing is left.
    pub fn from_distances(distances: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let (min, max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| (lo.min(d), hi.max(d)));
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        let median = finite.as_slice().medf_checked().ok();
        Some(Self {
            count: finite.len(),
            min,
            max,
            mean,
            median,
        })
    }
}
