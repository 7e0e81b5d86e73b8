/// The cost annotation of a field, used for admission control.
///
/// A field's effective cost is its base `complexity` multiplied by the
/// resolved numeric value of each multiplier argument. Multiplier paths
/// address arguments by name, with dotted segments descending into input
/// objects (`"filter.first"`).
#[derive(Debug, Clone)]
pub struct CostAnnotation {
    pub complexity: u64,
    pub multipliers: Vec<String>,
}

impl CostAnnotation {
    pub fn new(complexity: u64) -> Self {
        CostAnnotation {
            complexity,
            multipliers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_multipliers<S: Into<String>>(mut self, multipliers: impl IntoIterator<Item = S>) -> Self {
        self.multipliers = multipliers.into_iter().map(Into::into).collect();
        self
    }
}
