use std::time::Duration;

/// Engine settings carried by the schema.
///
/// All knobs the pipeline consults are explicit here; nothing is read from
/// ambient/global state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// How long the whole request pipeline may run before it is cancelled.
    pub timeout: Duration,
    pub complexity_control: ComplexityControl,
    /// When disabled, cost annotations contribute their base cost only and
    /// multiplier arguments are ignored.
    pub complexity_multipliers: bool,
    pub operation_limits: OperationLimits,
    /// Cap on in-flight resolver invocations within a single request.
    pub max_concurrent_resolvers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeout: Duration::from_secs(30),
            complexity_control: ComplexityControl::default(),
            complexity_multipliers: true,
            operation_limits: OperationLimits::default(),
            max_concurrent_resolvers: 64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ComplexityControl {
    #[default]
    Disabled,
    /// Complexity limits are enforced with the given limit.
    Enforce { limit: u64 },
    /// Complexity is measured and reported.
    ///
    /// A limit can still be provided which we should use for reporting
    /// whether something would have gone over the limit.
    Measure { limit: Option<u64> },
}

impl ComplexityControl {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ComplexityControl::Disabled)
    }

    pub fn is_enforce(&self) -> bool {
        matches!(self, ComplexityControl::Enforce { .. })
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            ComplexityControl::Disabled => None,
            ComplexityControl::Enforce { limit } => Some(*limit),
            ComplexityControl::Measure { limit } => *limit,
        }
    }
}

/// Cheap structural limits checked while the operation is bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationLimits {
    pub depth: Option<u16>,
    pub root_fields: Option<u16>,
    pub aliases: Option<u16>,
}
