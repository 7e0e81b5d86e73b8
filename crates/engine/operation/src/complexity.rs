use async_graphql_value::{ConstValue, Name, Variables};
use indexmap::IndexMap;

use crate::{BoundField, BoundOperation, ComplexityError};

/// The computed complexity of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityCost {
    pub cost: u64,
}

impl ComplexityCost {
    pub fn enforce(self, limit: u64) -> Result<ComplexityCost, ComplexityError> {
        if self.cost > limit {
            Err(ComplexityError::ExceedsLimit {
                cost: self.cost,
                limit,
            })
        } else {
            Ok(self)
        }
    }
}

/// Compute the operation's complexity before any resolver runs.
///
/// A field's effective cost is its declared base cost (1 when unannotated)
/// multiplied by each resolved multiplier argument; costs accumulate
/// additively down the tree. Pure function of its inputs.
pub fn compute_complexity(operation: &BoundOperation, variables: &Variables, use_multipliers: bool) -> ComplexityCost {
    ComplexityCost {
        cost: selection_set_cost(&operation.selection_set, variables, use_multipliers),
    }
}

fn selection_set_cost(selection_set: &[BoundField], variables: &Variables, use_multipliers: bool) -> u64 {
    selection_set
        .iter()
        .fold(0u64, |total, field| {
            total.saturating_add(field_cost(field, variables, use_multipliers))
        })
}

fn field_cost(field: &BoundField, variables: &Variables, use_multipliers: bool) -> u64 {
    let mut effective = field.definition.cost.as_ref().map_or(1, |cost| cost.complexity);

    if use_multipliers {
        if let Some(cost) = &field.definition.cost {
            if !cost.multipliers.is_empty() {
                let arguments = field.resolve_arguments(variables).unwrap_or_else(|err| {
                    tracing::debug!(
                        field = field.name.as_str(),
                        "could not resolve arguments for cost analysis: {err}"
                    );
                    IndexMap::new()
                });
                for path in &cost.multipliers {
                    effective = effective.saturating_mul(resolve_multiplier(field, &arguments, path));
                }
            }
        }
    }

    effective.saturating_add(selection_set_cost(&field.selection_set, variables, use_multipliers))
}

/// Resolve one multiplier path against the field's argument map.
///
/// Dotted segments descend into input object arguments. An absent segment or
/// a non-numeric leaf resolves to 1 instead of failing the analysis.
fn resolve_multiplier(field: &BoundField, arguments: &IndexMap<Name, ConstValue>, path: &str) -> u64 {
    let mut segments = path.split('.');
    let Some(argument_name) = segments.next() else {
        return 1;
    };

    let mut value = match arguments.get(argument_name) {
        Some(value) => value,
        None => {
            tracing::debug!(
                field = field.name.as_str(),
                path,
                "multiplier argument is absent, defaulting to 1"
            );
            return 1;
        }
    };

    for segment in segments {
        value = match value {
            ConstValue::Object(fields) => match fields.get(segment) {
                Some(value) => value,
                None => {
                    tracing::debug!(
                        field = field.name.as_str(),
                        path,
                        "multiplier path segment is absent, defaulting to 1"
                    );
                    return 1;
                }
            },
            _ => return 1,
        };
    }

    match value {
        ConstValue::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|float| *float >= 0.0).map(|float| float as u64))
            .unwrap_or(1),
        _ => {
            tracing::debug!(
                field = field.name.as_str(),
                path,
                "multiplier did not resolve to a number, defaulting to 1"
            );
            1
        }
    }
}
