use async_graphql_parser::{
    types::{BaseType, Type},
    Pos,
};
use async_graphql_value::{ConstValue, Name, Variables};
use schema::{EnumDefinition, InputObjectDefinition, ScalarDefinition, ScalarType, Schema, TypeDefinition};

use crate::{
    error::{ValuePath, VariableError},
    SelectedOperation,
};

/// Bind the caller-supplied raw values against the operation's variable
/// definitions.
///
/// All failures are collected and reported together; execution never starts
/// with a partially coerced variable map. Pure function of its inputs.
pub fn coerce_variables(
    schema: &Schema,
    operation: &SelectedOperation,
    variables: &Variables,
) -> Result<Variables, Vec<VariableError>> {
    let mut coerced = Variables::default();
    let mut errors = Vec::new();

    for definition in &operation.definition.node.variable_definitions {
        let name = definition.node.name.node.clone();
        let ty = &definition.node.var_type.node;

        let mut ctx = CoercionContext {
            schema,
            variable: name.as_str(),
            location: definition.pos,
            value_path: ValuePath::default(),
        };

        let value = match variables.get(&name) {
            Some(value) => value.clone(),
            None => match &definition.node.default_value {
                Some(default) => default.node.clone(),
                None if !ty.nullable => {
                    errors.push(VariableError::Missing {
                        name: name.to_string(),
                        location: definition.pos,
                    });
                    continue;
                }
                None => ConstValue::Null,
            },
        };

        match ctx.coerce_input_value(ty, value) {
            Ok(value) => {
                coerced.insert(name, value);
            }
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

struct CoercionContext<'a> {
    schema: &'a Schema,
    variable: &'a str,
    location: Pos,
    value_path: ValuePath,
}

impl CoercionContext<'_> {
    fn coerce_input_value(&mut self, ty: &Type, value: ConstValue) -> Result<ConstValue, VariableError> {
        if let ConstValue::Null = value {
            if !ty.nullable {
                return Err(VariableError::UnexpectedNull {
                    name: self.variable.to_string(),
                    expected: ty.to_string(),
                    path: self.value_path.clone(),
                    location: self.location,
                });
            }
            return Ok(ConstValue::Null);
        }

        match &ty.base {
            BaseType::List(inner) => match value {
                ConstValue::List(items) => {
                    let mut coerced = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        self.value_path.push(index);
                        coerced.push(self.coerce_input_value(inner, item)?);
                        self.value_path.pop();
                    }
                    Ok(ConstValue::List(coerced))
                }
                // A single value provided for a list type is treated as a
                // one-element list, at every nesting level.
                value => {
                    let coerced = self.coerce_input_value(inner, value)?;
                    Ok(ConstValue::List(vec![coerced]))
                }
            },
            BaseType::Named(name) => self.coerce_named_type(name, value),
        }
    }

    fn coerce_named_type(&mut self, name: &Name, value: ConstValue) -> Result<ConstValue, VariableError> {
        match self.schema.type_by_name(name.as_str()) {
            Some(TypeDefinition::Scalar(scalar)) => self.coerce_scalar(scalar, value),
            Some(TypeDefinition::Enum(r#enum)) => self.coerce_enum(r#enum, value),
            Some(TypeDefinition::InputObject(input_object)) => self.coerce_input_object(input_object, value),
            Some(TypeDefinition::Object(_)) => Err(VariableError::InvalidVariableType {
                name: self.variable.to_string(),
                ty: name.to_string(),
                location: self.location,
            }),
            None => Err(VariableError::UnknownType {
                name: self.variable.to_string(),
                ty: name.to_string(),
                location: self.location,
            }),
        }
    }

    fn coerce_scalar(&mut self, scalar: &ScalarDefinition, value: ConstValue) -> Result<ConstValue, VariableError> {
        match (scalar.ty, value) {
            // Custom scalars pass through by contract.
            (ScalarType::Unknown, value) => Ok(value),
            (ScalarType::Int, ConstValue::Number(number)) => {
                let as_int = match number.as_i64() {
                    Some(value) => i32::try_from(value).ok(),
                    None => number.as_f64().filter(|float| can_coerce_to_int(*float)).map(|f| f as i32),
                };
                match as_int {
                    Some(value) => Ok(ConstValue::Number(value.into())),
                    None => Err(VariableError::IncorrectScalarValue {
                        name: self.variable.to_string(),
                        actual: number.to_string(),
                        expected: scalar.name.clone(),
                        path: self.value_path.clone(),
                        location: self.location,
                    }),
                }
            }
            (ScalarType::Float, ConstValue::Number(number)) => match number.as_f64() {
                Some(value) => Ok(ConstValue::from(value)),
                None => Err(VariableError::IncorrectScalarValue {
                    name: self.variable.to_string(),
                    actual: number.to_string(),
                    expected: scalar.name.clone(),
                    path: self.value_path.clone(),
                    location: self.location,
                }),
            },
            (ScalarType::String, value @ ConstValue::String(_)) => Ok(value),
            (ScalarType::Boolean, value @ ConstValue::Boolean(_)) => Ok(value),
            (_, actual) => Err(VariableError::IncorrectScalarType {
                name: self.variable.to_string(),
                actual: const_value_kind(&actual),
                expected: scalar.name.clone(),
                path: self.value_path.clone(),
                location: self.location,
            }),
        }
    }

    fn coerce_enum(&mut self, r#enum: &EnumDefinition, value: ConstValue) -> Result<ConstValue, VariableError> {
        let name = match &value {
            ConstValue::String(value) => value.as_str(),
            ConstValue::Enum(value) => value.as_str(),
            actual => {
                return Err(VariableError::IncorrectEnumValueType {
                    name: self.variable.to_string(),
                    enum_name: r#enum.name.clone(),
                    actual: const_value_kind(actual),
                    path: self.value_path.clone(),
                    location: self.location,
                });
            }
        };

        if !r#enum.contains(name) {
            return Err(VariableError::UnknownEnumValue {
                name: self.variable.to_string(),
                enum_name: r#enum.name.clone(),
                value: name.to_string(),
                path: self.value_path.clone(),
                location: self.location,
            });
        }

        Ok(ConstValue::Enum(Name::new(name)))
    }

    fn coerce_input_object(
        &mut self,
        input_object: &InputObjectDefinition,
        value: ConstValue,
    ) -> Result<ConstValue, VariableError> {
        let ConstValue::Object(mut fields) = value else {
            return Err(VariableError::MissingObject {
                name: self.variable.to_string(),
                expected: input_object.name.clone(),
                actual: const_value_kind(&value),
                path: self.value_path.clone(),
                location: self.location,
            });
        };

        let mut coerced = indexmap::IndexMap::new();
        for (field_name, input_field) in &input_object.input_fields {
            let declared_ty = parse_declared_type(input_field.ty.as_str());
            match fields.shift_remove(field_name.as_str()) {
                Some(value) => {
                    self.value_path.push(field_name.as_str());
                    let value = self.coerce_input_value(&declared_ty, value)?;
                    coerced.insert(Name::new(field_name), value);
                    self.value_path.pop();
                }
                None => {
                    if let Some(default) = &input_field.default_value {
                        coerced.insert(Name::new(field_name), default.clone());
                    } else if input_field.ty.is_non_null() {
                        self.value_path.push(field_name.as_str());
                        return Err(VariableError::UnexpectedNull {
                            name: self.variable.to_string(),
                            expected: input_field.ty.to_string(),
                            path: self.value_path.clone(),
                            location: self.location,
                        });
                    }
                }
            }
        }

        if let Some(field) = fields.keys().next() {
            return Err(VariableError::UnknownInputField {
                name: self.variable.to_string(),
                input_object: input_object.name.clone(),
                field: field.to_string(),
                path: self.value_path.clone(),
                location: self.location,
            });
        }

        Ok(ConstValue::Object(coerced))
    }
}

/// Schema-side type references are wrapping strings; turn one back into the
/// parser's structured type to share the coercion code path.
fn parse_declared_type(ty: &str) -> Type {
    let (base, nullable) = match ty.strip_suffix('!') {
        Some(inner) => (inner, false),
        None => (ty, true),
    };
    let base = match base.strip_prefix('[').and_then(|inner| inner.strip_suffix(']')) {
        Some(inner) => BaseType::List(Box::new(parse_declared_type(inner))),
        None => BaseType::Named(Name::new(base)),
    };
    Type { base, nullable }
}

fn can_coerce_to_int(float: f64) -> bool {
    float.floor() == float && float < (i32::MAX as f64)
}

fn const_value_kind(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::Null => "null",
        ConstValue::Number(_) => "number",
        ConstValue::String(_) => "string",
        ConstValue::Boolean(_) => "boolean",
        ConstValue::Binary(_) => "binary",
        ConstValue::Enum(_) => "enum",
        ConstValue::List(_) => "list",
        ConstValue::Object(_) => "object",
    }
}
