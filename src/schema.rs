//! Schema derivation from a reference shape.
//!
//! The caller describes the expected document once — field names, types,
//! required-ness — and the middleware turns that description into a
//! compiled JSON Schema at construction time. Derivation happens exactly
//! once per middleware instance, never per request, and is independent of
//! any request content.

use jsonschema::Validator;
use serde_json::{Map, Value, json};
use tracing::error;

/// An exemplar description of the expected request document.
///
/// Fields are registered in order; [`field`](ReferenceShape::field) marks a
/// field required, [`optional`](ReferenceShape::optional) does not.
///
/// ```rust
/// use torii::{FieldKind, ReferenceShape};
///
/// let user = ReferenceShape::new()
///     .field("name", FieldKind::String)
///     .field("age", FieldKind::Integer)
///     .optional("tags", FieldKind::Array(Box::new(FieldKind::String)))
///     .optional(
///         "address",
///         FieldKind::Object(
///             ReferenceShape::new()
///                 .field("street", FieldKind::String)
///                 .optional("zip", FieldKind::String),
///         ),
///     );
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReferenceShape {
    fields: Vec<Field>,
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    kind: FieldKind,
    required: bool,
}

/// The type of a single field in a [`ReferenceShape`].
#[derive(Clone, Debug)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldKind>),
    Object(ReferenceShape),
}

impl ReferenceShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required field.
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.push(name.into(), kind, true)
    }

    /// Adds an optional field.
    pub fn optional(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.push(name.into(), kind, false)
    }

    fn push(mut self, name: String, kind: FieldKind, required: bool) -> Self {
        self.fields.push(Field { name, kind, required });
        self
    }

    /// Renders the shape as a JSON Schema document.
    ///
    /// With `allow_additional_fields` set to `false` the schema rejects
    /// fields not named in the shape; the toggle applies to nested object
    /// shapes too.
    pub(crate) fn to_schema(&self, allow_additional_fields: bool) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.name.clone(), field.kind.to_schema(allow_additional_fields));
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": allow_additional_fields,
        })
    }
}

impl FieldKind {
    fn to_schema(&self, allow_additional_fields: bool) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Number => json!({"type": "number"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Array(items) => json!({
                "type": "array",
                "items": items.to_schema(allow_additional_fields),
            }),
            Self::Object(shape) => shape.to_schema(allow_additional_fields),
        }
    }
}

/// Compiles the shape into a reusable validator.
///
/// A compile failure is an internal fault, not a user error: it is logged
/// and the middleware degrades to "no schema", which disables validation
/// rather than blocking the request path.
pub(crate) fn derive_schema(
    shape: &ReferenceShape,
    allow_additional_fields: bool,
) -> Option<Validator> {
    let document = shape.to_schema(allow_additional_fields);
    match jsonschema::validator_for(&document) {
        Ok(validator) => Some(validator),
        Err(e) => {
            error!(schema = %document, "could not compile body schema: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_an_object_schema_with_required_fields() {
        let shape = ReferenceShape::new()
            .field("name", FieldKind::String)
            .optional("age", FieldKind::Integer);

        assert_eq!(
            shape.to_schema(true),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "age": {"type": "integer"},
                },
                "required": ["name"],
                "additionalProperties": true,
            })
        );
    }

    #[test]
    fn additional_fields_toggle_propagates_to_nested_shapes() {
        let shape = ReferenceShape::new().field(
            "address",
            FieldKind::Object(ReferenceShape::new().field("street", FieldKind::String)),
        );

        let schema = shape.to_schema(false);
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(
            schema["properties"]["address"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn array_fields_carry_an_item_schema() {
        let shape = ReferenceShape::new()
            .field("tags", FieldKind::Array(Box::new(FieldKind::String)));

        let schema = shape.to_schema(true);
        assert_eq!(
            schema["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn derived_schema_compiles_and_matches() {
        let shape = ReferenceShape::new().field("name", FieldKind::String);
        let validator = derive_schema(&shape, true).unwrap();

        assert!(validator.is_valid(&json!({"name": "value"})));
        assert!(!validator.is_valid(&json!({})));
        assert!(!validator.is_valid(&json!({"name": 7})));
    }
}
