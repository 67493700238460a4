//! Subjects: typed references to domain entities.
//!
//! A [`SubjectKind`] names a kind of entity (an order, a customer, a cart)
//! and declares the arguments an instance of that kind carries. A
//! [`Subject`] implementation turns a raw trigger payload into a
//! [`SubjectInstance`] that downstream conditions and transformers consume.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AutomationError, Result};

/// Raw key-value data, as delivered by the host event system.
pub type Payload = serde_json::Map<String, Value>;

/// Semantic type of a subject argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    String,
    Integer,
    Number,
    Boolean,
    List,
    Object,
    /// RFC 3339 timestamp carried as a string.
    DateTime,
}

impl ArgumentType {
    /// Check whether a JSON value is an acceptable representation of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ArgumentType::String => value.is_string(),
            ArgumentType::Integer => value.is_i64() || value.is_u64(),
            ArgumentType::Number => value.is_number(),
            ArgumentType::Boolean => value.is_boolean(),
            ArgumentType::List => value.is_array(),
            ArgumentType::Object => value.is_object(),
            ArgumentType::DateTime => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        }
    }
}

impl std::fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArgumentType::String => "string",
            ArgumentType::Integer => "integer",
            ArgumentType::Number => "number",
            ArgumentType::Boolean => "boolean",
            ArgumentType::List => "list",
            ArgumentType::Object => "object",
            ArgumentType::DateTime => "datetime",
        };
        write!(f, "{}", name)
    }
}

/// One declared argument of a subject kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name (payload key).
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub ty: ArgumentType,
    /// Whether extraction fails when the argument is absent.
    #[serde(default)]
    pub required: bool,
}

/// Ordered mapping from argument name to semantic type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    arguments: Vec<ArgumentSpec>,
}

impl ArgumentSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required argument.
    pub fn required(self, name: impl Into<String>, ty: ArgumentType) -> Self {
        self.with_argument(name, ty, true)
    }

    /// Declare an optional argument.
    pub fn optional(self, name: impl Into<String>, ty: ArgumentType) -> Self {
        self.with_argument(name, ty, false)
    }

    fn with_argument(mut self, name: impl Into<String>, ty: ArgumentType, required: bool) -> Self {
        let name = name.into();
        // Redeclaring an argument replaces it in place.
        let spec = ArgumentSpec { name, ty, required };
        match self.arguments.iter().position(|a| a.name == spec.name) {
            Some(idx) => self.arguments[idx] = spec,
            None => self.arguments.push(spec),
        }
        self
    }

    /// Look up an argument by name.
    pub fn get(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Iterate arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.arguments.iter()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Extract the declared arguments from a raw payload.
    ///
    /// Keys not declared in the schema are dropped. `null` counts as absent.
    /// Fails with [`AutomationError::InvalidPayload`] when a required argument
    /// is missing or any present argument has the wrong type.
    pub fn extract(&self, subject: &str, payload: &Payload) -> Result<Payload> {
        let mut args = Payload::new();
        for spec in &self.arguments {
            match payload.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(AutomationError::invalid_payload(
                            subject,
                            format!("missing required argument '{}'", spec.name),
                        ));
                    }
                }
                Some(value) if spec.ty.accepts(value) => {
                    args.insert(spec.name.clone(), value.clone());
                }
                Some(value) => {
                    return Err(AutomationError::invalid_payload(
                        subject,
                        format!(
                            "argument '{}' expected {}, got {}",
                            spec.name,
                            spec.ty,
                            json_type_name(value)
                        ),
                    ));
                }
            }
        }
        Ok(args)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// A registered kind of subject: identifier plus argument schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectKind {
    id: String,
    name: String,
    schema: ArgumentSchema,
}

impl SubjectKind {
    /// Create a subject kind. The display name defaults to the identifier.
    pub fn new(id: impl Into<String>, schema: ArgumentSchema) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            schema,
        }
    }

    /// Set a human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }
}

/// A concrete subject value flowing through a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInstance {
    /// Identifier of the subject kind.
    pub kind: String,
    /// Typed arguments, keyed by schema argument name.
    pub args: Payload,
}

impl SubjectInstance {
    pub fn new(kind: impl Into<String>, args: Payload) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    /// Get an argument value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Get a string argument.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

/// A subject implementation: a kind plus the extraction from raw payloads.
///
/// Implementations are stateless and side-effect-free. The default
/// extraction validates the payload against the kind's schema; override
/// [`Subject::extract`] to derive arguments that are not verbatim payload keys.
pub trait Subject: Send + Sync {
    /// The kind this subject produces.
    fn kind(&self) -> &SubjectKind;

    /// Produce typed arguments from a raw trigger payload.
    fn extract(&self, payload: &Payload) -> Result<SubjectInstance> {
        let kind = self.kind();
        let args = kind.schema().extract(kind.id(), payload)?;
        Ok(SubjectInstance::new(kind.id(), args))
    }
}

/// A subject fully described by its schema.
#[derive(Debug, Clone)]
pub struct SchemaSubject {
    kind: SubjectKind,
}

impl SchemaSubject {
    pub fn new(kind: SubjectKind) -> Self {
        Self { kind }
    }
}

impl Subject for SchemaSubject {
    fn kind(&self) -> &SubjectKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    fn visitor_kind() -> SubjectKind {
        SubjectKind::new(
            "site.visitor",
            ArgumentSchema::new()
                .required("session_id", ArgumentType::String)
                .optional("account_id", ArgumentType::Integer),
        )
    }

    #[test]
    fn test_extract_keeps_declared_arguments() {
        let subject = SchemaSubject::new(visitor_kind());
        let instance = subject
            .extract(&payload(json!({
                "session_id": "abc",
                "account_id": 42,
                "ignored": true
            })))
            .unwrap();
        assert_eq!(instance.kind, "site.visitor");
        assert_eq!(instance.get_str("session_id"), Some("abc"));
        assert_eq!(instance.get_i64("account_id"), Some(42));
        assert!(instance.get("ignored").is_none());
    }

    #[test]
    fn test_extract_optional_absent() {
        let subject = SchemaSubject::new(visitor_kind());
        let instance = subject
            .extract(&payload(json!({"session_id": "abc", "account_id": null})))
            .unwrap();
        assert!(instance.get("account_id").is_none());
        assert_eq!(instance.args.len(), 1);
    }

    #[test]
    fn test_extract_missing_required() {
        let subject = SchemaSubject::new(visitor_kind());
        let err = subject.extract(&payload(json!({}))).unwrap_err();
        assert!(matches!(err, AutomationError::InvalidPayload { .. }));
        assert!(err.to_string().contains("missing required argument 'session_id'"));
    }

    #[test]
    fn test_extract_type_mismatch() {
        let subject = SchemaSubject::new(visitor_kind());
        let err = subject
            .extract(&payload(json!({"session_id": "abc", "account_id": "42"})))
            .unwrap_err();
        assert!(err.to_string().contains("expected integer, got string"));
    }

    #[test]
    fn test_argument_type_accepts() {
        assert!(ArgumentType::Integer.accepts(&json!(3)));
        assert!(!ArgumentType::Integer.accepts(&json!(3.5)));
        assert!(ArgumentType::Number.accepts(&json!(3.5)));
        assert!(ArgumentType::List.accepts(&json!([1, 2])));
        assert!(ArgumentType::DateTime.accepts(&json!("2024-05-01T10:00:00Z")));
        assert!(!ArgumentType::DateTime.accepts(&json!("yesterday")));
    }

    #[test]
    fn test_schema_redeclare_replaces() {
        let schema = ArgumentSchema::new()
            .optional("id", ArgumentType::String)
            .required("id", ArgumentType::Integer);
        assert_eq!(schema.len(), 1);
        let spec = schema.get("id").unwrap();
        assert_eq!(spec.ty, ArgumentType::Integer);
        assert!(spec.required);
    }

    #[test]
    fn test_schema_serializes_type_field() {
        let schema = ArgumentSchema::new().required("total", ArgumentType::Number);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["arguments"][0]["type"], json!("number"));
    }
}
