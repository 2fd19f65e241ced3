//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining provider, resource
//! and data source schemas, including attribute types, validation hooks,
//! plan modifiers and defaults.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    pub fn list_of(element: AttributeType) -> Self {
        AttributeType::List(Box::new(element))
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, AttributeType)>,
        S: Into<String>,
    {
        AttributeType::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// cty JSON type encoding expected in `Schema.Attribute.type`
    pub fn type_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};

        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(elem) => json!(["list", elem.type_json()]),
            AttributeType::Set(elem) => json!(["set", elem.type_json()]),
            AttributeType::Map(elem) => json!(["map", elem.type_json()]),
            AttributeType::Object(fields) => {
                let fields: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.type_json()))
                    .collect();
                json!(["object", fields])
            }
        }
    }

    /// Shapes `value` to this type: objects get exactly their declared
    /// attributes, with missing ones set to null.
    pub fn conform(&self, value: Dynamic) -> Dynamic {
        match (self, value) {
            (_, Dynamic::Null) => Dynamic::Null,
            (_, Dynamic::Unknown) => Dynamic::Unknown,
            (AttributeType::List(elem), Dynamic::List(items))
            | (AttributeType::Set(elem), Dynamic::List(items)) => {
                Dynamic::List(items.into_iter().map(|v| elem.conform(v)).collect())
            }
            (AttributeType::Map(elem), Dynamic::Map(map)) => Dynamic::Map(
                map.into_iter()
                    .map(|(k, v)| (k, elem.conform(v)))
                    .collect(),
            ),
            (AttributeType::Object(fields), Dynamic::Map(mut map)) => Dynamic::Map(
                fields
                    .iter()
                    .map(|(name, ty)| {
                        let value = map.remove(name).unwrap_or(Dynamic::Null);
                        (name.clone(), ty.conform(value))
                    })
                    .collect(),
            ),
            (_, value) => value,
        }
    }

    /// Returns true if `value` is acceptable for this type.
    /// Null and unknown are accepted everywhere.
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items))
            | (AttributeType::Set(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(map)) => {
                map.values().all(|item| elem.accepts(item))
            }
            (AttributeType::Object(fields), Dynamic::Map(map)) => map
                .iter()
                .all(|(k, v)| fields.get(k).is_some_and(|ty| ty.accepts(v))),
            _ => false,
        }
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|attr| attr.name == name)
    }

    /// Object type formed by all root attributes
    pub fn object_type(&self) -> AttributeType {
        AttributeType::Object(
            self.block
                .attributes
                .iter()
                .map(|attr| (attr.name.clone(), attr.r#type.clone()))
                .collect(),
        )
    }

    /// Fills every attribute missing from `value` with null and drops the
    /// ones the schema does not declare. A null object stays null.
    pub fn conform(&self, value: DynamicValue) -> DynamicValue {
        DynamicValue::new(self.object_type().conform(value.value))
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
    pub default: Option<Arc<dyn Default>>,
    pub deprecated: bool,
}

// Validators, modifiers and defaults are trait objects without Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &self
                    .validators
                    .iter()
                    .map(|v| v.description())
                    .collect::<Vec<_>>(),
            )
            .field(
                "plan_modifiers",
                &self
                    .plan_modifiers
                    .iter()
                    .map(|m| m.description())
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.default.as_ref().map(|d| d.description()))
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

/// StringKind represents the format of description strings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator checks a known attribute value during validation
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: DynamicValue,
    pub state_value: DynamicValue,
    pub plan_value: DynamicValue,
    pub path: AttributePath,
    /// True when the resource has no prior state
    pub is_create: bool,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Default provides default values for optional+computed attributes
/// Called when the attribute is null in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Request for default values
pub struct DefaultRequest {
    pub path: AttributePath,
}

/// Response with default value
pub struct DefaultResponse {
    pub value: DynamicValue,
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
                deprecated: false,
            },
        }
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    /// Add validator
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    /// Add plan modifier
    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.attribute.plan_modifiers.push(Arc::new(modifier));
        self
    }

    /// Set default. Terraform only accepts defaults on computed attributes,
    /// so this also marks the attribute optional and computed.
    pub fn default(mut self, default: impl Default + 'static) -> Self {
        self.attribute.default = Some(Arc::new(default));
        self.attribute.optional = true;
        self.attribute.required = false;
        self.attribute.computed = true;
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    version: 0,
                    attributes: Vec::new(),
                    description: String::new(),
                    description_kind: StringKind::Plain,
                    deprecated: false,
                },
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    /// Add attribute
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    /// Set description kind
    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::StaticDefault;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("mac", AttributeType::String)
            .description("Host MAC address")
            .required()
            .build();

        assert_eq!(attr.name, "mac");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "Host MAC address");
    }

    #[test]
    fn default_makes_attribute_optional_computed() {
        let attr = AttributeBuilder::new("enabled", AttributeType::Bool)
            .default(StaticDefault::bool(true))
            .build();

        assert!(attr.optional);
        assert!(attr.computed);
        assert!(!attr.required);

        // Clone keeps the shared default
        let cloned = attr.clone();
        assert!(cloned.default.is_some());
    }

    #[test]
    fn type_json_matches_cty_encoding() {
        assert_eq!(AttributeType::String.type_json().to_string(), "\"string\"");
        assert_eq!(
            AttributeType::list_of(AttributeType::String)
                .type_json()
                .to_string(),
            "[\"list\",\"string\"]"
        );

        let object = AttributeType::object([
            ("ip", AttributeType::String),
            ("port", AttributeType::Number),
        ]);
        assert_eq!(
            object.type_json().to_string(),
            "[\"object\",{\"ip\":\"string\",\"port\":\"number\"}]"
        );
    }

    #[test]
    fn schema_conform_fills_missing_and_drops_unknown_attributes() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("comment", AttributeType::String)
                    .optional()
                    .build(),
            )
            .build();

        let mut value = DynamicValue::object();
        value
            .set_string(&AttributePath::new("id"), "dhcp_config".to_string())
            .unwrap();
        value
            .set_string(&AttributePath::new("legacy"), "x".to_string())
            .unwrap();

        let conformed = schema.conform(value);
        let map = conformed.get_map(&AttributePath::root()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["comment"], Dynamic::Null);
        assert_eq!(map["id"], Dynamic::String("dhcp_config".to_string()));

        assert!(schema.conform(DynamicValue::null()).is_null());
    }

    #[test]
    fn conform_reaches_into_lists_of_objects() {
        let lease = AttributeType::object([
            ("mac", AttributeType::String),
            ("hostname", AttributeType::String),
        ]);
        let list = AttributeType::list_of(lease);

        let item = Dynamic::Map(HashMap::from([(
            "mac".to_string(),
            Dynamic::String("aa:bb:cc:dd:ee:ff".to_string()),
        )]));

        let Dynamic::List(items) = list.conform(Dynamic::List(vec![item])) else {
            panic!("expected list");
        };
        let Dynamic::Map(fields) = &items[0] else {
            panic!("expected object");
        };
        assert_eq!(fields["hostname"], Dynamic::Null);
    }

    #[test]
    fn accepts_checks_nested_types() {
        let ty = AttributeType::list_of(AttributeType::String);
        assert!(ty.accepts(&Dynamic::List(vec![Dynamic::String("1.1.1.1".into())])));
        assert!(ty.accepts(&Dynamic::List(vec![Dynamic::Unknown])));
        assert!(!ty.accepts(&Dynamic::List(vec![Dynamic::Bool(true)])));
        assert!(!ty.accepts(&Dynamic::String("1.1.1.1".into())));
    }
}
