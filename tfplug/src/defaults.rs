//! Default value providers for attributes
//!
//! Defaults are evaluated during planning when an optional+computed
//! attribute is null in configuration.
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::StaticDefault;
//!
//! let src_ip = AttributeBuilder::new("src_ip", AttributeType::String)
//!     .default(StaticDefault::string("0.0.0.0"))
//!     .build();
//! ```

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn string(value: &str) -> Self {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Self {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::create(Dynamic::Bool(value))
    }

    pub fn string_list(values: &[&str]) -> Self {
        Self::create(Dynamic::List(
            values.iter().map(|v| Dynamic::from(*v)).collect(),
        ))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}
