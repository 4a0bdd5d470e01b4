//! Function specifications for LLM function calling

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Function specification sent to the model
///
/// Serializes to the catalog entry shape the chat-completions API expects:
/// `{name, description, parameters}` where `parameters` is a JSON schema
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name (must match a function the application can invoke)
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// JSON schema for the function's parameters
    pub parameters: Value,
}

impl FunctionSpec {
    /// Create a new function specification
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names listed in the schema's `required` array
    pub fn required(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Helper module to build JSON schemas for functions
pub mod schema {
    use serde_json::{Map, Value, json};

    /// Create a JSON schema for an object with properties
    ///
    /// # Example
    ///
    /// ```
    /// use sage_llm::functions::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "ticker": schema::string("Ticker symbol"),
    ///         "window": schema::integer("Window length"),
    ///     }),
    ///     vec!["ticker", "window"],
    /// );
    /// assert_eq!(schema["type"], "object");
    /// ```
    pub fn object(properties: Value, required: Vec<&str>) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Property schema of the given primitive type, with an optional description
    pub fn property(kind: &str, description: Option<&str>) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), Value::from(kind));
        if let Some(description) = description {
            property.insert("description".to_string(), Value::from(description));
        }
        Value::Object(property)
    }

    /// String property schema
    pub fn string(description: &str) -> Value {
        property("string", Some(description))
    }

    /// Integer property schema
    pub fn integer(description: &str) -> Value {
        property("integer", Some(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_spec_creation() {
        let parameters = schema::object(
            json!({
                "ticker": schema::string("Ticker symbol"),
            }),
            vec!["ticker"],
        );

        let spec = FunctionSpec::new("getStockPrice", "Latest price", parameters.clone());
        assert_eq!(spec.name, "getStockPrice");
        assert_eq!(spec.description, "Latest price");
        assert_eq!(spec.parameters, parameters);
        assert_eq!(spec.required(), vec!["ticker"]);
    }

    #[test]
    fn test_property_without_description() {
        assert_eq!(schema::property("integer", None), json!({"type": "integer"}));
        assert_eq!(
            schema::property("string", Some("symbol")),
            json!({"type": "string", "description": "symbol"})
        );
    }

    #[test]
    fn test_serialized_shape() {
        let spec = FunctionSpec::new(
            "calculateRSI",
            "Calculate the RSI for a given stock ticker.",
            schema::object(json!({"ticker": schema::property("string", None)}), vec!["ticker"]),
        );

        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "name": "calculateRSI",
                "description": "Calculate the RSI for a given stock ticker.",
                "parameters": {
                    "type": "object",
                    "properties": {"ticker": {"type": "string"}},
                    "required": ["ticker"]
                }
            })
        );
    }
}
