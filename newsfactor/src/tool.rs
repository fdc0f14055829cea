//! Tool trait and the toolbox used for function calling.
//!
//! `ToolDefinition` serializes to the chat completion function format
//! `{"type": "function", "function": {...}}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::ToolError;

/// A type alias for `Result<T, ToolError>`.
pub type ToolResult<T> = Result<T, ToolError>;

/// Definition of a tool for LLM function calling.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool, in snake_case.
    pub name: String,

    /// Description that helps the model decide when to call the tool.
    pub description: String,

    /// JSON schema for the tool's parameters.
    pub parameters: Value,

}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

impl Serialize for ToolDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut function = serde_json::Map::new();
        function.insert("name".to_owned(), Value::String(self.name.clone()));
        function.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        function.insert("parameters".to_owned(), self.parameters.clone());

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "function")?;
        map.serialize_entry("function", &function)?;
        map.end()
    }
}

/// A capability the model can invoke through function calling.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: for<'de> Deserialize<'de> + Send;

    /// Output type of the tool.
    type Output: Serialize + Send;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with typed arguments.
    async fn call(&self, args: Self::Args) -> ToolResult<Self::Output>;

    /// Get the tool definition for function calling.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }

    /// Call the tool with JSON arguments and return JSON output.
    ///
    /// Models send arguments as a JSON-encoded string; plain objects are
    /// accepted as well.
    async fn call_json(&self, args: Value) -> ToolResult<Value>
    where
        Self::Output: 'static,
    {
        let typed_args: Self::Args = match &args {
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| ToolError::invalid_args(e.to_string()))?
            }
            _ => serde_json::from_value(args).map_err(|e| ToolError::invalid_args(e.to_string()))?,
        };

        let result = self.call(typed_args).await?;
        serde_json::to_value(result).map_err(|e| ToolError::execution(e.to_string()))
    }
}

/// A boxed dynamic tool that can be stored in a [`ToolBox`].
pub type BoxedTool = Box<dyn DynTool>;

/// Object-safe version of [`Tool`] for dynamic dispatch.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Get the name of the tool.
    fn name(&self) -> &str;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Call the tool with JSON arguments.
    async fn call_json(&self, args: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<T: Tool + 'static> DynTool for T
where
    T::Output: 'static,
{
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, args: Value) -> ToolResult<Value> {
        Tool::call_json(self, args).await
    }
}

/// A named collection of tools.
#[derive(Default)]
pub struct ToolBox {
    tools: HashMap<String, BoxedTool>,
}

impl ToolBox {
    /// Create a new empty toolbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool to the toolbox, replacing any tool with the same name.
    pub fn add<T: Tool + 'static>(&mut self, tool: T)
    where
        T::Output: 'static,
    {
        self.tools.insert(tool.name().to_owned(), Box::new(tool));
    }

    /// Definitions of every tool, sorted by name so requests are stable.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Call a tool by name with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for unknown names, or whatever the
    /// tool itself reports.
    pub async fn call(&self, name: &str, args: Value) -> ToolResult<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_owned()))?;
        tool.call_json(args).await
    }
}

impl fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolBox").field("tools", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    #[derive(Deserialize)]
    struct ShoutArgs {
        text: String,
    }

    #[async_trait]
    impl Tool for Shout {
        const NAME: &'static str = "shout";
        type Args = ShoutArgs;
        type Output = String;

        fn description(&self) -> String {
            "Upper-case the given text".to_owned()
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }

        async fn call(&self, args: Self::Args) -> ToolResult<Self::Output> {
            if args.text.is_empty() {
                return Err(ToolError::execution("nothing to shout"));
            }
            Ok(args.text.to_uppercase())
        }
    }

    #[test]
    fn definition_serializes_to_function_format() {
        let json = serde_json::to_value(Tool::definition(&Shout)).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "shout");
        assert!(json["function"]["parameters"]["properties"]["text"].is_object());
        assert!(json["function"].get("strict").is_none());
    }

    #[tokio::test]
    async fn toolbox_calls_with_string_or_object_args() {
        let mut toolbox = ToolBox::new();
        toolbox.add(Shout);
        assert_eq!(toolbox.definitions().len(), 1);

        let out = toolbox
            .call("shout", Value::String(r#"{"text":"hi"}"#.to_owned()))
            .await
            .unwrap();
        assert_eq!(out, Value::from("HI"));

        let out = toolbox
            .call("shout", serde_json::json!({"text": "ok"}))
            .await
            .unwrap();
        assert_eq!(out, Value::from("OK"));
    }

    #[tokio::test]
    async fn toolbox_reports_errors() {
        let mut toolbox = ToolBox::new();
        toolbox.add(Shout);

        let err = toolbox.call("whisper", Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));

        let err = toolbox
            .call("shout", serde_json::json!({"wrong": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = toolbox
            .call("shout", serde_json::json!({"text": ""}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
    }
}
