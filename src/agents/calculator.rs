use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;
use crate::{AiError, Result};

/// Basic arithmetic on two operands
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    fn error(message: impl Into<String>) -> AiError {
        AiError::ToolExecutionError {
            tool_name: "calculator".to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic arithmetic operations. Useful for answering math questions."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The arithmetic operation to perform"
                },
                "a": { "type": "number", "description": "The first operand" },
                "b": { "type": "number", "description": "The second operand" }
            },
            "required": ["operation", "a", "b"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String> {
        let args: Value = serde_json::from_str(arguments)
            .map_err(|e| Self::error(format!("invalid arguments: {}", e)))?;

        let operation = args["operation"]
            .as_str()
            .ok_or_else(|| Self::error("missing operation"))?;
        let a = args["a"]
            .as_f64()
            .ok_or_else(|| Self::error("missing or invalid 'a'"))?;
        let b = args["b"]
            .as_f64()
            .ok_or_else(|| Self::error("missing or invalid 'b'"))?;

        let result = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" if b == 0.0 => return Err(Self::error("division by zero")),
            "divide" => a / b,
            other => return Err(Self::error(format!("unknown operation: {}", other))),
        };

        Ok(result.to_string())
    }
}
