//! Argument extraction helpers shared by the household tools.

use homehub_core::error::ToolError;
use homehub_core::tool::Arguments;
use serde_json::Value;

/// A required, non-blank string argument.
pub fn required_str<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(Value::String(_)) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must not be empty"
        ))),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must be a string, got {other}"
        ))),
        None => Err(ToolError::InvalidArguments(format!(
            "Missing '{name}' argument"
        ))),
    }
}

/// An optional string argument; absent or null reads as empty.
pub fn optional_str<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must be a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Arguments {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn required_str_trims() {
        let a = args(json!({"task_name": "  dishes "}));
        assert_eq!(required_str(&a, "task_name").unwrap(), "dishes");
    }

    #[test]
    fn required_str_rejects_missing_blank_and_wrong_type() {
        let a = args(json!({"blank": "   ", "num": 3}));
        assert!(required_str(&a, "missing").is_err());
        assert!(required_str(&a, "blank").is_err());
        assert!(required_str(&a, "num").is_err());
    }

    #[test]
    fn optional_str_defaults_to_empty() {
        let a = args(json!({"notes": null}));
        assert_eq!(optional_str(&a, "notes").unwrap(), "");
        assert_eq!(optional_str(&a, "other").unwrap(), "");
    }
}
