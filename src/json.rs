use anyhow::{Result, anyhow};
use serde_json::{Map, Value};

pub fn read_field_object<'a>(json: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    match &json[field] {
        Value::Null => return Err(anyhow!("field `{}` not found", field)),
        Value::Bool(_) => return Err(anyhow!("field is a boolean, where object expected")),
        Value::Number(_) => return Err(anyhow!("field is a number, where object expected")),
        Value::String(_) => return Err(anyhow!("field is a literal, where object expected")),
        Value::Array(_) => return Err(anyhow!("field is an array, where object expected")),
        Value::Object(obj) => Ok(obj),
    }
}

/**
 * Reads a number; a literal is accepted as long as it parses as a number.
 */
pub fn read_weight(json: &Value) -> Result<f64> {
    match &json {
        Value::Null => return Err(anyhow!("field not found")),
        Value::Bool(_) => return Err(anyhow!("field is a boolean, where number expected")),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("number {} cannot be represented", n)),
        Value::String(s) => Ok(s.trim().parse::<f64>()?),
        Value::Array(_) => return Err(anyhow!("field is a list, where number expected")),
        Value::Object(_) => return Err(anyhow!("field is an object, where number expected")),
    }
}
