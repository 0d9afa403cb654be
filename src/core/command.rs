//! Parser for console command lines (`method arg…`)

use serde_json::Value;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub method: String,
    pub params: Vec<Value>,
}

/// Parse a console line into an RPC method and its typed parameters.
///
/// Arguments are split on whitespace outside of quotes and brackets. Each one
/// becomes an integer, a boolean, a decimal, a JSON literal (quoted string,
/// array, object, `null`), or otherwise a plain string. Blank input yields
/// `None`.
pub fn parse_command(input: &str) -> Option<Command> {
    let mut tokens = tokenize(input.trim()).into_iter();
    let method = tokens.next()?;
    Some(Command {
        method,
        params: tokens.map(|token| parse_param(&token)).collect(),
    })
}

fn parse_param(token: &str) -> Value {
    if let Ok(n) = token.parse::<i64>() {
        return Value::from(n);
    }
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = token.parse::<f64>() {
        if n.is_finite() {
            return Value::from(n);
        }
    }
    if token == "null" || token.starts_with(['"', '[', '{']) {
        if let Ok(value) = serde_json::from_str(token) {
            return value;
        }
    }
    Value::String(token.to_string())
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            current.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_method_only() {
        let cmd = parse_command("getblockcount").unwrap();
        assert_eq!(cmd.method, "getblockcount");
        assert!(cmd.params.is_empty());
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_parse_typed_params() {
        let cmd = parse_command("getblockhash 100").unwrap();
        assert_eq!(cmd.params, vec![json!(100)]);

        let cmd = parse_command("setnetworkactive false").unwrap();
        assert_eq!(cmd.params, vec![json!(false)]);

        let cmd = parse_command("settxfee 1.5").unwrap();
        assert_eq!(cmd.params, vec![json!(1.5)]);
    }

    #[test]
    fn test_parse_strings_and_json() {
        let cmd = parse_command("getblock 00000000deadbeef 2").unwrap();
        assert_eq!(cmd.params, vec![json!("00000000deadbeef"), json!(2)]);

        let cmd = parse_command(r#"echo "two words" [1, 2] {"a": true} null"#).unwrap();
        assert_eq!(
            cmd.params,
            vec![json!("two words"), json!([1, 2]), json!({"a": true}), Value::Null]
        );
    }

    #[test]
    fn test_unbalanced_json_falls_back_to_string() {
        let cmd = parse_command("echo [1,").unwrap();
        assert_eq!(cmd.params, vec![json!("[1,")]);
    }
}
