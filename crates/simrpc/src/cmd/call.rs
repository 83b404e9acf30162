use crate::cmd::CallArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{json_to_value, print_result, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let call_args = parse_args(&args.args)?;

    let mut client = args.connect.connect()?;
    let result = client
        .session_mut()
        .call_with_id(args.call_id, &args.method, call_args)
        .map_err(|err| client_error("call failed", err))?;

    print_result(
        &args.method,
        &args.connect.endpoint.to_string(),
        &result,
        format,
    );
    Ok(SUCCESS)
}

fn parse_args(input: &str) -> CliResult<Vec<simrpc_wire::Value>> {
    let json: serde_json::Value = serde_json::from_str(input)
        .map_err(|err| CliError::new(USAGE, format!("--args is not valid JSON: {err}")))?;
    match json {
        serde_json::Value::Array(items) => Ok(items.iter().map(json_to_value).collect()),
        other => Err(CliError::new(
            USAGE,
            format!("--args must be a JSON array, got: {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use simrpc_wire::Value;

    use super::*;

    #[test]
    fn parse_args_accepts_mixed_array() {
        let args = parse_args(r#"[true, "", 3, 1.5, null]"#).unwrap();
        assert_eq!(
            args,
            vec![
                Value::Bool(true),
                Value::from(""),
                Value::Int(3),
                Value::F64(1.5),
                Value::Nil,
            ]
        );
    }

    #[test]
    fn parse_args_rejects_non_array() {
        let err = parse_args(r#"{"x": 1}"#).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn parse_args_rejects_invalid_json() {
        assert_eq!(parse_args("not json").unwrap_err().code, USAGE);
    }
}
