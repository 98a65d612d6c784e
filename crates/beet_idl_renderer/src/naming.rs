//! Identifier conventions for the emitted TypeScript.

use heck::ToLowerCamelCase;
use heck::ToSnakeCase;
use heck::ToUpperCamelCase;

/// Exported type or class name, e.g. `ConfigData`.
pub fn type_name(name: &str) -> String {
	name.to_upper_camel_case()
}

/// Variable, property and file name for instructions, e.g. `initConfig`.
pub fn var_name(name: &str) -> String {
	name.to_lower_camel_case()
}

/// Name of the codec value exported next to a defined type, e.g.
/// `configDataBeet`.
pub fn codec_var_name(name: &str) -> String {
	format!("{}Beet", var_name(name))
}

pub fn snake_name(name: &str) -> String {
	name.to_snake_case()
}

/// Quote `value` as a single-quoted TypeScript string literal.
pub fn quote(value: &str) -> String {
	let mut quoted = String::with_capacity(value.len() + 2);
	quoted.push('\'');
	for ch in value.chars() {
		match ch {
			'\'' => quoted.push_str("\\'"),
			'\\' => quoted.push_str("\\\\"),
			'\n' => quoted.push_str("\\n"),
			'\r' => quoted.push_str("\\r"),
			_ => quoted.push(ch),
		}
	}
	quoted.push('\'');
	quoted
}
