//! The program's custom errors as `Error` subclasses with code and name
//! lookups.

use std::fmt::Write as _;

use crate::descriptor::ErrorDescriptor;
use crate::naming::quote;
use crate::naming::type_name;
use crate::render::HEADER;
use crate::render::doc_comment;

/// Render `errors/index.ts`. Returns `None` when the program declares no
/// errors.
pub fn render_errors(errors: &[ErrorDescriptor]) -> Option<String> {
	if errors.is_empty() {
		return None;
	}

	let mut code = String::from(HEADER);
	code.push_str(
		"\ntype ErrorWithCode = Error & { code: number }\ntype MaybeErrorWithCode = ErrorWithCode | null | undefined\n\nconst createErrorFromCodeLookup: Map<number, () => ErrorWithCode> = new Map()\nconst createErrorFromNameLookup: Map<string, () => ErrorWithCode> = new Map()\n",
	);

	for error in errors {
		let class = format!("{}Error", type_name(&error.name));
		let code_literal = format!("{:#x}", error.code);
		let name = quote(&error.name);
		let message = quote(&error.message);

		code.push('\n');
		code.push_str(&doc_comment(
			&[format!("{}: {message}", error.name)],
			&["errors", "generated"],
			"",
		));
		let _ = writeln!(
			code,
			"export class {class} extends Error {{\n  readonly code: number = {code_literal}\n  readonly name: string = {name}\n  constructor() {{\n    super({message})\n    if (typeof Error.captureStackTrace === 'function') {{\n      Error.captureStackTrace(this, {class})\n    }}\n  }}\n}}\n"
		);
		let _ = writeln!(code, "createErrorFromCodeLookup.set({code_literal}, () => new {class}())");
		let _ = writeln!(code, "createErrorFromNameLookup.set({name}, () => new {class}())");
	}

	code.push('\n');
	code.push_str(&doc_comment(
		&["Attempts to resolve a custom program error from the provided error code.".to_string()],
		&["errors", "generated"],
		"",
	));
	code.push_str(
		"export function errorFromCode(code: number): MaybeErrorWithCode {\n  const createError = createErrorFromCodeLookup.get(code)\n  return createError != null ? createError() : null\n}\n\n",
	);
	code.push_str(&doc_comment(
		&["Attempts to resolve a custom program error from the provided error name, i.e. 'Unauthorized'.".to_string()],
		&["errors", "generated"],
		"",
	));
	code.push_str(
		"export function errorFromName(name: string): MaybeErrorWithCode {\n  const createError = createErrorFromNameLookup.get(name)\n  return createError != null ? createError() : null\n}\n",
	);

	tracing::debug!(errors = errors.len(), "rendered errors");
	Some(code)
}
