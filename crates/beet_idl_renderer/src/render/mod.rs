//! Emission of complete TypeScript modules.
//!
//! Each submodule turns one kind of IDL entity into the text of its module.
//! Entities are mapped with their own [`TypeMapper`](crate::type_mapper::TypeMapper)
//! and the resulting [`Usage`] drives the import block at the top of the file.

use std::fmt::Write as _;

use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::type_mapper::Usage;

pub mod accounts;
pub mod errors;
pub mod imports;
pub mod index;
pub mod instructions;
pub mod types;

pub const HEADER: &str = "/**
 * This code was GENERATED using beet_idl_renderer.
 * Please DO NOT EDIT THIS FILE, instead rerun the generator to update it or
 * write a wrapper to add functionality.
 */
";

/// One emitted file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
	pub dir: Option<ModuleDir>,
	/// File stem without extension.
	pub name: String,
	pub code: String,
}

impl RenderedModule {
	pub fn new(dir: Option<ModuleDir>, name: impl Into<String>, code: String) -> Self {
		Self {
			dir,
			name: name.into(),
			code,
		}
	}

	/// Path relative to the output root, always `/` separated.
	pub fn path(&self) -> String {
		match self.dir {
			Some(dir) => format!("{}/{}.ts", dir.dir_name(), self.name),
			None => format!("{}.ts", self.name),
		}
	}
}

/// Header, imports and body of an entity module.
///
/// `own` is the defined type the module itself exports, which is never
/// imported.
pub fn assemble(dir: ModuleDir, own: Option<&str>, usage: &Usage, context: &TypeContext, body: &str) -> String {
	let mut code = String::from(HEADER);
	code.push('\n');
	let imports = imports::render_imports(usage, dir, own, context);
	if !imports.is_empty() {
		code.push_str(&imports);
		code.push('\n');
	}
	code.push_str(body);
	code
}

/// A JSDoc block. Returns an empty string when there is nothing to say.
pub fn doc_comment(docs: &[String], categories: &[&str], indent: &str) -> String {
	if docs.is_empty() && categories.is_empty() {
		return String::new();
	}

	let mut code = format!("{indent}/**\n");
	for line in docs {
		let line = line.trim_end();
		if line.is_empty() {
			let _ = writeln!(code, "{indent} *");
		} else {
			let _ = writeln!(code, "{indent} * {}", line.replace("*/", "*\\/"));
		}
	}
	if !docs.is_empty() && !categories.is_empty() {
		let _ = writeln!(code, "{indent} *");
	}
	for category in categories {
		let _ = writeln!(code, "{indent} * @category {category}");
	}
	let _ = writeln!(code, "{indent} */");
	code
}
