//! Import blocks derived from a [`Usage`] accumulator.

use std::fmt::Write as _;

use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::type_mapper::Usage;

/// Package imports in [`Package`](crate::registry::Package) order followed
/// by one named import per referenced defined type.
pub fn render_imports(usage: &Usage, from: ModuleDir, own: Option<&str>, context: &TypeContext) -> String {
	let mut code = String::new();
	for package in &usage.packages {
		let _ = writeln!(code, "{}", package.import_statement());
	}

	for (name, identifiers) in &usage.local_imports {
		if own == Some(name.as_str()) {
			continue;
		}
		let Some(entry) = context.lookup(name) else {
			continue;
		};
		let module = entry.module_name();
		let path = if entry.dir == from {
			format!("./{module}")
		} else {
			format!("../{}/{module}", entry.dir.dir_name())
		};
		let identifiers: Vec<&str> = identifiers.iter().map(String::as_str).collect();
		let _ = writeln!(code, "import {{ {} }} from '{path}'", identifiers.join(", "));
	}

	code
}
