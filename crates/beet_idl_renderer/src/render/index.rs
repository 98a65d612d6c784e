//! Barrel modules re-exporting every generated module.

use std::fmt::Write as _;

use crate::context::ModuleDir;
use crate::naming::quote;
use crate::naming::type_name;
use crate::render::HEADER;
use crate::render::RenderedModule;
use crate::render::doc_comment;

/// `<dir>/index.ts` re-exporting the modules named by `stems`.
///
/// The accounts barrel also exports `accountProviders`, mapping each account
/// class by name, for tooling that resolves accounts dynamically.
pub fn render_dir_index(dir: ModuleDir, stems: &[String]) -> RenderedModule {
	let mut stems = stems.to_vec();
	stems.sort();
	stems.dedup();

	let mut code = String::new();
	if dir == ModuleDir::Accounts {
		for stem in &stems {
			let _ = writeln!(code, "import {{ {} }} from './{stem}'", type_name(stem));
		}
		code.push('\n');
	}
	for stem in &stems {
		let _ = writeln!(code, "export * from './{stem}'");
	}
	if dir == ModuleDir::Accounts {
		let providers: Vec<String> = stems.iter().map(|stem| type_name(stem)).collect();
		let _ = writeln!(code, "\nexport const accountProviders = {{ {} }}", providers.join(", "));
	}

	RenderedModule::new(Some(dir), "index", code)
}

/// The root `index.ts`: re-exports of every non-empty directory plus the
/// program address.
pub fn render_root_index(dirs: &[ModuleDir], program_address: &str) -> RenderedModule {
	let mut code = String::from("import { PublicKey } from '@solana/web3.js'\n");
	for dir in ModuleDir::ALL.iter().filter(|dir| dirs.contains(dir)) {
		let _ = writeln!(code, "export * from './{}'", dir.dir_name());
	}

	code.push('\n');
	code.push_str(&doc_comment(
		&["Program address".to_string()],
		&["constants", "generated"],
		"",
	));
	let _ = writeln!(code, "export const PROGRAM_ADDRESS = {}\n", quote(program_address));
	code.push_str(&doc_comment(
		&["Program public key".to_string()],
		&["constants", "generated"],
		"",
	));
	code.push_str("export const PROGRAM_ID = new PublicKey(PROGRAM_ADDRESS)\n");

	RenderedModule::new(None, "index", code)
}

/// Prefix a barrel with the generated header.
pub fn with_header(mut module: RenderedModule) -> RenderedModule {
	module.code = format!("{HEADER}\n{}", module.code);
	module
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn account_barrels_export_providers() {
		let index = render_dir_index(ModuleDir::Accounts, &["Vault".to_string(), "Counter".to_string()]);
		assert_eq!(index.path(), "accounts/index.ts");
		insta::assert_snapshot!(index.code, @r"
		import { Counter } from './Counter'
		import { Vault } from './Vault'

		export * from './Counter'
		export * from './Vault'

		export const accountProviders = { Counter, Vault }
		");
	}

	#[test]
	fn type_barrels_only_reexport() {
		let index = render_dir_index(ModuleDir::Instructions, &["transfer".to_string(), "initialize".to_string()]);
		assert_eq!(index.code, "export * from './initialize'\nexport * from './transfer'\n");
	}

	#[test]
	fn root_index_exports_the_program_address() {
		let index = render_root_index(&[ModuleDir::Types, ModuleDir::Instructions], "11111111111111111111111111111111");
		assert_eq!(index.path(), "index.ts");
		assert!(index.code.starts_with("import { PublicKey } from '@solana/web3.js'\nexport * from './instructions'\nexport * from './types'\n"));
		assert!(!index.code.contains("./accounts"));
		assert!(index.code.contains("export const PROGRAM_ADDRESS = '11111111111111111111111111111111'\n"));
		assert!(index.code.contains("export const PROGRAM_ID = new PublicKey(PROGRAM_ADDRESS)\n"));
	}
}
