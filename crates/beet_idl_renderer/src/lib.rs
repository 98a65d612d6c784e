//! Render beet-based TypeScript clients from Anchor and Shank IDLs.
//!
//! The IDL is lowered into [`descriptor`] values, every field type is mapped
//! to a TypeScript type and a beet codec by [`type_mapper`], and the
//! [`render`] modules turn the mapped entities into files. [`wire`] is a Rust
//! interpreter of the same codecs, used to check the bytes the generated
//! builders produce.

pub mod beet_struct;
pub mod codec;
pub mod config;
pub mod context;
pub mod data_enum;
pub mod descriptor;
pub mod discriminator;
pub mod error;
pub mod idl;
pub mod naming;
pub mod pda;
pub mod program;
pub mod registry;
pub mod render;
pub mod type_mapper;
pub mod wire;

use std::path::Path;

pub use crate::config::RenderConfig;
pub use crate::error::RenderError;
pub use crate::error::RenderFailure;
pub use crate::error::Result;
pub use crate::idl::Idl;
pub use crate::idl::LoweredIdl;
pub use crate::idl::lower_idl;
pub use crate::idl::read_idl;
pub use crate::program::GeneratedModule;
pub use crate::program::GeneratedProgram;
pub use crate::program::render_program;

/// Lower and render a parsed IDL.
///
/// Entities rejected while lowering follow the same error policy as those
/// that fail to render: the first one is returned, or with
/// [`RenderConfig::continue_on_error`] they lead the reported failures.
pub fn render_idl(idl: &Idl, config: &RenderConfig) -> Result<GeneratedProgram> {
	let LoweredIdl { program, rejected } = lower_idl(idl);
	let mut failures = Vec::with_capacity(rejected.len());
	for failure in rejected {
		if !config.continue_on_error {
			return Err(failure.error);
		}
		tracing::error!(entity = %failure.entity, error = %failure.error, "skipping entity");
		failures.push(failure);
	}
	tracing::debug!(
		program = %program.name,
		dialect = ?program.dialect,
		instructions = program.instructions.len(),
		accounts = program.accounts.len(),
		types = program.types.len(),
		"lowered IDL"
	);
	let mut generated = render_program(&program, config)?;
	failures.append(&mut generated.failures);
	generated.failures = failures;
	Ok(generated)
}

/// Read the IDL at `idl_path`, render it and write the client into
/// `output_dir`.
pub fn render_idl_file(idl_path: &Path, output_dir: &Path, config: &RenderConfig) -> Result<GeneratedProgram> {
	let idl = read_idl(idl_path)?;
	let generated = render_idl(&idl, config)?;
	generated.write_to(output_dir)?;
	Ok(generated)
}
