//! Whole program rendering.
//!
//! Types are rendered first, in dependency order, so that by the time any
//! instruction or account is mapped the fixable registry is complete. After
//! that the registry is read only and instructions and accounts are rendered
//! independently, on the rayon pool when [`RenderConfig::parallel`] is set.
//! Results are collected in IDL order either way.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use rayon::prelude::*;

use crate::codec::Codec;
use crate::config::RenderConfig;
use crate::context::DefinitionRef;
use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::descriptor::AccountDescriptor;
use crate::descriptor::InstructionDescriptor;
use crate::descriptor::ProgramDescriptor;
use crate::descriptor::TypeDescriptor;
use crate::error::RenderError;
use crate::error::RenderFailure;
use crate::error::Result;
use crate::render::RenderedModule;
use crate::render::accounts::RenderedAccount;
use crate::render::accounts::account_struct;
use crate::render::accounts::render_account;
use crate::render::errors::render_errors;
use crate::render::index::render_dir_index;
use crate::render::index::render_root_index;
use crate::render::index::with_header;
use crate::render::instructions::InstructionEnv;
use crate::render::instructions::RenderedInstruction;
use crate::render::instructions::program_bytes;
use crate::render::instructions::render_instruction;
use crate::render::types::render_type;
use crate::type_mapper::TypeMapper;
use crate::wire;
use crate::wire::LayoutTable;
use crate::wire::Value;
use crate::wire::WireError;
use crate::wire::WireResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
	/// Path relative to the output directory, `/` separated.
	pub path: String,
	pub code: String,
}

impl From<RenderedModule> for GeneratedModule {
	fn from(module: RenderedModule) -> Self {
		Self {
			path: module.path(),
			code: module.code,
		}
	}
}

/// Wire layout of an instruction's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionLayout {
	pub discriminator: Vec<u8>,
	pub args: Vec<(String, Codec)>,
}

#[derive(Debug)]
pub struct GeneratedProgram {
	pub name: String,
	pub program_address: String,
	pub modules: Vec<GeneratedModule>,
	pub failures: Vec<RenderFailure>,
	/// Every defined type and account whose encoding is variable length.
	pub fixable_types: BTreeSet<String>,
	/// Layouts of defined types and accounts, for [`wire`].
	pub layouts: LayoutTable,
	/// Keyed by the instruction's IDL name.
	pub instructions: BTreeMap<String, InstructionLayout>,
}

impl GeneratedProgram {
	pub fn module(&self, path: &str) -> Option<&GeneratedModule> {
		self.modules.iter().find(|module| module.path == path)
	}

	/// The exact instruction data the generated builder of `instruction`
	/// serializes for `args`.
	pub fn encode_instruction_data(&self, instruction: &str, args: &Value) -> WireResult<Vec<u8>> {
		let layout = self
			.instructions
			.get(instruction)
			.ok_or_else(|| WireError::UnknownType(instruction.to_string()))?;
		let mut data = layout.discriminator.clone();
		wire::encode_fields(&layout.args, args, &self.layouts, &mut data)?;
		Ok(data)
	}

	/// Decode account data, discriminator included, with the layout of the
	/// account `name`.
	pub fn decode_account(&self, name: &str, data: &[u8]) -> WireResult<Value> {
		let Some(wire::TypeLayout::Struct(fields)) = self.layouts.get(name) else {
			return Err(WireError::UnknownType(name.to_string()));
		};
		let mut input = data;
		wire::decode_fields(fields, &mut input, &self.layouts)
	}

	/// Write every module below `dir`, creating directories as needed.
	pub fn write_to(&self, dir: &Path) -> Result<()> {
		for module in &self.modules {
			let path = dir.join(&module.path);
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent).map_err(|source| {
					RenderError::WriteFile {
						path: parent.to_path_buf(),
						source,
					}
				})?;
			}
			std::fs::write(&path, &module.code).map_err(|source| {
				RenderError::WriteFile {
					path: path.clone(),
					source,
				}
			})?;
			tracing::debug!(path = %path.display(), "wrote module");
		}

		tracing::info!(program = %self.name, dir = %dir.display(), modules = self.modules.len(), "wrote generated client");
		Ok(())
	}
}

/// The address builders default to: the IDL's own, else the configured one.
pub fn program_address(program: &ProgramDescriptor, config: &RenderConfig) -> Result<String> {
	program
		.address
		.clone()
		.or_else(|| config.program_id.clone())
		.ok_or_else(|| {
			RenderError::UnsupportedValue {
				context: format!("program `{}`", program.name),
				kind: "address",
				reason: "the IDL has no `metadata.address` and no `programId` is configured".to_string(),
			}
		})
}

pub fn render_program(program: &ProgramDescriptor, config: &RenderConfig) -> Result<GeneratedProgram> {
	let address = program_address(program, config)?;
	let bytes = program_bytes(&address)?;
	let mut context = TypeContext::new(program, config)?;
	let mut failures = Vec::new();
	let mut layouts = LayoutTable::default();

	let order = context.render_order(program);
	for name in &order.cyclic {
		tracing::debug!(entity = %name, "recursive type treated as fixable");
		context.mark_fixable(name);
	}

	let mut failed = BTreeSet::new();
	let mut type_modules = vec![None; program.types.len()];
	for definition in &order.order {
		match *definition {
			DefinitionRef::Type(index) => {
				let definition = &program.types[index];
				let Some(rendered) = settle(definition.name(), render_type(definition, &context), config, &mut failures)?
				else {
					failed.insert(definition.name().to_string());
					continue;
				};
				if rendered.fixable {
					context.mark_fixable(definition.name());
				}
				layouts.insert(definition.name(), rendered.layout);
				type_modules[index] = Some(rendered.module);
			}
			DefinitionRef::Account(index) => {
				// Only the fixable flag is needed here; the module is rendered
				// with the other accounts below.
				let account = &program.accounts[index];
				let mut mapper = TypeMapper::new(&context, account.name.as_str());
				match settle(&account.name, account_struct(&mut mapper, account), config, &mut failures)? {
					Some(codec) if codec.fixable => context.mark_fixable(&account.name),
					Some(_) => {}
					None => {
						failed.insert(account.name.clone());
					}
				}
			}
		}
	}

	cascade_failures(program, &mut failed, config, &mut failures)?;
	for name in &failed {
		context.unmark_fixable(name);
		layouts.remove(name);
	}
	for (index, definition) in program.types.iter().enumerate() {
		if failed.contains(definition.name()) {
			type_modules[index] = None;
		}
	}

	let env = InstructionEnv {
		context: &context,
		config,
		dialect: program.dialect,
		program_address: &address,
		program_bytes: bytes,
	};
	let live_accounts: Vec<&AccountDescriptor> = program
		.accounts
		.iter()
		.filter(|account| !failed.contains(&account.name))
		.collect();
	let render_one_account = |account: &AccountDescriptor| render_account(account, &context);
	let render_one_instruction = |instruction: &InstructionDescriptor| {
		let arg_types: Vec<&TypeDescriptor> = instruction.args.iter().map(|arg| &arg.ty).collect();
		if let Some(dependency) = failed_dependency(&arg_types, &failed) {
			return Err(RenderError::DependencyFailed {
				entity: instruction.name.clone(),
				dependency,
			});
		}
		render_instruction(instruction, &env)
	};

	let (accounts, instructions): (Vec<Result<RenderedAccount>>, Vec<Result<RenderedInstruction>>) = if config.parallel {
		rayon::join(
			|| live_accounts.par_iter().copied().map(render_one_account).collect(),
			|| program.instructions.par_iter().map(render_one_instruction).collect(),
		)
	} else {
		(
			live_accounts.iter().copied().map(render_one_account).collect(),
			program.instructions.iter().map(render_one_instruction).collect(),
		)
	};

	let mut modules: Vec<RenderedModule> = type_modules.into_iter().flatten().collect();

	for (account, result) in live_accounts.iter().zip(accounts) {
		if let Some(rendered) = settle(&account.name, result, config, &mut failures)? {
			layouts.insert(account.name.as_str(), rendered.layout);
			modules.push(rendered.module);
		}
	}

	let mut instruction_layouts = BTreeMap::new();
	for (instruction, result) in program.instructions.iter().zip(instructions) {
		if let Some(rendered) = settle(&instruction.name, result, config, &mut failures)? {
			instruction_layouts.insert(
				instruction.name.clone(),
				InstructionLayout {
					discriminator: rendered.discriminator,
					args: rendered.args,
				},
			);
			modules.push(rendered.module);
		}
	}

	if let Some(code) = render_errors(&program.errors) {
		modules.push(RenderedModule::new(Some(ModuleDir::Errors), "index", code));
	}

	let mut dirs = Vec::new();
	for dir in ModuleDir::ALL {
		let stems: Vec<String> = modules
			.iter()
			.filter(|module| module.dir == Some(dir))
			.map(|module| module.name.clone())
			.collect();
		if stems.is_empty() {
			continue;
		}
		dirs.push(dir);
		if dir != ModuleDir::Errors {
			modules.push(with_header(render_dir_index(dir, &stems)));
		}
	}
	modules.push(with_header(render_root_index(&dirs, &address)));

	tracing::info!(
		program = %program.name,
		modules = modules.len(),
		failures = failures.len(),
		"rendered program"
	);

	Ok(GeneratedProgram {
		name: program.name.clone(),
		program_address: address,
		modules: modules.into_iter().map(GeneratedModule::from).collect(),
		failures,
		fixable_types: context.fixable_types().clone(),
		layouts,
		instructions: instruction_layouts,
	})
}

/// Apply the error policy to one entity's result: halt, or record the
/// failure and move on.
fn settle<T>(entity: &str, result: Result<T>, config: &RenderConfig, failures: &mut Vec<RenderFailure>) -> Result<Option<T>> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(error) if config.continue_on_error => {
			tracing::error!(entity, %error, "skipping entity");
			failures.push(RenderFailure::new(entity, error));
			Ok(None)
		}
		Err(error) => Err(error),
	}
}

/// The first definition in `failed` that `types` reference.
fn failed_dependency(types: &[&TypeDescriptor], failed: &BTreeSet<String>) -> Option<String> {
	types
		.iter()
		.flat_map(|ty| ty.defined_references())
		.find(|name| failed.contains(*name))
		.map(str::to_string)
}

/// Fail every type and account that references a failed definition.
///
/// Members of a reference cycle render before their dependencies are known
/// to be good, so this repeats until nothing else fails.
fn cascade_failures(
	program: &ProgramDescriptor,
	failed: &mut BTreeSet<String>,
	config: &RenderConfig,
	failures: &mut Vec<RenderFailure>,
) -> Result<()> {
	loop {
		let definitions = program
			.types
			.iter()
			.map(|definition| (definition.name(), definition.field_types()))
			.chain(
				program
					.accounts
					.iter()
					.map(|account| (account.name.as_str(), account.fields.iter().map(|field| &field.ty).collect())),
			);

		let mut cascaded = Vec::new();
		for (name, field_types) in definitions {
			if failed.contains(name) {
				continue;
			}
			if let Some(dependency) = failed_dependency(&field_types, failed) {
				cascaded.push((name, dependency));
			}
		}

		if cascaded.is_empty() {
			return Ok(());
		}
		for (name, dependency) in cascaded {
			failed.insert(name.to_string());
			let error = RenderError::DependencyFailed {
				entity: name.to_string(),
				dependency,
			};
			settle::<()>(name, Err(error), config, failures)?;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::AccountRef;
	use crate::descriptor::Dialect;
	use crate::descriptor::FieldDescriptor;
	use crate::descriptor::StructDescriptor;
	use crate::descriptor::TypeDefinition;
	use crate::descriptor::TypeDescriptor;
	use crate::discriminator::instruction_discriminator;

	const PROGRAM: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

	fn program() -> ProgramDescriptor {
		ProgramDescriptor {
			name: "ledger".to_string(),
			version: "0.1.0".to_string(),
			address: Some(PROGRAM.to_string()),
			dialect: Dialect::Anchor,
			instructions: vec![InstructionDescriptor {
				name: "record".to_string(),
				accounts: vec![AccountRef {
					name: "entry".to_string(),
					is_mut: true,
					is_signer: false,
					is_optional: false,
					pda: None,
					docs: Vec::new(),
				}],
				args: vec![FieldDescriptor::new("note", TypeDescriptor::Defined("Note".to_string()))],
				discriminant: None,
				docs: Vec::new(),
			}],
			accounts: vec![AccountDescriptor {
				name: "Entry".to_string(),
				fields: vec![FieldDescriptor::new("note", TypeDescriptor::Defined("Note".to_string()))],
				has_implicit_discriminator: true,
				docs: Vec::new(),
			}],
			types: vec![TypeDefinition::Struct(StructDescriptor {
				name: "Note".to_string(),
				fields: vec![FieldDescriptor::new("text", TypeDescriptor::primitive("string"))],
				docs: Vec::new(),
			})],
			errors: Vec::new(),
		}
	}

	#[test]
	fn fixability_reaches_instructions_and_accounts() {
		let generated = render_program(&program(), &RenderConfig::default()).unwrap_or_else(|e| panic!("{e}"));

		assert_eq!(
			generated.fixable_types.iter().map(String::as_str).collect::<Vec<_>>(),
			vec!["Entry", "Note"]
		);
		let record = generated
			.module("instructions/record.ts")
			.unwrap_or_else(|| panic!("missing instruction module"));
		assert!(record.code.contains("new beet.FixableBeetArgsStruct<"));
		assert!(record.code.contains("import { Note, noteBeet } from '../types/Note'"));

		let paths: Vec<&str> = generated.modules.iter().map(|module| module.path.as_str()).collect();
		assert_eq!(
			paths,
			vec![
				"types/Note.ts",
				"accounts/Entry.ts",
				"instructions/record.ts",
				"accounts/index.ts",
				"instructions/index.ts",
				"types/index.ts",
				"index.ts",
			]
		);
	}

	#[test]
	fn instruction_data_starts_with_the_discriminator() {
		let generated = render_program(&program(), &RenderConfig::default()).unwrap_or_else(|e| panic!("{e}"));
		let args = Value::record([("note", Value::record([("text", Value::str("hi"))]))]);
		let data = generated
			.encode_instruction_data("record", &args)
			.unwrap_or_else(|e| panic!("{e}"));

		assert_eq!(&data[..8], &instruction_discriminator("record"));
		assert_eq!(&data[8..], &[2, 0, 0, 0, b'h', b'i']);
	}

	#[test]
	fn errors_halt_unless_asked_to_continue() {
		let mut broken = program();
		broken.instructions[0].args.push(FieldDescriptor::new("ratio", TypeDescriptor::primitive("f32")));

		let error = render_program(&broken, &RenderConfig::default()).err();
		assert!(matches!(error, Some(RenderError::UnsupportedType { ref entity, .. }) if entity == "record"));

		let config = RenderConfig {
			continue_on_error: true,
			..RenderConfig::default()
		};
		let generated = render_program(&broken, &config).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(generated.failures.len(), 1);
		assert_eq!(generated.failures[0].entity, "record");
		assert!(generated.module("instructions/record.ts").is_none());
		assert!(generated.module("accounts/Entry.ts").is_some());
	}

	fn continuing() -> RenderConfig {
		RenderConfig {
			continue_on_error: true,
			..RenderConfig::default()
		}
	}

	fn structure(name: &str, fields: Vec<FieldDescriptor>) -> TypeDefinition {
		TypeDefinition::Struct(StructDescriptor {
			name: name.to_string(),
			fields,
			docs: Vec::new(),
		})
	}

	fn defined(name: &str) -> TypeDescriptor {
		TypeDescriptor::Defined(name.to_string())
	}

	#[test]
	fn failed_types_take_their_dependents_down() {
		let mut broken = program();
		broken.types = vec![
			structure("Holder", vec![FieldDescriptor::new("bad", defined("Bad"))]),
			structure("Bad", vec![FieldDescriptor::new("ratio", TypeDescriptor::primitive("f32"))]),
			structure("Note", vec![FieldDescriptor::new("text", TypeDescriptor::primitive("string"))]),
		];
		broken.accounts[0].fields = vec![FieldDescriptor::new("holder", defined("Holder"))];
		broken.instructions[0].args = vec![FieldDescriptor::new("holder", defined("Holder"))];

		let generated = render_program(&broken, &continuing()).unwrap_or_else(|e| panic!("{e}"));
		let failed: Vec<&str> = generated.failures.iter().map(|failure| failure.entity.as_str()).collect();
		assert_eq!(failed, vec!["Bad", "Holder", "Entry", "record"]);
		assert!(matches!(
			generated.failures[1].error,
			RenderError::DependencyFailed { ref dependency, .. } if dependency == "Bad"
		));

		let paths: Vec<&str> = generated.modules.iter().map(|module| module.path.as_str()).collect();
		assert_eq!(paths, vec!["types/Note.ts", "types/index.ts", "index.ts"]);
		assert!(generated.layouts.get("Holder").is_none());
		assert!(generated.fixable_types.contains("Note"));
		assert!(!generated.fixable_types.contains("Holder"));
	}

	#[test]
	fn failures_cascade_through_reference_cycles() {
		let mut cyclic = program();
		cyclic.types = vec![
			structure(
				"Node",
				vec![
					FieldDescriptor::new("edges", TypeDescriptor::Vector(Box::new(defined("Edge")))),
					FieldDescriptor::new("weight", TypeDescriptor::primitive("f32")),
				],
			),
			structure("Edge", vec![FieldDescriptor::new("target", defined("Node"))]),
			structure("Note", vec![FieldDescriptor::new("text", TypeDescriptor::primitive("string"))]),
		];

		let generated = render_program(&cyclic, &continuing()).unwrap_or_else(|e| panic!("{e}"));
		let mut failed: Vec<&str> = generated.failures.iter().map(|failure| failure.entity.as_str()).collect();
		failed.sort_unstable();
		assert_eq!(failed, vec!["Edge", "Node"]);
		assert!(generated.module("types/Edge.ts").is_none());
		assert!(generated.module("types/Node.ts").is_none());
		assert!(!generated.fixable_types.contains("Edge"));
		assert!(!generated.fixable_types.contains("Node"));
		assert!(generated.module("instructions/record.ts").is_some());
	}

	#[test]
	fn account_prepass_errors_follow_the_error_policy() {
		let mut broken = program();
		broken.accounts[0].fields.push(FieldDescriptor::new("ratio", TypeDescriptor::primitive("f32")));

		let error = render_program(&broken, &RenderConfig::default()).err();
		assert!(matches!(error, Some(RenderError::UnsupportedType { ref entity, .. }) if entity == "Entry"));

		let generated = render_program(&broken, &continuing()).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(generated.failures.len(), 1);
		assert_eq!(generated.failures[0].entity, "Entry");
		assert!(generated.module("accounts/Entry.ts").is_none());
		assert!(generated.module("accounts/index.ts").is_none());
		assert!(generated.module("instructions/record.ts").is_some());
	}

	#[test]
	fn a_program_address_is_required() {
		let mut anonymous = program();
		anonymous.address = None;
		assert!(matches!(
			render_program(&anonymous, &RenderConfig::default()),
			Err(RenderError::UnsupportedValue { kind: "address", .. })
		));

		let config = RenderConfig {
			program_id: Some("11111111111111111111111111111111".to_string()),
			..RenderConfig::default()
		};
		let generated = render_program(&anonymous, &config).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(generated.program_address, "11111111111111111111111111111111");

		let config = RenderConfig {
			program_id: Some("not an address".to_string()),
			..RenderConfig::default()
		};
		assert!(matches!(render_program(&anonymous, &config), Err(RenderError::InvalidAddress { .. })));
	}

	#[test]
	fn sequential_and_parallel_output_match() {
		let parallel = render_program(&program(), &RenderConfig::default()).unwrap_or_else(|e| panic!("{e}"));
		let config = RenderConfig {
			parallel: false,
			..RenderConfig::default()
		};
		let sequential = render_program(&program(), &config).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(parallel.modules, sequential.modules);
	}
}
