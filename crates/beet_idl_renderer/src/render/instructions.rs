//! Instruction modules: args type and codec, accounts type, discriminator and
//! the `create<Name>Instruction` builder.
//!
//! Accounts the builder can fill in on its own become optional properties of
//! the accounts type: well-known program and sysvar addresses, optional
//! accounts (which default to the program id) and derived addresses whose
//! seeds the builder has at hand.

use std::fmt::Write as _;

use crate::beet_struct::StructKind;
use crate::beet_struct::StructOwner;
use crate::beet_struct::render_struct;
use crate::codec::Codec;
use crate::config::KnownAddress;
use crate::config::RenderConfig;
use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::context::module_name;
use crate::descriptor::AccountRef;
use crate::descriptor::Dialect;
use crate::descriptor::InstructionDescriptor;
use crate::discriminator::Discriminator;
use crate::discriminator::INSTRUCTION_DISCRIMINATOR_FIELD;
use crate::error::Result;
use crate::naming::quote;
use crate::naming::type_name;
use crate::naming::var_name;
use crate::pda;
use crate::pda::Eligibility;
use crate::registry::Package;
use crate::render::RenderedModule;
use crate::render::assemble;
use crate::render::doc_comment;
use crate::render::types::type_declaration;
use crate::type_mapper::TypeMapper;

/// Program wide inputs every instruction builder needs.
#[derive(Debug, Clone, Copy)]
pub struct InstructionEnv<'a> {
	pub context: &'a TypeContext,
	pub config: &'a RenderConfig,
	pub dialect: Dialect,
	/// Base58 program address the builder defaults `programId` to.
	pub program_address: &'a str,
	pub program_bytes: [u8; 32],
}

#[derive(Debug, Clone)]
pub struct RenderedInstruction {
	pub module: RenderedModule,
	pub fixable: bool,
	/// Bytes written before the arguments.
	pub discriminator: Vec<u8>,
	/// Argument codecs in wire order, discriminator excluded.
	pub args: Vec<(String, Codec)>,
}

/// How the builder fills an account the caller leaves out.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AccountDefault {
	Known(KnownAddress),
	ProgramId,
	/// A derived address resolved at generation time.
	ConstantPda(String),
	/// A derived address computed by the builder.
	DerivedPda,
}

impl AccountDefault {
	fn is_derived(&self) -> bool {
		matches!(self, Self::DerivedPda)
	}
}

pub fn render_instruction(instruction: &InstructionDescriptor, env: &InstructionEnv<'_>) -> Result<RenderedInstruction> {
	let pascal = type_name(&instruction.name);
	let camel = var_name(&instruction.name);
	let categories = ["Instructions", pascal.as_str(), "generated"];

	let mut mapper = TypeMapper::new(env.context, instruction.name.as_str());
	let discriminator = Discriminator::for_instruction(instruction, env.dialect)?;
	let owner = StructOwner {
		entity: instruction.name.clone(),
		type_name: format!("{pascal}InstructionArgs"),
		var_name: format!("{camel}Struct"),
		kind: StructKind::Args,
		requires_data: true,
	};
	let codec = render_struct(
		&mut mapper,
		&instruction.args,
		owner,
		Some((&discriminator, INSTRUCTION_DISCRIMINATOR_FIELD)),
	)?;
	mapper.add_package(Package::SolanaWeb3);
	mapper.add_package(Package::Beet);

	let defaults = resolve_defaults(instruction, env, &mut mapper);
	let remaining_accounts = env.dialect == Dialect::Anchor && env.config.anchor_remaining_accounts;
	let has_accounts = !instruction.accounts.is_empty() || remaining_accounts;
	let has_args = !instruction.args.is_empty();
	let discriminator_var = format!("{camel}InstructionDiscriminator");

	let mut body = doc_comment(&[], &categories, "");
	body.push_str(&type_declaration(&codec.owner.type_name, &codec.fields));
	body.push_str(&doc_comment(&[], &categories, ""));
	body.push_str(&codec.render());

	if has_accounts {
		body.push_str(&accounts_doc(instruction, &categories));
		let _ = writeln!(body, "export type {pascal}InstructionAccounts = {{");
		for (account, default) in instruction.accounts.iter().zip(&defaults) {
			let optional = if default.is_some() { "?" } else { "" };
			let _ = writeln!(body, "  {}{optional}: web3.PublicKey", var_name(&account.name));
		}
		if remaining_accounts {
			body.push_str("  anchorRemainingAccounts?: web3.AccountMeta[]\n");
		}
		body.push_str("}\n\n");
	}

	let _ = writeln!(body, "export const {discriminator_var} = {}\n", discriminator.literal());

	let mut builder_docs = instruction.docs.clone();
	if !builder_docs.is_empty() {
		builder_docs.push(String::new());
	}
	builder_docs.push(format!("Creates a _{pascal}_ instruction."));
	if has_accounts {
		builder_docs.push(String::new());
		builder_docs.push("@param accounts that will be accessed while the instruction is processed".to_string());
	}
	if has_args {
		builder_docs.push("@param args to provide as instruction data to the program".to_string());
	}
	body.push_str(&doc_comment(&builder_docs, &categories, ""));

	let _ = writeln!(body, "export function create{pascal}Instruction(");
	if has_accounts {
		let _ = writeln!(body, "  accounts: {pascal}InstructionAccounts,");
	}
	if has_args {
		let _ = writeln!(body, "  args: {},", codec.owner.type_name);
	}
	let _ = writeln!(
		body,
		"  programId = new web3.PublicKey({})\n) {{",
		quote(env.program_address)
	);

	let args_spread = if has_args { "\n    ...args," } else { "" };
	let _ = writeln!(
		body,
		"  const [data] = {}.serialize({{\n    {INSTRUCTION_DISCRIMINATOR_FIELD}: {discriminator_var},{args_spread}\n  }})",
		codec.owner.var_name
	);

	body.push_str(&render_locals(instruction, &defaults)?);
	body.push_str(&render_keys(instruction, &defaults));

	if remaining_accounts {
		body.push_str(
			"\n  if (accounts.anchorRemainingAccounts != null) {\n    for (const acc of accounts.anchorRemainingAccounts) {\n      keys.push(acc)\n    }\n  }\n",
		);
	}

	body.push_str("\n  const ix = new web3.TransactionInstruction({\n    programId,\n    keys,\n    data,\n  })\n  return ix\n}\n");

	tracing::debug!(entity = %instruction.name, fixable = codec.fixable, "rendered instruction");
	let code = assemble(ModuleDir::Instructions, None, mapper.usage(), env.context, &body);

	Ok(RenderedInstruction {
		module: RenderedModule::new(
			Some(ModuleDir::Instructions),
			module_name(&instruction.name, ModuleDir::Instructions),
			code,
		),
		fixable: codec.fixable,
		discriminator: discriminator.bytes(),
		args: codec
			.fields
			.iter()
			.map(|field| (field.name.clone(), field.codec.clone()))
			.collect(),
	})
}

/// Pick a default for every account, recording the packages the defaults
/// need. Derived addresses that cannot be computed by the builder are left
/// to the caller.
fn resolve_defaults(
	instruction: &InstructionDescriptor,
	env: &InstructionEnv<'_>,
	mapper: &mut TypeMapper<'_>,
) -> Vec<Option<AccountDefault>> {
	instruction
		.accounts
		.iter()
		.map(|account| {
			if account.is_optional {
				return Some(AccountDefault::ProgramId);
			}
			if let Some(known) = env.config.known_address(&account.name) {
				if let Some(package) = known.package {
					mapper.add_package(package);
				}
				return Some(AccountDefault::Known(known));
			}
			let formula = account.pda.as_ref()?;

			match pda::is_eligible(account, instruction) {
				Ok(Eligibility::Eligible) => {}
				Ok(Eligibility::Ineligible(reason)) => {
					tracing::debug!(instruction = %instruction.name, account = %account.name, ?reason, "derived account left to the caller");
					return None;
				}
				Err(error) => {
					tracing::warn!(instruction = %instruction.name, account = %account.name, %error, "cannot derive account address");
					return None;
				}
			}

			match pda::resolve_constant_pda(formula, &env.program_bytes, &instruction.name, &account.name) {
				Ok(Some(address)) => Some(AccountDefault::ConstantPda(address)),
				Ok(None) => Some(AccountDefault::DerivedPda),
				Err(error) => {
					tracing::warn!(instruction = %instruction.name, account = %account.name, %error, "cannot resolve constant address");
					None
				}
			}
		})
		.collect()
}

fn local_name(account: &AccountRef) -> String {
	format!("{}Address", var_name(&account.name))
}

/// Locals for every defaulted account: plain defaults first, then derived
/// addresses, which may read them.
fn render_locals(instruction: &InstructionDescriptor, defaults: &[Option<AccountDefault>]) -> Result<String> {
	let resolve_account = |referenced: &AccountRef| {
		let has_default = instruction
			.accounts
			.iter()
			.zip(defaults)
			.any(|(account, default)| account.name == referenced.name && default.is_some());
		if has_default {
			local_name(referenced)
		} else {
			format!("accounts.{}", var_name(&referenced.name))
		}
	};

	let mut code = String::new();
	let plain = instruction
		.accounts
		.iter()
		.zip(defaults)
		.filter(|(_, default)| default.as_ref().is_some_and(|default| !default.is_derived()));
	for (account, default) in plain {
		let fallback = match default {
			Some(AccountDefault::Known(known)) => known.render(),
			Some(AccountDefault::ConstantPda(address)) => format!("new web3.PublicKey({})", quote(address)),
			_ => "programId".to_string(),
		};
		let _ = writeln!(
			code,
			"  const {} = accounts.{} ?? {fallback}",
			local_name(account),
			var_name(&account.name)
		);
	}

	let derived = instruction
		.accounts
		.iter()
		.zip(defaults)
		.filter(|(_, default)| default.as_ref().is_some_and(AccountDefault::is_derived));
	for (account, _) in derived {
		let expression = pda::render_pda(account, instruction, &resolve_account, "programId")?;
		let _ = writeln!(
			code,
			"  const {} =\n    accounts.{} ??\n    {expression}",
			local_name(account),
			var_name(&account.name)
		);
	}

	if !code.is_empty() {
		code.insert(0, '\n');
	}
	Ok(code)
}

fn render_keys(instruction: &InstructionDescriptor, defaults: &[Option<AccountDefault>]) -> String {
	let mut code = String::from("  const keys: web3.AccountMeta[] = [\n");
	for (account, default) in instruction.accounts.iter().zip(defaults) {
		let property = var_name(&account.name);
		let pubkey = if default.is_some() {
			local_name(account)
		} else {
			format!("accounts.{property}")
		};
		let flag = |set: bool| {
			match (set, account.is_optional) {
				(false, _) => "false".to_string(),
				(true, false) => "true".to_string(),
				(true, true) => format!("accounts.{property} != null"),
			}
		};
		let _ = writeln!(
			code,
			"    {{\n      pubkey: {pubkey},\n      isWritable: {},\n      isSigner: {},\n    }},",
			flag(account.is_mut),
			flag(account.is_signer)
		);
	}
	code.push_str("  ]\n");
	code.insert(0, '\n');
	code
}

fn accounts_doc(instruction: &InstructionDescriptor, categories: &[&str]) -> String {
	let mut lines = vec![format!("Accounts required by the _{}_ instruction", instruction.name), String::new()];
	for account in &instruction.accounts {
		let mut flags = Vec::new();
		if account.is_mut {
			flags.push("_writable_");
		}
		if account.is_signer {
			flags.push("**signer**");
		}
		if account.is_optional {
			flags.push("_optional_");
		}
		let flags = if flags.is_empty() {
			String::new()
		} else {
			format!("[{}] ", flags.join(", "))
		};
		let mut line = format!("@property {flags}{}", var_name(&account.name));
		if let Some(doc) = account.docs.first() {
			let _ = write!(line, " {doc}");
		}
		lines.push(line);
	}
	doc_comment(&lines, categories, "")
}

/// Validate the address every builder defaults to.
pub fn program_bytes(address: &str) -> Result<[u8; 32]> {
	pda::parse_address(address, "program address")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::FieldDescriptor;
	use crate::descriptor::ProgramDescriptor;
	use crate::descriptor::Seed;
	use crate::descriptor::SeedFormula;
	use crate::descriptor::SeedValue;
	use crate::descriptor::TypeDescriptor;
	use crate::discriminator::byte_list;
	use crate::discriminator::instruction_discriminator;

	const PROGRAM: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

	fn account(name: &str, is_mut: bool, is_signer: bool) -> AccountRef {
		AccountRef {
			name: name.to_string(),
			is_mut,
			is_signer,
			is_optional: false,
			pda: None,
			docs: Vec::new(),
		}
	}

	fn empty_context() -> TypeContext {
		let program = ProgramDescriptor {
			name: "demo".to_string(),
			version: String::new(),
			address: Some(PROGRAM.to_string()),
			dialect: Dialect::Anchor,
			instructions: Vec::new(),
			accounts: Vec::new(),
			types: Vec::new(),
			errors: Vec::new(),
		};
		TypeContext::new(&program, &RenderConfig::default()).unwrap_or_else(|e| panic!("{e}"))
	}

	fn render(instruction: &InstructionDescriptor, dialect: Dialect) -> RenderedInstruction {
		let context = empty_context();
		let config = RenderConfig::default();
		let env = InstructionEnv {
			context: &context,
			config: &config,
			dialect,
			program_address: PROGRAM,
			program_bytes: program_bytes(PROGRAM).unwrap_or_else(|e| panic!("{e}")),
		};
		render_instruction(instruction, &env).unwrap_or_else(|e| panic!("{e}"))
	}

	fn transfer() -> InstructionDescriptor {
		InstructionDescriptor {
			name: "transfer".to_string(),
			accounts: vec![account("from", true, true), account("to", true, false), account("systemProgram", false, false)],
			args: vec![FieldDescriptor::new("amount", TypeDescriptor::primitive("u64"))],
			discriminant: None,
			docs: vec!["Moves lamports.".to_string()],
		}
	}

	#[test]
	fn builds_the_transfer_builder() {
		let rendered = render(&transfer(), Dialect::Anchor);
		let code = &rendered.module.code;

		assert_eq!(rendered.module.path(), "instructions/transfer.ts");
		assert_eq!(rendered.discriminator, instruction_discriminator("transfer").to_vec());
		assert!(!rendered.fixable);
		assert_eq!(rendered.args.len(), 1);

		assert!(code.contains(&format!(
			"export const transferInstructionDiscriminator = {}",
			byte_list(&instruction_discriminator("transfer"))
		)));
		assert!(code.contains(
			"export type TransferInstructionAccounts = {\n  from: web3.PublicKey\n  to: web3.PublicKey\n  systemProgram?: web3.PublicKey\n  anchorRemainingAccounts?: web3.AccountMeta[]\n}"
		));
		assert!(code.contains(" * @property [_writable_, **signer**] from\n"));
		assert!(code.contains(&format!(
			"  args: TransferInstructionArgs,\n  programId = new web3.PublicKey('{PROGRAM}')\n) {{"
		)));
		assert!(code.contains("instructionDiscriminator: transferInstructionDiscriminator,\n    ...args,"));
		assert!(code.contains("const systemProgramAddress = accounts.systemProgram ?? web3.SystemProgram.programId"));
		assert!(code.contains("      pubkey: accounts.from,\n      isWritable: true,\n      isSigner: true,"));
		assert!(code.contains("      pubkey: systemProgramAddress,\n      isWritable: false,"));
		assert!(code.contains("for (const acc of accounts.anchorRemainingAccounts)"));
		assert!(code.contains(" * Moves lamports.\n"));
	}

	#[test]
	fn shank_builders_use_the_declared_discriminant() {
		let mut instruction = transfer();
		instruction.discriminant = Some(crate::descriptor::ExplicitDiscriminant {
			ty: TypeDescriptor::primitive("u8"),
			value: crate::descriptor::DiscriminantValue::Number(2),
		});
		let rendered = render(&instruction, Dialect::Shank);

		assert_eq!(rendered.discriminator, vec![2]);
		assert!(rendered.module.code.contains("export const transferInstructionDiscriminator = 2\n"));
		assert!(!rendered.module.code.contains("anchorRemainingAccounts"));
	}

	#[test]
	fn derived_accounts_default_to_their_seeds() {
		let mut counter = account("counter", true, false);
		counter.pda = Some(SeedFormula {
			seeds: vec![
				Seed::Const {
					ty: TypeDescriptor::primitive("string"),
					value: SeedValue::Text("counter".to_string()),
				},
				Seed::Account {
					ty: TypeDescriptor::primitive("publicKey"),
					path: "authority".to_string(),
				},
			],
			program_id: None,
		});
		let mut config = account("config", false, false);
		config.pda = Some(SeedFormula {
			seeds: vec![Seed::Const {
				ty: TypeDescriptor::primitive("string"),
				value: SeedValue::Text("config".to_string()),
			}],
			program_id: None,
		});
		let mut nested = account("vault", true, false);
		nested.pda = Some(SeedFormula {
			seeds: vec![Seed::Account {
				ty: TypeDescriptor::primitive("publicKey"),
				path: "config.authority".to_string(),
			}],
			program_id: None,
		});

		let instruction = InstructionDescriptor {
			name: "initialize".to_string(),
			accounts: vec![counter, account("authority", true, true), config, nested],
			args: Vec::new(),
			discriminant: None,
			docs: Vec::new(),
		};
		let rendered = render(&instruction, Dialect::Anchor);
		let code = &rendered.module.code;

		assert!(code.contains("  counter?: web3.PublicKey\n  authority: web3.PublicKey\n  config?: web3.PublicKey\n  vault: web3.PublicKey\n"));
		assert!(code.contains("const configAddress = accounts.config ?? new web3.PublicKey('"));
		assert!(code.contains("  const counterAddress =\n    accounts.counter ??\n    web3.PublicKey.findProgramAddressSync("));
		assert!(code.contains("accounts.authority.toBuffer(),"));
		assert!(code.find("const configAddress").unwrap_or(usize::MAX) < code.find("const counterAddress").unwrap_or(0));
		assert!(code.contains("      pubkey: accounts.vault,"));
		assert!(!code.contains("args: InitializeInstructionArgs,"));
		assert!(code.contains("serialize({\n    instructionDiscriminator: initializeInstructionDiscriminator,\n  })"));
	}

	#[test]
	fn optional_accounts_fall_back_to_the_program() {
		let mut maybe = account("maybeAuthority", false, true);
		maybe.is_optional = true;
		let instruction = InstructionDescriptor {
			name: "touch".to_string(),
			accounts: vec![maybe],
			args: vec![FieldDescriptor::new("memo", TypeDescriptor::primitive("string"))],
			discriminant: None,
			docs: Vec::new(),
		};
		let rendered = render(&instruction, Dialect::Anchor);
		let code = &rendered.module.code;

		assert!(rendered.fixable);
		assert!(code.contains("const maybeAuthorityAddress = accounts.maybeAuthority ?? programId"));
		assert!(code.contains("isSigner: accounts.maybeAuthority != null,"));
		assert!(code.contains("new beet.FixableBeetArgsStruct<"));
	}

	#[test]
	fn unresolvable_seeds_leave_the_account_to_the_caller() {
		let mut vault = account("vault", true, false);
		vault.pda = Some(SeedFormula {
			seeds: vec![Seed::Arg {
				ty: TypeDescriptor::primitive("u64"),
				path: "missing".to_string(),
			}],
			program_id: None,
		});
		let instruction = InstructionDescriptor {
			name: "open".to_string(),
			accounts: vec![vault],
			args: vec![FieldDescriptor::new("id", TypeDescriptor::primitive("u64"))],
			discriminant: None,
			docs: Vec::new(),
		};
		let rendered = render(&instruction, Dialect::Anchor);
		assert!(rendered.module.code.contains("  vault: web3.PublicKey\n"));
		assert!(rendered.module.code.contains("      pubkey: accounts.vault,"));
	}
}
