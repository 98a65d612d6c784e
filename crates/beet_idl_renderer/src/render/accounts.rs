//! Account modules: an args type, a class with (de)serialization helpers and
//! the account codec.

use std::fmt::Write as _;

use crate::beet_struct::StructCodec;
use crate::beet_struct::StructKind;
use crate::beet_struct::StructOwner;
use crate::beet_struct::render_struct;
use crate::codec::TsType;
use crate::context::DefinedKind;
use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::context::module_name;
use crate::descriptor::AccountDescriptor;
use crate::discriminator::ACCOUNT_DISCRIMINATOR_FIELD;
use crate::discriminator::Discriminator;
use crate::error::Result;
use crate::naming::codec_var_name;
use crate::naming::type_name;
use crate::naming::var_name;
use crate::registry::Package;
use crate::registry::PrimitiveKind;
use crate::render::RenderedModule;
use crate::render::assemble;
use crate::render::doc_comment;
use crate::render::types::type_declaration;
use crate::type_mapper::MappedField;
use crate::type_mapper::TypeMapper;
use crate::wire::TypeLayout;

#[derive(Debug, Clone)]
pub struct RenderedAccount {
	pub module: RenderedModule,
	pub fixable: bool,
	pub layout: TypeLayout,
	pub discriminator: Option<Vec<u8>>,
}

/// Map the account's fields, hidden discriminator first when it has one.
pub fn account_struct(mapper: &mut TypeMapper<'_>, account: &AccountDescriptor) -> Result<StructCodec> {
	let owner = StructOwner {
		entity: account.name.clone(),
		type_name: type_name(&account.name),
		var_name: codec_var_name(&account.name),
		kind: StructKind::Class,
		requires_data: true,
	};
	let discriminator = Discriminator::for_account(&account.name);
	let prefix = account
		.has_implicit_discriminator
		.then_some((&discriminator, ACCOUNT_DISCRIMINATOR_FIELD));
	render_struct(mapper, &account.fields, owner, prefix)
}

pub fn render_account(account: &AccountDescriptor, context: &TypeContext) -> Result<RenderedAccount> {
	let mut mapper = TypeMapper::new(context, account.name.as_str());
	let codec = account_struct(&mut mapper, account)?;
	mapper.add_package(Package::SolanaWeb3);
	mapper.add_package(Package::Beet);

	let name = type_name(&account.name);
	let discriminator = account
		.has_implicit_discriminator
		.then(|| Discriminator::for_account(&account.name));
	let discriminator_var = format!("{}Discriminator", var_name(&account.name));
	let class = AccountClass {
		name: &name,
		codec_var: &codec.owner.var_name,
		fields: &codec.fields,
		fixable: codec.fixable,
		discriminator_var: discriminator.as_ref().map(|_| discriminator_var.as_str()),
		context,
	};

	let mut body = doc_comment(
		&[format!("Arguments used to create {{@link {name}}}")],
		&["Accounts", "generated"],
		"",
	);
	body.push_str(&type_declaration(&format!("{name}Args"), &codec.fields));
	body.push('\n');
	if let Some(discriminator) = &discriminator {
		let _ = writeln!(body, "export const {discriminator_var} = {}", discriminator.literal());
	}
	let mut class_docs = account.docs.clone();
	if !class_docs.is_empty() {
		class_docs.push(String::new());
	}
	class_docs.push(format!(
		"Holds the data for the {{@link {name}}} Account and provides de/serialization"
	));
	class_docs.push("functionality for that data".to_string());
	body.push_str(&doc_comment(&class_docs, &["Accounts", "generated"], ""));
	body.push_str(&class.render());
	body.push('\n');
	body.push_str(&doc_comment(&[], &["Accounts", "generated"], ""));
	body.push_str(&codec.render());

	tracing::debug!(entity = %account.name, fixable = codec.fixable, "rendered account");
	let code = assemble(ModuleDir::Accounts, Some(&account.name), mapper.usage(), context, &body);

	Ok(RenderedAccount {
		module: RenderedModule::new(
			Some(ModuleDir::Accounts),
			module_name(&account.name, ModuleDir::Accounts),
			code,
		),
		fixable: codec.fixable,
		layout: TypeLayout::Struct(codec.layout()),
		discriminator: discriminator.map(|discriminator| discriminator.bytes()),
	})
}

struct AccountClass<'a> {
	name: &'a str,
	codec_var: &'a str,
	fields: &'a [MappedField],
	fixable: bool,
	discriminator_var: Option<&'a str>,
	context: &'a TypeContext,
}

impl AccountClass<'_> {
	fn render(&self) -> String {
		let name = self.name;
		let codec = self.codec_var;
		let mut code = format!("export class {name} implements {name}Args {{\n");

		if self.fields.is_empty() {
			code.push_str("  private constructor() {}\n\n");
		} else {
			code.push_str("  private constructor(\n");
			let params: Vec<String> = self
				.fields
				.iter()
				.map(|field| format!("    readonly {}: {}", field.name, field.ts))
				.collect();
			let _ = writeln!(code, "{}\n  ) {{}}\n", params.join(",\n"));
		}

		let args: Vec<String> = self.fields.iter().map(|field| format!("args.{}", field.name)).collect();
		let _ = writeln!(
			code,
			"  /**\n   * Creates a {{@link {name}}} instance from the provided args.\n   */\n  static fromArgs(args: {name}Args) {{\n    return new {name}({})\n  }}\n",
			args.join(", ")
		);

		let _ = writeln!(
			code,
			"  /**\n   * Deserializes the {{@link {name}}} from the data of the provided {{@link web3.AccountInfo}}.\n   * @returns a tuple of the account data and the offset up to which the buffer was read to obtain it.\n   */\n  static fromAccountInfo(\n    accountInfo: web3.AccountInfo<Buffer>,\n    offset = 0\n  ): [{name}, number] {{\n    return {name}.deserialize(accountInfo.data, offset)\n  }}\n"
		);

		let _ = writeln!(
			code,
			"  /**\n   * Retrieves the account info from the provided address and deserializes\n   * the {{@link {name}}} from its data.\n   *\n   * @throws Error if no account info is found at the address or if deserialization fails\n   */\n  static async fromAccountAddress(\n    connection: web3.Connection,\n    address: web3.PublicKey,\n    commitmentOrConfig?: web3.Commitment | web3.GetAccountInfoConfig\n  ): Promise<{name}> {{\n    const accountInfo = await connection.getAccountInfo(\n      address,\n      commitmentOrConfig\n    )\n    if (accountInfo == null) {{\n      throw new Error(`Unable to find {name} account at ${{address}}`)\n    }}\n    return {name}.fromAccountInfo(accountInfo, 0)[0]\n  }}\n"
		);

		let _ = writeln!(
			code,
			"  /**\n   * Deserializes the {{@link {name}}} from the provided data Buffer.\n   * @returns a tuple of the account data and the offset up to which the buffer was read to obtain it.\n   */\n  static deserialize(buf: Buffer, offset = 0): [{name}, number] {{\n    return {codec}.deserialize(buf, offset)\n  }}\n"
		);

		let _ = writeln!(
			code,
			"  /**\n   * Serializes the {{@link {name}}} into a Buffer.\n   * @returns a tuple of the created Buffer and the offset up to which the buffer was written to store it.\n   */\n  serialize(): [Buffer, number] {{\n    return {codec}.serialize({})\n  }}\n",
			self.value_with_discriminator("this")
		);

		if self.fixable {
			let _ = writeln!(
				code,
				"  /**\n   * Returns the byteSize of a {{@link Buffer}} holding the serialized data of\n   * {{@link {name}}} for the provided args.\n   *\n   * @param args need to be provided since the byte size for this account\n   * depends on them\n   */\n  static byteSize(args: {name}Args) {{\n    const instance = {name}.fromArgs(args)\n    return {codec}.toFixedFromValue({}).byteSize\n  }}\n",
				self.value_with_discriminator("instance")
			);
			let _ = writeln!(
				code,
				"  /**\n   * Fetches the minimum balance needed to exempt an account holding\n   * {{@link {name}}} data from rent\n   *\n   * @param args need to be provided since the byte size for this account\n   * depends on them\n   * @param connection used to retrieve the rent exemption information\n   */\n  static async getMinimumBalanceForRentExemption(\n    args: {name}Args,\n    connection: web3.Connection,\n    commitment?: web3.Commitment\n  ): Promise<number> {{\n    return connection.getMinimumBalanceForRentExemption(\n      {name}.byteSize(args),\n      commitment\n    )\n  }}\n"
			);
		} else {
			let _ = writeln!(
				code,
				"  /**\n   * Returns the byteSize of a {{@link Buffer}} holding the serialized data of\n   * {{@link {name}}}\n   */\n  static get byteSize() {{\n    return {codec}.byteSize\n  }}\n"
			);
			let _ = writeln!(
				code,
				"  /**\n   * Fetches the minimum balance needed to exempt an account holding\n   * {{@link {name}}} data from rent\n   *\n   * @param connection used to retrieve the rent exemption information\n   */\n  static async getMinimumBalanceForRentExemption(\n    connection: web3.Connection,\n    commitment?: web3.Commitment\n  ): Promise<number> {{\n    return connection.getMinimumBalanceForRentExemption(\n      {name}.byteSize,\n      commitment\n    )\n  }}\n"
			);
			let _ = writeln!(
				code,
				"  /**\n   * Determines if the provided {{@link Buffer}} has the correct byte size to\n   * hold {{@link {name}}} data.\n   */\n  static hasCorrectByteSize(buf: Buffer, offset = 0) {{\n    return buf.byteLength - offset === {name}.byteSize\n  }}\n"
			);
		}

		code.push_str(
			"  /**\n   * Returns a readable version of the account's properties that can be used for logging.\n   */\n  pretty() {\n    return {\n",
		);
		for field in self.fields {
			let _ = writeln!(code, "      {}: {},", field.name, self.pretty_value(field));
		}
		code.push_str("    }\n  }\n}\n");
		code
	}

	fn value_with_discriminator(&self, source: &str) -> String {
		match self.discriminator_var {
			Some(var) => format!("{{\n      {ACCOUNT_DISCRIMINATOR_FIELD}: {var},\n      ...{source},\n    }}"),
			None => source.to_string(),
		}
	}

	fn pretty_value(&self, field: &MappedField) -> String {
		let value = format!("this.{}", field.name);
		match &field.ts {
			TsType::Primitive(mapping) if mapping.kind == PrimitiveKind::PublicKey => format!("{value}.toBase58()"),
			TsType::Primitive(mapping) if mapping.is_bignum() => {
				format!(
					"(() => {{\n        const x = <{{ toNumber: () => number }}>{value}\n        if (typeof x.toNumber === 'function') {{\n          try {{\n            return x.toNumber()\n          }} catch (_) {{\n            return x\n          }}\n        }}\n        return x\n      }})()"
				)
			}
			TsType::Named(defined) => {
				match self.context.lookup(defined).map(|entry| &entry.kind) {
					Some(DefinedKind::ScalarEnum(_)) => {
						let enum_name = type_name(defined);
						format!("'{enum_name}.' + {enum_name}[{value}]")
					}
					_ => value,
				}
			}
			_ => value,
		}
	}
}
