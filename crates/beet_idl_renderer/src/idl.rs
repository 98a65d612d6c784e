//! Serde model of Anchor and Shank IDL JSON and its lowering into
//! [`crate::descriptor`] values.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::descriptor::AccountDescriptor;
use crate::descriptor::AccountRef;
use crate::descriptor::Dialect;
use crate::descriptor::DiscriminantValue;
use crate::descriptor::EnumDescriptor;
use crate::descriptor::ErrorDescriptor;
use crate::descriptor::ExplicitDiscriminant;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::InstructionDescriptor;
use crate::descriptor::ProgramDescriptor;
use crate::descriptor::Seed;
use crate::descriptor::SeedFormula;
use crate::descriptor::SeedValue;
use crate::descriptor::StructDescriptor;
use crate::descriptor::TypeDefinition;
use crate::descriptor::TypeDescriptor;
use crate::descriptor::VariantDescriptor;
use crate::descriptor::VariantFields;
use crate::error::RenderError;
use crate::error::RenderFailure;
use crate::error::Result;
use crate::registry;

const SHANK_ORIGIN: &str = "shank";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idl {
	#[serde(default)]
	pub version: String,
	pub name: String,
	#[serde(default)]
	pub instructions: Vec<IdlInstruction>,
	#[serde(default)]
	pub accounts: Vec<IdlTypeDefinition>,
	#[serde(default)]
	pub types: Vec<IdlTypeDefinition>,
	#[serde(default)]
	pub errors: Vec<IdlError>,
	#[serde(default)]
	pub metadata: IdlMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlMetadata {
	#[serde(default)]
	pub address: Option<String>,
	#[serde(default)]
	pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlInstruction {
	pub name: String,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default)]
	pub accounts: Vec<IdlAccountItem>,
	#[serde(default)]
	pub args: Vec<IdlField>,
	#[serde(default)]
	pub discriminant: Option<IdlDiscriminant>,
}

/// Anchor allows accounts to be grouped into nested account structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
	Account(IdlInstructionAccount),
	Group(IdlAccountGroup),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct IdlInstructionAccount {
	pub name: String,
	pub is_mut: bool,
	pub is_signer: bool,
	#[serde(default, alias = "optional")]
	pub is_optional: bool,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default)]
	pub pda: Option<IdlPda>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlAccountGroup {
	pub name: String,
	pub accounts: Vec<IdlAccountItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlPda {
	pub seeds: Vec<IdlSeed>,
	#[serde(default)]
	pub program_id: Option<IdlSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdlSeed {
	Const {
		#[serde(rename = "type")]
		ty: IdlType,
		value: JsonValue,
	},
	Arg {
		#[serde(rename = "type")]
		ty: IdlType,
		path: String,
	},
	Account {
		#[serde(rename = "type")]
		ty: IdlType,
		path: String,
		#[serde(default)]
		account: Option<String>,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlDiscriminant {
	#[serde(rename = "type")]
	pub ty: IdlType,
	pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlField {
	pub name: String,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(rename = "type")]
	pub ty: IdlType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
	Primitive(String),
	Defined {
		defined: String,
	},
	Option {
		option: Box<IdlType>,
	},
	COption {
		coption: Box<IdlType>,
	},
	Vec {
		vec: Box<IdlType>,
	},
	Array {
		array: (Box<IdlType>, usize),
	},
	HashMap {
		#[serde(rename = "hashMap")]
		hash_map: (Box<IdlType>, Box<IdlType>),
	},
	BTreeMap {
		#[serde(rename = "bTreeMap")]
		b_tree_map: (Box<IdlType>, Box<IdlType>),
	},
	Tuple {
		tuple: Vec<IdlType>,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlTypeDefinition {
	pub name: String,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(rename = "type")]
	pub ty: IdlTypeDefinitionTy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdlTypeDefinitionTy {
	Struct {
		#[serde(default)]
		fields: Vec<IdlField>,
	},
	Enum {
		variants: Vec<IdlEnumVariant>,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlEnumVariant {
	pub name: String,
	#[serde(default)]
	pub fields: Option<IdlEnumFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlEnumFields {
	Named(Vec<IdlField>),
	Tuple(Vec<IdlType>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlError {
	pub code: u32,
	pub name: String,
	#[serde(default)]
	pub msg: Option<String>,
}

impl Idl {
	pub fn dialect(&self) -> Dialect {
		if self.metadata.origin.as_deref() == Some(SHANK_ORIGIN) {
			Dialect::Shank
		} else {
			Dialect::Anchor
		}
	}
}

/// Read and parse an IDL JSON file.
pub fn read_idl(path: &Path) -> Result<Idl> {
	let content = std::fs::read_to_string(path).map_err(|source| {
		RenderError::ReadFile {
			path: path.to_path_buf(),
			source,
		}
	})?;

	serde_json::from_str(&content).map_err(|source| {
		RenderError::ParseIdl {
			path: path.to_path_buf(),
			source,
		}
	})
}

/// IDL files to render: every path in `files` plus the `*.json` files found
/// directly in `dir`, hidden files excepted. Sorted and deduplicated.
pub fn discover_idl_files(files: &[PathBuf], dir: Option<&Path>) -> Result<Vec<PathBuf>> {
	let mut paths = files.to_vec();

	if let Some(dir) = dir {
		let read_error = |source: std::io::Error| {
			RenderError::ReadFile {
				path: dir.to_path_buf(),
				source,
			}
		};
		for entry in std::fs::read_dir(dir).map_err(read_error)? {
			let path = entry.map_err(read_error)?.path();
			if is_idl_file(&path) {
				paths.push(path);
			}
		}
	}

	paths.sort();
	paths.dedup();
	if paths.is_empty() {
		return Err(RenderError::NoIdlFiles);
	}
	tracing::debug!(count = paths.len(), "discovered IDL files");
	Ok(paths)
}

fn is_idl_file(path: &Path) -> bool {
	let visible = path
		.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| !name.starts_with('.'));
	let json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
	visible && json && path.is_file()
}

/// Where the client of `idl_path` is written below `output_root`: a
/// directory named after the IDL file stem.
pub fn client_dir(idl_path: &Path, output_root: &Path) -> Result<PathBuf> {
	let Some(stem) = idl_path.file_stem().and_then(|stem| stem.to_str()) else {
		return Err(RenderError::InvalidIdlPath {
			path: idl_path.to_path_buf(),
		});
	};
	Ok(output_root.join(stem))
}

/// A lowered program and the IDL entities that could not be lowered.
#[derive(Debug)]
pub struct LoweredIdl {
	pub program: ProgramDescriptor,
	/// Accounts and instructions left out of [`Self::program`], in IDL order.
	pub rejected: Vec<RenderFailure>,
}

/// Lower a parsed IDL into a [`ProgramDescriptor`].
///
/// Anchor IDLs that spell a map as a defined type (`HashMap<String,u64>`)
/// have those top level fields repaired into proper map descriptors. An
/// account that is not a struct or an instruction with a malformed
/// discriminant is rejected on its own; the rest of the IDL still lowers.
pub fn lower_idl(idl: &Idl) -> LoweredIdl {
	let dialect = idl.dialect();
	let repair_maps = dialect == Dialect::Anchor;
	let mut rejected = Vec::new();

	let types = idl
		.types
		.iter()
		.map(|definition| lower_type_definition(definition, repair_maps))
		.collect();

	let mut accounts = Vec::new();
	for definition in &idl.accounts {
		match lower_account(definition, dialect, repair_maps) {
			Ok(account) => accounts.push(account),
			Err(error) => rejected.push(RenderFailure::new(&definition.name, error)),
		}
	}

	let mut instructions = Vec::new();
	for instruction in &idl.instructions {
		match lower_instruction(instruction) {
			Ok(lowered) => instructions.push(lowered),
			Err(error) => rejected.push(RenderFailure::new(&instruction.name, error)),
		}
	}

	let errors = idl
		.errors
		.iter()
		.map(|error| {
			ErrorDescriptor {
				code: error.code,
				name: error.name.clone(),
				message: error.msg.clone().unwrap_or_else(|| error.name.clone()),
			}
		})
		.collect();

	let program = ProgramDescriptor {
		name: idl.name.clone(),
		version: idl.version.clone(),
		address: idl.metadata.address.clone(),
		dialect,
		instructions,
		accounts,
		types,
		errors,
	};

	LoweredIdl { program, rejected }
}

impl IdlType {
	/// Lower into a [`TypeDescriptor`] without any repair.
	pub fn to_descriptor(&self) -> TypeDescriptor {
		match self {
			Self::Primitive(token) => TypeDescriptor::Primitive(token.clone()),
			Self::Defined { defined } => TypeDescriptor::Defined(defined.clone()),
			Self::Option { option } => TypeDescriptor::Option(Box::new(option.to_descriptor())),
			Self::COption { coption } => TypeDescriptor::COption(Box::new(coption.to_descriptor())),
			Self::Vec { vec } => TypeDescriptor::Vector(Box::new(vec.to_descriptor())),
			Self::Array { array: (inner, len) } => {
				TypeDescriptor::FixedArray(Box::new(inner.to_descriptor()), *len)
			}
			Self::HashMap {
				hash_map: (key, value),
			} => TypeDescriptor::HashMap(Box::new(key.to_descriptor()), Box::new(value.to_descriptor())),
			Self::BTreeMap {
				b_tree_map: (key, value),
			} => TypeDescriptor::BTreeMap(Box::new(key.to_descriptor()), Box::new(value.to_descriptor())),
			Self::Tuple { tuple } => TypeDescriptor::Tuple(tuple.iter().map(Self::to_descriptor).collect()),
		}
	}
}

fn lower_field(field: &IdlField, repair_maps: bool) -> FieldDescriptor {
	let mut ty = field.ty.to_descriptor();
	if repair_maps {
		if let TypeDescriptor::Defined(name) = &ty {
			if let Some(repaired) = repair_map_type(name) {
				tracing::warn!(
					field = %field.name,
					declared = %name,
					"repairing map type declared as a defined type"
				);
				ty = repaired;
			}
		}
	}

	FieldDescriptor {
		name: field.name.clone(),
		ty,
		docs: field.docs.clone(),
	}
}

/// Parse `HashMap<K,V>` / `BTreeMap<K, V>` spelled as a defined type name.
pub fn repair_map_type(name: &str) -> Option<TypeDescriptor> {
	let (is_hash, rest) = if let Some(rest) = name.strip_prefix("HashMap<") {
		(true, rest)
	} else if let Some(rest) = name.strip_prefix("BTreeMap<") {
		(false, rest)
	} else {
		return None;
	};

	let inner = rest.strip_suffix('>')?;
	let (key, value) = inner.split_once(',')?;
	let key = resolve_map_component(key.trim())?;
	let value = resolve_map_component(value.trim())?;

	Some(if is_hash {
		TypeDescriptor::HashMap(Box::new(key), Box::new(value))
	} else {
		TypeDescriptor::BTreeMap(Box::new(key), Box::new(value))
	})
}

fn resolve_map_component(token: &str) -> Option<TypeDescriptor> {
	if token.is_empty() || token.contains(['<', '>', ',', ' ']) {
		return None;
	}

	let lower = token.to_ascii_lowercase();
	let resolved = match lower.as_str() {
		"string" => TypeDescriptor::primitive("string"),
		"pubkey" | "publickey" => TypeDescriptor::primitive("publicKey"),
		"bool" => TypeDescriptor::primitive("bool"),
		_ if registry::is_primitive(&lower) => TypeDescriptor::Primitive(lower),
		_ => TypeDescriptor::Defined(token.to_string()),
	};
	Some(resolved)
}

fn lower_type_definition(definition: &IdlTypeDefinition, repair_maps: bool) -> TypeDefinition {
	match &definition.ty {
		IdlTypeDefinitionTy::Struct { fields } => {
			TypeDefinition::Struct(StructDescriptor {
				name: definition.name.clone(),
				fields: fields.iter().map(|field| lower_field(field, repair_maps)).collect(),
				docs: definition.docs.clone(),
			})
		}
		IdlTypeDefinitionTy::Enum { variants } => {
			TypeDefinition::Enum(EnumDescriptor {
				name: definition.name.clone(),
				variants: variants.iter().map(lower_variant).collect(),
				docs: definition.docs.clone(),
			})
		}
	}
}

fn lower_variant(variant: &IdlEnumVariant) -> VariantDescriptor {
	let fields = match &variant.fields {
		None => VariantFields::Unit,
		Some(IdlEnumFields::Named(fields)) if fields.is_empty() => VariantFields::Unit,
		Some(IdlEnumFields::Tuple(types)) if types.is_empty() => VariantFields::Unit,
		Some(IdlEnumFields::Named(fields)) => {
			VariantFields::Named(fields.iter().map(|field| lower_field(field, false)).collect())
		}
		Some(IdlEnumFields::Tuple(types)) => {
			VariantFields::Tuple(types.iter().map(IdlType::to_descriptor).collect())
		}
	};

	VariantDescriptor {
		name: variant.name.clone(),
		fields,
	}
}

fn lower_account(
	definition: &IdlTypeDefinition,
	dialect: Dialect,
	repair_maps: bool,
) -> Result<AccountDescriptor> {
	let IdlTypeDefinitionTy::Struct { fields } = &definition.ty else {
		return Err(RenderError::UnsupportedValue {
			context: format!("account `{}`", definition.name),
			kind: "account",
			reason: "accounts must be structs".to_string(),
		});
	};

	Ok(AccountDescriptor {
		name: definition.name.clone(),
		fields: fields.iter().map(|field| lower_field(field, repair_maps)).collect(),
		has_implicit_discriminator: dialect == Dialect::Anchor,
		docs: definition.docs.clone(),
	})
}

fn lower_instruction(instruction: &IdlInstruction) -> Result<InstructionDescriptor> {
	let mut accounts = Vec::new();
	flatten_accounts(&instruction.accounts, &mut accounts);

	let discriminant = instruction
		.discriminant
		.as_ref()
		.map(|discriminant| lower_discriminant(discriminant, &instruction.name))
		.transpose()?;

	Ok(InstructionDescriptor {
		name: instruction.name.clone(),
		accounts,
		args: instruction.args.iter().map(|field| lower_field(field, false)).collect(),
		discriminant,
		docs: instruction.docs.clone(),
	})
}

fn flatten_accounts(items: &[IdlAccountItem], accounts: &mut Vec<AccountRef>) {
	for item in items {
		match item {
			IdlAccountItem::Account(account) => {
				accounts.push(AccountRef {
					name: account.name.clone(),
					is_mut: account.is_mut,
					is_signer: account.is_signer,
					is_optional: account.is_optional,
					pda: account.pda.as_ref().map(lower_pda),
					docs: account.docs.clone(),
				});
			}
			IdlAccountItem::Group(group) => flatten_accounts(&group.accounts, accounts),
		}
	}
}

fn lower_pda(pda: &IdlPda) -> SeedFormula {
	SeedFormula {
		seeds: pda.seeds.iter().map(lower_seed).collect(),
		program_id: pda.program_id.as_ref().map(lower_seed),
	}
}

fn lower_seed(seed: &IdlSeed) -> Seed {
	match seed {
		IdlSeed::Const { ty, value } => {
			Seed::Const {
				ty: ty.to_descriptor(),
				value: lower_seed_value(value),
			}
		}
		IdlSeed::Arg { ty, path } => {
			Seed::Arg {
				ty: ty.to_descriptor(),
				path: path.clone(),
			}
		}
		IdlSeed::Account { ty, path, .. } => {
			Seed::Account {
				ty: ty.to_descriptor(),
				path: path.clone(),
			}
		}
	}
}

/// Constant seed values the resolver cannot encode are kept as
/// [`SeedValue::Unsupported`] and make the account ineligible later.
fn lower_seed_value(value: &JsonValue) -> SeedValue {
	let lowered = match value {
		JsonValue::Number(number) => {
			number
				.as_u64()
				.map(SeedValue::Number)
				.or_else(|| number.as_i64().map(SeedValue::Signed))
		}
		JsonValue::String(text) => Some(SeedValue::Text(text.clone())),
		JsonValue::Array(items) => json_bytes(items).map(SeedValue::Bytes),
		_ => None,
	};
	lowered.unwrap_or_else(|| SeedValue::Unsupported(value.to_string()))
}

fn json_bytes(items: &[JsonValue]) -> Option<Vec<u8>> {
	items
		.iter()
		.map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
		.collect()
}

fn lower_discriminant(discriminant: &IdlDiscriminant, instruction: &str) -> Result<ExplicitDiscriminant> {
	let value = match &discriminant.value {
		JsonValue::Number(number) => number.as_u64().map(DiscriminantValue::Number),
		JsonValue::Array(items) => json_bytes(items).map(DiscriminantValue::Bytes),
		_ => None,
	};

	let Some(value) = value else {
		return Err(RenderError::InvalidDiscriminator {
			entity: instruction.to_string(),
			reason: format!(
				"discriminant value `{}` must be an unsigned integer or a byte array",
				discriminant.value
			),
		});
	};

	Ok(ExplicitDiscriminant {
		ty: discriminant.ty.to_descriptor(),
		value,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(json: &str) -> Idl {
		serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse idl: {e}"))
	}

	#[test]
	fn discovers_visible_json_files_once() {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
		for name in ["b.json", "a.JSON", ".hidden.json", "notes.txt"] {
			std::fs::write(dir.path().join(name), "{}").unwrap_or_else(|e| panic!("{e}"));
		}
		std::fs::create_dir(dir.path().join("nested.json")).unwrap_or_else(|e| panic!("{e}"));

		let explicit = vec![dir.path().join("b.json")];
		let found = discover_idl_files(&explicit, Some(dir.path())).unwrap_or_else(|e| panic!("{e}"));
		let names: Vec<_> = found
			.iter()
			.filter_map(|path| path.file_name().and_then(|name| name.to_str()))
			.collect();
		assert_eq!(names, vec!["a.JSON", "b.json"]);

		assert!(matches!(discover_idl_files(&[], None), Err(RenderError::NoIdlFiles)));
		assert!(matches!(
			discover_idl_files(&[], Some(dir.path().join("missing").as_path())),
			Err(RenderError::ReadFile { .. })
		));
	}

	#[test]
	fn clients_are_named_after_the_idl_file() {
		let dir = client_dir(Path::new("target/idl/counter.json"), Path::new("clients"))
			.unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(dir, Path::new("clients").join("counter"));
		assert!(matches!(client_dir(Path::new("/"), Path::new("clients")), Err(RenderError::InvalidIdlPath { .. })));
	}

	#[test]
	fn parses_nested_type_references() {
		let ty: IdlType = serde_json::from_str(r#"{"vec":{"option":{"defined":"Item"}}}"#)
			.unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(
			ty.to_descriptor(),
			TypeDescriptor::Vector(Box::new(TypeDescriptor::Option(Box::new(TypeDescriptor::Defined(
				"Item".to_string()
			)))))
		);

		let ty: IdlType =
			serde_json::from_str(r#"{"array":["u8",32]}"#).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(
			ty.to_descriptor(),
			TypeDescriptor::FixedArray(Box::new(TypeDescriptor::primitive("u8")), 32)
		);

		let ty: IdlType = serde_json::from_str(r#"{"hashMap":["string",{"defined":"Item"}]}"#)
			.unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(ty.to_descriptor().to_string(), "HashMap<string, Item>");

		let ty: IdlType =
			serde_json::from_str(r#"{"tuple":["u8",{"coption":"u64"}]}"#).unwrap_or_else(|e| panic!("{e}"));
		assert_eq!(ty.to_descriptor().to_string(), "(u8, COption<u64>)");
	}

	#[test]
	fn detects_dialect_from_metadata() {
		let anchor = parse(r#"{"version":"0.1.0","name":"demo","instructions":[]}"#);
		assert_eq!(anchor.dialect(), Dialect::Anchor);

		let shank = parse(r#"{"name":"demo","metadata":{"origin":"shank","address":"11111111111111111111111111111111"}}"#);
		assert_eq!(shank.dialect(), Dialect::Shank);
		assert_eq!(shank.metadata.address.as_deref(), Some("11111111111111111111111111111111"));
	}

	#[test]
	fn repairs_map_types_declared_as_defined() {
		assert_eq!(
			repair_map_type("HashMap<String,u64>"),
			Some(TypeDescriptor::HashMap(
				Box::new(TypeDescriptor::primitive("string")),
				Box::new(TypeDescriptor::primitive("u64"))
			))
		);
		assert_eq!(
			repair_map_type("BTreeMap<Pubkey, DataItem>"),
			Some(TypeDescriptor::BTreeMap(
				Box::new(TypeDescriptor::primitive("publicKey")),
				Box::new(TypeDescriptor::Defined("DataItem".to_string()))
			))
		);
		assert_eq!(repair_map_type("ConfigData"), None);
		assert_eq!(repair_map_type("HashMap<Vec<u8>,u8>"), None);
	}

	#[test]
	fn repairs_only_anchor_fields() {
		let json = r#"{
			"name": "maps",
			"types": [{
				"name": "Holder",
				"type": {"kind": "struct", "fields": [{"name": "items", "type": {"defined": "HashMap<String,u8>"}}]}
			}]
		}"#;

		let program = lower_idl(&parse(json)).program;
		let TypeDefinition::Struct(holder) = &program.types[0] else {
			panic!("expected struct");
		};
		assert_eq!(holder.fields[0].ty.to_string(), "HashMap<string, u8>");

		let shank = json.replacen("\"name\": \"maps\",", "\"name\": \"maps\", \"metadata\": {\"origin\": \"shank\"},", 1);
		let program = lower_idl(&parse(&shank)).program;
		let TypeDefinition::Struct(holder) = &program.types[0] else {
			panic!("expected struct");
		};
		assert_eq!(holder.fields[0].ty, TypeDescriptor::Defined("HashMap<String,u8>".to_string()));
	}

	#[test]
	fn flattens_account_groups_and_lowers_seeds() {
		let json = r#"{
			"name": "grouped",
			"instructions": [{
				"name": "deposit",
				"accounts": [
					{"name": "user", "isMut": true, "isSigner": true},
					{"name": "vault", "accounts": [
						{"name": "vaultState", "isMut": true, "isSigner": false, "pda": {"seeds": [
							{"kind": "const", "type": "string", "value": "vault"},
							{"kind": "account", "type": "publicKey", "path": "user"},
							{"kind": "arg", "type": "u64", "path": "id"}
						]}},
						{"name": "feeCollector", "isMut": false, "isSigner": false, "optional": true}
					]}
				],
				"args": [{"name": "id", "type": "u64"}]
			}]
		}"#;

		let program = lower_idl(&parse(json)).program;
		let accounts = &program.instructions[0].accounts;
		let names: Vec<_> = accounts.iter().map(|account| account.name.as_str()).collect();
		assert_eq!(names, vec!["user", "vaultState", "feeCollector"]);
		assert!(accounts[2].is_optional);

		let pda = accounts[1].pda.as_ref().unwrap_or_else(|| panic!("missing pda"));
		assert_eq!(pda.seeds.len(), 3);
		assert_eq!(
			pda.seeds[0],
			Seed::Const {
				ty: TypeDescriptor::primitive("string"),
				value: SeedValue::Text("vault".to_string()),
			}
		);
		assert!(!pda.is_constant());
	}

	#[test]
	fn lowers_enum_variants() {
		let json = r#"{
			"name": "enums",
			"types": [{
				"name": "Shape",
				"type": {"kind": "enum", "variants": [
					{"name": "Empty"},
					{"name": "Circle", "fields": [{"name": "radius", "type": "u32"}]},
					{"name": "Pair", "fields": ["u8", {"defined": "Color"}]}
				]}
			}]
		}"#;

		let program = lower_idl(&parse(json)).program;
		let TypeDefinition::Enum(shape) = &program.types[0] else {
			panic!("expected enum");
		};
		assert_eq!(shape.variants[0].fields, VariantFields::Unit);
		assert!(matches!(shape.variants[1].fields, VariantFields::Named(ref fields) if fields[0].name == "radius"));
		assert!(matches!(shape.variants[2].fields, VariantFields::Tuple(ref types) if types.len() == 2));
	}

	#[test]
	fn rejects_malformed_discriminants_per_instruction() {
		let json = r#"{
			"name": "bad",
			"metadata": {"origin": "shank"},
			"instructions": [
				{"name": "Create", "accounts": [], "args": [], "discriminant": {"type": "u8", "value": "zero"}},
				{"name": "Close", "accounts": [], "args": [], "discriminant": {"type": "u8", "value": 1}}
			]
		}"#;

		let lowered = lower_idl(&parse(json));
		assert_eq!(lowered.rejected.len(), 1);
		assert_eq!(lowered.rejected[0].entity, "Create");
		assert!(matches!(lowered.rejected[0].error, RenderError::InvalidDiscriminator { .. }));
		let names: Vec<_> = lowered.program.instructions.iter().map(|ix| ix.name.as_str()).collect();
		assert_eq!(names, vec!["Close"]);
	}

	#[test]
	fn rejects_enum_accounts_without_dropping_the_rest() {
		let json = r#"{
			"name": "mixed",
			"accounts": [
				{"name": "Broken", "type": {"kind": "enum", "variants": [{"name": "A"}]}},
				{"name": "Fine", "type": {"kind": "struct", "fields": [{"name": "value", "type": "u8"}]}}
			]
		}"#;

		let lowered = lower_idl(&parse(json));
		assert_eq!(lowered.rejected.len(), 1);
		assert_eq!(lowered.rejected[0].entity, "Broken");
		assert_eq!(lowered.program.accounts.len(), 1);
		assert_eq!(lowered.program.accounts[0].name, "Fine");
	}

	#[test]
	fn keeps_signed_and_unsupported_constant_seeds() {
		let json = r#"{
			"name": "seeds",
			"instructions": [{
				"name": "make",
				"accounts": [{"name": "vault", "isMut": true, "isSigner": false, "pda": {"seeds": [
					{"kind": "const", "type": "i64", "value": -1},
					{"kind": "const", "type": "bool", "value": true}
				]}}],
				"args": []
			}]
		}"#;

		let lowered = lower_idl(&parse(json));
		assert!(lowered.rejected.is_empty());
		let pda = lowered.program.instructions[0].accounts[0]
			.pda
			.as_ref()
			.unwrap_or_else(|| panic!("missing pda"));
		assert_eq!(
			pda.seeds[0],
			Seed::Const {
				ty: TypeDescriptor::primitive("i64"),
				value: SeedValue::Signed(-1),
			}
		);
		assert_eq!(
			pda.seeds[1],
			Seed::Const {
				ty: TypeDescriptor::primitive("bool"),
				value: SeedValue::Unsupported("true".to_string()),
			}
		);
	}
}
