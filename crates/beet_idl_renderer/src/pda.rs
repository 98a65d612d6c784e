//! Derived account addresses.
//!
//! An instruction account that declares a seed formula may be derived by the
//! generated builder instead of being passed in by the caller. Whether that is
//! possible is decided here, and so is the TypeScript expression that derives
//! it. Formulas made only of constants are resolved at generation time.

use solana_address::Address;
use thiserror::Error;

use crate::descriptor::AccountRef;
use crate::descriptor::InstructionDescriptor;
use crate::descriptor::Seed;
use crate::descriptor::SeedFormula;
use crate::descriptor::SeedValue;
use crate::descriptor::TypeDescriptor;
use crate::error::RenderError;
use crate::error::Result;
use crate::naming::quote;
use crate::naming::var_name;

/// Why a seed value cannot be turned into bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeedError {
	#[error("seeds of type `{ty}` are not supported")]
	UnsupportedType { ty: String },
	#[error("{value} does not fit in `{ty}`")]
	OutOfRange { value: String, ty: String },
	#[error("constant {value} cannot be encoded as `{ty}`")]
	Mismatch { value: String, ty: String },
	#[error("invalid base58: {reason}")]
	InvalidBase58 { reason: String },
	#[error("expected 32 bytes, found {len}")]
	AddressLength { len: usize },
}

pub type SeedResult<T> = std::result::Result<T, SeedError>;

/// Why a derived account has to be supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
	/// The account declares no seeds.
	NotDerived,
	/// A seed reaches into a nested field, e.g. `config.authority`.
	MultiSegmentPath { path: String },
	/// A seed references an account the caller may omit.
	OptionalAccount { account: String },
	/// A seed references an account that is itself derived at runtime.
	DependsOnDerivedAccount { account: String },
	/// A seed value or type has no byte encoding.
	UnencodableSeed { seed: String, reason: SeedError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
	Eligible,
	Ineligible(Ineligible),
}

/// How a seed value is turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedEncoding {
	/// Little-endian integer of `width` bytes.
	Integer { width: usize, signed: bool },
	Utf8,
	PublicKey,
	Raw,
}

pub fn seed_encoding(ty: &TypeDescriptor) -> Option<SeedEncoding> {
	let integer = |width, signed| Some(SeedEncoding::Integer { width, signed });
	match ty {
		TypeDescriptor::Primitive(token) => {
			match token.as_str() {
				"u8" => integer(1, false),
				"u16" => integer(2, false),
				"u32" => integer(4, false),
				"u64" => integer(8, false),
				"i8" => integer(1, true),
				"i16" => integer(2, true),
				"i32" => integer(4, true),
				"i64" => integer(8, true),
				"string" => Some(SeedEncoding::Utf8),
				"publicKey" | "pubkey" => Some(SeedEncoding::PublicKey),
				"bytes" => Some(SeedEncoding::Raw),
				_ => None,
			}
		}
		TypeDescriptor::FixedArray(inner, _) | TypeDescriptor::Vector(inner)
			if **inner == TypeDescriptor::primitive("u8") =>
		{
			Some(SeedEncoding::Raw)
		}
		_ => None,
	}
}

/// Serialize a constant seed.
pub fn seed_bytes(ty: &TypeDescriptor, value: &SeedValue) -> SeedResult<Vec<u8>> {
	let Some(encoding) = seed_encoding(ty) else {
		return Err(SeedError::UnsupportedType { ty: ty.to_string() });
	};

	match (encoding, value) {
		(SeedEncoding::Integer { width, signed }, SeedValue::Number(number)) => {
			integer_bytes(i128::from(*number), width, signed, ty)
		}
		(SeedEncoding::Integer { width, signed }, SeedValue::Signed(number)) => {
			integer_bytes(i128::from(*number), width, signed, ty)
		}
		(SeedEncoding::Utf8 | SeedEncoding::Raw, SeedValue::Text(text)) => Ok(text.as_bytes().to_vec()),
		(SeedEncoding::PublicKey, SeedValue::Text(text)) => decode_address(text).map(|bytes| bytes.to_vec()),
		(SeedEncoding::PublicKey, SeedValue::Bytes(bytes)) if bytes.len() == 32 => Ok(bytes.clone()),
		(SeedEncoding::Raw | SeedEncoding::Utf8, SeedValue::Bytes(bytes)) => Ok(bytes.clone()),
		(_, value) => {
			Err(SeedError::Mismatch {
				value: value.to_string(),
				ty: ty.to_string(),
			})
		}
	}
}

/// Two's complement little-endian bytes of `value`, range checked against
/// the declared width.
fn integer_bytes(value: i128, width: usize, signed: bool, ty: &TypeDescriptor) -> SeedResult<Vec<u8>> {
	let bits = width * 8;
	let (min, max) = if signed {
		(-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
	} else {
		(0, (1i128 << bits) - 1)
	};
	if value < min || value > max {
		return Err(SeedError::OutOfRange {
			value: value.to_string(),
			ty: ty.to_string(),
		});
	}
	Ok(value.to_le_bytes()[..width].to_vec())
}

/// Decode a base58 address into its 32 bytes.
pub fn decode_address(value: &str) -> SeedResult<[u8; 32]> {
	let bytes = bs58::decode(value).into_vec().map_err(|error| {
		SeedError::InvalidBase58 {
			reason: error.to_string(),
		}
	})?;
	<[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| SeedError::AddressLength { len: bytes.len() })
}

pub fn encode_address(bytes: &[u8; 32]) -> String {
	bs58::encode(bytes).into_string()
}

/// Validate a configured or declared program address.
pub fn parse_address(value: &str, context: &str) -> Result<[u8; 32]> {
	decode_address(value).map_err(|error| {
		RenderError::InvalidAddress {
			context: context.to_string(),
			value: value.to_string(),
			reason: error.to_string(),
		}
	})
}

/// Decide whether `account` can be derived by the builder of `instruction`.
///
/// Multi-segment paths, optional references, references to other runtime
/// derived accounts and seeds without a byte encoding make the account
/// ineligible. Seeds naming arguments or accounts that do not exist are
/// errors.
pub fn is_eligible(account: &AccountRef, instruction: &InstructionDescriptor) -> Result<Eligibility> {
	let Some(formula) = &account.pda else {
		return Ok(Eligibility::Ineligible(Ineligible::NotDerived));
	};

	for seed in formula.all_seeds() {
		let unresolved = |reason: String| {
			RenderError::SeedResolution {
				instruction: instruction.name.clone(),
				account: account.name.clone(),
				seed: seed.to_string(),
				reason,
			}
		};
		let unencodable = |reason: SeedError| {
			Ok(Eligibility::Ineligible(Ineligible::UnencodableSeed {
				seed: seed.to_string(),
				reason,
			}))
		};

		match seed {
			Seed::Const { ty, value } => {
				if let Err(reason) = seed_bytes(ty, value) {
					return unencodable(reason);
				}
			}
			Seed::Arg { ty, path } => {
				if is_multi_segment(path) {
					return Ok(Eligibility::Ineligible(Ineligible::MultiSegmentPath { path: path.clone() }));
				}
				if find_arg(instruction, path).is_none() {
					return Err(unresolved(format!("instruction has no argument `{path}`")));
				}
				if seed_encoding(ty).is_none() {
					return unencodable(SeedError::UnsupportedType { ty: ty.to_string() });
				}
			}
			Seed::Account { path, .. } => {
				if is_multi_segment(path) {
					return Ok(Eligibility::Ineligible(Ineligible::MultiSegmentPath { path: path.clone() }));
				}
				let Some(referenced) = find_account(instruction, path) else {
					return Err(unresolved(format!("instruction has no account `{path}`")));
				};
				if referenced.is_optional {
					return Ok(Eligibility::Ineligible(Ineligible::OptionalAccount {
						account: referenced.name.clone(),
					}));
				}
				if referenced.pda.as_ref().is_some_and(|pda| !pda.is_constant()) {
					return Ok(Eligibility::Ineligible(Ineligible::DependsOnDerivedAccount {
						account: referenced.name.clone(),
					}));
				}
			}
		}
	}

	Ok(Eligibility::Eligible)
}

/// Resolve an all-constant formula to its address at generation time.
///
/// Returns `None` for formulas with runtime seeds.
pub fn resolve_constant_pda(
	formula: &SeedFormula,
	program_address: &[u8; 32],
	instruction: &str,
	account: &str,
) -> Result<Option<String>> {
	if !formula.is_constant() {
		return Ok(None);
	}

	let unresolved = |seed: &Seed, reason: String| {
		RenderError::SeedResolution {
			instruction: instruction.to_string(),
			account: account.to_string(),
			seed: seed.to_string(),
			reason,
		}
	};
	let encode = |seed: &Seed, ty: &TypeDescriptor, value: &SeedValue| {
		seed_bytes(ty, value).map_err(|error| unresolved(seed, error.to_string()))
	};

	let mut seeds = Vec::with_capacity(formula.seeds.len());
	for seed in &formula.seeds {
		if let Seed::Const { ty, value } = seed {
			seeds.push(encode(seed, ty, value)?);
		}
	}

	let program = match &formula.program_id {
		Some(seed @ Seed::Const { ty, value }) => {
			let bytes = encode(seed, ty, value)?;
			<[u8; 32]>::try_from(bytes.as_slice())
				.map_err(|_| unresolved(seed, "program id seeds must be 32 bytes".to_string()))?
		}
		_ => *program_address,
	};

	let seed_refs: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
	let Some((address, bump)) = Address::try_find_program_address(&seed_refs, &Address::new_from_array(program))
	else {
		return Err(RenderError::SeedResolution {
			instruction: instruction.to_string(),
			account: account.to_string(),
			seed: "*".to_string(),
			reason: "no valid program derived address exists for these seeds".to_string(),
		});
	};

	let encoded = bs58::encode(address.as_ref()).into_string();
	tracing::debug!(instruction, account, address = %encoded, bump, "resolved constant PDA");
	Ok(Some(encoded))
}

/// The TypeScript expression deriving `account` at runtime.
///
/// `resolve_account` yields the expression holding a referenced account's
/// address; `program_id` the expression of the program's own address.
pub fn render_pda(
	account: &AccountRef,
	instruction: &InstructionDescriptor,
	resolve_account: &dyn Fn(&AccountRef) -> String,
	program_id: &str,
) -> Result<String> {
	let Some(formula) = &account.pda else {
		return Err(RenderError::SeedResolution {
			instruction: instruction.name.clone(),
			account: account.name.clone(),
			seed: "*".to_string(),
			reason: "account has no seeds".to_string(),
		});
	};

	let seeds = formula
		.seeds
		.iter()
		.map(|seed| seed_expression(seed, account, instruction, resolve_account))
		.collect::<Result<Vec<_>>>()?;

	let program = match &formula.program_id {
		Some(seed) => {
			format!(
				"new web3.PublicKey({})",
				seed_expression(seed, account, instruction, resolve_account)?
			)
		}
		None => program_id.to_string(),
	};

	Ok(format!(
		"web3.PublicKey.findProgramAddressSync(\n      [\n        {},\n      ],\n      {program}\n    )[0]",
		seeds.join(",\n        ")
	))
}

fn seed_expression(
	seed: &Seed,
	account: &AccountRef,
	instruction: &InstructionDescriptor,
	resolve_account: &dyn Fn(&AccountRef) -> String,
) -> Result<String> {
	let unresolved = |reason: String| {
		RenderError::SeedResolution {
			instruction: instruction.name.clone(),
			account: account.name.clone(),
			seed: seed.to_string(),
			reason,
		}
	};

	match seed {
		Seed::Const { ty, value } => {
			let bytes = seed_bytes(ty, value).map_err(|error| unresolved(error.to_string()))?;
			let expression = match (seed_encoding(ty), value) {
				(Some(SeedEncoding::Utf8), SeedValue::Text(text)) => format!("Buffer.from({}, 'utf8')", quote(text)),
				(Some(SeedEncoding::PublicKey), _) => {
					format!("new web3.PublicKey({}).toBuffer()", quote(&encode_address_slice(&bytes)))
				}
				_ => format!("Buffer.from({})", crate::discriminator::byte_list(&bytes)),
			};
			Ok(expression)
		}
		Seed::Arg { ty, path } => {
			if find_arg(instruction, path).is_none() {
				return Err(unresolved(format!("instruction has no argument `{path}`")));
			}
			let value = format!("args.{}", var_name(path));
			let expression = match seed_encoding(ty) {
				Some(SeedEncoding::Integer { width: 1, signed: false }) => format!("Buffer.from([{value}])"),
				Some(SeedEncoding::Integer { width, signed }) => little_endian_buffer(width, &integer_write(width, signed, &value)),
				Some(SeedEncoding::Utf8) => format!("Buffer.from({value}, 'utf8')"),
				Some(SeedEncoding::PublicKey) => format!("{value}.toBuffer()"),
				Some(SeedEncoding::Raw) => format!("Buffer.from({value})"),
				None => return Err(unresolved(format!("seeds of type `{ty}` are not supported"))),
			};
			Ok(expression)
		}
		Seed::Account { path, .. } => {
			let Some(referenced) = find_account(instruction, path) else {
				return Err(unresolved(format!("instruction has no account `{path}`")));
			};
			Ok(format!("{}.toBuffer()", resolve_account(referenced)))
		}
	}
}

/// The `Buffer` write call storing `value` as a little-endian integer.
fn integer_write(width: usize, signed: bool, value: &str) -> String {
	let sign = if signed { "" } else { "U" };
	match width {
		1 => format!("write{sign}Int8({value})"),
		2 => format!("write{sign}Int16LE({value})"),
		4 => format!("write{sign}Int32LE({value})"),
		_ => format!("writeBig{sign}Int64LE(BigInt({value}.toString()))"),
	}
}

fn little_endian_buffer(width: usize, write: &str) -> String {
	format!("(() => {{ const buf = Buffer.alloc({width}); buf.{write}; return buf }})()")
}

fn encode_address_slice(bytes: &[u8]) -> String {
	bs58::encode(bytes).into_string()
}

fn is_multi_segment(path: &str) -> bool {
	path.contains('.')
}

fn find_arg<'a>(instruction: &'a InstructionDescriptor, path: &str) -> Option<&'a crate::descriptor::FieldDescriptor> {
	let wanted = var_name(path);
	instruction.args.iter().find(|arg| var_name(&arg.name) == wanted)
}

fn find_account<'a>(instruction: &'a InstructionDescriptor, path: &str) -> Option<&'a AccountRef> {
	let wanted = var_name(path);
	instruction
		.accounts
		.iter()
		.find(|account| var_name(&account.name) == wanted)
}
