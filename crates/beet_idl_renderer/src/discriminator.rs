//! Discriminator prefixes for instruction data and account data.
//!
//! Anchor programs identify an instruction by the first 8 bytes of
//! `sha256("global:<snake_case name>")` and an account by the first 8 bytes
//! of `sha256("account:<PascalCase name>")`. Shank programs declare an
//! explicit literal discriminant per instruction instead.

use sha2::Digest;
use sha2::Sha256;

use crate::descriptor::Dialect;
use crate::descriptor::DiscriminantValue;
use crate::descriptor::ExplicitDiscriminant;
use crate::descriptor::InstructionDescriptor;
use crate::descriptor::TypeDescriptor;
use crate::error::RenderError;
use crate::error::Result;
use crate::naming::snake_name;
use crate::naming::type_name;
use crate::registry;
use crate::registry::PrimitiveKind;
use crate::type_mapper::MappedField;
use crate::type_mapper::TypeMapper;

pub const DISCRIMINATOR_LEN: usize = 8;
pub const INSTRUCTION_NAMESPACE: &str = "global";
pub const ACCOUNT_NAMESPACE: &str = "account";
pub const INSTRUCTION_DISCRIMINATOR_FIELD: &str = "instructionDiscriminator";
pub const ACCOUNT_DISCRIMINATOR_FIELD: &str = "accountDiscriminator";

/// First 8 bytes of `sha256("<namespace>:<name>")`.
pub fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
	let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
	let mut prefix = [0u8; DISCRIMINATOR_LEN];
	prefix.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
	prefix
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
	sighash(INSTRUCTION_NAMESPACE, &snake_name(name))
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
	sighash(ACCOUNT_NAMESPACE, &type_name(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminator {
	Hashed([u8; DISCRIMINATOR_LEN]),
	Explicit(ExplicitDiscriminant),
}

impl Discriminator {
	/// The discriminator written in front of an instruction's arguments.
	pub fn for_instruction(instruction: &InstructionDescriptor, dialect: Dialect) -> Result<Self> {
		match (&instruction.discriminant, dialect) {
			(Some(discriminant), _) => Self::explicit(discriminant.clone(), &instruction.name),
			(None, Dialect::Anchor) => Ok(Self::Hashed(instruction_discriminator(&instruction.name))),
			(None, Dialect::Shank) => {
				Err(RenderError::InvalidDiscriminator {
					entity: instruction.name.clone(),
					reason: "shank instructions must declare a discriminant".to_string(),
				})
			}
		}
	}

	pub fn for_account(name: &str) -> Self {
		Self::Hashed(account_discriminator(name))
	}

	/// Validate an explicit discriminant: an unsigned integer primitive or a
	/// `[u8; 8]` array, with a value that fits.
	pub fn explicit(discriminant: ExplicitDiscriminant, entity: &str) -> Result<Self> {
		let invalid = |reason: String| {
			RenderError::InvalidDiscriminator {
				entity: entity.to_string(),
				reason,
			}
		};

		match (&discriminant.ty, &discriminant.value) {
			(TypeDescriptor::Primitive(token), DiscriminantValue::Number(value)) => {
				let Some(mapping) = registry::lookup(token) else {
					return Err(invalid(format!("`{token}` is not a primitive type")));
				};
				let PrimitiveKind::Unsigned(bits) = mapping.kind else {
					return Err(invalid(format!("`{token}` is not an unsigned integer")));
				};
				if bits > 64 {
					return Err(invalid(format!("`{token}` is wider than 64 bits")));
				}
				if bits < 64 && *value >= 1u64 << bits {
					return Err(invalid(format!("value {value} does not fit in `{token}`")));
				}
			}
			(TypeDescriptor::FixedArray(inner, len), DiscriminantValue::Bytes(bytes))
				if **inner == TypeDescriptor::primitive("u8") && *len == DISCRIMINATOR_LEN =>
			{
				if bytes.len() != DISCRIMINATOR_LEN {
					return Err(invalid(format!(
						"expected {DISCRIMINATOR_LEN} bytes, found {}",
						bytes.len()
					)));
				}
			}
			(ty, _) => {
				return Err(invalid(format!(
					"discriminant of type `{ty}` must be an unsigned integer or `[u8; {DISCRIMINATOR_LEN}]`"
				)));
			}
		}

		Ok(Self::Explicit(discriminant))
	}

	/// The exact bytes the discriminator occupies on the wire.
	pub fn bytes(&self) -> Vec<u8> {
		match self {
			Self::Hashed(bytes) => bytes.to_vec(),
			Self::Explicit(ExplicitDiscriminant {
				ty,
				value: DiscriminantValue::Number(value),
			}) => {
				let width = match ty {
					TypeDescriptor::Primitive(token) => {
						registry::lookup(token)
							.and_then(registry::PrimitiveMapping::fixed_size)
							.unwrap_or(1)
					}
					_ => 1,
				};
				value.to_le_bytes()[..width.min(8)].to_vec()
			}
			Self::Explicit(ExplicitDiscriminant {
				value: DiscriminantValue::Bytes(bytes),
				..
			}) => bytes.clone(),
		}
	}

	/// The TypeScript literal, e.g. `[175, 175, 109, 31, 13, 152, 155, 237]`.
	pub fn literal(&self) -> String {
		match self {
			Self::Hashed(bytes) => byte_list(bytes),
			Self::Explicit(ExplicitDiscriminant {
				value: DiscriminantValue::Number(value),
				..
			}) => value.to_string(),
			Self::Explicit(ExplicitDiscriminant {
				value: DiscriminantValue::Bytes(bytes),
				..
			}) => byte_list(bytes),
		}
	}

	/// Map the discriminator as the hidden leading struct field `name`.
	pub fn field(&self, name: &str, mapper: &mut TypeMapper<'_>) -> Result<MappedField> {
		let ty = match self {
			Self::Hashed(_) => {
				TypeDescriptor::FixedArray(Box::new(TypeDescriptor::primitive("u8")), DISCRIMINATOR_LEN)
			}
			Self::Explicit(discriminant) => discriminant.ty.clone(),
		};
		let mapped = mapper.map(&ty, name)?;
		Ok(MappedField::new(name, mapped))
	}
}

pub fn byte_list(bytes: &[u8]) -> String {
	let items: Vec<String> = bytes.iter().map(u8::to_string).collect();
	format!("[{}]", items.join(", "))
}
