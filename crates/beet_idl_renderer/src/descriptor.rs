//! Lowered program description.
//!
//! The IDL JSON is parsed into [`crate::idl`] and then lowered into these
//! types, which are what every renderer consumes. All type references are
//! closed [`TypeDescriptor`] values.

use std::fmt;

/// A type reference as found on a field, argument or seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
	Primitive(String),
	Option(Box<TypeDescriptor>),
	COption(Box<TypeDescriptor>),
	Vector(Box<TypeDescriptor>),
	FixedArray(Box<TypeDescriptor>, usize),
	HashMap(Box<TypeDescriptor>, Box<TypeDescriptor>),
	BTreeMap(Box<TypeDescriptor>, Box<TypeDescriptor>),
	Tuple(Vec<TypeDescriptor>),
	Defined(String),
}

impl TypeDescriptor {
	pub fn primitive(token: &str) -> Self {
		Self::Primitive(token.to_string())
	}

	/// Names of every defined type this descriptor references, in order of
	/// appearance.
	pub fn defined_references(&self) -> Vec<&str> {
		let mut names = Vec::new();
		self.collect_references(&mut names);
		names
	}

	fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
		match self {
			// A primitive token that is not a known primitive may still name a
			// defined type.
			Self::Primitive(name) | Self::Defined(name) => names.push(name),
			Self::Option(inner)
			| Self::COption(inner)
			| Self::Vector(inner)
			| Self::FixedArray(inner, _) => inner.collect_references(names),
			Self::HashMap(key, value) | Self::BTreeMap(key, value) => {
				key.collect_references(names);
				value.collect_references(names);
			}
			Self::Tuple(elements) => {
				for element in elements {
					element.collect_references(names);
				}
			}
		}
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(name) | Self::Defined(name) => f.write_str(name),
			Self::Option(inner) => write!(f, "Option<{inner}>"),
			Self::COption(inner) => write!(f, "COption<{inner}>"),
			Self::Vector(inner) => write!(f, "Vec<{inner}>"),
			Self::FixedArray(inner, len) => write!(f, "[{inner}; {len}]"),
			Self::HashMap(key, value) => write!(f, "HashMap<{key}, {value}>"),
			Self::BTreeMap(key, value) => write!(f, "BTreeMap<{key}, {value}>"),
			Self::Tuple(elements) => {
				f.write_str("(")?;
				for (index, element) in elements.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{element}")?;
				}
				f.write_str(")")
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: String,
	pub ty: TypeDescriptor,
	pub docs: Vec<String>,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
		Self {
			name: name.into(),
			ty,
			docs: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
	pub name: String,
	pub fields: Vec<FieldDescriptor>,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantFields {
	Unit,
	Named(Vec<FieldDescriptor>),
	Tuple(Vec<TypeDescriptor>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
	pub name: String,
	pub fields: VariantFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
	pub name: String,
	pub variants: Vec<VariantDescriptor>,
	pub docs: Vec<String>,
}

impl EnumDescriptor {
	/// An enum whose variants carry no payload is encoded as a single byte.
	pub fn is_scalar(&self) -> bool {
		self.variants
			.iter()
			.all(|variant| variant.fields == VariantFields::Unit)
	}

	pub fn variant_names(&self) -> Vec<String> {
		self.variants
			.iter()
			.map(|variant| variant.name.clone())
			.collect()
	}
}

/// A user defined type from the IDL `types` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
	Struct(StructDescriptor),
	Enum(EnumDescriptor),
}

impl TypeDefinition {
	pub fn name(&self) -> &str {
		match self {
			Self::Struct(definition) => &definition.name,
			Self::Enum(definition) => &definition.name,
		}
	}

	pub fn docs(&self) -> &[String] {
		match self {
			Self::Struct(definition) => &definition.docs,
			Self::Enum(definition) => &definition.docs,
		}
	}

	/// Every type descriptor appearing in the definition, in declaration
	/// order.
	pub fn field_types(&self) -> Vec<&TypeDescriptor> {
		match self {
			Self::Struct(definition) => definition.fields.iter().map(|field| &field.ty).collect(),
			Self::Enum(definition) => {
				definition
					.variants
					.iter()
					.flat_map(|variant| {
						match &variant.fields {
							VariantFields::Unit => Vec::new(),
							VariantFields::Named(fields) => fields.iter().map(|field| &field.ty).collect(),
							VariantFields::Tuple(types) => types.iter().collect(),
						}
					})
					.collect()
			}
		}
	}
}

/// A constant seed value as declared in the IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedValue {
	Number(u64),
	/// A negative integer; non-negative numbers are always [`Self::Number`].
	Signed(i64),
	Text(String),
	Bytes(Vec<u8>),
	/// Any other JSON value, kept verbatim so the account can be reported
	/// and left to the caller.
	Unsupported(String),
}

impl fmt::Display for SeedValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(value) => write!(f, "{value}"),
			Self::Signed(value) => write!(f, "{value}"),
			Self::Text(value) => write!(f, "\"{value}\""),
			Self::Bytes(bytes) => write!(f, "{bytes:?}"),
			Self::Unsupported(raw) => f.write_str(raw),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
	Const { ty: TypeDescriptor, value: SeedValue },
	Arg { ty: TypeDescriptor, path: String },
	Account { ty: TypeDescriptor, path: String },
}

impl Seed {
	pub fn ty(&self) -> &TypeDescriptor {
		match self {
			Self::Const { ty, .. } | Self::Arg { ty, .. } | Self::Account { ty, .. } => ty,
		}
	}

	pub fn is_const(&self) -> bool {
		matches!(self, Self::Const { .. })
	}
}

impl fmt::Display for Seed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Const { value, .. } => write!(f, "const {value}"),
			Self::Arg { path, .. } => write!(f, "arg {path}"),
			Self::Account { path, .. } => write!(f, "account {path}"),
		}
	}
}

/// The recipe for a derived account address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFormula {
	pub seeds: Vec<Seed>,
	/// Overrides the deriving program; defaults to the program itself.
	pub program_id: Option<Seed>,
}

impl SeedFormula {
	pub fn all_seeds(&self) -> impl Iterator<Item = &Seed> {
		self.seeds.iter().chain(self.program_id.as_ref())
	}

	pub fn is_constant(&self) -> bool {
		self.all_seeds().all(Seed::is_const)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AccountRef {
	pub name: String,
	pub is_mut: bool,
	pub is_signer: bool,
	pub is_optional: bool,
	pub pda: Option<SeedFormula>,
	pub docs: Vec<String>,
}

/// A discriminant value written literally by the IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminantValue {
	Number(u64),
	Bytes(Vec<u8>),
}

/// An explicit discriminant declared on a Shank instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitDiscriminant {
	pub ty: TypeDescriptor,
	pub value: DiscriminantValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDescriptor {
	pub name: String,
	pub accounts: Vec<AccountRef>,
	pub args: Vec<FieldDescriptor>,
	pub discriminant: Option<ExplicitDiscriminant>,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDescriptor {
	pub name: String,
	pub fields: Vec<FieldDescriptor>,
	/// Anchor accounts carry a hashed 8-byte prefix; Shank accounts declare
	/// their own key field.
	pub has_implicit_discriminator: bool,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
	pub code: u32,
	pub name: String,
	pub message: String,
}

/// Which IDL producer emitted the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
	#[default]
	Anchor,
	Shank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDescriptor {
	pub name: String,
	pub version: String,
	pub address: Option<String>,
	pub dialect: Dialect,
	pub instructions: Vec<InstructionDescriptor>,
	pub accounts: Vec<AccountDescriptor>,
	pub types: Vec<TypeDefinition>,
	pub errors: Vec<ErrorDescriptor>,
}
