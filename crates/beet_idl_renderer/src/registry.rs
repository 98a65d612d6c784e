//! Static primitive tables.
//!
//! Every primitive token an IDL may use maps to exactly one entry: the
//! TypeScript type a value of it has at runtime, the codec that reads and
//! writes it, the package both come from, and its encoded width. Two tables
//! are consulted in order: the core numeric/text table served by `beet` and
//! the address table served by `beet-solana`.

use serde::Deserialize;
use serde::Serialize;

/// A TypeScript package the emitted code may import.
///
/// The declaration order is the order imports are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Package {
	SolanaWeb3,
	SplToken,
	Beet,
	BeetSolana,
}

impl Package {
	/// The npm module specifier.
	pub const fn module(self) -> &'static str {
		match self {
			Self::SolanaWeb3 => "@solana/web3.js",
			Self::SplToken => "@solana/spl-token",
			Self::Beet => "@metaplex-foundation/beet",
			Self::BeetSolana => "@metaplex-foundation/beet-solana",
		}
	}

	/// The namespace identifier the module is imported as.
	pub const fn namespace(self) -> &'static str {
		match self {
			Self::SolanaWeb3 => "web3",
			Self::SplToken => "splToken",
			Self::Beet => "beet",
			Self::BeetSolana => "beetSolana",
		}
	}

	pub fn import_statement(self) -> String {
		format!("import * as {} from '{}'", self.namespace(), self.module())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
	Unsigned(u16),
	Signed(u16),
	Bool,
	String,
	Bytes,
	PublicKey,
}

/// One row of a primitive table.
#[derive(Debug, PartialEq, Eq)]
pub struct PrimitiveMapping {
	/// The token as written in the IDL.
	pub token: &'static str,
	pub kind: PrimitiveKind,
	/// Fully qualified TypeScript type, e.g. `number` or `beet.bignum`.
	pub ts_type: &'static str,
	/// Package the TypeScript type lives in, `None` for builtins.
	pub ts_package: Option<Package>,
	/// Export name of the codec inside `codec_package`.
	pub codec: &'static str,
	pub codec_package: Package,
}

impl PrimitiveMapping {
	/// Encoded width in bytes, `None` for variable-length primitives.
	pub const fn fixed_size(&self) -> Option<usize> {
		match self.kind {
			PrimitiveKind::Unsigned(bits) | PrimitiveKind::Signed(bits) => Some(bits as usize / 8),
			PrimitiveKind::Bool => Some(1),
			PrimitiveKind::PublicKey => Some(32),
			PrimitiveKind::String | PrimitiveKind::Bytes => None,
		}
	}

	pub const fn is_fixable(&self) -> bool {
		self.fixed_size().is_none()
	}

	/// Whether the primitive is an integer that does not fit a JavaScript
	/// `number` and is therefore represented as `beet.bignum`.
	pub const fn is_bignum(&self) -> bool {
		match self.kind {
			PrimitiveKind::Unsigned(bits) | PrimitiveKind::Signed(bits) => bits > 32,
			_ => false,
		}
	}

	/// The codec expression, e.g. `beet.u64`.
	pub fn codec_expression(&self) -> String {
		format!("{}.{}", self.codec_package.namespace(), self.codec)
	}
}

const fn unsigned(token: &'static str, bits: u16) -> PrimitiveMapping {
	integer(token, PrimitiveKind::Unsigned(bits), bits)
}

const fn signed(token: &'static str, bits: u16) -> PrimitiveMapping {
	integer(token, PrimitiveKind::Signed(bits), bits)
}

const fn integer(token: &'static str, kind: PrimitiveKind, bits: u16) -> PrimitiveMapping {
	let wide = bits > 32;
	PrimitiveMapping {
		token,
		kind,
		ts_type: if wide { "beet.bignum" } else { "number" },
		ts_package: if wide { Some(Package::Beet) } else { None },
		codec: token,
		codec_package: Package::Beet,
	}
}

const CORE: &[PrimitiveMapping] = &[
	unsigned("u8", 8),
	unsigned("u16", 16),
	unsigned("u32", 32),
	unsigned("u64", 64),
	unsigned("u128", 128),
	unsigned("u256", 256),
	unsigned("u512", 512),
	signed("i8", 8),
	signed("i16", 16),
	signed("i32", 32),
	signed("i64", 64),
	signed("i128", 128),
	signed("i256", 256),
	signed("i512", 512),
	PrimitiveMapping {
		token: "bool",
		kind: PrimitiveKind::Bool,
		ts_type: "boolean",
		ts_package: None,
		codec: "bool",
		codec_package: Package::Beet,
	},
	PrimitiveMapping {
		token: "string",
		kind: PrimitiveKind::String,
		ts_type: "string",
		ts_package: None,
		codec: "utf8String",
		codec_package: Package::Beet,
	},
	PrimitiveMapping {
		token: "bytes",
		kind: PrimitiveKind::Bytes,
		ts_type: "Uint8Array",
		ts_package: None,
		codec: "bytes",
		codec_package: Package::Beet,
	},
];

const ADDRESS: &[PrimitiveMapping] = &[
	PrimitiveMapping {
		token: "publicKey",
		kind: PrimitiveKind::PublicKey,
		ts_type: "web3.PublicKey",
		ts_package: Some(Package::SolanaWeb3),
		codec: "publicKey",
		codec_package: Package::BeetSolana,
	},
	PrimitiveMapping {
		token: "pubkey",
		kind: PrimitiveKind::PublicKey,
		ts_type: "web3.PublicKey",
		ts_package: Some(Package::SolanaWeb3),
		codec: "publicKey",
		codec_package: Package::BeetSolana,
	},
];

/// Look up a primitive by its exact token.
pub fn lookup(token: &str) -> Option<&'static PrimitiveMapping> {
	CORE.iter().chain(ADDRESS).find(|mapping| mapping.token == token)
}

pub fn is_primitive(token: &str) -> bool {
	lookup(token).is_some()
}

/// Comma separated list of every supported token, for diagnostics.
pub fn supported_tokens() -> String {
	CORE.iter()
		.chain(ADDRESS)
		.map(|mapping| mapping.token)
		.collect::<Vec<_>>()
		.join(", ")
}
