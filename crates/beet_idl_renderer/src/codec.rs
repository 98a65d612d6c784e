//! Structured TypeScript types and codec expressions.
//!
//! Both are built as values first and only turned into text through
//! [`Display`](std::fmt::Display), so the mapper never has to parse its own
//! output to learn what it produced.

use std::fmt;

use crate::naming::codec_var_name;
use crate::naming::type_name;
use crate::registry::PrimitiveMapping;

/// The TypeScript type of a decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
	Primitive(&'static PrimitiveMapping),
	/// A defined type exported from another generated module.
	Named(String),
	Option(Box<TsType>),
	Array(Box<TsType>),
	FixedArray(Box<TsType>, usize),
	Map(Box<TsType>, Box<TsType>),
	Tuple(Vec<TsType>),
}

impl fmt::Display for TsType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(mapping) => f.write_str(mapping.ts_type),
			Self::Named(name) => f.write_str(&type_name(name)),
			Self::Option(inner) => write!(f, "beet.COption<{inner}>"),
			Self::Array(inner) => write!(f, "{inner}[]"),
			Self::FixedArray(inner, len) => write!(f, "{inner}[] /* size: {len} */"),
			Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
			Self::Tuple(elements) => {
				f.write_str("[")?;
				write_joined(f, elements)?;
				f.write_str("]")
			}
		}
	}
}

/// A codec expression over the beet combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codec {
	Primitive(&'static PrimitiveMapping),
	Option(Box<Codec>),
	Array(Box<Codec>),
	FixedArray(Box<Codec>, usize),
	Map(Box<Codec>, Box<Codec>),
	Tuple { elements: Vec<Codec>, fixable: bool },
	/// A payload-less enum encoded as a single byte.
	ScalarEnum(String),
	/// The exported codec of a struct, data enum or account.
	Defined { name: String, fixable: bool },
}

impl Codec {
	/// Whether the encoded size depends on the value.
	pub fn is_fixable(&self) -> bool {
		match self {
			Self::Primitive(mapping) => mapping.is_fixable(),
			Self::Option(_) | Self::Array(_) | Self::Map(..) => true,
			Self::FixedArray(inner, _) => inner.is_fixable(),
			Self::Tuple { fixable, .. } | Self::Defined { fixable, .. } => *fixable,
			Self::ScalarEnum(_) => false,
		}
	}
}

impl fmt::Display for Codec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(mapping) => f.write_str(&mapping.codec_expression()),
			Self::Option(inner) => write!(f, "beet.coption({inner})"),
			Self::Array(inner) => write!(f, "beet.array({inner})"),
			Self::FixedArray(inner, len) => write!(f, "beet.uniformFixedSizeArray({inner}, {len})"),
			Self::Map(key, value) => write!(f, "beet.map({key}, {value})"),
			Self::Tuple { elements, fixable } => {
				let combinator = if *fixable { "tuple" } else { "fixedSizeTuple" };
				write!(f, "beet.{combinator}([")?;
				write_joined(f, elements)?;
				f.write_str("])")
			}
			Self::ScalarEnum(name) => write!(f, "beet.fixedScalarEnum({})", type_name(name)),
			Self::Defined { name, .. } => f.write_str(&codec_var_name(name)),
		}
	}
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
	for (index, item) in items.iter().enumerate() {
		if index > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{item}")?;
	}
	Ok(())
}
