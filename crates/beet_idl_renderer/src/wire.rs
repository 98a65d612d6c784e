//! A reference interpreter of [`Codec`] values.
//!
//! Encodes and decodes dynamic [`Value`]s with exactly the byte layout the
//! generated beet codecs use: little-endian integers, `u32` length prefixes
//! for strings, byte buffers, vectors and maps, a one byte tag for options and
//! enums, and no prefix at all for fixed-size arrays and tuples. The renderer
//! uses it to know the bytes an emitted builder produces without running any
//! TypeScript.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_bigint::Sign;
use thiserror::Error;

use crate::codec::Codec;
use crate::registry::PrimitiveKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
	#[error("unexpected end of input: needed {needed} more bytes, {remaining} remaining")]
	UnexpectedEof { needed: usize, remaining: usize },
	#[error("expected {expected} for codec `{codec}`, found {found}")]
	TypeMismatch {
		codec: String,
		expected: &'static str,
		found: String,
	},
	#[error("value {value} is out of range for `{codec}`")]
	OutOfRange { codec: String, value: String },
	#[error("expected {expected} elements for `{codec}`, found {found}")]
	LengthMismatch {
		codec: String,
		expected: usize,
		found: usize,
	},
	#[error("no layout registered for `{0}`")]
	UnknownType(String),
	#[error("`{ty}` has no variant `{variant}`")]
	UnknownVariant { ty: String, variant: String },
	#[error("`{ty}` has no variant with tag {tag}")]
	InvalidTag { ty: String, tag: u8 },
	#[error("missing field `{field}`")]
	MissingField { field: String },
	#[error("invalid boolean byte {0}")]
	InvalidBool(u8),
	#[error("invalid UTF-8 in string")]
	InvalidUtf8,
}

pub type WireResult<T> = Result<T, WireError>;

/// A decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Int(BigInt),
	Bool(bool),
	Str(String),
	Bytes(Vec<u8>),
	Address([u8; 32]),
	Option(Option<Box<Value>>),
	/// Vectors, fixed-size arrays and tuples.
	Seq(Vec<Value>),
	Map(Vec<(Value, Value)>),
	Struct(Vec<(String, Value)>),
	/// A data enum or scalar enum variant.
	Variant {
		name: String,
		payload: Option<Box<Value>>,
	},
}

impl Value {
	pub fn int(value: impl Into<BigInt>) -> Self {
		Self::Int(value.into())
	}

	pub fn str(value: impl Into<String>) -> Self {
		Self::Str(value.into())
	}

	pub fn some(value: Value) -> Self {
		Self::Option(Some(Box::new(value)))
	}

	pub fn record<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = (S, Value)>,
		S: Into<String>,
	{
		Self::Struct(fields.into_iter().map(|(name, value)| (name.into(), value)).collect())
	}

	pub fn unit_variant(name: impl Into<String>) -> Self {
		Self::Variant {
			name: name.into(),
			payload: None,
		}
	}

	fn describe(&self) -> String {
		match self {
			Self::Int(value) => format!("integer {value}"),
			Self::Bool(_) => "boolean".to_string(),
			Self::Str(_) => "string".to_string(),
			Self::Bytes(_) => "bytes".to_string(),
			Self::Address(_) => "address".to_string(),
			Self::Option(_) => "option".to_string(),
			Self::Seq(items) => format!("sequence of {}", items.len()),
			Self::Map(_) => "map".to_string(),
			Self::Struct(_) => "struct".to_string(),
			Self::Variant { name, .. } => format!("variant `{name}`"),
		}
	}
}

/// Layout of a defined type, referenced by name from [`Codec::Defined`] and
/// [`Codec::ScalarEnum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLayout {
	Struct(Vec<(String, Codec)>),
	/// Variants in tag order; `None` for unit variants.
	DataEnum(Vec<(String, Option<Vec<(String, Codec)>>)>),
	ScalarEnum(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
	layouts: BTreeMap<String, TypeLayout>,
}

impl LayoutTable {
	pub fn insert(&mut self, name: impl Into<String>, layout: TypeLayout) {
		self.layouts.insert(name.into(), layout);
	}

	pub fn get(&self, name: &str) -> Option<&TypeLayout> {
		self.layouts.get(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<TypeLayout> {
		self.layouts.remove(name)
	}

	pub fn len(&self) -> usize {
		self.layouts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.layouts.is_empty()
	}

	fn layout(&self, name: &str) -> WireResult<&TypeLayout> {
		self.get(name).ok_or_else(|| WireError::UnknownType(name.to_string()))
	}
}

/// Encoded size of `codec` when it does not depend on the value.
pub fn byte_size(codec: &Codec, table: &LayoutTable) -> Option<usize> {
	match codec {
		Codec::Primitive(mapping) => mapping.fixed_size(),
		Codec::Option(_) | Codec::Array(_) | Codec::Map(..) => None,
		Codec::FixedArray(inner, len) => byte_size(inner, table).map(|size| size * len),
		Codec::Tuple { elements, .. } => elements.iter().map(|element| byte_size(element, table)).sum(),
		Codec::ScalarEnum(_) => Some(1),
		Codec::Defined { name, .. } => {
			match table.get(name)? {
				TypeLayout::Struct(fields) => fields_byte_size(fields, table),
				TypeLayout::ScalarEnum(_) => Some(1),
				TypeLayout::DataEnum(_) => None,
			}
		}
	}
}

pub fn fields_byte_size(fields: &[(String, Codec)], table: &LayoutTable) -> Option<usize> {
	fields.iter().map(|(_, codec)| byte_size(codec, table)).sum()
}

/// Append the encoding of `value` under `codec` to `out`.
pub fn encode(codec: &Codec, value: &Value, table: &LayoutTable, out: &mut Vec<u8>) -> WireResult<()> {
	let mismatch = |expected: &'static str| {
		WireError::TypeMismatch {
			codec: codec.to_string(),
			expected,
			found: value.describe(),
		}
	};

	match (codec, value) {
		(Codec::Primitive(mapping), _) => {
			match (mapping.kind, value) {
				(PrimitiveKind::Unsigned(bits), Value::Int(int)) => encode_int(int, bits, false, codec, out),
				(PrimitiveKind::Signed(bits), Value::Int(int)) => encode_int(int, bits, true, codec, out),
				(PrimitiveKind::Bool, Value::Bool(flag)) => {
					out.push(u8::from(*flag));
					Ok(())
				}
				(PrimitiveKind::String, Value::Str(text)) => {
					encode_len(text.len(), codec, out)?;
					out.extend_from_slice(text.as_bytes());
					Ok(())
				}
				(PrimitiveKind::Bytes, Value::Bytes(bytes)) => {
					encode_len(bytes.len(), codec, out)?;
					out.extend_from_slice(bytes);
					Ok(())
				}
				(PrimitiveKind::PublicKey, Value::Address(address)) => {
					out.extend_from_slice(address);
					Ok(())
				}
				(kind, _) => Err(mismatch(kind_name(kind))),
			}
		}
		(Codec::Option(inner), Value::Option(option)) => {
			match option {
				None => out.push(0),
				Some(inner_value) => {
					out.push(1);
					encode(inner, inner_value, table, out)?;
				}
			}
			Ok(())
		}
		(Codec::Array(inner), Value::Seq(items)) => {
			encode_len(items.len(), codec, out)?;
			items.iter().try_for_each(|item| encode(inner, item, table, out))
		}
		(Codec::FixedArray(inner, len), Value::Seq(items)) => {
			if items.len() != *len {
				return Err(WireError::LengthMismatch {
					codec: codec.to_string(),
					expected: *len,
					found: items.len(),
				});
			}
			items.iter().try_for_each(|item| encode(inner, item, table, out))
		}
		(Codec::Map(key, value_codec), Value::Map(entries)) => {
			encode_len(entries.len(), codec, out)?;
			for (entry_key, entry_value) in entries {
				encode(key, entry_key, table, out)?;
				encode(value_codec, entry_value, table, out)?;
			}
			Ok(())
		}
		(Codec::Tuple { elements, .. }, Value::Seq(items)) => {
			if items.len() != elements.len() {
				return Err(WireError::LengthMismatch {
					codec: codec.to_string(),
					expected: elements.len(),
					found: items.len(),
				});
			}
			elements
				.iter()
				.zip(items)
				.try_for_each(|(element, item)| encode(element, item, table, out))
		}
		(Codec::ScalarEnum(name), Value::Variant { name: variant, .. }) => {
			let TypeLayout::ScalarEnum(variants) = table.layout(name)? else {
				return Err(WireError::UnknownType(name.clone()));
			};
			out.push(variant_tag(name, variants.iter().map(String::as_str), variant)?);
			Ok(())
		}
		(Codec::Defined { name, .. }, _) => {
			match table.layout(name)? {
				TypeLayout::Struct(fields) => encode_fields(fields, value, table, out),
				TypeLayout::ScalarEnum(variants) => {
					let Value::Variant { name: variant, .. } = value else {
						return Err(mismatch("variant"));
					};
					out.push(variant_tag(name, variants.iter().map(String::as_str), variant)?);
					Ok(())
				}
				TypeLayout::DataEnum(variants) => {
					let Value::Variant { name: variant, payload } = value else {
						return Err(mismatch("variant"));
					};
					let tag = variant_tag(name, variants.iter().map(|(name, _)| name.as_str()), variant)?;
					out.push(tag);
					match (&variants[usize::from(tag)].1, payload) {
						(None, _) => Ok(()),
						(Some(fields), Some(payload)) => encode_fields(fields, payload, table, out),
						(Some(_), None) => Err(mismatch("variant payload")),
					}
				}
			}
		}
		(Codec::Option(_), _) => Err(mismatch("option")),
		(Codec::Array(_) | Codec::FixedArray(..) | Codec::Tuple { .. }, _) => Err(mismatch("sequence")),
		(Codec::Map(..), _) => Err(mismatch("map")),
		(Codec::ScalarEnum(_), _) => Err(mismatch("variant")),
	}
}

/// Encode a struct value field by field in layout order.
pub fn encode_fields(fields: &[(String, Codec)], value: &Value, table: &LayoutTable, out: &mut Vec<u8>) -> WireResult<()> {
	let Value::Struct(values) = value else {
		return Err(WireError::TypeMismatch {
			codec: "struct".to_string(),
			expected: "struct",
			found: value.describe(),
		});
	};

	for (name, codec) in fields {
		let Some((_, field_value)) = values.iter().find(|(field, _)| field == name) else {
			return Err(WireError::MissingField { field: name.clone() });
		};
		encode(codec, field_value, table, out)?;
	}

	Ok(())
}

/// Decode one value from the front of `input`, advancing it.
pub fn decode(codec: &Codec, input: &mut &[u8], table: &LayoutTable) -> WireResult<Value> {
	match codec {
		Codec::Primitive(mapping) => {
			match mapping.kind {
				PrimitiveKind::Unsigned(bits) => {
					let bytes = take(input, usize::from(bits / 8))?;
					Ok(Value::Int(BigInt::from_bytes_le(Sign::Plus, bytes)))
				}
				PrimitiveKind::Signed(bits) => {
					let bytes = take(input, usize::from(bits / 8))?;
					Ok(Value::Int(BigInt::from_signed_bytes_le(bytes)))
				}
				PrimitiveKind::Bool => {
					match take(input, 1)?[0] {
						0 => Ok(Value::Bool(false)),
						1 => Ok(Value::Bool(true)),
						byte => Err(WireError::InvalidBool(byte)),
					}
				}
				PrimitiveKind::String => {
					let len = decode_len(input)?;
					let bytes = take(input, len)?;
					String::from_utf8(bytes.to_vec())
						.map(Value::Str)
						.map_err(|_| WireError::InvalidUtf8)
				}
				PrimitiveKind::Bytes => {
					let len = decode_len(input)?;
					Ok(Value::Bytes(take(input, len)?.to_vec()))
				}
				PrimitiveKind::PublicKey => {
					let mut address = [0u8; 32];
					address.copy_from_slice(take(input, 32)?);
					Ok(Value::Address(address))
				}
			}
		}
		Codec::Option(inner) => {
			match take(input, 1)?[0] {
				0 => Ok(Value::Option(None)),
				_ => Ok(Value::some(decode(inner, input, table)?)),
			}
		}
		Codec::Array(inner) => {
			let len = decode_len(input)?;
			(0..len)
				.map(|_| decode(inner, input, table))
				.collect::<WireResult<Vec<_>>>()
				.map(Value::Seq)
		}
		Codec::FixedArray(inner, len) => {
			(0..*len)
				.map(|_| decode(inner, input, table))
				.collect::<WireResult<Vec<_>>>()
				.map(Value::Seq)
		}
		Codec::Map(key, value) => {
			let len = decode_len(input)?;
			let mut entries = Vec::with_capacity(len.min(1024));
			for _ in 0..len {
				let entry_key = decode(key, input, table)?;
				let entry_value = decode(value, input, table)?;
				entries.push((entry_key, entry_value));
			}
			Ok(Value::Map(entries))
		}
		Codec::Tuple { elements, .. } => {
			elements
				.iter()
				.map(|element| decode(element, input, table))
				.collect::<WireResult<Vec<_>>>()
				.map(Value::Seq)
		}
		Codec::ScalarEnum(name) => decode_scalar(name, input, table),
		Codec::Defined { name, .. } => {
			match table.layout(name)? {
				TypeLayout::Struct(fields) => decode_fields(fields, input, table),
				TypeLayout::ScalarEnum(_) => decode_scalar(name, input, table),
				TypeLayout::DataEnum(variants) => {
					let tag = take(input, 1)?[0];
					let Some((variant, fields)) = variants.get(usize::from(tag)) else {
						return Err(WireError::InvalidTag { ty: name.clone(), tag });
					};
					let payload = match fields {
						None => None,
						Some(fields) => Some(Box::new(decode_fields(fields, input, table)?)),
					};
					Ok(Value::Variant {
						name: variant.clone(),
						payload,
					})
				}
			}
		}
	}
}

pub fn decode_fields(fields: &[(String, Codec)], input: &mut &[u8], table: &LayoutTable) -> WireResult<Value> {
	fields
		.iter()
		.map(|(name, codec)| decode(codec, input, table).map(|value| (name.clone(), value)))
		.collect::<WireResult<Vec<_>>>()
		.map(Value::Struct)
}

fn decode_scalar(name: &str, input: &mut &[u8], table: &LayoutTable) -> WireResult<Value> {
	let TypeLayout::ScalarEnum(variants) = table.layout(name)? else {
		return Err(WireError::UnknownType(name.to_string()));
	};
	let tag = take(input, 1)?[0];
	variants
		.get(usize::from(tag))
		.map(Value::unit_variant)
		.ok_or_else(|| WireError::InvalidTag { ty: name.to_string(), tag })
}

fn take<'a>(input: &mut &'a [u8], len: usize) -> WireResult<&'a [u8]> {
	if input.len() < len {
		return Err(WireError::UnexpectedEof {
			needed: len,
			remaining: input.len(),
		});
	}
	let (head, tail) = input.split_at(len);
	*input = tail;
	Ok(head)
}

fn decode_len(input: &mut &[u8]) -> WireResult<usize> {
	let bytes = take(input, 4)?;
	Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
}

fn encode_len(len: usize, codec: &Codec, out: &mut Vec<u8>) -> WireResult<()> {
	let len = u32::try_from(len).map_err(|_| {
		WireError::OutOfRange {
			codec: codec.to_string(),
			value: len.to_string(),
		}
	})?;
	out.extend_from_slice(&len.to_le_bytes());
	Ok(())
}

fn encode_int(value: &BigInt, bits: u16, signed: bool, codec: &Codec, out: &mut Vec<u8>) -> WireResult<()> {
	let bits = usize::from(bits);
	let (min, max) = if signed {
		(-(BigInt::from(1) << (bits - 1)), BigInt::from(1) << (bits - 1))
	} else {
		(BigInt::from(0), BigInt::from(1) << bits)
	};
	if *value < min || *value >= max {
		return Err(WireError::OutOfRange {
			codec: codec.to_string(),
			value: value.to_string(),
		});
	}

	let width = bits / 8;
	let mut bytes = value.to_signed_bytes_le();
	let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
	bytes.resize(width.max(bytes.len()), fill);
	out.extend_from_slice(&bytes[..width]);
	Ok(())
}

fn variant_tag<'a>(ty: &str, mut variants: impl Iterator<Item = &'a str>, variant: &str) -> WireResult<u8> {
	variants
		.position(|name| name == variant)
		.and_then(|index| u8::try_from(index).ok())
		.ok_or_else(|| {
			WireError::UnknownVariant {
				ty: ty.to_string(),
				variant: variant.to_string(),
			}
		})
}

fn kind_name(kind: PrimitiveKind) -> &'static str {
	match kind {
		PrimitiveKind::Unsigned(_) | PrimitiveKind::Signed(_) => "integer",
		PrimitiveKind::Bool => "boolean",
		PrimitiveKind::String => "string",
		PrimitiveKind::Bytes => "bytes",
		PrimitiveKind::PublicKey => "address",
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::registry::lookup;

	fn primitive(token: &str) -> Codec {
		Codec::Primitive(lookup(token).unwrap_or_else(|| panic!("missing primitive {token}")))
	}

	fn encoded(codec: &Codec, value: &Value, table: &LayoutTable) -> Vec<u8> {
		let mut out = Vec::new();
		encode(codec, value, table, &mut out).unwrap_or_else(|e| panic!("encode failed: {e}"));
		out
	}

	fn round_trip(codec: &Codec, value: &Value, table: &LayoutTable) -> Value {
		let bytes = encoded(codec, value, table);
		let mut input = bytes.as_slice();
		let decoded = decode(codec, &mut input, table).unwrap_or_else(|e| panic!("decode failed: {e}"));
		assert!(input.is_empty(), "trailing bytes after decoding");
		decoded
	}

	#[test]
	fn integers_are_little_endian() {
		let table = LayoutTable::default();
		assert_eq!(encoded(&primitive("u16"), &Value::int(0x0102), &table), vec![0x02, 0x01]);
		assert_eq!(encoded(&primitive("u64"), &Value::int(1_000u64), &table), vec![0xe8, 0x03, 0, 0, 0, 0, 0, 0]);
		assert_eq!(encoded(&primitive("i16"), &Value::int(-2), &table), vec![0xfe, 0xff]);
		assert_eq!(encoded(&primitive("i8"), &Value::int(-128), &table), vec![0x80]);

		let error = encode(&primitive("u8"), &Value::int(256), &table, &mut Vec::new()).err();
		assert!(matches!(error, Some(WireError::OutOfRange { .. })));
		let error = encode(&primitive("i8"), &Value::int(128), &table, &mut Vec::new()).err();
		assert!(matches!(error, Some(WireError::OutOfRange { .. })));
	}

	#[test]
	fn variable_length_values_carry_u32_prefixes() {
		let table = LayoutTable::default();
		assert_eq!(encoded(&primitive("string"), &Value::str("hi"), &table), vec![2, 0, 0, 0, b'h', b'i']);

		let vec = Codec::Array(Box::new(primitive("u8")));
		assert_eq!(
			encoded(&vec, &Value::Seq(vec![Value::int(7), Value::int(9)]), &table),
			vec![2, 0, 0, 0, 7, 9]
		);

		let option = Codec::Option(Box::new(primitive("u16")));
		assert_eq!(encoded(&option, &Value::Option(None), &table), vec![0]);
		assert_eq!(encoded(&option, &Value::some(Value::int(1)), &table), vec![1, 1, 0]);

		let fixed = Codec::FixedArray(Box::new(primitive("u8")), 3);
		assert_eq!(
			encoded(&fixed, &Value::Seq(vec![Value::int(1), Value::int(2), Value::int(3)]), &table),
			vec![1, 2, 3]
		);
		assert_eq!(byte_size(&fixed, &table), Some(3));
		assert_eq!(byte_size(&option, &table), None);
	}

	#[test]
	fn defined_types_resolve_through_the_table() {
		let mut table = LayoutTable::default();
		table.insert("Side", TypeLayout::ScalarEnum(vec!["Bid".to_string(), "Ask".to_string()]));
		table.insert(
			"Order",
			TypeLayout::Struct(vec![
				("side".to_string(), Codec::ScalarEnum("Side".to_string())),
				("price".to_string(), primitive("u32")),
			]),
		);
		table.insert(
			"Event",
			TypeLayout::DataEnum(vec![
				("Cancelled".to_string(), None),
				(
					"Filled".to_string(),
					Some(vec![("order".to_string(), Codec::Defined {
						name: "Order".to_string(),
						fixable: false,
					})]),
				),
			]),
		);

		let order = Value::record([("side", Value::unit_variant("Ask")), ("price", Value::int(5))]);
		let order_codec = Codec::Defined {
			name: "Order".to_string(),
			fixable: false,
		};
		assert_eq!(encoded(&order_codec, &order, &table), vec![1, 5, 0, 0, 0]);
		assert_eq!(byte_size(&order_codec, &table), Some(5));

		let event_codec = Codec::Defined {
			name: "Event".to_string(),
			fixable: true,
		};
		let filled = Value::Variant {
			name: "Filled".to_string(),
			payload: Some(Box::new(Value::record([("order", order)]))),
		};
		assert_eq!(encoded(&event_codec, &filled, &table), vec![1, 1, 5, 0, 0, 0]);
		assert_eq!(round_trip(&event_codec, &filled, &table), filled);
		assert_eq!(encoded(&event_codec, &Value::unit_variant("Cancelled"), &table), vec![0]);
		assert_eq!(byte_size(&event_codec, &table), None);

		let error = encode(&event_codec, &Value::unit_variant("Missing"), &table, &mut Vec::new()).err();
		assert!(matches!(error, Some(WireError::UnknownVariant { .. })));
	}

	#[test]
	fn truncated_input_is_reported() {
		let table = LayoutTable::default();
		let mut input: &[u8] = &[1, 2];
		let error = decode(&primitive("u32"), &mut input, &table).err();
		assert_eq!(error, Some(WireError::UnexpectedEof { needed: 4, remaining: 2 }));
	}

	#[test]
	fn missing_struct_fields_are_reported() {
		let fields = vec![("amount".to_string(), primitive("u64"))];
		let error = encode_fields(&fields, &Value::record(Vec::<(String, Value)>::new()), &LayoutTable::default(), &mut Vec::new()).err();
		assert_eq!(error, Some(WireError::MissingField { field: "amount".to_string() }));
	}

	proptest! {
		#[test]
		fn map_values_round_trip(entries in proptest::collection::vec((any::<u16>(), ".{0,12}"), 0..8), flag in any::<bool>()) {
			let table = LayoutTable::default();
			let codec = Codec::Tuple {
				elements: vec![
					Codec::Map(Box::new(primitive("u16")), Box::new(primitive("string"))),
					primitive("bool"),
				],
				fixable: true,
			};
			let value = Value::Seq(vec![
				Value::Map(entries.into_iter().map(|(key, text)| (Value::int(key), Value::Str(text))).collect()),
				Value::Bool(flag),
			]);
			prop_assert_eq!(round_trip(&codec, &value, &table), value);
		}

		#[test]
		fn coption_values_round_trip(amount in proptest::option::of(any::<u64>()), label in proptest::option::of(".{0,12}")) {
			let table = LayoutTable::default();
			let codec = Codec::Tuple {
				elements: vec![
					Codec::Option(Box::new(primitive("u64"))),
					Codec::Option(Box::new(primitive("string"))),
				],
				fixable: true,
			};
			let value = Value::Seq(vec![
				Value::Option(amount.map(|amount| Box::new(Value::int(amount)))),
				Value::Option(label.map(|label| Box::new(Value::Str(label)))),
			]);

			let bytes = encoded(&codec, &value, &table);
			prop_assert_eq!(bytes[0], u8::from(amount.is_some()));
			if let Some(amount) = amount {
				prop_assert_eq!(&bytes[1..9], &amount.to_le_bytes());
			}
			prop_assert_eq!(round_trip(&codec, &value, &table), value);
		}

		#[test]
		fn signed_integers_round_trip(value in any::<i64>(), small in any::<i16>()) {
			let table = LayoutTable::default();
			let codec = Codec::Tuple { elements: vec![primitive("i64"), primitive("i128"), primitive("i16")], fixable: false };
			let value = Value::Seq(vec![Value::int(value), Value::int(i128::from(value) * 3), Value::int(small)]);
			prop_assert_eq!(byte_size(&codec, &table), Some(26));
			prop_assert_eq!(round_trip(&codec, &value, &table), value);
		}
	}
}
