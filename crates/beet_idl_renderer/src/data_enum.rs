//! Tagged unions whose variants carry payloads.
//!
//! The union is modelled as a record type keyed by variant name and turned
//! into a discriminated union with `beet.DataEnumKeyAsKind`, which adds the
//! hidden `__kind` property the generated guards narrow on. Each variant is
//! mapped with its own forked accumulator so that one variable-size variant
//! does not force its fixed-size siblings into the fixable constructor.

use std::fmt::Write as _;

use crate::beet_struct::StructCodec;
use crate::beet_struct::StructKind;
use crate::beet_struct::StructOwner;
use crate::beet_struct::render_struct;
use crate::codec::Codec;
use crate::codec::TsType;
use crate::descriptor::VariantDescriptor;
use crate::descriptor::VariantFields;
use crate::error::Result;
use crate::naming::codec_var_name;
use crate::naming::quote;
use crate::naming::type_name;
use crate::registry::Package;
use crate::type_mapper::MappedField;
use crate::type_mapper::TypeMapper;

/// Name of the single property positional variants are wrapped in.
pub const TUPLE_FIELDS: &str = "fields";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantPayload {
	Unit,
	Struct(StructCodec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVariant {
	pub name: String,
	pub payload: VariantPayload,
	/// Whether this variant alone needs the fixable struct constructor.
	pub fixable: bool,
}

impl RenderedVariant {
	/// Name and codec pairs of the payload, empty for unit variants.
	pub fn layout(&self) -> Option<Vec<(String, Codec)>> {
		match &self.payload {
			VariantPayload::Unit => None,
			VariantPayload::Struct(codec) => Some(codec.layout()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDataEnum {
	pub name: String,
	pub variants: Vec<RenderedVariant>,
	/// OR of the per-variant fixable flags.
	pub any_variant_fixable: bool,
}

impl RenderedDataEnum {
	pub fn type_name(&self) -> String {
		type_name(&self.name)
	}

	pub fn record_name(&self) -> String {
		format!("{}Record", self.type_name())
	}

	pub fn guard_name(&self, variant: &str) -> String {
		format!("is{}{}", self.type_name(), type_name(variant))
	}

	pub fn var_name(&self) -> String {
		codec_var_name(&self.name)
	}

	/// The record type and the union derived from it.
	pub fn render_types(&self) -> String {
		let record = self.record_name();
		let mut code = format!("export type {record} = {{\n");
		for variant in &self.variants {
			match &variant.payload {
				VariantPayload::Unit => {
					let _ = writeln!(code, "  {}: void /* scalar variant */", variant.name);
				}
				VariantPayload::Struct(codec) => {
					let properties: Vec<String> = codec
						.fields
						.iter()
						.map(|field| format!("{}: {}", field.name, field.ts))
						.collect();
					let _ = writeln!(code, "  {}: {{ {} }}", variant.name, properties.join(", "));
				}
			}
		}
		code.push_str("}\n\n");
		let _ = writeln!(
			code,
			"export type {} = beet.DataEnumKeyAsKind<{record}>",
			self.type_name()
		);
		code
	}

	/// One narrowing guard per variant.
	pub fn render_guards(&self) -> String {
		let name = self.type_name();
		let mut code = String::new();
		for variant in &self.variants {
			let kind = quote(&variant.name);
			let _ = writeln!(
				code,
				"export const {} = (\n  x: {name}\n): x is {name} & {{ __kind: {kind} }} => x.__kind === {kind}",
				self.guard_name(&variant.name)
			);
		}
		code
	}

	/// The union codec. `beet.dataEnum` only exists in a fixable form.
	pub fn render_codec(&self) -> String {
		let record = self.record_name();
		let name = self.type_name();
		let mut code = format!("export const {} = beet.dataEnum<{record}>([\n", self.var_name());
		for variant in &self.variants {
			match &variant.payload {
				VariantPayload::Unit => {
					let _ = writeln!(code, "  [{}, beet.unit],", quote(&variant.name));
				}
				VariantPayload::Struct(codec) => {
					let _ = writeln!(code, "  [\n    {},", quote(&variant.name));
					let _ = writeln!(
						code,
						"    new beet.{}<{record}[{}]>(",
						codec.constructor(),
						quote(&variant.name)
					);
					code.push_str("      [\n");
					for field in codec.codec_fields() {
						let _ = writeln!(code, "        [{}, {}],", quote(&field.name), field.codec);
					}
					code.push_str("      ],\n");
					let _ = writeln!(code, "      '{record}[\"{}\"]'\n    ),\n  ],", variant.name);
				}
			}
		}
		let _ = writeln!(code, "]) as beet.FixableBeet<{name}, {name}>");
		code
	}
}

/// Map every variant of the enum `name` and assemble the union codec.
pub fn render_data_enum(
	mapper: &mut TypeMapper<'_>,
	variants: &[VariantDescriptor],
	name: &str,
) -> Result<RenderedDataEnum> {
	let record = format!("{}Record", type_name(name));
	let mut rendered = Vec::with_capacity(variants.len());

	for variant in variants {
		let mut child = mapper.fork();
		let owner = StructOwner {
			entity: format!("{name}::{}", variant.name),
			type_name: format!("{record}[{}]", quote(&variant.name)),
			var_name: String::new(),
			kind: StructKind::Args,
			requires_data: false,
		};

		let payload = match &variant.fields {
			VariantFields::Unit => VariantPayload::Unit,
			VariantFields::Named(fields) => VariantPayload::Struct(render_struct(&mut child, fields, owner, None)?),
			VariantFields::Tuple(types) => {
				let mut elements = Vec::with_capacity(types.len());
				let mut codecs = Vec::with_capacity(types.len());
				let mut fixable = false;
				for (index, ty) in types.iter().enumerate() {
					let mapped = child.map(ty, &format!("{}[{index}]", variant.name))?;
					fixable |= mapped.fixable;
					elements.push(mapped.ts);
					codecs.push(mapped.codec);
				}
				VariantPayload::Struct(StructCodec {
					owner,
					discriminator: None,
					fields: vec![MappedField {
						name: TUPLE_FIELDS.to_string(),
						ts: TsType::Tuple(elements),
						codec: Codec::Tuple {
							elements: codecs,
							fixable,
						},
						fixable,
					}],
					fixable: child.used_fixable(),
				})
			}
		};

		let fixable = child.used_fixable();
		tracing::trace!(entity = %name, variant = %variant.name, fixable, "mapped enum variant");
		mapper.join(child);
		rendered.push(RenderedVariant {
			name: variant.name.clone(),
			payload,
			fixable,
		});
	}

	let any_variant_fixable = rendered.iter().any(|variant| variant.fixable);
	mapper.add_package(Package::Beet);
	mapper.mark_fixable();

	Ok(RenderedDataEnum {
		name: name.to_string(),
		variants: rendered,
		any_variant_fixable,
	})
}
