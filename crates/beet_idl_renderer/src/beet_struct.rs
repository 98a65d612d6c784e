//! Struct codecs: an ordered list of field name and codec pairs wrapped in
//! the fixed or fixable beet struct constructor.

use std::fmt;

use crate::codec::Codec;
use crate::descriptor::FieldDescriptor;
use crate::discriminator::Discriminator;
use crate::error::RenderError;
use crate::error::Result;
use crate::naming::quote;
use crate::registry::Package;
use crate::type_mapper::MappedField;
use crate::type_mapper::TypeMapper;

/// Which family of struct constructors the codec uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
	/// Plain object values: instruction args, user types, enum variants.
	Args,
	/// Values constructed through `<Class>.fromArgs`: accounts.
	Class,
}

/// Who the struct belongs to and how it is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructOwner {
	/// IDL entity name, for diagnostics.
	pub entity: String,
	/// The TypeScript type the codec produces.
	pub type_name: String,
	/// The exported codec identifier.
	pub var_name: String,
	pub kind: StructKind,
	/// Instructions and accounts must put at least one byte on the wire.
	pub requires_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructCodec {
	pub owner: StructOwner,
	/// The hidden leading discriminator field, if any.
	pub discriminator: Option<MappedField>,
	/// Declared fields in wire order.
	pub fields: Vec<MappedField>,
	pub fixable: bool,
}

impl StructCodec {
	pub fn constructor(&self) -> &'static str {
		match (self.owner.kind, self.fixable) {
			(StructKind::Args, false) => "BeetArgsStruct",
			(StructKind::Args, true) => "FixableBeetArgsStruct",
			(StructKind::Class, false) => "BeetStruct",
			(StructKind::Class, true) => "FixableBeetStruct",
		}
	}

	/// All encoded fields, discriminator first.
	pub fn codec_fields(&self) -> impl Iterator<Item = &MappedField> {
		self.discriminator.iter().chain(&self.fields)
	}

	/// Name and codec pairs in wire order.
	pub fn layout(&self) -> Vec<(String, Codec)> {
		self.codec_fields()
			.map(|field| (field.name.clone(), field.codec.clone()))
			.collect()
	}

	/// The value type parameter: the declared type intersected with the
	/// hidden discriminator property.
	fn args_type(&self) -> String {
		let base = match self.owner.kind {
			StructKind::Args => self.owner.type_name.clone(),
			StructKind::Class => format!("{}Args", self.owner.type_name),
		};
		match &self.discriminator {
			Some(discriminator) => {
				format!(
					"{base} & {{\n    {}: {}\n  }}",
					discriminator.name, discriminator.ts
				)
			}
			None => base,
		}
	}

	/// The exported codec declaration.
	pub fn render(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for StructCodec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let type_params = match self.owner.kind {
			StructKind::Args => self.args_type(),
			StructKind::Class => format!("{},\n  {}", self.owner.type_name, self.args_type()),
		};
		writeln!(
			f,
			"export const {} = new beet.{}<\n  {}\n>(",
			self.owner.var_name,
			self.constructor(),
			type_params
		)?;

		if self.codec_fields().next().is_none() {
			writeln!(f, "  [],")?;
		} else {
			writeln!(f, "  [")?;
			for field in self.codec_fields() {
				writeln!(f, "    [{}, {}],", quote(&field.name), field.codec)?;
			}
			writeln!(f, "  ],")?;
		}

		if self.owner.kind == StructKind::Class {
			writeln!(f, "  {}.fromArgs,", self.owner.type_name)?;
		}
		writeln!(f, "  {}\n)", quote(&self.owner.type_name))
	}
}

/// Map `fields` and assemble the struct codec for `owner`.
///
/// The constructor is chosen solely from the mapper's fixable flag, so the
/// mapper must be fresh for the owning entity (or a fork of it).
pub fn render_struct(
	mapper: &mut TypeMapper<'_>,
	fields: &[FieldDescriptor],
	owner: StructOwner,
	discriminator: Option<(&Discriminator, &str)>,
) -> Result<StructCodec> {
	let discriminator = discriminator
		.map(|(discriminator, name)| discriminator.field(name, mapper))
		.transpose()?;
	let fields = mapper.map_fields(fields)?;

	if owner.requires_data && discriminator.is_none() && fields.is_empty() {
		return Err(RenderError::EmptyStruct {
			entity: owner.entity,
		});
	}

	mapper.add_package(Package::Beet);
	tracing::trace!(entity = %owner.entity, fields = fields.len(), fixable = mapper.used_fixable(), "rendered struct codec");

	Ok(StructCodec {
		owner,
		discriminator,
		fields,
		fixable: mapper.used_fixable(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::RenderConfig;
	use crate::context::TypeContext;
	use crate::descriptor::Dialect;
	use crate::descriptor::ProgramDescriptor;
	use crate::descriptor::TypeDescriptor;
	use crate::discriminator::INSTRUCTION_DISCRIMINATOR_FIELD;
	use crate::discriminator::instruction_discriminator;

	fn empty_context() -> TypeContext {
		let program = ProgramDescriptor {
			name: "demo".to_string(),
			version: String::new(),
			address: None,
			dialect: Dialect::Anchor,
			instructions: Vec::new(),
			accounts: Vec::new(),
			types: Vec::new(),
			errors: Vec::new(),
		};
		TypeContext::new(&program, &RenderConfig::default()).unwrap_or_else(|e| panic!("{e}"))
	}

	fn args_owner(entity: &str) -> StructOwner {
		StructOwner {
			entity: entity.to_string(),
			type_name: "TransferInstructionArgs".to_string(),
			var_name: "transferStruct".to_string(),
			kind: StructKind::Args,
			requires_data: true,
		}
	}

	#[test]
	fn discriminator_comes_first_and_fields_keep_order() {
		let context = empty_context();
		let mut mapper = TypeMapper::new(&context, "transfer");
		let discriminator = Discriminator::Hashed(instruction_discriminator("transfer"));
		let fields = vec![
			FieldDescriptor::new("amount", TypeDescriptor::primitive("u64")),
			FieldDescriptor::new("memo_len", TypeDescriptor::primitive("u8")),
		];

		let codec = render_struct(
			&mut mapper,
			&fields,
			args_owner("transfer"),
			Some((&discriminator, INSTRUCTION_DISCRIMINATOR_FIELD)),
		)
		.unwrap_or_else(|e| panic!("{e}"));

		let names: Vec<String> = codec.layout().into_iter().map(|(name, _)| name).collect();
		assert_eq!(names, vec!["instructionDiscriminator", "amount", "memoLen"]);
		assert_eq!(codec.constructor(), "BeetArgsStruct");
		insta::assert_snapshot!(codec.render(), @r"
		export const transferStruct = new beet.BeetArgsStruct<
		  TransferInstructionArgs & {
		    instructionDiscriminator: number[] /* size: 8 */
		  }
		>(
		  [
		    ['instructionDiscriminator', beet.uniformFixedSizeArray(beet.u8, 8)],
		    ['amount', beet.u64],
		    ['memoLen', beet.u8],
		  ],
		  'TransferInstructionArgs'
		)
		");
	}

	#[test]
	fn fixable_fields_switch_the_constructor() {
		let context = empty_context();
		let mut mapper = TypeMapper::new(&context, "Counter");
		let fields = vec![
			FieldDescriptor::new("authority", TypeDescriptor::primitive("publicKey")),
			FieldDescriptor::new("label", TypeDescriptor::primitive("string")),
		];
		let owner = StructOwner {
			entity: "Counter".to_string(),
			type_name: "Counter".to_string(),
			var_name: "counterBeet".to_string(),
			kind: StructKind::Class,
			requires_data: true,
		};

		let codec = render_struct(&mut mapper, &fields, owner, None).unwrap_or_else(|e| panic!("{e}"));
		assert!(codec.fixable);
		assert_eq!(codec.constructor(), "FixableBeetStruct");
		let rendered = codec.render();
		assert!(rendered.contains("new beet.FixableBeetStruct<\n  Counter,\n  CounterArgs\n>"));
		assert!(rendered.contains("  Counter.fromArgs,\n"));
	}

	#[test]
	fn empty_instruction_payloads_are_rejected() {
		let context = empty_context();
		let mut mapper = TypeMapper::new(&context, "noop");
		let error = render_struct(&mut mapper, &[], args_owner("noop"), None).err();
		assert!(matches!(error, Some(RenderError::EmptyStruct { ref entity }) if entity == "noop"));
	}

	#[test]
	fn empty_user_types_render_a_zero_length_codec() {
		let context = empty_context();
		let mut mapper = TypeMapper::new(&context, "Marker");
		let owner = StructOwner {
			entity: "Marker".to_string(),
			type_name: "Marker".to_string(),
			var_name: "markerBeet".to_string(),
			kind: StructKind::Args,
			requires_data: false,
		};

		let codec = render_struct(&mut mapper, &[], owner, None).unwrap_or_else(|e| panic!("{e}"));
		assert!(!codec.fixable);
		assert!(codec.render().contains("new beet.BeetArgsStruct<\n  Marker\n>(\n  [],\n  'Marker'\n)"));
	}
}
