//! Modules for user defined types: structs, scalar enums and data enums.

use std::fmt::Write as _;

use crate::beet_struct::StructKind;
use crate::beet_struct::StructOwner;
use crate::beet_struct::render_struct;
use crate::context::ModuleDir;
use crate::context::TypeContext;
use crate::context::module_name;
use crate::data_enum::render_data_enum;
use crate::descriptor::TypeDefinition;
use crate::error::Result;
use crate::naming::codec_var_name;
use crate::naming::type_name;
use crate::render::RenderedModule;
use crate::render::assemble;
use crate::render::doc_comment;
use crate::type_mapper::MappedField;
use crate::type_mapper::TypeMapper;
use crate::wire::TypeLayout;

const CATEGORIES: &[&str] = &["userTypes", "generated"];

#[derive(Debug, Clone)]
pub struct RenderedType {
	pub module: RenderedModule,
	pub fixable: bool,
	pub layout: TypeLayout,
}

/// Render the module of a user defined type.
///
/// The referenced types must already be registered as fixable where they are,
/// so definitions have to be rendered in dependency order.
pub fn render_type(definition: &TypeDefinition, context: &TypeContext) -> Result<RenderedType> {
	let name = definition.name();
	let mut mapper = TypeMapper::new(context, name);
	let docs = doc_comment(definition.docs(), CATEGORIES, "");

	let (body, layout) = match definition {
		TypeDefinition::Struct(structure) => {
			let owner = StructOwner {
				entity: name.to_string(),
				type_name: type_name(name),
				var_name: codec_var_name(name),
				kind: StructKind::Args,
				requires_data: false,
			};
			let codec = render_struct(&mut mapper, &structure.fields, owner, None)?;

			let mut body = docs.clone();
			body.push_str(&type_declaration(&type_name(name), &codec.fields));
			body.push('\n');
			body.push_str(&doc_comment(&[], CATEGORIES, ""));
			body.push_str(&codec.render());
			(body, TypeLayout::Struct(codec.layout()))
		}
		TypeDefinition::Enum(enumeration) if enumeration.is_scalar() => {
			let variants = enumeration.variant_names();
			mapper.map_scalar_enum(name);

			let enum_name = type_name(name);
			let mut body = docs.clone();
			let _ = writeln!(body, "export enum {enum_name} {{");
			for variant in &variants {
				let _ = writeln!(body, "  {variant},");
			}
			body.push_str("}\n\n");
			body.push_str(&doc_comment(&[], CATEGORIES, ""));
			let _ = writeln!(
				body,
				"export const {} = beet.fixedScalarEnum(\n  {enum_name}\n) as beet.FixedSizeBeet<{enum_name}, {enum_name}>",
				codec_var_name(name)
			);
			(body, TypeLayout::ScalarEnum(variants))
		}
		TypeDefinition::Enum(enumeration) => {
			let rendered = render_data_enum(&mut mapper, &enumeration.variants, name)?;

			let mut body = String::new();
			let _ = writeln!(
				body,
				"/**\n * This type is used to derive the {{@link {0}}} type as well as the de/serializer.\n * However don't refer to it in your code but use the {{@link {0}}} type instead.\n *\n * @category userTypes\n * @category enums\n * @category generated\n * @private\n */",
				rendered.type_name()
			);
			body.push_str(&rendered.render_types());
			body.push('\n');
			body.push_str(&rendered.render_guards());
			body.push('\n');
			body.push_str(&docs);
			body.push_str(&rendered.render_codec());

			let layout = TypeLayout::DataEnum(
				rendered
					.variants
					.iter()
					.map(|variant| (variant.name.clone(), variant.layout()))
					.collect(),
			);
			(body, layout)
		}
	};

	let fixable = mapper.used_fixable();
	tracing::debug!(entity = %name, fixable, "rendered type");
	let code = assemble(ModuleDir::Types, Some(name), mapper.usage(), context, &body);

	Ok(RenderedType {
		module: RenderedModule::new(Some(ModuleDir::Types), module_name(name, ModuleDir::Types), code),
		fixable,
		layout,
	})
}

/// `export type Name = { ... }` over already mapped fields.
pub fn type_declaration(name: &str, fields: &[MappedField]) -> String {
	let mut code = format!("export type {name} = {{\n");
	for field in fields {
		let _ = writeln!(code, "  {}: {}", field.name, field.ts);
	}
	code.push_str("}\n");
	code
}
