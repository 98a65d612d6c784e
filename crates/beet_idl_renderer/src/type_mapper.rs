//! Resolution of [`TypeDescriptor`]s into TypeScript types and codecs.
//!
//! A [`TypeMapper`] is created per top level entity (an instruction, an
//! account or a user type). While mapping it records in its [`Usage`] which
//! packages, scalar enums and defined types the entity's module will have to
//! import, and whether any mapped field was fixable. Data enum variants need
//! their own view of that flag, so a mapper can [`fork`](TypeMapper::fork)
//! a child with a fresh accumulator and [`join`](TypeMapper::join) it back.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::codec::Codec;
use crate::codec::TsType;
use crate::context::DefinedKind;
use crate::context::TypeContext;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::TypeDescriptor;
use crate::error::RenderError;
use crate::error::Result;
use crate::naming::codec_var_name;
use crate::naming::type_name;
use crate::naming::var_name;
use crate::registry;
use crate::registry::Package;
use crate::registry::PrimitiveMapping;

/// Everything a rendered entity needs from outside its own module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
	pub packages: BTreeSet<Package>,
	/// Defined type name to the identifiers imported from its module.
	pub local_imports: BTreeMap<String, BTreeSet<String>>,
	pub used_fixable: bool,
}

impl Usage {
	pub fn merge(&mut self, other: Usage) {
		self.packages.extend(other.packages);
		for (name, identifiers) in other.local_imports {
			self.local_imports.entry(name).or_default().extend(identifiers);
		}
		self.used_fixable |= other.used_fixable;
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
	pub ts: TsType,
	pub codec: Codec,
	pub fixable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
	/// The TypeScript property name.
	pub name: String,
	pub ts: TsType,
	pub codec: Codec,
	pub fixable: bool,
}

impl MappedField {
	pub fn new(name: impl Into<String>, mapped: MappedType) -> Self {
		Self {
			name: name.into(),
			ts: mapped.ts,
			codec: mapped.codec,
			fixable: mapped.fixable,
		}
	}
}

#[derive(Debug, Clone)]
pub struct TypeMapper<'a> {
	context: &'a TypeContext,
	entity: String,
	usage: Usage,
}

impl<'a> TypeMapper<'a> {
	pub fn new(context: &'a TypeContext, entity: impl Into<String>) -> Self {
		Self {
			context,
			entity: entity.into(),
			usage: Usage::default(),
		}
	}

	pub fn usage(&self) -> &Usage {
		&self.usage
	}

	pub fn used_fixable(&self) -> bool {
		self.usage.used_fixable
	}

	/// Force the fixable flag, for constructs that only exist in a fixable
	/// form.
	pub fn mark_fixable(&mut self) {
		self.usage.used_fixable = true;
	}

	pub fn add_package(&mut self, package: Package) {
		self.usage.packages.insert(package);
	}

	/// A child mapper over the same context with an empty accumulator.
	pub fn fork(&self) -> Self {
		Self {
			context: self.context,
			entity: self.entity.clone(),
			usage: Usage::default(),
		}
	}

	/// Merge a forked child back.
	pub fn join(&mut self, child: Self) {
		self.usage.merge(child.usage);
	}

	/// Map the type of `field`.
	pub fn map(&mut self, ty: &TypeDescriptor, field: &str) -> Result<MappedType> {
		let mapped = self.map_at(ty, field, field)?;
		if mapped.fixable {
			self.usage.used_fixable = true;
		}
		Ok(mapped)
	}

	/// Map every field in declaration order.
	pub fn map_fields(&mut self, fields: &[FieldDescriptor]) -> Result<Vec<MappedField>> {
		fields
			.iter()
			.map(|field| {
				let mapped = self.map(&field.ty, &field.name)?;
				tracing::trace!(entity = %self.entity, field = %field.name, ts = %mapped.ts, codec = %mapped.codec, "mapped field");
				Ok(MappedField::new(var_name(&field.name), mapped))
			})
			.collect()
	}

	/// Map the definition of a payload-less enum.
	pub fn map_scalar_enum(&mut self, name: &str) -> MappedType {
		self.usage.packages.insert(Package::Beet);
		MappedType {
			ts: TsType::Named(name.to_string()),
			codec: Codec::ScalarEnum(name.to_string()),
			fixable: false,
		}
	}

	fn map_at(&mut self, ty: &TypeDescriptor, field: &str, path: &str) -> Result<MappedType> {
		match ty {
			TypeDescriptor::Primitive(token) => {
				match registry::lookup(token) {
					Some(mapping) => Ok(self.map_primitive(mapping)),
					None => self.map_defined(token, field, path, true),
				}
			}
			TypeDescriptor::Defined(name) => self.map_defined(name, field, path, false),
			TypeDescriptor::Option(inner) | TypeDescriptor::COption(inner) => {
				let path = format!("{path}.option");
				if !self.context.composite_options() && !self.is_primitive_like(inner) {
					return Err(RenderError::UnsupportedNesting {
						entity: self.entity.clone(),
						path,
						reason: format!(
							"option of composite type `{inner}`; only primitives may be optional unless \
							 `compositeOptions` is enabled"
						),
					});
				}
				let inner = self.map_at(inner, field, &path)?;
				self.usage.packages.insert(Package::Beet);
				Ok(MappedType {
					ts: TsType::Option(Box::new(inner.ts)),
					codec: Codec::Option(Box::new(inner.codec)),
					fixable: true,
				})
			}
			TypeDescriptor::Vector(inner) => {
				let inner = self.map_at(inner, field, &format!("{path}.vec"))?;
				self.usage.packages.insert(Package::Beet);
				Ok(MappedType {
					ts: TsType::Array(Box::new(inner.ts)),
					codec: Codec::Array(Box::new(inner.codec)),
					fixable: true,
				})
			}
			TypeDescriptor::FixedArray(inner, len) => {
				let path = format!("{path}.array");
				let inner = self.map_at(inner, field, &path)?;
				if inner.fixable {
					return Err(RenderError::UnsupportedNesting {
						entity: self.entity.clone(),
						path,
						reason: "fixed size arrays of variable size elements cannot be encoded".to_string(),
					});
				}
				self.usage.packages.insert(Package::Beet);
				Ok(MappedType {
					ts: TsType::FixedArray(Box::new(inner.ts), *len),
					codec: Codec::FixedArray(Box::new(inner.codec), *len),
					fixable: false,
				})
			}
			TypeDescriptor::HashMap(key, value) | TypeDescriptor::BTreeMap(key, value) => {
				let key = self.map_at(key, field, &format!("{path}.key"))?;
				let value = self.map_at(value, field, &format!("{path}.value"))?;
				self.usage.packages.insert(Package::Beet);
				Ok(MappedType {
					ts: TsType::Map(Box::new(key.ts), Box::new(value.ts)),
					codec: Codec::Map(Box::new(key.codec), Box::new(value.codec)),
					fixable: true,
				})
			}
			TypeDescriptor::Tuple(elements) => {
				let mut types = Vec::with_capacity(elements.len());
				let mut codecs = Vec::with_capacity(elements.len());
				let mut fixable = false;
				for (index, element) in elements.iter().enumerate() {
					let mapped = self.map_at(element, field, &format!("{path}.{index}"))?;
					fixable |= mapped.fixable;
					types.push(mapped.ts);
					codecs.push(mapped.codec);
				}
				self.usage.packages.insert(Package::Beet);
				Ok(MappedType {
					ts: TsType::Tuple(types),
					codec: Codec::Tuple {
						elements: codecs,
						fixable,
					},
					fixable,
				})
			}
		}
	}

	fn map_primitive(&mut self, mapping: &'static PrimitiveMapping) -> MappedType {
		if let Some(package) = mapping.ts_package {
			self.usage.packages.insert(package);
		}
		self.usage.packages.insert(mapping.codec_package);
		MappedType {
			ts: TsType::Primitive(mapping),
			codec: Codec::Primitive(mapping),
			fixable: mapping.is_fixable(),
		}
	}

	/// Resolve a name against aliases and the defined registry. A bare token
	/// that matches neither is reported as an unsupported primitive.
	fn map_defined(&mut self, name: &str, field: &str, path: &str, bare_token: bool) -> Result<MappedType> {
		if let Some(target) = self.context.alias(name) {
			let Some(mapping) = registry::lookup(target) else {
				return Err(RenderError::UnsupportedType {
					entity: self.entity.clone(),
					field: field.to_string(),
					ty: format!("{name} = {target}"),
					supported: registry::supported_tokens(),
				});
			};
			return Ok(self.map_primitive(mapping));
		}

		let Some(entry) = self.context.lookup(name) else {
			if bare_token {
				return Err(RenderError::UnsupportedType {
					entity: self.entity.clone(),
					field: field.to_string(),
					ty: name.to_string(),
					supported: registry::supported_tokens(),
				});
			}
			return Err(RenderError::UnknownType {
				entity: self.entity.clone(),
				field: path.to_string(),
				name: name.to_string(),
			});
		};

		let imports = self.usage.local_imports.entry(entry.name.clone()).or_default();
		imports.insert(type_name(&entry.name));

		if matches!(entry.kind, DefinedKind::ScalarEnum(_)) {
			self.usage.packages.insert(Package::Beet);
			return Ok(MappedType {
				ts: TsType::Named(entry.name.clone()),
				codec: Codec::ScalarEnum(entry.name.clone()),
				fixable: false,
			});
		}

		imports.insert(codec_var_name(&entry.name));
		let fixable = self.context.is_fixable(&entry.name);
		Ok(MappedType {
			ts: TsType::Named(entry.name.clone()),
			codec: Codec::Defined {
				name: entry.name.clone(),
				fixable,
			},
			fixable,
		})
	}

	fn is_primitive_like(&self, ty: &TypeDescriptor) -> bool {
		match ty {
			TypeDescriptor::Primitive(token) | TypeDescriptor::Defined(token) => {
				registry::is_primitive(token)
					|| self
						.context
						.alias(token)
						.is_some_and(registry::is_primitive)
			}
			_ => false,
		}
	}
}
