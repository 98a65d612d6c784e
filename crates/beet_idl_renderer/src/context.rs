//! Program wide registry of defined types.
//!
//! The [`TypeContext`] knows every user defined type and account of the
//! program, which module each one is emitted into, the configured type
//! aliases and, once types have been rendered, which of them are fixable.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::config::RenderConfig;
use crate::descriptor::ProgramDescriptor;
use crate::descriptor::TypeDefinition;
use crate::descriptor::TypeDescriptor;
use crate::error::RenderError;
use crate::error::Result;
use crate::naming::type_name;
use crate::naming::var_name;

/// Output directory of a generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleDir {
	Types,
	Accounts,
	Instructions,
	Errors,
}

impl ModuleDir {
	pub const ALL: [Self; 4] = [Self::Accounts, Self::Errors, Self::Instructions, Self::Types];

	pub const fn dir_name(self) -> &'static str {
		match self {
			Self::Types => "types",
			Self::Accounts => "accounts",
			Self::Instructions => "instructions",
			Self::Errors => "errors",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinedKind {
	Struct,
	DataEnum,
	/// Variant names in declaration order.
	ScalarEnum(Vec<String>),
	Account,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedEntry {
	pub name: String,
	pub kind: DefinedKind,
	pub dir: ModuleDir,
}

impl DefinedEntry {
	/// File stem of the module the entry is emitted into.
	pub fn module_name(&self) -> String {
		module_name(&self.name, self.dir)
	}
}

/// File stem for an entity emitted into `dir`.
pub fn module_name(name: &str, dir: ModuleDir) -> String {
	match dir {
		ModuleDir::Instructions => var_name(name),
		ModuleDir::Errors => "index".to_string(),
		ModuleDir::Types | ModuleDir::Accounts => type_name(name),
	}
}

/// A type or account definition, by index into the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionRef {
	Type(usize),
	Account(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOrder {
	/// Definitions with every dependency ahead of its dependents.
	pub order: Vec<DefinitionRef>,
	/// Names of definitions that take part in a reference cycle.
	pub cyclic: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct TypeContext {
	entries: BTreeMap<String, DefinedEntry>,
	aliases: BTreeMap<String, String>,
	fixable: BTreeSet<String>,
	composite_options: bool,
}

impl TypeContext {
	/// Register every type and account of `program`.
	///
	/// Names must be unique case-insensitively because they become file
	/// names.
	pub fn new(program: &ProgramDescriptor, config: &RenderConfig) -> Result<Self> {
		let mut entries = BTreeMap::new();
		let mut seen: BTreeMap<String, &'static str> = BTreeMap::new();

		let definitions = program
			.types
			.iter()
			.map(|definition| {
				let kind = match definition {
					TypeDefinition::Struct(_) => DefinedKind::Struct,
					TypeDefinition::Enum(definition) if definition.is_scalar() => {
						DefinedKind::ScalarEnum(definition.variant_names())
					}
					TypeDefinition::Enum(_) => DefinedKind::DataEnum,
				};
				(definition.name(), kind, ModuleDir::Types, "type")
			})
			.chain(
				program
					.accounts
					.iter()
					.map(|account| (account.name.as_str(), DefinedKind::Account, ModuleDir::Accounts, "account")),
			);

		for (name, kind, dir, label) in definitions {
			if let Some(previous) = seen.insert(name.to_ascii_lowercase(), label) {
				return Err(RenderError::DuplicateName {
					kind: previous,
					name: name.to_string(),
				});
			}
			entries.insert(
				name.to_string(),
				DefinedEntry {
					name: name.to_string(),
					kind,
					dir,
				},
			);
		}

		Ok(Self {
			entries,
			aliases: config.type_aliases.clone(),
			fixable: BTreeSet::new(),
			composite_options: config.composite_options,
		})
	}

	pub fn lookup(&self, name: &str) -> Option<&DefinedEntry> {
		self.entries.get(name)
	}

	/// The primitive token `name` aliases, if it is an alias.
	pub fn alias(&self, name: &str) -> Option<&str> {
		self.aliases.get(name).map(String::as_str)
	}

	pub fn is_fixable(&self, name: &str) -> bool {
		self.fixable.contains(name)
	}

	pub fn mark_fixable(&mut self, name: &str) {
		self.fixable.insert(name.to_string());
	}

	/// Drop a definition that failed to render from the fixable registry.
	pub fn unmark_fixable(&mut self, name: &str) {
		self.fixable.remove(name);
	}

	pub fn fixable_types(&self) -> &BTreeSet<String> {
		&self.fixable
	}

	pub fn composite_options(&self) -> bool {
		self.composite_options
	}

	/// Order types and accounts so that each definition comes after the
	/// definitions it references.
	pub fn render_order(&self, program: &ProgramDescriptor) -> RenderOrder {
		let mut builder = OrderBuilder {
			context: self,
			program,
			marks: BTreeMap::new(),
			stack: Vec::new(),
			result: RenderOrder::default(),
		};

		for index in 0..program.types.len() {
			builder.visit(DefinitionRef::Type(index));
		}
		for index in 0..program.accounts.len() {
			builder.visit(DefinitionRef::Account(index));
		}

		builder.result
	}

	fn definition_ref(&self, program: &ProgramDescriptor, name: &str) -> Option<DefinitionRef> {
		if self.aliases.contains_key(name) {
			return None;
		}
		let entry = self.entries.get(name)?;
		match entry.dir {
			ModuleDir::Types => {
				program
					.types
					.iter()
					.position(|definition| definition.name() == name)
					.map(DefinitionRef::Type)
			}
			ModuleDir::Accounts => {
				program
					.accounts
					.iter()
					.position(|account| account.name == name)
					.map(DefinitionRef::Account)
			}
			ModuleDir::Instructions | ModuleDir::Errors => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
	Visiting,
	Done,
}

struct OrderBuilder<'a> {
	context: &'a TypeContext,
	program: &'a ProgramDescriptor,
	marks: BTreeMap<&'a str, Mark>,
	stack: Vec<&'a str>,
	result: RenderOrder,
}

impl<'a> OrderBuilder<'a> {
	fn name(&self, definition: DefinitionRef) -> &'a str {
		match definition {
			DefinitionRef::Type(index) => self.program.types[index].name(),
			DefinitionRef::Account(index) => &self.program.accounts[index].name,
		}
	}

	fn field_types(&self, definition: DefinitionRef) -> Vec<&'a TypeDescriptor> {
		match definition {
			DefinitionRef::Type(index) => self.program.types[index].field_types(),
			DefinitionRef::Account(index) => {
				self.program.accounts[index]
					.fields
					.iter()
					.map(|field| &field.ty)
					.collect()
			}
		}
	}

	fn visit(&mut self, definition: DefinitionRef) {
		let name = self.name(definition);
		match self.marks.get(name) {
			Some(Mark::Done) => return,
			Some(Mark::Visiting) => {
				if let Some(start) = self.stack.iter().position(|entry| *entry == name) {
					for member in &self.stack[start..] {
						self.result.cyclic.insert((*member).to_string());
					}
				}
				return;
			}
			None => {}
		}

		self.marks.insert(name, Mark::Visiting);
		self.stack.push(name);

		for ty in self.field_types(definition) {
			for reference in ty.defined_references() {
				if let Some(dependency) = self.context.definition_ref(self.program, reference) {
					self.visit(dependency);
				}
			}
		}

		self.stack.pop();
		self.marks.insert(name, Mark::Done);
		self.result.order.push(definition);
	}
}
