use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to read `{path}`: {source}")]
	ReadFile {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to write `{path}`: {source}")]
	WriteFile {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("no IDL files to render")]
	NoIdlFiles,
	#[error("`{path}` has no UTF-8 file stem to name its client after")]
	InvalidIdlPath { path: PathBuf },
	#[error("failed to parse IDL `{path}`: {source}")]
	ParseIdl {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error("failed to parse config `{path}`: {source}")]
	ParseConfig {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error(
		"unsupported type `{ty}` for field `{field}` of `{entity}`; supported primitives: \
		 {supported}"
	)]
	UnsupportedType {
		entity: String,
		field: String,
		ty: String,
		supported: String,
	},
	#[error("unknown type `{name}` referenced by field `{field}` of `{entity}`")]
	UnknownType {
		entity: String,
		field: String,
		name: String,
	},
	#[error("unsupported nesting at `{path}` of `{entity}`: {reason}")]
	UnsupportedNesting {
		entity: String,
		path: String,
		reason: String,
	},
	#[error(
		"cannot resolve seed `{seed}` of account `{account}` in instruction `{instruction}`: \
		 {reason}"
	)]
	SeedResolution {
		instruction: String,
		account: String,
		seed: String,
		reason: String,
	},
	#[error("invalid discriminator for `{entity}`: {reason}")]
	InvalidDiscriminator { entity: String, reason: String },
	#[error("`{entity}` has no fields to encode")]
	EmptyStruct { entity: String },
	#[error("duplicate {kind} name `{name}`")]
	DuplicateName { kind: &'static str, name: String },
	#[error("invalid address `{value}` for `{context}`: {reason}")]
	InvalidAddress {
		context: String,
		value: String,
		reason: String,
	},
	#[error("`{entity}` depends on `{dependency}`, which failed to render")]
	DependencyFailed { entity: String, dependency: String },
	#[error("unsupported value `{kind}` at `{context}`: {reason}")]
	UnsupportedValue {
		context: String,
		kind: &'static str,
		reason: String,
	},
}

impl RenderError {
	/// Name of the IDL entity the error is attributed to, when there is one.
	pub fn entity(&self) -> Option<&str> {
		match self {
			Self::UnsupportedType { entity, .. }
			| Self::UnknownType { entity, .. }
			| Self::UnsupportedNesting { entity, .. }
			| Self::InvalidDiscriminator { entity, .. }
			| Self::DependencyFailed { entity, .. }
			| Self::EmptyStruct { entity } => Some(entity.as_str()),
			Self::SeedResolution { instruction, .. } => Some(instruction.as_str()),
			_ => None,
		}
	}
}

/// An entity skipped under [`crate::RenderConfig::continue_on_error`].
#[derive(Debug)]
pub struct RenderFailure {
	pub entity: String,
	pub error: RenderError,
}

impl RenderFailure {
	/// Attribute `error` to the entity it names, falling back to `entity`.
	pub fn new(entity: &str, error: RenderError) -> Self {
		Self {
			entity: error.entity().unwrap_or(entity).to_string(),
			error,
		}
	}
}
