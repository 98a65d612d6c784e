use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RenderError;
use crate::error::Result;
use crate::naming::var_name;
use crate::registry::Package;

/// Options that shape the generated client.
///
/// Loaded from an optional JSON file; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderConfig {
	/// Program address used when the IDL has no `metadata.address`.
	pub program_id: Option<String>,
	/// Defined type names that are plain aliases of a primitive token.
	pub type_aliases: BTreeMap<String, String>,
	/// Extra well-known account addresses, keyed by account name. Entries
	/// here take precedence over the built-in ones.
	pub known_addresses: BTreeMap<String, KnownAddress>,
	/// Allow options around composite types instead of primitives only.
	pub composite_options: bool,
	/// Let instruction builders accept `anchorRemainingAccounts`.
	pub anchor_remaining_accounts: bool,
	/// Keep rendering the remaining entities after one fails.
	pub continue_on_error: bool,
	/// Render instructions and accounts on the rayon pool.
	pub parallel: bool,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			program_id: None,
			type_aliases: BTreeMap::new(),
			known_addresses: BTreeMap::new(),
			composite_options: false,
			anchor_remaining_accounts: true,
			continue_on_error: false,
			parallel: true,
		}
	}
}

/// An address expression an instruction builder can fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownAddress {
	/// Package exporting the address; `None` for builder locals such as
	/// `programId`.
	#[serde(default)]
	pub package: Option<Package>,
	pub expression: String,
}

impl KnownAddress {
	pub fn new(package: Option<Package>, expression: impl Into<String>) -> Self {
		Self {
			package,
			expression: expression.into(),
		}
	}

	/// The TypeScript expression, e.g. `web3.SystemProgram.programId`.
	pub fn render(&self) -> String {
		match self.package {
			Some(package) => format!("{}.{}", package.namespace(), self.expression),
			None => self.expression.clone(),
		}
	}
}

/// Built-in defaults for accounts every Solana program passes around.
pub fn builtin_known_address(name: &str) -> Option<KnownAddress> {
	let known = match name {
		"systemProgram" => KnownAddress::new(Some(Package::SolanaWeb3), "SystemProgram.programId"),
		"rent" => KnownAddress::new(Some(Package::SolanaWeb3), "SYSVAR_RENT_PUBKEY"),
		"clock" => KnownAddress::new(Some(Package::SolanaWeb3), "SYSVAR_CLOCK_PUBKEY"),
		"tokenProgram" => KnownAddress::new(Some(Package::SplToken), "TOKEN_PROGRAM_ID"),
		"ataProgram" | "associatedTokenProgram" => {
			KnownAddress::new(Some(Package::SplToken), "ASSOCIATED_TOKEN_PROGRAM_ID")
		}
		"programId" => KnownAddress::new(None, "programId"),
		_ => return None,
	};
	Some(known)
}

impl RenderConfig {
	pub fn from_file(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| {
			RenderError::ReadFile {
				path: path.to_path_buf(),
				source,
			}
		})?;

		serde_json::from_str(&content).map_err(|source| {
			RenderError::ParseConfig {
				path: path.to_path_buf(),
				source,
			}
		})
	}

	/// Resolve the default address of an instruction account, matching on its
	/// camelCased name.
	pub fn known_address(&self, account: &str) -> Option<KnownAddress> {
		let name = var_name(account);
		self.known_addresses
			.get(&name)
			.or_else(|| self.known_addresses.get(account))
			.cloned()
			.or_else(|| builtin_known_address(&name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_cover_common_programs() {
		let config = RenderConfig::default();
		assert!(config.anchor_remaining_accounts);
		assert!(!config.composite_options);

		let render = |name: &str| config.known_address(name).map(|known| known.render());
		assert_eq!(render("systemProgram").as_deref(), Some("web3.SystemProgram.programId"));
		assert_eq!(render("system_program").as_deref(), Some("web3.SystemProgram.programId"));
		assert_eq!(render("tokenProgram").as_deref(), Some("splToken.TOKEN_PROGRAM_ID"));
		assert_eq!(render("ataProgram").as_deref(), Some("splToken.ASSOCIATED_TOKEN_PROGRAM_ID"));
		assert_eq!(render("rent").as_deref(), Some("web3.SYSVAR_RENT_PUBKEY"));
		assert_eq!(render("programId").as_deref(), Some("programId"));
		assert_eq!(render("authority"), None);
	}

	#[test]
	fn parses_partial_json_with_defaults() {
		let config: RenderConfig = serde_json::from_str(
			r#"{
				"programId": "11111111111111111111111111111111",
				"typeAliases": {"UnixTimestamp": "i64"},
				"knownAddresses": {"metadataProgram": {"expression": "PROGRAM_ID"}},
				"compositeOptions": true
			}"#,
		)
		.unwrap_or_else(|e| panic!("failed to parse config: {e}"));

		assert_eq!(config.type_aliases.get("UnixTimestamp").map(String::as_str), Some("i64"));
		assert!(config.composite_options);
		assert!(config.parallel);
		assert_eq!(
			config.known_address("metadataProgram").map(|known| known.render()).as_deref(),
			Some("PROGRAM_ID")
		);
	}

	#[test]
	fn reads_config_files() {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
		let path = dir.path().join("config.json");
		std::fs::write(&path, r#"{"continueOnError": true}"#).unwrap_or_else(|e| panic!("write: {e}"));

		let config = RenderConfig::from_file(&path).unwrap_or_else(|e| panic!("{e}"));
		assert!(config.continue_on_error);

		std::fs::write(&path, "{ not json").unwrap_or_else(|e| panic!("write: {e}"));
		assert!(matches!(RenderConfig::from_file(&path), Err(RenderError::ParseConfig { .. })));
	}
}
