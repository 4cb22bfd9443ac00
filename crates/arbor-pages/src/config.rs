//! Render options.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Options controlling how an [`Env`](crate::env::Env) mounts and updates.
///
/// Options can be built in code or loaded from TOML:
///
/// ```
/// use arbor_pages::RenderOptions;
///
/// let options = RenderOptions::from_toml_str("max_flush_passes = 4").unwrap();
/// assert_eq!(options.max_flush_passes, 4);
/// assert!(options.inject_styles);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
	/// Push generated style fragments to the render target.
	pub inject_styles: bool,
	/// Check the whole patch list against the live tree before mutating anything.
	pub validate_patches: bool,
	/// Remove pre-existing children of the mount container.
	pub clear_container: bool,
	/// Maximum number of queued passes one `flush()` drains.
	pub max_flush_passes: usize,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			inject_styles: true,
			validate_patches: true,
			clear_container: true,
			max_flush_passes: 16,
		}
	}
}

impl RenderOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses options from a TOML document. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source).map_err(|e| RenderError::Config(e.to_string()))
	}

	/// Serializes the options as TOML.
	pub fn to_toml_string(&self) -> Result<String> {
		toml::to_string(self).map_err(|e| RenderError::Config(e.to_string()))
	}

	/// Disables stylesheet injection.
	pub fn no_styles(mut self) -> Self {
		self.inject_styles = false;
		self
	}

	/// Enables or disables the dry-run validation of patch lists.
	pub fn validate_patches(mut self, enable: bool) -> Self {
		self.validate_patches = enable;
		self
	}

	/// Keeps whatever the mount container already holds; the app is appended after it.
	pub fn keep_container(mut self) -> Self {
		self.clear_container = false;
		self
	}

	/// Sets the bound on passes drained by one `flush()`.
	pub fn max_flush_passes(mut self, passes: usize) -> Self {
		self.max_flush_passes = passes;
		self
	}
}
