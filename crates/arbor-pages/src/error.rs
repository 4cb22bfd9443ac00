//! Error types for arbor-pages.
//!
//! Every failure in a render pass is surfaced as a [`RenderError`]. A pass that
//! fails stops at the failing step; patches already applied to the render target
//! are not rolled back.

use thiserror::Error;

use crate::dom::NodeHandle;
use crate::identity::NodePath;

/// Failures reported by a [`RenderTarget`](crate::dom::RenderTarget).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
	/// The handle does not name a live node of this target.
	#[error("unknown node handle {0}")]
	UnknownNode(NodeHandle),

	/// The operation requires an element but the handle names a text node.
	#[error("node {0} is not an element")]
	NotAnElement(NodeHandle),

	/// The operation requires a text node but the handle names an element.
	#[error("node {0} is not a text node")]
	NotAText(NodeHandle),

	/// `child` is not attached under `parent`.
	#[error("node {child} is not a child of {parent}")]
	NotAChild {
		/// The expected parent.
		parent: NodeHandle,
		/// The node that was looked up.
		child: NodeHandle,
	},

	/// No node matched the selector.
	#[error("no node matches selector `{0}`")]
	SelectorNotFound(String),

	/// The tag name cannot be used to create an element.
	#[error("invalid tag name `{0}`")]
	InvalidTag(String),

	/// The node belongs to the document skeleton and cannot be released.
	#[error("node {0} cannot be released")]
	Permanent(NodeHandle),

	/// The target cannot issue any more handles.
	#[error("no node handles left")]
	Exhausted,
}

/// Errors raised while building, diffing, patching or firing lifecycle events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
	/// The node model was asked for something its variant cannot provide, e.g. a
	/// text patch against an element. Indicates a bug in tree construction.
	#[error("structural error at {path}: {message}")]
	Structural {
		/// Position in the live tree where the mismatch was found.
		path: NodePath,
		/// What was expected.
		message: String,
	},

	/// An attribute could not be converted into a supported value.
	#[error("invalid attribute `{name}`: {reason}")]
	Attribute {
		/// The offending attribute name.
		name: String,
		/// Why it was rejected.
		reason: String,
	},

	/// A consumer ran before the provider that populates its pass-scoped key.
	#[error("missing context `{key}`: no provider ran earlier in this pass")]
	MissingContext {
		/// The key that was looked up.
		key: String,
	},

	/// The render target rejected an operation.
	#[error("render target error: {0}")]
	Target(#[from] TargetError),

	/// A component called its hooks in a different order than on the previous render.
	#[error("hook order changed in component `{component}` at slot {slot}: expected {expected}, found {found}")]
	HookOrder {
		/// Name of the component.
		component: String,
		/// Index of the slot whose kind or type changed.
		slot: usize,
		/// What the slot held on the previous render.
		expected: String,
		/// What the current hook call asked for.
		found: String,
	},

	/// A mount, render or unmount callback failed.
	#[error("lifecycle callback for `{component}` failed: {message}")]
	Lifecycle {
		/// Name of the component that registered the callback.
		component: String,
		/// The callback's error message.
		message: String,
	},

	/// Queued render requests kept re-arming after the configured number of passes.
	#[error("render loop: still pending after {passes} passes")]
	RenderLoop {
		/// Number of passes that ran before giving up.
		passes: usize,
	},

	/// Render options could not be parsed.
	#[error("invalid render options: {0}")]
	Config(String),
}

impl RenderError {
	/// Shorthand for a [`RenderError::Structural`] at `path`.
	pub fn structural(path: &NodePath, message: impl Into<String>) -> Self {
		Self::Structural {
			path: path.clone(),
			message: message.into(),
		}
	}

	/// Shorthand for a [`RenderError::Attribute`].
	pub fn attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Attribute {
			name: name.into(),
			reason: reason.into(),
		}
	}

	/// Shorthand for a [`RenderError::Lifecycle`].
	pub fn lifecycle(component: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Lifecycle {
			component: component.into(),
			message: message.into(),
		}
	}
}

/// Result type alias used across the crate.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
