//! Patches and their execution.
//!
//! A [`Patch`] is one self-contained mutation produced by the diff engine. The
//! [`Executor`] applies patches, strictly in order, to the live tree and its
//! render target at the same time: the live tree always mirrors what the target
//! shows, so later patches can locate nodes inserted by earlier ones.
//!
//! Execution stops at the first failing patch. Patches already applied stay
//! applied; run [`validate`] first to reject a list that cannot apply cleanly.

mod apply;
mod validate;

pub use apply::Executor;
pub(crate) use apply::transfer_handles;
pub use validate::validate;

use std::collections::BTreeMap;
use std::fmt;

use crate::dom::Listener;
use crate::identity::NodePath;
use crate::node::{ElementProps, Node};

/// A single mutation instruction.
#[derive(Debug, Clone)]
pub enum Patch {
	/// Replace the content of the text node at `path`.
	Text {
		/// Target text node.
		path: NodePath,
		/// New content.
		content: String,
	},
	/// Reapply id, classes, attributes, listeners and styles of the element at `path`.
	Html {
		/// Target element.
		path: NodePath,
		/// The new element properties.
		props: ElementProps,
	},
	/// Rebind the listeners of the element at `path`.
	Listeners {
		/// Target element.
		path: NodePath,
		/// The new bindings.
		listeners: BTreeMap<String, Listener>,
	},
	/// Add `node` as a logical child of `parent` at `index`, or at the end, and
	/// mount it.
	Insert {
		/// Logical parent.
		parent: NodePath,
		/// Position among the parent's logical children; `None` appends.
		index: Option<usize>,
		/// The subtree to mount.
		node: Node,
	},
	/// Unmount the node at `path` and drop it from its logical parent.
	Remove {
		/// Node to remove.
		path: NodePath,
	},
	/// Unmount the node at `path` and mount `node` in its place.
	Replace {
		/// Node to replace.
		path: NodePath,
		/// The replacement subtree.
		node: Node,
	},
}

/// Variant tag of a [`Patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
	/// [`Patch::Text`].
	Text,
	/// [`Patch::Html`].
	Html,
	/// [`Patch::Listeners`].
	Listeners,
	/// [`Patch::Insert`].
	Insert,
	/// [`Patch::Remove`].
	Remove,
	/// [`Patch::Replace`].
	Replace,
}

impl fmt::Display for PatchKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			PatchKind::Text => "text",
			PatchKind::Html => "html",
			PatchKind::Listeners => "listeners",
			PatchKind::Insert => "insert",
			PatchKind::Remove => "remove",
			PatchKind::Replace => "replace",
		})
	}
}

impl Patch {
	/// The variant tag.
	pub fn kind(&self) -> PatchKind {
		match self {
			Patch::Text { .. } => PatchKind::Text,
			Patch::Html { .. } => PatchKind::Html,
			Patch::Listeners { .. } => PatchKind::Listeners,
			Patch::Insert { .. } => PatchKind::Insert,
			Patch::Remove { .. } => PatchKind::Remove,
			Patch::Replace { .. } => PatchKind::Replace,
		}
	}

	/// The position the patch affects. For an insert without an index this is
	/// the parent.
	pub fn path(&self) -> NodePath {
		match self {
			Patch::Text { path, .. }
			| Patch::Html { path, .. }
			| Patch::Listeners { path, .. }
			| Patch::Remove { path }
			| Patch::Replace { path, .. } => path.clone(),
			Patch::Insert {
				parent,
				index: Some(index),
				..
			} => parent.child(*index),
			Patch::Insert { parent, .. } => parent.clone(),
		}
	}

	/// A summary for reports.
	pub fn record(&self) -> PatchRecord {
		PatchRecord {
			kind: self.kind(),
			path: self.path(),
		}
	}
}

/// What a patch did, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
	/// Patch kind.
	pub kind: PatchKind,
	/// Affected position.
	pub path: NodePath,
}

impl fmt::Display for PatchRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.kind, self.path)
	}
}
