//! Tree diffing.
//!
//! [`diff`] walks two generations in lock-step and returns the patches that turn
//! the old one into the new one, in pre-order (parent before children, siblings
//! in order). Per position:
//!
//! 1. no new node: nothing here; removals are emitted by the parent;
//! 2. no old node: [`Patch::Insert`], without descending;
//! 3. different variant, element tag or namespace, or component render function:
//!    [`Patch::Replace`], without descending;
//! 4. equal signatures: the static subtree is unchanged, nothing is emitted;
//! 5. text content changed: [`Patch::Text`]; element properties changed:
//!    [`Patch::Html`]; only listener bindings changed: [`Patch::Listeners`];
//! 6. children are reconciled by index.
//!
//! Children are matched positionally, never by key. Inserting into or removing
//! from the middle of a list therefore diffs every later sibling against the
//! node that used to sit at its index. Surplus new children become inserts at
//! the end; surplus old children become removes, highest index first, so that
//! earlier removes never shift the index of a later one.

use tracing::trace;

use crate::identity::NodePath;
use crate::node::Node;
use crate::patch::Patch;

/// Diffs two trees rooted at the same position.
pub fn diff(old: &Node, new: &Node) -> Vec<Patch> {
	let mut differ = Differ::default();
	differ.node(&NodePath::root(), old, new);
	differ.patches
}

#[derive(Default)]
struct Differ {
	patches: Vec<Patch>,
}

impl Differ {
	fn push(&mut self, patch: Patch) {
		trace!(kind = %patch.kind(), path = %patch.path(), "patch");
		self.patches.push(patch);
	}

	fn node(&mut self, path: &NodePath, old: &Node, new: &Node) {
		if needs_replace(old, new) {
			self.push(Patch::Replace {
				path: path.clone(),
				node: new.clone(),
			});
			return;
		}
		if let (Some(a), Some(b)) = (old.signature(), new.signature())
			&& a == b
		{
			return;
		}

		match (old, new) {
			(Node::Text(a), Node::Text(b)) if a.content() != b.content() => {
				self.push(Patch::Text {
					path: path.clone(),
					content: b.content().to_string(),
				});
			}
			(Node::Element(a), Node::Element(b)) => {
				if a.props_differ(b) {
					self.push(Patch::Html {
						path: path.clone(),
						props: b.props(),
					});
				} else if a.listeners_differ(b) {
					self.push(Patch::Listeners {
						path: path.clone(),
						listeners: b.listeners().clone(),
					});
				}
			}
			_ => {}
		}

		self.children(path, old.child_nodes(), new.child_nodes());
	}

	fn children(&mut self, path: &NodePath, old: &[Node], new: &[Node]) {
		for (index, (a, b)) in old.iter().zip(new).enumerate() {
			self.node(&path.child(index), a, b);
		}
		for (index, node) in new.iter().enumerate().skip(old.len()) {
			self.push(Patch::Insert {
				parent: path.clone(),
				index: Some(index),
				node: node.clone(),
			});
		}
		for index in (new.len()..old.len()).rev() {
			self.push(Patch::Remove {
				path: path.child(index),
			});
		}
	}
}

fn needs_replace(old: &Node, new: &Node) -> bool {
	match (old, new) {
		(Node::Element(a), Node::Element(b)) => a.kind_differs(b),
		(Node::Component(a), Node::Component(b)) => a.factory_id() != b.factory_id(),
		(a, b) => a.kind() != b.kind(),
	}
}
