//! Generated per-node styles.
//!
//! `Element::css` turns a block of declarations into a [`StyleFragment`] with a
//! class name derived from the declarations, so identical rules always map to the
//! same class. A [`StyleSheet`] accumulates the fragments of a tree, keeping the
//! first occurrence of each class.

use std::collections::HashSet;

use crate::identity::fnv_hash;
use crate::node::Node;

/// Prefix of every generated class name.
pub const CLASS_PREFIX: &str = "arbor-";

/// A block of CSS declarations bound to a generated class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleFragment {
	class_name: String,
	rules: String,
}

impl StyleFragment {
	/// Creates a fragment for `rules`, e.g. `"color: red; padding: 4px"`.
	pub fn new(rules: impl Into<String>) -> Self {
		let rules = rules.into().trim().to_string();
		let hash = fnv_hash(rules.as_str());
		let folded = (hash ^ (hash >> 32)) as u32;
		Self {
			class_name: format!("{CLASS_PREFIX}{folded:08x}"),
			rules,
		}
	}

	/// The generated class name.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	/// The declarations, trimmed.
	pub fn rules(&self) -> &str {
		&self.rules
	}

	/// Renders `.class { rules }`.
	pub fn to_css(&self) -> String {
		format!(".{} {{ {} }}", self.class_name, self.rules)
	}
}

/// Ordered, de-duplicated collection of style fragments.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
	fragments: Vec<StyleFragment>,
	seen: HashSet<String>,
}

impl StyleSheet {
	/// Creates an empty sheet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a fragment. Returns `false` if its class was already present.
	pub fn add(&mut self, fragment: StyleFragment) -> bool {
		if !self.seen.insert(fragment.class_name.clone()) {
			return false;
		}
		self.fragments.push(fragment);
		true
	}

	/// Collects every fragment of `node`, descending into rendered components.
	pub fn collect(&mut self, node: &Node) {
		if let Node::Element(el) = node {
			for fragment in el.styles() {
				self.add(fragment.clone());
			}
		}
		for child in node.child_nodes() {
			self.collect(child);
		}
	}

	/// Returns true if `class_name` is in the sheet.
	pub fn contains(&self, class_name: &str) -> bool {
		self.seen.contains(class_name)
	}

	/// Fragments in first-seen order.
	pub fn fragments(&self) -> &[StyleFragment] {
		&self.fragments
	}

	/// Number of fragments.
	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	/// Returns true if the sheet has no fragments.
	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Moves every fragment of `other` not yet present into `self`, returning a
	/// sheet with just the newly added ones.
	pub fn absorb(&mut self, other: StyleSheet) -> StyleSheet {
		let mut added = StyleSheet::new();
		for fragment in other.fragments {
			if self.add(fragment.clone()) {
				added.add(fragment);
			}
		}
		added
	}

	/// Renders the whole sheet, one rule per line.
	pub fn to_css(&self) -> String {
		self.fragments
			.iter()
			.map(StyleFragment::to_css)
			.collect::<Vec<_>>()
			.join("\n")
	}
}
