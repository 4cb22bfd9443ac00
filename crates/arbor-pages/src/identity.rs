//! Positional identity and content hashing.
//!
//! A node's identity is the ordinal path from the root of the tree to the node.
//! Two generations of a tree therefore agree on the identity of "whatever sits at
//! this position", independent of content. A component's render result is always
//! child `0` of the component.
//!
//! Content signatures are a separate concern: a [`Signature`] summarises a static
//! subtree (elements, text and fragments only) so the diff engine can skip a whole
//! subtree whose content did not change.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a hasher. Deterministic across processes and toolchains, unlike the
/// standard library's default hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv64(u64);

impl Default for Fnv64 {
	fn default() -> Self {
		Self(FNV_OFFSET)
	}
}

impl Hasher for Fnv64 {
	fn finish(&self) -> u64 {
		self.0
	}

	fn write(&mut self, bytes: &[u8]) {
		for byte in bytes {
			self.0 ^= u64::from(*byte);
			self.0 = self.0.wrapping_mul(FNV_PRIME);
		}
	}
}

/// Hashes any `Hash` value with [`Fnv64`].
pub fn fnv_hash<T: Hash + ?Sized>(value: &T) -> u64 {
	let mut hasher = Fnv64::default();
	value.hash(&mut hasher);
	hasher.finish()
}

/// Ordinal path from the root of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
	/// The root position.
	pub fn root() -> Self {
		Self(Vec::new())
	}

	/// Returns the path of the `index`-th child of this position.
	pub fn child(&self, index: usize) -> Self {
		let mut segments = Vec::with_capacity(self.0.len() + 1);
		segments.extend_from_slice(&self.0);
		segments.push(index);
		Self(segments)
	}

	/// Returns the parent position, or `None` for the root.
	pub fn parent(&self) -> Option<Self> {
		let (_, rest) = self.0.split_last()?;
		Some(Self(rest.to_vec()))
	}

	/// Returns the last segment, or `None` for the root.
	pub fn last(&self) -> Option<usize> {
		self.0.last().copied()
	}

	/// Returns the path segments.
	pub fn segments(&self) -> &[usize] {
		&self.0
	}

	/// Number of segments.
	pub fn depth(&self) -> usize {
		self.0.len()
	}

	/// Returns true if `self` equals `other` or lies below it.
	pub fn starts_with(&self, other: &NodePath) -> bool {
		self.0.starts_with(&other.0)
	}

	/// Derives the identity for this position.
	pub fn id(&self) -> NodeId {
		NodeId(fnv_hash(&self.0))
	}
}

impl From<Vec<usize>> for NodePath {
	fn from(segments: Vec<usize>) -> Self {
		Self(segments)
	}
}

impl fmt::Display for NodePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("/");
		}
		for segment in &self.0 {
			write!(f, "/{segment}")?;
		}
		Ok(())
	}
}

/// Stable identity of a tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
	/// Returns the raw hash value.
	pub fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:016x}", self.0)
	}
}

/// Identity of a component instance: its position plus the render function it
/// was built from. A different function at the same position is a different
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey {
	/// Position identity.
	pub id: NodeId,
	/// Type of the render function.
	pub factory: TypeId,
}

impl ComponentKey {
	/// Creates a key.
	pub fn new(id: NodeId, factory: TypeId) -> Self {
		Self { id, factory }
	}
}

/// Content hash of a static subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(u64);

impl Signature {
	/// Wraps a precomputed hash.
	pub fn from_hash(hash: u64) -> Self {
		Self(hash)
	}

	/// Returns the raw hash value.
	pub fn as_u64(self) -> u64 {
		self.0
	}
}

/// Positional metadata every node carries.
///
/// `parent`, `prev` and `next` are back-references by identity, never owning,
/// and are recomputed on every build. Nothing reads them from a previous
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMeta {
	/// Position of the node; `None` until identities are assigned.
	pub path: Option<NodePath>,
	/// Logical parent.
	pub parent: Option<NodeId>,
	/// Previous logical sibling.
	pub prev: Option<NodeId>,
	/// Next logical sibling.
	pub next: Option<NodeId>,
	/// Content signature of the subtree, if the subtree is static.
	pub signature: Option<Signature>,
}

impl NodeMeta {
	/// Returns the identity, if one was assigned.
	pub fn id(&self) -> Option<NodeId> {
		self.path.as_ref().map(NodePath::id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_path_display() {
		assert_eq!(NodePath::root().to_string(), "/");
		assert_eq!(NodePath::root().child(0).child(3).to_string(), "/0/3");
	}

	#[rstest]
	fn test_identity_is_positional() {
		let a = NodePath::from(vec![0, 1, 2]);
		let b = NodePath::root().child(0).child(1).child(2);
		assert_eq!(a.id(), b.id());
		assert_ne!(a.id(), NodePath::from(vec![0, 2, 1]).id());
	}

	#[rstest]
	fn test_parent_and_last() {
		let path = NodePath::from(vec![4, 5]);
		assert_eq!(path.parent(), Some(NodePath::from(vec![4])));
		assert_eq!(path.last(), Some(5));
		assert_eq!(NodePath::root().parent(), None);
	}

	#[rstest]
	fn test_starts_with() {
		let path = NodePath::from(vec![0, 1, 2]);
		assert!(path.starts_with(&NodePath::from(vec![0, 1])));
		assert!(path.starts_with(&NodePath::root()));
		assert!(!path.starts_with(&NodePath::from(vec![1])));
	}

	#[rstest]
	fn test_component_key_distinguishes_factories() {
		let id = NodePath::from(vec![0]).id();
		let a = ComponentKey::new(id, TypeId::of::<u8>());
		let b = ComponentKey::new(id, TypeId::of::<u16>());
		assert_ne!(a, b);
		assert_eq!(a, ComponentKey::new(id, TypeId::of::<u8>()));
	}

	#[rstest]
	#[case(b"", 0xcbf2_9ce4_8422_2325)]
	#[case(b"a", 0xaf63_dc4c_8601_ec8c)]
	fn test_fnv_known_vectors(#[case] input: &[u8], #[case] expected: u64) {
		let mut hasher = Fnv64::default();
		hasher.write(input);
		assert_eq!(hasher.finish(), expected);
	}
}
