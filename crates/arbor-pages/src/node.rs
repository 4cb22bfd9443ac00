//! The node model.
//!
//! A tree is made of four variants:
//!
//! - [`Element`]: materializes a render-target element.
//! - [`Text`]: materializes a render-target text node.
//! - [`Fragment`]: an ordered child list that never materializes anything itself;
//!   its children attach to the nearest materializing ancestor.
//! - [`Component`]: a render function plus the props and children it is called
//!   with. Its render result is its single logical child.
//!
//! Trees are rebuilt on every pass. Render-target handles live on the `Element`
//! and `Text` nodes of the live tree and are carried over to each new generation.

mod attr;
mod component;
mod element;

pub use attr::{AttrValue, listener};
pub use component::{AnyProps, Component};
pub use element::{Element, ElementProps, SVG_NAMESPACE};

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::context::Context;
use crate::dom::NodeHandle;
use crate::error::Result;
use crate::identity::{Fnv64, NodeId, NodeMeta, NodePath, Signature};
use crate::markup;

/// A literal text node.
#[derive(Debug, Clone)]
pub struct Text {
	pub(crate) meta: NodeMeta,
	content: Cow<'static, str>,
	pub(crate) handle: Option<NodeHandle>,
}

impl Text {
	/// Creates a text node.
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			meta: NodeMeta::default(),
			content: content.into(),
			handle: None,
		}
	}

	/// The text content.
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Render-target handle, once mounted.
	pub fn handle(&self) -> Option<NodeHandle> {
		self.handle
	}

	pub(crate) fn set_content(&mut self, content: String) {
		self.content = Cow::Owned(content);
	}
}

/// A transparent list of nodes.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
	pub(crate) meta: NodeMeta,
	pub(crate) children: Vec<Node>,
}

impl Fragment {
	/// Creates a fragment.
	pub fn new<I>(children: I) -> Self
	where
		I: IntoIterator,
		I::Item: IntoNode,
	{
		Self {
			meta: NodeMeta::default(),
			children: children.into_iter().map(IntoNode::into_node).collect(),
		}
	}

	/// Child nodes.
	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}
}

/// Variant tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// [`Node::Element`].
	Element,
	/// [`Node::Text`].
	Text,
	/// [`Node::Fragment`].
	Fragment,
	/// [`Node::Component`].
	Component,
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			NodeKind::Element => "element",
			NodeKind::Text => "text",
			NodeKind::Fragment => "fragment",
			NodeKind::Component => "component",
		})
	}
}

/// An entry in the declarative tree.
#[derive(Debug, Clone)]
pub enum Node {
	/// An element.
	Element(Element),
	/// A text node.
	Text(Text),
	/// A fragment.
	Fragment(Fragment),
	/// A component.
	Component(Component),
}

impl Node {
	/// Shorthand for a text node.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Node::Text(Text::new(content))
	}

	/// An empty fragment; renders nothing.
	pub fn empty() -> Self {
		Node::Fragment(Fragment::default())
	}

	/// The variant tag.
	pub fn kind(&self) -> NodeKind {
		match self {
			Node::Element(_) => NodeKind::Element,
			Node::Text(_) => NodeKind::Text,
			Node::Fragment(_) => NodeKind::Fragment,
			Node::Component(_) => NodeKind::Component,
		}
	}

	/// Positional metadata.
	pub fn meta(&self) -> &NodeMeta {
		match self {
			Node::Element(e) => &e.meta,
			Node::Text(t) => &t.meta,
			Node::Fragment(f) => &f.meta,
			Node::Component(c) => &c.meta,
		}
	}

	pub(crate) fn meta_mut(&mut self) -> &mut NodeMeta {
		match self {
			Node::Element(e) => &mut e.meta,
			Node::Text(t) => &mut t.meta,
			Node::Fragment(f) => &mut f.meta,
			Node::Component(c) => &mut c.meta,
		}
	}

	/// Identity of the node, once positioned.
	pub fn id(&self) -> Option<NodeId> {
		self.meta().id()
	}

	/// Position of the node, once positioned.
	pub fn path(&self) -> Option<&NodePath> {
		self.meta().path.as_ref()
	}

	/// Content signature, if the subtree is static and was built.
	pub fn signature(&self) -> Option<Signature> {
		self.meta().signature
	}

	/// Render-target handle. Only elements and text nodes ever carry one.
	pub fn handle(&self) -> Option<NodeHandle> {
		match self {
			Node::Element(e) => e.handle,
			Node::Text(t) => t.handle,
			Node::Fragment(_) | Node::Component(_) => None,
		}
	}

	pub(crate) fn set_handle(&mut self, handle: Option<NodeHandle>) {
		match self {
			Node::Element(e) => e.handle = handle,
			Node::Text(t) => t.handle = handle,
			Node::Fragment(_) | Node::Component(_) => {}
		}
	}

	/// Logical children used for reconciliation: an element's or fragment's child
	/// list, or a component's render result.
	pub fn child_nodes(&self) -> &[Node] {
		match self {
			Node::Element(e) => &e.children,
			Node::Fragment(f) => &f.children,
			Node::Component(c) => c.rendered.as_deref().map(std::slice::from_ref).unwrap_or(&[]),
			Node::Text(_) => &[],
		}
	}

	pub(crate) fn child_nodes_mut(&mut self) -> &mut [Node] {
		match self {
			Node::Element(e) => &mut e.children,
			Node::Fragment(f) => &mut f.children,
			Node::Component(c) => match c.rendered.as_deref_mut() {
				Some(rendered) => std::slice::from_mut(rendered),
				None => &mut [],
			},
			Node::Text(_) => &mut [],
		}
	}

	/// The logical child at `index`.
	pub fn child(&self, index: usize) -> Option<&Node> {
		self.child_nodes().get(index)
	}

	pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
		self.child_nodes_mut().get_mut(index)
	}

	/// Follows `path` from this node.
	pub fn find(&self, path: &NodePath) -> Option<&Node> {
		path.segments()
			.iter()
			.try_fold(self, |node, index| node.child(*index))
	}

	pub(crate) fn find_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
		path.segments()
			.iter()
			.try_fold(self, |node, index| node.child_mut(*index))
	}

	/// Records the node's logical parent and siblings. Links are back-references
	/// only and are recomputed on every build.
	pub fn position(&mut self, parent: Option<NodeId>, prev: Option<NodeId>, next: Option<NodeId>) {
		let meta = self.meta_mut();
		meta.parent = parent;
		meta.prev = prev;
		meta.next = next;
	}

	/// Produces the node this one stands for: a component invokes its render
	/// function, every other variant renders as itself.
	pub fn render(&self, cx: &mut Context<'_>) -> Result<Node> {
		match self {
			Node::Component(c) => c.render(cx),
			other => Ok(other.clone()),
		}
	}

	/// Returns true if turning `self` into `other` requires a content patch.
	///
	/// - Text: content differs.
	/// - Element: tag, id, class list, attributes or child count differ; listeners
	///   are ignored.
	/// - Fragment: child count differs.
	/// - Component: factory, props or given-children count differ.
	///
	/// Nodes of different variants always differ.
	pub fn diff(&self, other: &Node) -> bool {
		match (self, other) {
			(Node::Text(a), Node::Text(b)) => a.content != b.content,
			(Node::Element(a), Node::Element(b)) => a.diff(b),
			(Node::Fragment(a), Node::Fragment(b)) => a.children.len() != b.children.len(),
			(Node::Component(a), Node::Component(b)) => a.diff(b),
			_ => true,
		}
	}

	/// Number of render-target nodes this subtree puts directly into its
	/// materializing ancestor.
	pub fn materialized_len(&self) -> usize {
		match self {
			Node::Element(_) | Node::Text(_) => 1,
			Node::Fragment(_) | Node::Component(_) => {
				self.child_nodes().iter().map(Node::materialized_len).sum()
			}
		}
	}

	/// Handles of the render-target nodes this subtree puts directly into its
	/// materializing ancestor, in order.
	pub fn top_handles(&self) -> Vec<NodeHandle> {
		let mut handles = Vec::new();
		self.collect_top_handles(&mut handles);
		handles
	}

	fn collect_top_handles(&self, out: &mut Vec<NodeHandle>) {
		match self {
			Node::Element(_) | Node::Text(_) => out.extend(self.handle()),
			Node::Fragment(_) | Node::Component(_) => {
				for child in self.child_nodes() {
					child.collect_top_handles(out);
				}
			}
		}
	}

	/// Computes the signature from the node's own content and the signatures
	/// already assigned to its children.
	pub(crate) fn compute_signature(&self) -> Option<Signature> {
		let mut h = Fnv64::default();
		match self {
			Node::Text(t) => {
				0u8.hash(&mut h);
				t.content.hash(&mut h);
			}
			Node::Element(e) => {
				if !e.listeners().is_empty() {
					return None;
				}
				1u8.hash(&mut h);
				e.tag().hash(&mut h);
				e.namespace().hash(&mut h);
				e.dom_id().hash(&mut h);
				e.classes().hash(&mut h);
				e.attrs().hash(&mut h);
				e.styles().hash(&mut h);
			}
			Node::Fragment(_) => 2u8.hash(&mut h),
			Node::Component(_) => return None,
		}
		let children = self.child_nodes();
		children.len().hash(&mut h);
		for child in children {
			child.signature()?.as_u64().hash(&mut h);
		}
		Some(Signature::from_hash(h.finish()))
	}

	pub(crate) fn write_markup(&self, out: &mut String) {
		match self {
			Node::Element(e) => e.write_markup(out),
			Node::Text(t) => out.push_str(&markup::escape(&t.content)),
			Node::Fragment(_) | Node::Component(_) => {
				for child in self.child_nodes() {
					child.write_markup(out);
				}
			}
		}
	}
}

impl fmt::Display for Node {
	/// Serializes the subtree as HTML. Components contribute their last render
	/// result; an unrendered component contributes nothing.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut out = String::new();
		self.write_markup(&mut out);
		f.write_str(&out)
	}
}

/// Conversion into a [`Node`].
pub trait IntoNode {
	/// Performs the conversion.
	fn into_node(self) -> Node;
}

impl IntoNode for Node {
	fn into_node(self) -> Node {
		self
	}
}

impl IntoNode for Element {
	fn into_node(self) -> Node {
		Node::Element(self)
	}
}

impl IntoNode for Text {
	fn into_node(self) -> Node {
		Node::Text(self)
	}
}

impl IntoNode for Fragment {
	fn into_node(self) -> Node {
		Node::Fragment(self)
	}
}

impl IntoNode for Component {
	fn into_node(self) -> Node {
		Node::Component(self)
	}
}

impl IntoNode for &'static str {
	fn into_node(self) -> Node {
		Node::text(self)
	}
}

impl IntoNode for String {
	fn into_node(self) -> Node {
		Node::text(self)
	}
}

impl<T: IntoNode> IntoNode for Option<T> {
	fn into_node(self) -> Node {
		self.map_or_else(Node::empty, IntoNode::into_node)
	}
}

macro_rules! impl_from_variant {
	($($variant:ident),*) => {
		$(
			impl From<$variant> for Node {
				fn from(value: $variant) -> Self {
					Node::$variant(value)
				}
			}
		)*
	};
}

impl_from_variant!(Element, Text, Fragment, Component);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::html::{div, li, span, ul};
	use crate::builder::{fragment, text};
	use rstest::rstest;

	#[rstest]
	#[case(text("a"), text("a"), false)]
	#[case(text("a"), text("b"), true)]
	#[case(fragment([text("a")]), fragment([text("b")]), false)]
	#[case(fragment([text("a")]), fragment([text("a"), text("b")]), true)]
	#[case(text("a"), fragment([text("a")]), true)]
	#[case(div().child(text("a")).into_node(), div().child(text("b")).into_node(), false)]
	fn test_diff_contract(#[case] a: Node, #[case] b: Node, #[case] expected: bool) {
		assert_eq!(a.diff(&b), expected);
	}

	#[rstest]
	fn test_display_serializes_recursively() {
		let tree = div()
			.id("root")
			.child(span().text("a & b"))
			.child(fragment(["x", "y"]))
			.into_node();
		assert_eq!(
			tree.to_string(),
			"<div id=\"root\"><span>a &amp; b</span>xy</div>"
		);
	}

	#[rstest]
	fn test_find_follows_logical_children() {
		let tree = ul().child(li().text("1")).child(li().text("2")).into_node();
		let second = tree.find(&NodePath::from(vec![1, 0])).unwrap();
		match second {
			Node::Text(t) => assert_eq!(t.content(), "2"),
			other => panic!("unexpected node {other:?}"),
		}
		assert!(tree.find(&NodePath::from(vec![2])).is_none());
	}

	#[rstest]
	fn test_materialized_len_flattens_fragments() {
		let tree = fragment([text("a"), fragment([text("b"), text("c")]).into_node()]);
		assert_eq!(tree.materialized_len(), 3);
		assert_eq!(div().child(tree).into_node().materialized_len(), 1);
	}

	#[rstest]
	fn test_signature_requires_static_children() {
		let mut leaf = text("a");
		leaf.meta_mut().signature = leaf.compute_signature();
		let mut parent = div().child(leaf.clone()).into_node();
		assert!(parent.compute_signature().is_some());

		let unsigned = div().child(text("a")).into_node();
		assert!(unsigned.compute_signature().is_none());

		let with_listener = div().on_click(|_| {}).into_node();
		assert!(with_listener.compute_signature().is_none());

		parent.meta_mut().signature = parent.compute_signature();
		let mut same = div().child(leaf).into_node();
		same.meta_mut().signature = same.compute_signature();
		assert_eq!(parent.signature(), same.signature());
	}

	#[rstest]
	fn test_position_sets_links() {
		let mut node = text("a");
		let parent = NodePath::root().id();
		let next = NodePath::from(vec![1]).id();
		node.position(Some(parent), None, Some(next));
		assert_eq!(node.meta().parent, Some(parent));
		assert_eq!(node.meta().prev, None);
		assert_eq!(node.meta().next, Some(next));
	}

	#[rstest]
	fn test_option_into_node() {
		assert_eq!(Some("a").into_node().to_string(), "a");
		assert_eq!(None::<&'static str>.into_node().materialized_len(), 0);
	}
}
