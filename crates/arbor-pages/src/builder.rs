//! Tree construction API
//!
//! Free functions for each node variant, plus [`html`] with one constructor per
//! common tag.
//!
//! ## Example
//!
//! ```
//! use arbor_pages::builder::{component, fragment, text};
//! use arbor_pages::builder::html::{li, ul};
//! use arbor_pages::{Context, Node, Result};
//!
//! fn item(_cx: &mut Context<'_>, label: &&'static str, _children: &[Node]) -> Result<Node> {
//!     Ok(li().text(*label).into())
//! }
//!
//! let tree = ul()
//!     .child(component(item, "first"))
//!     .child(fragment([text("a"), text("b")]));
//! assert_eq!(tree.child_nodes().len(), 2);
//! ```

pub mod html;

use std::borrow::Cow;
use std::fmt;

use crate::context::Context;
use crate::error::Result;
use crate::node::{Component, Element, Fragment, IntoNode, Node};

/// Creates an element with an arbitrary tag.
pub fn element(tag: impl Into<Cow<'static, str>>) -> Element {
	Element::new(tag)
}

/// Creates a text node.
pub fn text(content: impl Into<Cow<'static, str>>) -> Node {
	Node::text(content)
}

/// Creates a fragment.
pub fn fragment<I>(children: I) -> Node
where
	I: IntoIterator,
	I::Item: IntoNode,
{
	Node::Fragment(Fragment::new(children))
}

/// Creates a component node.
pub fn component<P, F>(render: F, props: P) -> Node
where
	P: PartialEq + fmt::Debug + 'static,
	F: Fn(&mut Context<'_>, &P, &[Node]) -> Result<Node> + 'static,
{
	Node::Component(Component::new(render, props))
}

/// Creates a component node invoked with `children`.
pub fn component_with_children<P, F, I>(render: F, props: P, children: I) -> Node
where
	P: PartialEq + fmt::Debug + 'static,
	F: Fn(&mut Context<'_>, &P, &[Node]) -> Result<Node> + 'static,
	I: IntoIterator,
	I::Item: IntoNode,
{
	Node::Component(Component::new(render, props).children(children))
}
