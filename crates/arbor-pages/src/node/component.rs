//! Component nodes.
//!
//! A component is a render function `(context, props, children) -> Node` plus the
//! props and children it is invoked with. The function's type is its identity: two
//! components are "the same component" only if they were built from the same
//! function item or closure type.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use super::{IntoNode, Node};
use crate::context::Context;
use crate::error::{RenderError, Result};
use crate::identity::NodeMeta;

/// Type-erased component properties.
pub trait AnyProps: fmt::Debug {
	/// Upcasts to `Any` for downcasting.
	fn as_any(&self) -> &dyn Any;

	/// Shallow equality against props of possibly another type.
	fn props_eq(&self, other: &dyn AnyProps) -> bool;
}

impl<T> AnyProps for T
where
	T: PartialEq + fmt::Debug + 'static,
{
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn props_eq(&self, other: &dyn AnyProps) -> bool {
		other.as_any().downcast_ref::<T>() == Some(self)
	}
}

type Factory = Rc<dyn Fn(&mut Context<'_>, &dyn Any, &[Node]) -> Result<Node>>;

/// A component node.
#[derive(Clone)]
pub struct Component {
	pub(crate) meta: NodeMeta,
	name: Cow<'static, str>,
	factory_id: TypeId,
	factory: Factory,
	props: Rc<dyn AnyProps>,
	children: Vec<Node>,
	pub(crate) rendered: Option<Box<Node>>,
}

impl Component {
	/// Creates a component from a render function and its props.
	pub fn new<P, F>(render: F, props: P) -> Self
	where
		P: PartialEq + fmt::Debug + 'static,
		F: Fn(&mut Context<'_>, &P, &[Node]) -> Result<Node> + 'static,
	{
		let factory = erase(move |cx, props, children| {
			let props = props.downcast_ref::<P>().ok_or_else(|| {
				RenderError::structural(cx.path(), "component props have an unexpected type")
			})?;
			render(cx, props, children)
		});
		Self {
			meta: NodeMeta::default(),
			name: Cow::Borrowed(short_type_name::<F>()),
			factory_id: TypeId::of::<F>(),
			factory,
			props: Rc::new(props),
			children: Vec::new(),
			rendered: None,
		}
	}

	/// Overrides the name used in logs and errors.
	pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.name = name.into();
		self
	}

	/// Appends a given child.
	pub fn child(mut self, child: impl IntoNode) -> Self {
		self.children.push(child.into_node());
		self
	}

	/// Appends several given children.
	pub fn children<I>(mut self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: IntoNode,
	{
		self.children
			.extend(children.into_iter().map(IntoNode::into_node));
		self
	}

	/// The component name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Identity of the render function.
	pub fn factory_id(&self) -> TypeId {
		self.factory_id
	}

	/// The props, if they are of type `P`.
	pub fn props<P: 'static>(&self) -> Option<&P> {
		(*self.props).as_any().downcast_ref::<P>()
	}

	/// The children the component is invoked with. These are inputs to the
	/// render function, not its output.
	pub fn given_children(&self) -> &[Node] {
		&self.children
	}

	/// The node produced by the last invocation.
	pub fn rendered(&self) -> Option<&Node> {
		self.rendered.as_deref()
	}

	/// Invokes the render function.
	pub fn render(&self, cx: &mut Context<'_>) -> Result<Node> {
		(self.factory)(cx, (*self.props).as_any(), &self.children)
	}

	/// Returns true if `other` is a different invocation: another factory, unequal
	/// props or a different number of given children.
	pub fn diff(&self, other: &Component) -> bool {
		self.factory_id != other.factory_id
			|| !(*self.props).props_eq(&*other.props)
			|| self.children.len() != other.children.len()
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.name)
			.field("props", &self.props)
			.field("children", &self.children)
			.field("rendered", &self.rendered)
			.finish()
	}
}

fn erase<F>(f: F) -> Factory
where
	F: Fn(&mut Context<'_>, &dyn Any, &[Node]) -> Result<Node> + 'static,
{
	Rc::new(f)
}

fn short_type_name<F>() -> &'static str {
	let full = std::any::type_name::<F>();
	let base = full.split('<').next().unwrap_or(full);
	let mut segments = base.rsplit("::");
	match segments.next() {
		Some("{{closure}}") => segments.next().unwrap_or(full),
		Some(last) => last,
		None => full,
	}
}
