//! Render target abstraction.
//!
//! The diff engine and patch executor never touch a concrete backend. They talk to
//! a [`RenderTarget`], which is the minimal DOM-like surface the renderer needs:
//! element and text creation, attribute and class mutation, positional child
//! insertion, removal and replacement, and event listener binding.
//!
//! [`MemoryDocument`] is a complete in-memory implementation used for tests and
//! headless rendering.

mod memory;

pub use memory::MemoryDocument;

use std::fmt;
use std::rc::Rc;

use crate::error::TargetError;

/// Opaque handle to a node owned by a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
	/// Builds a handle from a raw index. Only render targets should mint handles.
	pub fn from_raw(raw: u32) -> Self {
		Self(raw)
	}

	/// Returns the raw index.
	pub fn raw(self) -> u32 {
		self.0
	}
}

impl fmt::Display for NodeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
	/// Event name without the `on` prefix, e.g. `click`.
	pub name: String,
	/// The node the event was dispatched to.
	pub target: NodeHandle,
	/// Optional payload, e.g. the new value of an input.
	pub value: Option<String>,
}

impl Event {
	/// Creates an event without a payload.
	pub fn new(name: impl Into<String>, target: NodeHandle) -> Self {
		Self {
			name: name.into(),
			target,
			value: None,
		}
	}

	/// Attaches a payload.
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}
}

/// A cloneable event listener.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
	/// Wraps a closure.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		Self(Rc::new(f))
	}

	/// Invokes the listener.
	pub fn call(&self, event: &Event) {
		(self.0)(event)
	}

	/// Returns true if both values wrap the same closure allocation.
	pub fn ptr_eq(&self, other: &Listener) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Listener(..)")
	}
}

/// The live output surface patches are applied to.
pub trait RenderTarget {
	/// Creates a detached element.
	fn create_element(
		&mut self,
		tag: &str,
		namespace: Option<&str>,
	) -> Result<NodeHandle, TargetError>;

	/// Creates a detached text node.
	fn create_text(&mut self, content: &str) -> Result<NodeHandle, TargetError>;

	/// Replaces the content of a text node.
	fn set_text(&mut self, node: NodeHandle, content: &str) -> Result<(), TargetError>;

	/// Reads an attribute.
	fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>, TargetError>;

	/// Sets an attribute.
	fn set_attribute(&mut self, node: NodeHandle, name: &str, value: &str)
	-> Result<(), TargetError>;

	/// Removes an attribute; removing an absent attribute is not an error.
	fn remove_attribute(&mut self, node: NodeHandle, name: &str) -> Result<(), TargetError>;

	/// Appends a class to the element's class list if not already present.
	fn add_class(&mut self, node: NodeHandle, class: &str) -> Result<(), TargetError>;

	/// Removes a class from the element's class list.
	fn remove_class(&mut self, node: NodeHandle, class: &str) -> Result<(), TargetError>;

	/// Inserts `child` under `parent` at `index`, detaching it from any previous
	/// parent first. An index past the end appends.
	fn insert_child(
		&mut self,
		parent: NodeHandle,
		child: NodeHandle,
		index: usize,
	) -> Result<(), TargetError>;

	/// Detaches `child` from `parent`.
	fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError>;

	/// Puts `new_child` where `old_child` was and detaches `old_child`.
	fn replace_child(
		&mut self,
		parent: NodeHandle,
		new_child: NodeHandle,
		old_child: NodeHandle,
	) -> Result<(), TargetError>;

	/// Lists the children of an element in order.
	fn children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>, TargetError>;

	/// Binds `listener` to `event` on `node`, replacing any previous binding.
	fn add_listener(
		&mut self,
		node: NodeHandle,
		event: &str,
		listener: Listener,
	) -> Result<(), TargetError>;

	/// Unbinds the listener for `event`; unbinding an absent listener is not an error.
	fn remove_listener(&mut self, node: NodeHandle, event: &str) -> Result<(), TargetError>;

	/// Detaches `node` if attached and frees it with its whole subtree. The
	/// released handles must not be used again.
	fn release(&mut self, node: NodeHandle) -> Result<(), TargetError>;

	/// Finds the first element matching `#id`, `.class` or a tag name.
	fn query_selector(&self, selector: &str) -> Option<NodeHandle>;

	/// Appends a stylesheet to the document head.
	fn inject_stylesheet(&mut self, css: &str) -> Result<(), TargetError>;

	/// Serializes the children of `node`.
	fn inner_markup(&self, node: NodeHandle) -> Result<String, TargetError>;
}
