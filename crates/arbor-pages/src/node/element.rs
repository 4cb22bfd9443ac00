//! Element nodes.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::warn;

use super::attr::{self, AttrValue};
use super::{IntoNode, Node};
use crate::dom::{Event, Listener, NodeHandle};
use crate::error::{RenderError, Result};
use crate::identity::NodeMeta;
use crate::markup;
use crate::style::StyleFragment;

/// Namespace URI for SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A render-target element.
#[derive(Debug, Clone)]
pub struct Element {
	pub(crate) meta: NodeMeta,
	tag: Cow<'static, str>,
	namespace: Option<Cow<'static, str>>,
	attrs: BTreeMap<String, String>,
	classes: Vec<String>,
	dom_id: Option<String>,
	pub(crate) children: Vec<Node>,
	listeners: BTreeMap<String, Listener>,
	styles: Vec<StyleFragment>,
	pub(crate) handle: Option<NodeHandle>,
}

/// The content of an element that an HTML patch reapplies.
#[derive(Debug, Clone)]
pub struct ElementProps {
	/// DOM id.
	pub dom_id: Option<String>,
	/// Class list, in order.
	pub classes: Vec<String>,
	/// Attributes other than `id` and `class`.
	pub attrs: BTreeMap<String, String>,
	/// Listener bindings by event name.
	pub listeners: BTreeMap<String, Listener>,
	/// Generated style fragments.
	pub styles: Vec<StyleFragment>,
}

impl Element {
	/// Creates an element with the given tag.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		Self {
			meta: NodeMeta::default(),
			tag: tag.into(),
			namespace: None,
			attrs: BTreeMap::new(),
			classes: Vec::new(),
			dom_id: None,
			children: Vec::new(),
			listeners: BTreeMap::new(),
			styles: Vec::new(),
			handle: None,
		}
	}

	/// Sets the namespace URI.
	pub fn ns(mut self, namespace: impl Into<Cow<'static, str>>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}

	/// Sets an attribute.
	///
	/// `id` sets the DOM id, `class` appends to the class list, listener values
	/// and `on*` names bind listeners, `false` removes the attribute. Invalid input
	/// is logged and ignored; use [`Element::try_attr`] to surface it as an error.
	pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
		if let Err(err) = self.apply_attr(name, value.into()) {
			warn!(tag = %self.tag, error = %err, "attribute ignored");
		}
		self
	}

	/// Sets an attribute, failing on invalid names or values.
	pub fn try_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Result<Self> {
		self.apply_attr(name, value.into())?;
		Ok(self)
	}

	/// Sets an attribute from a JSON value; arrays and objects are rejected.
	pub fn json_attr(self, name: &str, value: serde_json::Value) -> Result<Self> {
		let value = AttrValue::try_from(value).map_err(|err| match err {
			RenderError::Attribute { reason, .. } => RenderError::attribute(name, reason),
			other => other,
		})?;
		self.try_attr(name, value)
	}

	fn apply_attr(&mut self, name: &str, value: AttrValue) -> Result<()> {
		attr::validate_name(name)?;
		if let AttrValue::Number(n) = value
			&& !n.is_finite()
		{
			return Err(RenderError::attribute(name, format!("{n} is not a finite number")));
		}

		if let AttrValue::Listener(listener) = value {
			let event = attr::event_name(name).unwrap_or(name);
			self.listeners.insert(event.to_string(), listener);
			return Ok(());
		}
		if attr::event_name(name).is_some() {
			return Err(RenderError::attribute(
				name,
				format!("event attributes take a listener, got {}", value.type_name()),
			));
		}

		match (name, value.to_attr_string()) {
			("id", id) => self.dom_id = id,
			("class", Some(classes)) => {
				for class in classes.split_whitespace() {
					self.push_class(class);
				}
			}
			("class", None) => self.classes.clear(),
			(_, Some(v)) => {
				self.attrs.insert(name.to_string(), v);
			}
			(_, None) => {
				self.attrs.remove(name);
			}
		}
		Ok(())
	}

	fn push_class(&mut self, class: &str) {
		if !self.classes.iter().any(|c| c == class) {
			self.classes.push(class.to_string());
		}
	}

	/// Sets the DOM id.
	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.dom_id = Some(id.into());
		self
	}

	/// Appends one or more whitespace-separated classes.
	pub fn class(mut self, classes: &str) -> Self {
		for class in classes.split_whitespace() {
			self.push_class(class);
		}
		self
	}

	/// Binds a listener for `event` (without the `on` prefix).
	pub fn on<F>(mut self, event: &str, f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.listeners.insert(event.to_string(), Listener::new(f));
		self
	}

	/// Shortcut for `on("click", f)`.
	pub fn on_click<F>(self, f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.on("click", f)
	}

	/// Shortcut for `on("input", f)`.
	pub fn on_input<F>(self, f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.on("input", f)
	}

	/// Binds an existing listener.
	pub fn listener(mut self, event: &str, listener: Listener) -> Self {
		self.listeners.insert(event.to_string(), listener);
		self
	}

	/// Attaches generated styles; the element gets the fragment's class.
	pub fn css(mut self, rules: impl Into<String>) -> Self {
		let fragment = StyleFragment::new(rules);
		self.push_class(fragment.class_name());
		if !self.styles.contains(&fragment) {
			self.styles.push(fragment);
		}
		self
	}

	/// Appends a child.
	pub fn child(mut self, child: impl IntoNode) -> Self {
		self.children.push(child.into_node());
		self
	}

	/// Appends several children.
	pub fn children<I>(mut self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: IntoNode,
	{
		self.children
			.extend(children.into_iter().map(IntoNode::into_node));
		self
	}

	/// Appends a text child.
	pub fn text(self, content: impl Into<Cow<'static, str>>) -> Self {
		self.child(Node::text(content))
	}

	/// The tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// The namespace URI.
	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	/// Attributes other than `id` and `class`, sorted by name.
	pub fn attrs(&self) -> &BTreeMap<String, String> {
		&self.attrs
	}

	/// Reads one attribute.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attrs.get(name).map(String::as_str)
	}

	/// The class list.
	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	/// The DOM id.
	pub fn dom_id(&self) -> Option<&str> {
		self.dom_id.as_deref()
	}

	/// Child nodes.
	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	/// Listener bindings.
	pub fn listeners(&self) -> &BTreeMap<String, Listener> {
		&self.listeners
	}

	/// Generated style fragments.
	pub fn styles(&self) -> &[StyleFragment] {
		&self.styles
	}

	/// Render-target handle, once mounted.
	pub fn handle(&self) -> Option<NodeHandle> {
		self.handle
	}

	/// Returns true if this element needs a content patch to become `other`.
	///
	/// Tag, id, class list (order-sensitive), attributes and child count are
	/// compared. Listeners are not.
	pub fn diff(&self, other: &Element) -> bool {
		self.props_differ(other) || self.children.len() != other.children.len()
	}

	pub(crate) fn props_differ(&self, other: &Element) -> bool {
		self.tag != other.tag
			|| self.dom_id != other.dom_id
			|| self.classes != other.classes
			|| self.attrs != other.attrs
			|| self.styles != other.styles
	}

	/// Returns true if `other` binds different events or different closures.
	pub(crate) fn listeners_differ(&self, other: &Element) -> bool {
		self.listeners.len() != other.listeners.len()
			|| self
				.listeners
				.iter()
				.zip(&other.listeners)
				.any(|((a_name, a), (b_name, b))| a_name != b_name || !a.ptr_eq(b))
	}

	/// Returns true if tag or namespace differ, which forces a replacement.
	pub(crate) fn kind_differs(&self, other: &Element) -> bool {
		self.tag != other.tag || self.namespace != other.namespace
	}

	pub(crate) fn props(&self) -> ElementProps {
		ElementProps {
			dom_id: self.dom_id.clone(),
			classes: self.classes.clone(),
			attrs: self.attrs.clone(),
			listeners: self.listeners.clone(),
			styles: self.styles.clone(),
		}
	}

	pub(crate) fn set_props(&mut self, props: ElementProps) {
		self.dom_id = props.dom_id;
		self.classes = props.classes;
		self.attrs = props.attrs;
		self.listeners = props.listeners;
		self.styles = props.styles;
	}

	pub(crate) fn set_listeners(&mut self, listeners: BTreeMap<String, Listener>) {
		self.listeners = listeners;
	}

	pub(crate) fn write_markup(&self, out: &mut String) {
		markup::open_tag(
			out,
			&self.tag,
			self.dom_id.as_deref(),
			&self.classes,
			self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
		);
		for child in &self.children {
			child.write_markup(out);
		}
		markup::close_tag(out, &self.tag);
	}
}
