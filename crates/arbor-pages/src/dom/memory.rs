//! In-memory render target.

use std::collections::BTreeMap;

use super::{Event, Listener, NodeHandle, RenderTarget};
use crate::error::TargetError;
use crate::markup;

#[derive(Debug)]
struct ElementData {
	tag: String,
	namespace: Option<String>,
	attributes: BTreeMap<String, String>,
	classes: Vec<String>,
	children: Vec<NodeHandle>,
	listeners: BTreeMap<String, Listener>,
}

#[derive(Debug)]
enum NodeData {
	Element(ElementData),
	Text(String),
}

#[derive(Debug)]
struct MemoryNode {
	parent: Option<NodeHandle>,
	data: NodeData,
}

/// A DOM-like document kept entirely in memory.
///
/// The document starts as `<html><head></head><body></body></html>`. Detached
/// nodes stay addressable until they are released; released slots are reused
/// by later allocations.
///
/// ```
/// use arbor_pages::dom::{MemoryDocument, RenderTarget};
///
/// let mut doc = MemoryDocument::new();
/// let app = doc.append_container("div", "app").unwrap();
/// assert_eq!(doc.query_selector("#app"), Some(app));
/// ```
#[derive(Debug)]
pub struct MemoryDocument {
	nodes: Vec<Option<MemoryNode>>,
	free: Vec<NodeHandle>,
	root: NodeHandle,
	head: NodeHandle,
	body: NodeHandle,
	stylesheets: Vec<String>,
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDocument {
	/// Creates an empty html/head/body document.
	pub fn new() -> Self {
		let (root, head, body) = (
			NodeHandle::from_raw(0),
			NodeHandle::from_raw(1),
			NodeHandle::from_raw(2),
		);
		let mut doc = Self {
			nodes: ["html", "head", "body"]
				.into_iter()
				.map(|tag| {
					Some(MemoryNode {
						parent: None,
						data: element_data(tag, None),
					})
				})
				.collect(),
			free: Vec::new(),
			root,
			head,
			body,
			stylesheets: Vec::new(),
		};
		doc.attach(root, head, 0);
		doc.attach(root, body, 1);
		doc
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> NodeHandle {
		self.root
	}

	/// The `<head>` element.
	pub fn head(&self) -> NodeHandle {
		self.head
	}

	/// The `<body>` element.
	pub fn body(&self) -> NodeHandle {
		self.body
	}

	/// Appends `<tag id="id">` to the body and returns it. Convenient for creating
	/// mount containers.
	pub fn append_container(&mut self, tag: &str, id: &str) -> Result<NodeHandle, TargetError> {
		let node = self.create_element(tag, None)?;
		self.set_attribute(node, "id", id)?;
		let body = self.body;
		let end = self.child_count(body);
		self.attach(body, node, end);
		Ok(node)
	}

	/// Stylesheets injected so far, in order.
	pub fn stylesheets(&self) -> &[String] {
		&self.stylesheets
	}

	/// Number of live nodes, attached or not. Released nodes are not counted.
	pub fn node_count(&self) -> usize {
		self.nodes.len() - self.free.len()
	}

	/// Returns the tag of an element.
	pub fn tag(&self, node: NodeHandle) -> Result<&str, TargetError> {
		Ok(&self.element(node)?.tag)
	}

	/// Returns the namespace of an element.
	pub fn namespace(&self, node: NodeHandle) -> Result<Option<&str>, TargetError> {
		Ok(self.element(node)?.namespace.as_deref())
	}

	/// Returns the content of a text node.
	pub fn text(&self, node: NodeHandle) -> Result<&str, TargetError> {
		match &self.get(node)?.data {
			NodeData::Text(content) => Ok(content),
			NodeData::Element(_) => Err(TargetError::NotAText(node)),
		}
	}

	/// Returns the class list of an element.
	pub fn classes(&self, node: NodeHandle) -> Result<&[String], TargetError> {
		Ok(&self.element(node)?.classes)
	}

	/// Returns the names of the events bound on an element.
	pub fn listener_names(&self, node: NodeHandle) -> Result<Vec<&str>, TargetError> {
		Ok(self
			.element(node)?
			.listeners
			.keys()
			.map(String::as_str)
			.collect())
	}

	/// Returns the parent of a node, if attached.
	pub fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, TargetError> {
		Ok(self.get(node)?.parent)
	}

	/// Serializes a node including its own tag.
	pub fn outer_markup(&self, node: NodeHandle) -> Result<String, TargetError> {
		let mut out = String::new();
		self.write_node(node, &mut out)?;
		Ok(out)
	}

	/// Delivers `event` to the listener bound on its target.
	///
	/// Returns `false` when nothing is bound for that event name. The listener
	/// runs after the document borrow is released, so it may freely capture
	/// application state.
	pub fn dispatch(&self, event: &Event) -> Result<bool, TargetError> {
		let listener = self.element(event.target)?.listeners.get(&event.name).cloned();
		match listener {
			Some(listener) => {
				listener.call(event);
				Ok(true)
			}
			None => Ok(false),
		}
	}

	fn alloc(&mut self, data: NodeData) -> Result<NodeHandle, TargetError> {
		let node = MemoryNode { parent: None, data };
		if let Some(handle) = self.free.pop() {
			self.nodes[handle.raw() as usize] = Some(node);
			return Ok(handle);
		}
		let raw = u32::try_from(self.nodes.len()).map_err(|_| TargetError::Exhausted)?;
		self.nodes.push(Some(node));
		Ok(NodeHandle::from_raw(raw))
	}

	fn get(&self, node: NodeHandle) -> Result<&MemoryNode, TargetError> {
		self.nodes
			.get(node.raw() as usize)
			.and_then(Option::as_ref)
			.ok_or(TargetError::UnknownNode(node))
	}

	fn get_mut(&mut self, node: NodeHandle) -> Result<&mut MemoryNode, TargetError> {
		self.nodes
			.get_mut(node.raw() as usize)
			.and_then(Option::as_mut)
			.ok_or(TargetError::UnknownNode(node))
	}

	fn element(&self, node: NodeHandle) -> Result<&ElementData, TargetError> {
		match &self.get(node)?.data {
			NodeData::Element(el) => Ok(el),
			NodeData::Text(_) => Err(TargetError::NotAnElement(node)),
		}
	}

	fn element_mut(&mut self, node: NodeHandle) -> Result<&mut ElementData, TargetError> {
		match &mut self.get_mut(node)?.data {
			NodeData::Element(el) => Ok(el),
			NodeData::Text(_) => Err(TargetError::NotAnElement(node)),
		}
	}

	fn child_count(&self, node: NodeHandle) -> usize {
		self.element(node).map(|el| el.children.len()).unwrap_or(0)
	}

	// Callers have validated both handles.
	fn attach(&mut self, parent: NodeHandle, child: NodeHandle, index: usize) {
		if let Ok(el) = self.element_mut(parent) {
			let index = index.min(el.children.len());
			el.children.insert(index, child);
		}
		if let Ok(node) = self.get_mut(child) {
			node.parent = Some(parent);
		}
	}

	fn detach(&mut self, child: NodeHandle) -> Result<(), TargetError> {
		let Some(parent) = self.get(child)?.parent else {
			return Ok(());
		};
		let el = self.element_mut(parent)?;
		el.children.retain(|c| *c != child);
		self.get_mut(child)?.parent = None;
		Ok(())
	}

	fn matches(&self, node: NodeHandle, selector: &str) -> bool {
		let Ok(el) = self.element(node) else {
			return false;
		};
		if let Some(id) = selector.strip_prefix('#') {
			el.attributes.get("id").is_some_and(|v| v == id)
		} else if let Some(class) = selector.strip_prefix('.') {
			el.classes.iter().any(|c| c == class)
		} else {
			el.tag.eq_ignore_ascii_case(selector)
		}
	}

	fn find(&self, node: NodeHandle, selector: &str) -> Option<NodeHandle> {
		if self.matches(node, selector) {
			return Some(node);
		}
		let el = self.element(node).ok()?;
		el.children
			.iter()
			.find_map(|child| self.find(*child, selector))
	}

	fn write_node(&self, node: NodeHandle, out: &mut String) -> Result<(), TargetError> {
		match &self.get(node)?.data {
			NodeData::Text(content) => out.push_str(&markup::escape(content)),
			NodeData::Element(el) => {
				markup::open_tag(
					out,
					&el.tag,
					el.attributes.get("id").map(String::as_str),
					&el.classes,
					el.attributes
						.iter()
						.map(|(k, v)| (k.as_str(), v.as_str())),
				);
				for child in &el.children {
					self.write_node(*child, out)?;
				}
				markup::close_tag(out, &el.tag);
			}
		}
		Ok(())
	}
}

fn element_data(tag: &str, namespace: Option<&str>) -> NodeData {
	NodeData::Element(ElementData {
		tag: tag.to_string(),
		namespace: namespace.map(str::to_string),
		attributes: BTreeMap::new(),
		classes: Vec::new(),
		children: Vec::new(),
		listeners: BTreeMap::new(),
	})
}

impl RenderTarget for MemoryDocument {
	fn create_element(
		&mut self,
		tag: &str,
		namespace: Option<&str>,
	) -> Result<NodeHandle, TargetError> {
		if !markup::is_valid_tag(tag) {
			return Err(TargetError::InvalidTag(tag.to_string()));
		}
		self.alloc(element_data(tag, namespace))
	}

	fn create_text(&mut self, content: &str) -> Result<NodeHandle, TargetError> {
		self.alloc(NodeData::Text(content.to_string()))
	}

	fn set_text(&mut self, node: NodeHandle, content: &str) -> Result<(), TargetError> {
		match &mut self.get_mut(node)?.data {
			NodeData::Text(existing) => {
				content.clone_into(existing);
				Ok(())
			}
			NodeData::Element(_) => Err(TargetError::NotAText(node)),
		}
	}

	fn attribute(&self, node: NodeHandle, name: &str) -> Result<Option<String>, TargetError> {
		let el = self.element(node)?;
		if name == "class" {
			return Ok((!el.classes.is_empty()).then(|| el.classes.join(" ")));
		}
		Ok(el.attributes.get(name).cloned())
	}

	fn set_attribute(
		&mut self,
		node: NodeHandle,
		name: &str,
		value: &str,
	) -> Result<(), TargetError> {
		let el = self.element_mut(node)?;
		if name == "class" {
			el.classes = value.split_whitespace().map(str::to_string).collect();
		} else {
			el.attributes.insert(name.to_string(), value.to_string());
		}
		Ok(())
	}

	fn remove_attribute(&mut self, node: NodeHandle, name: &str) -> Result<(), TargetError> {
		let el = self.element_mut(node)?;
		if name == "class" {
			el.classes.clear();
		} else {
			el.attributes.remove(name);
		}
		Ok(())
	}

	fn add_class(&mut self, node: NodeHandle, class: &str) -> Result<(), TargetError> {
		let el = self.element_mut(node)?;
		if !el.classes.iter().any(|c| c == class) {
			el.classes.push(class.to_string());
		}
		Ok(())
	}

	fn remove_class(&mut self, node: NodeHandle, class: &str) -> Result<(), TargetError> {
		self.element_mut(node)?.classes.retain(|c| c != class);
		Ok(())
	}

	fn insert_child(
		&mut self,
		parent: NodeHandle,
		child: NodeHandle,
		index: usize,
	) -> Result<(), TargetError> {
		self.element(parent)?;
		self.detach(child)?;
		self.attach(parent, child, index);
		Ok(())
	}

	fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError> {
		if !self.element(parent)?.children.contains(&child) {
			return Err(TargetError::NotAChild { parent, child });
		}
		self.detach(child)
	}

	fn replace_child(
		&mut self,
		parent: NodeHandle,
		new_child: NodeHandle,
		old_child: NodeHandle,
	) -> Result<(), TargetError> {
		let index = self
			.element(parent)?
			.children
			.iter()
			.position(|c| *c == old_child)
			.ok_or(TargetError::NotAChild {
				parent,
				child: old_child,
			})?;
		self.get(new_child)?;
		self.detach(old_child)?;
		self.detach(new_child)?;
		self.attach(parent, new_child, index);
		Ok(())
	}

	fn children(&self, node: NodeHandle) -> Result<Vec<NodeHandle>, TargetError> {
		Ok(self.element(node)?.children.clone())
	}

	fn add_listener(
		&mut self,
		node: NodeHandle,
		event: &str,
		listener: Listener,
	) -> Result<(), TargetError> {
		self.element_mut(node)?
			.listeners
			.insert(event.to_string(), listener);
		Ok(())
	}

	fn remove_listener(&mut self, node: NodeHandle, event: &str) -> Result<(), TargetError> {
		self.element_mut(node)?.listeners.remove(event);
		Ok(())
	}

	fn release(&mut self, node: NodeHandle) -> Result<(), TargetError> {
		if [self.root, self.head, self.body].contains(&node) {
			return Err(TargetError::Permanent(node));
		}
		self.detach(node)?;
		let mut pending = vec![node];
		while let Some(handle) = pending.pop() {
			let Some(released) = self.nodes.get_mut(handle.raw() as usize).and_then(Option::take)
			else {
				continue;
			};
			if let NodeData::Element(el) = released.data {
				pending.extend(el.children);
			}
			self.free.push(handle);
		}
		Ok(())
	}

	fn query_selector(&self, selector: &str) -> Option<NodeHandle> {
		self.find(self.root, selector.trim())
	}

	fn inject_stylesheet(&mut self, css: &str) -> Result<(), TargetError> {
		let style = self.create_element("style", None)?;
		let text = self.create_text(css)?;
		self.attach(style, text, 0);
		let head = self.head;
		let end = self.child_count(head);
		self.attach(head, style, end);
		self.stylesheets.push(css.to_string());
		Ok(())
	}

	fn inner_markup(&self, node: NodeHandle) -> Result<String, TargetError> {
		let mut out = String::new();
		for child in &self.element(node)?.children {
			self.write_node(*child, &mut out)?;
		}
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::cell::Cell;
	use std::rc::Rc;

	#[fixture]
	fn doc() -> MemoryDocument {
		MemoryDocument::new()
	}

	#[rstest]
	fn test_new_document_skeleton(doc: MemoryDocument) {
		assert_eq!(
			doc.outer_markup(doc.document_element()).unwrap(),
			"<html><head></head><body></body></html>"
		);
	}

	#[rstest]
	fn test_query_selector_variants(mut doc: MemoryDocument) {
		let app = doc.append_container("div", "app").unwrap();
		let span = doc.create_element("span", None).unwrap();
		doc.add_class(span, "badge").unwrap();
		doc.insert_child(app, span, 0).unwrap();

		assert_eq!(doc.query_selector("#app"), Some(app));
		assert_eq!(doc.query_selector(".badge"), Some(span));
		assert_eq!(doc.query_selector("span"), Some(span));
		assert_eq!(doc.query_selector("#missing"), None);
	}

	#[rstest]
	fn test_insert_moves_node_between_parents(mut doc: MemoryDocument) {
		let a = doc.append_container("div", "a").unwrap();
		let b = doc.append_container("div", "b").unwrap();
		let text = doc.create_text("x").unwrap();
		doc.insert_child(a, text, 0).unwrap();
		doc.insert_child(b, text, 0).unwrap();

		assert!(doc.children(a).unwrap().is_empty());
		assert_eq!(doc.children(b).unwrap(), vec![text]);
		assert_eq!(doc.parent(text).unwrap(), Some(b));
	}

	#[rstest]
	fn test_insert_index_past_end_appends(mut doc: MemoryDocument) {
		let app = doc.append_container("div", "app").unwrap();
		let first = doc.create_text("1").unwrap();
		let second = doc.create_text("2").unwrap();
		doc.insert_child(app, first, 0).unwrap();
		doc.insert_child(app, second, 99).unwrap();
		assert_eq!(doc.inner_markup(app).unwrap(), "12");
	}

	#[rstest]
	fn test_remove_child_requires_parentage(mut doc: MemoryDocument) {
		let app = doc.append_container("div", "app").unwrap();
		let stray = doc.create_text("x").unwrap();
		assert_eq!(
			doc.remove_child(app, stray),
			Err(TargetError::NotAChild {
				parent: app,
				child: stray
			})
		);
	}

	#[rstest]
	fn test_replace_child_keeps_position(mut doc: MemoryDocument) {
		let app = doc.append_container("ul", "list").unwrap();
		let a = doc.create_text("a").unwrap();
		let b = doc.create_text("b").unwrap();
		let c = doc.create_text("c").unwrap();
		doc.insert_child(app, a, 0).unwrap();
		doc.insert_child(app, b, 1).unwrap();
		doc.replace_child(app, c, a).unwrap();
		assert_eq!(doc.inner_markup(app).unwrap(), "cb");
		assert_eq!(doc.parent(a).unwrap(), None);
	}

	#[rstest]
	fn test_class_attribute_round_trips_through_class_list(mut doc: MemoryDocument) {
		let el = doc.create_element("div", None).unwrap();
		doc.set_attribute(el, "class", "a  b").unwrap();
		assert_eq!(doc.classes(el).unwrap(), ["a", "b"]);
		assert_eq!(doc.attribute(el, "class").unwrap().as_deref(), Some("a b"));
		doc.remove_class(el, "a").unwrap();
		assert_eq!(doc.attribute(el, "class").unwrap().as_deref(), Some("b"));
	}

	#[rstest]
	fn test_text_operations_reject_elements(mut doc: MemoryDocument) {
		let el = doc.create_element("div", None).unwrap();
		assert_eq!(doc.set_text(el, "x"), Err(TargetError::NotAText(el)));
		let text = doc.create_text("x").unwrap();
		assert_eq!(
			doc.set_attribute(text, "a", "b"),
			Err(TargetError::NotAnElement(text))
		);
	}

	#[rstest]
	#[case("")]
	#[case("di v")]
	#[case("<div>")]
	fn test_invalid_tags_rejected(mut doc: MemoryDocument, #[case] tag: &str) {
		assert!(matches!(
			doc.create_element(tag, None),
			Err(TargetError::InvalidTag(_))
		));
	}

	#[rstest]
	fn test_dispatch_reaches_bound_listener(mut doc: MemoryDocument) {
		let button = doc.create_element("button", None).unwrap();
		let clicks = Rc::new(Cell::new(0));
		doc.add_listener(
			button,
			"click",
			Listener::new({
				let clicks = Rc::clone(&clicks);
				move |_| clicks.set(clicks.get() + 1)
			}),
		)
		.unwrap();

		assert!(doc.dispatch(&Event::new("click", button)).unwrap());
		assert!(!doc.dispatch(&Event::new("input", button)).unwrap());
		doc.remove_listener(button, "click").unwrap();
		assert!(!doc.dispatch(&Event::new("click", button)).unwrap());
		assert_eq!(clicks.get(), 1);
	}

	#[rstest]
	fn test_release_frees_subtree(mut doc: MemoryDocument) {
		let app = doc.append_container("div", "app").unwrap();
		let list = doc.create_element("ul", None).unwrap();
		let item = doc.create_element("li", None).unwrap();
		let label = doc.create_text("x").unwrap();
		doc.insert_child(item, label, 0).unwrap();
		doc.insert_child(list, item, 0).unwrap();
		doc.insert_child(app, list, 0).unwrap();
		let before = doc.node_count();

		doc.release(list).unwrap();

		assert_eq!(doc.node_count(), before - 3);
		assert!(doc.children(app).unwrap().is_empty());
		for handle in [list, item, label] {
			assert_eq!(doc.parent(handle), Err(TargetError::UnknownNode(handle)));
		}
	}

	#[rstest]
	fn test_released_slots_are_reused(mut doc: MemoryDocument) {
		let first = doc.create_text("a").unwrap();
		doc.release(first).unwrap();
		let second = doc.create_text("b").unwrap();
		assert_eq!(first, second);
		assert_eq!(doc.text(second).unwrap(), "b");
	}

	#[rstest]
	fn test_skeleton_cannot_be_released(mut doc: MemoryDocument) {
		let body = doc.body();
		assert_eq!(doc.release(body), Err(TargetError::Permanent(body)));
		assert_eq!(
			doc.outer_markup(doc.document_element()).unwrap(),
			"<html><head></head><body></body></html>"
		);
	}

	#[rstest]
	fn test_inject_stylesheet_appends_style_to_head(mut doc: MemoryDocument) {
		doc.inject_stylesheet(".a{color:red}").unwrap();
		assert_eq!(
			doc.inner_markup(doc.head()).unwrap(),
			"<style>.a{color:red}</style>"
		);
		assert_eq!(doc.stylesheets(), [".a{color:red}"]);
	}
}
