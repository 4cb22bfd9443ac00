use std::collections::BTreeMap;

use tracing::debug;

use super::{Patch, PatchRecord};
use crate::dom::{Listener, NodeHandle, RenderTarget};
use crate::error::{RenderError, Result};
use crate::identity::NodePath;
use crate::node::{ElementProps, Node};

/// Applies patches to a live tree and the render target it is mounted in.
///
/// `root` is the render-target element the live tree's root materializes into,
/// and `root_offset` the position of the tree's first node among `root`'s
/// children.
pub struct Executor<'t, T: RenderTarget + ?Sized> {
	target: &'t mut T,
	root: NodeHandle,
	root_offset: usize,
}

impl<'t, T: RenderTarget + ?Sized> Executor<'t, T> {
	/// Creates an executor for a tree mounted under `root`.
	pub fn new(target: &'t mut T, root: NodeHandle, root_offset: usize) -> Self {
		Self {
			target,
			root,
			root_offset,
		}
	}

	/// Applies `patches` in order, stopping at the first failure.
	pub fn apply_all(&mut self, live: &mut Node, patches: Vec<Patch>) -> Result<Vec<PatchRecord>> {
		let mut records = Vec::with_capacity(patches.len());
		for patch in patches {
			let record = patch.record();
			self.apply(live, patch)?;
			records.push(record);
		}
		Ok(records)
	}

	/// Applies a single patch.
	pub fn apply(&mut self, live: &mut Node, patch: Patch) -> Result<()> {
		debug!(kind = %patch.kind(), path = %patch.path(), "apply");
		match patch {
			Patch::Text { path, content } => {
				let Node::Text(text) = find_mut(live, &path)? else {
					return Err(RenderError::structural(&path, "text patch against a non-text node"));
				};
				let handle = text
					.handle
					.ok_or_else(|| RenderError::structural(&path, "text node is not mounted"))?;
				self.target.set_text(handle, &content)?;
				text.set_content(content);
			}
			Patch::Html { path, props } => {
				let Node::Element(element) = find_mut(live, &path)? else {
					return Err(RenderError::structural(&path, "html patch against a non-element"));
				};
				let handle = element
					.handle
					.ok_or_else(|| RenderError::structural(&path, "element is not mounted"))?;
				self.apply_props(handle, Some(&element.props()), &props)?;
				element.set_props(props);
			}
			Patch::Listeners { path, listeners } => {
				let Node::Element(element) = find_mut(live, &path)? else {
					return Err(RenderError::structural(
						&path,
						"listener patch against a non-element",
					));
				};
				let handle = element
					.handle
					.ok_or_else(|| RenderError::structural(&path, "element is not mounted"))?;
				self.bind_listeners(handle, Some(element.listeners()), &listeners)?;
				element.set_listeners(listeners);
			}
			Patch::Insert {
				parent,
				index,
				mut node,
			} => {
				let parent_node = find(live, &parent)?;
				if let Node::Text(_) = parent_node {
					return Err(RenderError::structural(&parent, "text nodes have no children"));
				}
				let len = parent_node.child_nodes().len();
				let index = index.unwrap_or(len);
				if index > len {
					return Err(RenderError::structural(
						&parent,
						format!("insert index {index} is past the end ({len} children)"),
					));
				}

				let (host, offset) = self.locate(live, &parent.child(index), true)?;
				let handles = self.materialize(&mut node, &parent.child(index))?;
				for (k, handle) in handles.into_iter().enumerate() {
					self.target.insert_child(host, handle, offset + k)?;
				}
				splice(find_mut(live, &parent)?, &parent, index, node)?;
			}
			Patch::Remove { path } => {
				let (host, _) = self.locate(live, &path, false)?;
				let parent = path
					.parent()
					.ok_or_else(|| RenderError::structural(&path, "the root cannot be removed"))?;
				let index = path.last().unwrap_or_default();
				let removed = take(find_mut(live, &parent)?, &path, index)?;
				self.detach_listeners(&removed)?;
				for handle in removed.top_handles() {
					self.target.remove_child(host, handle)?;
					self.target.release(handle)?;
				}
			}
			Patch::Replace { path, mut node } => {
				let (host, offset) = self.locate(live, &path, false)?;
				let new_handles = self.materialize(&mut node, &path)?;
				let old = find_mut(live, &path)?;
				let old_handles = old.top_handles();
				self.detach_listeners(old)?;
				match (new_handles.as_slice(), old_handles.as_slice()) {
					([new], [previous]) => self.target.replace_child(host, *new, *previous)?,
					_ => {
						for (k, handle) in new_handles.iter().enumerate() {
							self.target.insert_child(host, *handle, offset + k)?;
						}
						for handle in &old_handles {
							self.target.remove_child(host, *handle)?;
						}
					}
				}
				for handle in old_handles {
					self.target.release(handle)?;
				}
				*old = node;
			}
		}
		Ok(())
	}

	/// Finds the render-target element that hosts the node at `path` and the
	/// position of the node's first render-target node among the host's children.
	///
	/// With `open_end`, the last segment may point one past the parent's last
	/// child, which is where an appended node would go.
	fn locate(&self, live: &Node, path: &NodePath, open_end: bool) -> Result<(NodeHandle, usize)> {
		let mut host = self.root;
		let mut offset = self.root_offset;
		let mut node = live;
		let segments = path.segments();

		for (depth, &index) in segments.iter().enumerate() {
			let here = NodePath::from(segments[..depth].to_vec());
			match node {
				Node::Text(_) => {
					return Err(RenderError::structural(&here, "text nodes have no children"));
				}
				Node::Element(element) => {
					host = element
						.handle
						.ok_or_else(|| RenderError::structural(&here, "element is not mounted"))?;
					offset = 0;
				}
				Node::Fragment(_) | Node::Component(_) => {}
			}

			let children = node.child_nodes();
			let last = depth + 1 == segments.len();
			if last && open_end && index == children.len() {
				offset += children.iter().map(Node::materialized_len).sum::<usize>();
				return Ok((host, offset));
			}
			let Some(child) = children.get(index) else {
				return Err(RenderError::structural(path, "no node at this position"));
			};
			offset += children[..index]
				.iter()
				.map(Node::materialized_len)
				.sum::<usize>();
			node = child;
		}
		Ok((host, offset))
	}

	/// Creates render-target nodes for `node` and its subtree, recording handles
	/// on the nodes. Returns the handles to attach to the host, in order.
	fn materialize(&mut self, node: &mut Node, path: &NodePath) -> Result<Vec<NodeHandle>> {
		match node {
			Node::Text(text) => {
				let handle = self.target.create_text(text.content())?;
				text.handle = Some(handle);
				Ok(vec![handle])
			}
			Node::Element(element) => {
				let handle = self.target.create_element(element.tag(), element.namespace())?;
				self.apply_props(handle, None, &element.props())?;
				element.handle = Some(handle);

				let mut position = 0;
				for (index, child) in element.children.iter_mut().enumerate() {
					for child_handle in self.materialize(child, &path.child(index))? {
						self.target.insert_child(handle, child_handle, position)?;
						position += 1;
					}
				}
				Ok(vec![handle])
			}
			Node::Fragment(fragment) => {
				let mut handles = Vec::new();
				for (index, child) in fragment.children.iter_mut().enumerate() {
					handles.extend(self.materialize(child, &path.child(index))?);
				}
				Ok(handles)
			}
			Node::Component(component) => match component.rendered.as_deref_mut() {
				Some(rendered) => self.materialize(rendered, &path.child(0)),
				None => Err(RenderError::structural(
					path,
					format!("component `{}` was never rendered", component.name()),
				)),
			},
		}
	}

	/// Brings the render-target element from `old` properties to `new`.
	fn apply_props(
		&mut self,
		handle: NodeHandle,
		old: Option<&ElementProps>,
		new: &ElementProps,
	) -> Result<()> {
		let old_id = old.and_then(|props| props.dom_id.as_deref());
		match new.dom_id.as_deref() {
			Some(id) if old_id != Some(id) => self.target.set_attribute(handle, "id", id)?,
			None if old_id.is_some() => self.target.remove_attribute(handle, "id")?,
			_ => {}
		}

		let old_classes = old.map(|props| props.classes.as_slice()).unwrap_or(&[]);
		if old_classes != new.classes.as_slice() {
			self.apply_classes(handle, &new.classes)?;
		}

		if let Some(old) = old {
			for name in old.attrs.keys() {
				if !new.attrs.contains_key(name) {
					self.target.remove_attribute(handle, name)?;
				}
			}
		}
		for (name, value) in &new.attrs {
			if old.and_then(|props| props.attrs.get(name)) != Some(value) {
				self.target.set_attribute(handle, name, value)?;
			}
		}

		self.bind_listeners(handle, old.map(|props| &props.listeners), &new.listeners)
	}

	/// Brings the element's class list to `classes`.
	///
	/// Classes that stay keep their relative order on the target and new ones are
	/// appended, so single-class edits suffice whenever `classes` lists the kept
	/// classes first. Any other reordering rewrites the whole attribute.
	fn apply_classes(&mut self, handle: NodeHandle, classes: &[String]) -> Result<()> {
		if classes.is_empty() {
			self.target.remove_attribute(handle, "class")?;
			return Ok(());
		}
		let current: Vec<String> = self
			.target
			.attribute(handle, "class")?
			.map(|value| value.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default();
		let kept: Vec<&String> = current.iter().filter(|c| classes.contains(c)).collect();
		if !classes.iter().take(kept.len()).eq(kept.iter().copied()) {
			self.target.set_attribute(handle, "class", &classes.join(" "))?;
			return Ok(());
		}
		for class in current.iter().filter(|c| !classes.contains(c)) {
			self.target.remove_class(handle, class)?;
		}
		for class in &classes[kept.len()..] {
			self.target.add_class(handle, class)?;
		}
		Ok(())
	}

	fn bind_listeners(
		&mut self,
		handle: NodeHandle,
		old: Option<&BTreeMap<String, Listener>>,
		new: &BTreeMap<String, Listener>,
	) -> Result<()> {
		if let Some(old) = old {
			for event in old.keys() {
				if !new.contains_key(event) {
					self.target.remove_listener(handle, event)?;
				}
			}
		}
		for (event, listener) in new {
			let unchanged = old
				.and_then(|old| old.get(event))
				.is_some_and(|previous| previous.ptr_eq(listener));
			if !unchanged {
				self.target.add_listener(handle, event, listener.clone())?;
			}
		}
		Ok(())
	}

	/// Unbinds every listener in a subtree that is leaving the target.
	fn detach_listeners(&mut self, node: &Node) -> Result<()> {
		if let Node::Element(element) = node
			&& let Some(handle) = element.handle
		{
			for event in element.listeners().keys() {
				self.target.remove_listener(handle, event)?;
			}
		}
		for child in node.child_nodes() {
			self.detach_listeners(child)?;
		}
		Ok(())
	}
}

fn find<'n>(live: &'n Node, path: &NodePath) -> Result<&'n Node> {
	live.find(path)
		.ok_or_else(|| RenderError::structural(path, "no node at this position"))
}

fn find_mut<'n>(live: &'n mut Node, path: &NodePath) -> Result<&'n mut Node> {
	live.find_mut(path)
		.ok_or_else(|| RenderError::structural(path, "no node at this position"))
}

/// Adds `node` to the logical children of `parent`.
pub(super) fn splice(parent: &mut Node, at: &NodePath, index: usize, node: Node) -> Result<()> {
	match parent {
		Node::Element(element) if index <= element.children.len() => {
			element.children.insert(index, node);
		}
		Node::Fragment(fragment) if index <= fragment.children.len() => {
			fragment.children.insert(index, node);
		}
		Node::Component(component) if index == 0 && component.rendered.is_none() => {
			component.rendered = Some(Box::new(node));
		}
		Node::Component(_) => {
			return Err(RenderError::structural(
				at,
				"a component has exactly one render result",
			));
		}
		Node::Text(_) => {
			return Err(RenderError::structural(at, "text nodes have no children"));
		}
		Node::Element(_) | Node::Fragment(_) => {
			return Err(RenderError::structural(
				at,
				format!("insert index {index} is past the end"),
			));
		}
	}
	Ok(())
}

/// Removes and returns the logical child of `parent` at `index`.
pub(super) fn take(parent: &mut Node, path: &NodePath, index: usize) -> Result<Node> {
	let missing = || RenderError::structural(path, "no node at this position");
	match parent {
		Node::Element(element) if index < element.children.len() => {
			Ok(element.children.remove(index))
		}
		Node::Fragment(fragment) if index < fragment.children.len() => {
			Ok(fragment.children.remove(index))
		}
		Node::Component(component) if index == 0 => component
			.rendered
			.take()
			.map(|rendered| *rendered)
			.ok_or_else(missing),
		_ => Err(missing()),
	}
}

/// Copies render-target handles from the live tree onto the next generation.
///
/// Once every patch of a pass has been applied, both trees have the same shape;
/// any mismatch means the patch list did not describe the change.
pub(crate) fn transfer_handles(live: &Node, next: &mut Node) -> Result<()> {
	transfer_at(live, next, &NodePath::root())
}

fn transfer_at(live: &Node, next: &mut Node, path: &NodePath) -> Result<()> {
	if live.kind() != next.kind() {
		return Err(RenderError::structural(
			path,
			format!("live {} does not match next {}", live.kind(), next.kind()),
		));
	}
	next.set_handle(live.handle());

	let from = live.child_nodes();
	let to = next.child_nodes_mut();
	if from.len() != to.len() {
		return Err(RenderError::structural(
			path,
			format!("live has {} children, next has {}", from.len(), to.len()),
		));
	}
	for (index, (a, b)) in from.iter().zip(to.iter_mut()).enumerate() {
		transfer_at(a, b, &path.child(index))?;
	}
	Ok(())
}
