//! Tree building.
//!
//! Building a generation walks the tree depth first, parents before children.
//! Every node gets its path, parent and sibling links. Every component invokes
//! its render function with a [`Context`] bound to its hook chain and stores the
//! result as its single child. Signatures are computed bottom-up once the
//! children are done.

use tracing::trace;

use crate::context::{Context, PassStore};
use crate::env::Updater;
use crate::error::Result;
use crate::hooks::HookStore;
use crate::identity::{ComponentKey, NodeId, NodePath};
use crate::lifecycle::EventBus;
use crate::node::{IntoNode, Node};

/// Builds one generation of a tree.
pub(crate) struct Renderer<'a> {
	hooks: &'a mut HookStore,
	bus: &'a mut EventBus,
	store: &'a mut PassStore,
	updater: &'a Updater,
}

impl<'a> Renderer<'a> {
	pub(crate) fn new(
		hooks: &'a mut HookStore,
		bus: &'a mut EventBus,
		store: &'a mut PassStore,
		updater: &'a Updater,
	) -> Self {
		Self {
			hooks,
			bus,
			store,
			updater,
		}
	}

	/// Builds `root` in place, treating it as the root of the tree.
	pub(crate) fn build(&mut self, root: &mut Node) -> Result<()> {
		root.position(None, None, None);
		self.build_at(root, NodePath::root())
	}

	fn build_at(&mut self, node: &mut Node, path: NodePath) -> Result<()> {
		node.meta_mut().path = Some(path.clone());
		let id = path.id();

		if let Node::Component(component) = node {
			let key = ComponentKey::new(id, component.factory_id());
			let name = component.name().to_string();
			self.bus.enter(key, &name, &path);
			trace!(component = %name, path = %path, "render");

			let chain = self.hooks.entry(key, &name);
			chain.begin();
			let mut cx = Context::new(
				key,
				&name,
				&path,
				chain,
				self.bus,
				self.store,
				self.updater,
			);
			let rendered = component.render(&mut cx);
			cx.finish();
			component.rendered = Some(Box::new(rendered?));
		}

		let ids: Vec<NodeId> = (0..node.child_nodes().len())
			.map(|index| path.child(index).id())
			.collect();
		for (index, child) in node.child_nodes_mut().iter_mut().enumerate() {
			let prev = index.checked_sub(1).map(|i| ids[i]);
			let next = ids.get(index + 1).copied();
			child.position(Some(id), prev, next);
			self.build_at(child, path.child(index))?;
		}

		let signature = node.compute_signature();
		node.meta_mut().signature = signature;
		Ok(())
	}
}

/// Builds a detached tree: renders every component with fresh hook state and
/// no lifecycle firing, and assigns identities and signatures.
///
/// Useful for serialization and for diffing two trees outside an environment.
///
/// ```
/// use arbor_pages::builder::{html::div, text};
/// use arbor_pages::render::prepare;
///
/// let tree = prepare(div().child(text("a"))).unwrap();
/// assert_eq!(tree.child(0).and_then(|n| n.path()).map(ToString::to_string).as_deref(), Some("/0"));
/// ```
pub fn prepare(tree: impl IntoNode) -> Result<Node> {
	let mut tree = tree.into_node();
	let mut hooks = HookStore::new();
	let mut bus = EventBus::new();
	let mut store = PassStore::new();
	let updater = Updater::default();
	Renderer::new(&mut hooks, &mut bus, &mut store, &updater).build(&mut tree)?;
	Ok(tree)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::html::{div, li, ul};
	use crate::builder::{component, component_with_children, fragment, text};
	use crate::error::RenderError;
	use rstest::rstest;

	fn label(_cx: &mut Context<'_>, value: &u32, _children: &[Node]) -> Result<Node> {
		Ok(text(format!("#{value}")))
	}

	fn frame(_cx: &mut Context<'_>, _props: &(), children: &[Node]) -> Result<Node> {
		Ok(div().class("frame").children(children.to_vec()).into())
	}

	fn provider(cx: &mut Context<'_>, _props: &(), children: &[Node]) -> Result<Node> {
		cx.provide("lang", "en".to_string());
		Ok(fragment(children.to_vec()))
	}

	fn consumer(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		let lang: String = cx.require("lang")?;
		Ok(text(lang))
	}

	#[rstest]
	fn test_paths_and_links() {
		let tree = prepare(ul().child(li()).child(li()).child(li())).unwrap();
		let middle = tree.child(1).unwrap();
		assert_eq!(middle.path(), Some(&NodePath::from(vec![1])));
		assert_eq!(middle.meta().parent, Some(NodePath::root().id()));
		assert_eq!(middle.meta().prev, Some(NodePath::from(vec![0]).id()));
		assert_eq!(middle.meta().next, Some(NodePath::from(vec![2]).id()));
		assert_eq!(tree.child(0).unwrap().meta().prev, None);
		assert_eq!(tree.child(2).unwrap().meta().next, None);
	}

	#[rstest]
	fn test_component_render_result_is_child_zero() {
		let tree = prepare(div().child(component(label, 7))).unwrap();
		let rendered = tree.find(&NodePath::from(vec![0, 0])).unwrap();
		assert_eq!(rendered.to_string(), "#7");
		assert_eq!(rendered.meta().parent, Some(NodePath::from(vec![0]).id()));
		assert_eq!(tree.to_string(), "<div>#7</div>");
	}

	#[rstest]
	fn test_given_children_render_inside_component_output() {
		let tree = prepare(component_with_children(frame, (), [component(label, 1)])).unwrap();
		assert_eq!(tree.to_string(), "<div class=\"frame\">#1</div>");
	}

	#[rstest]
	fn test_static_subtrees_are_signed() {
		let tree = prepare(div().child(text("a")).child(component(label, 1))).unwrap();
		assert!(tree.child(0).unwrap().signature().is_some());
		assert!(tree.child(1).unwrap().signature().is_none());
		assert!(tree.signature().is_none());
	}

	#[rstest]
	fn test_providers_run_before_consumers() {
		let tree = prepare(component_with_children(provider, (), [component(consumer, ())])).unwrap();
		assert_eq!(tree.to_string(), "en");
	}

	#[rstest]
	fn test_consumer_without_provider_fails() {
		let err = prepare(component(consumer, ())).unwrap_err();
		assert!(matches!(err, RenderError::MissingContext { .. }));
	}
}
