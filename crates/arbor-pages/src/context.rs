//! The context handed to component render functions.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::env::Updater;
use crate::error::{RenderError, Result};
use crate::hooks::{Cleanup, HookChain, State};
use crate::identity::{ComponentKey, NodeId, NodePath};
use crate::lifecycle::{EventBus, LifecycleEvent};

/// Key/value store scoped to one render pass.
///
/// Components render depth first, parents before children, so a value provided
/// by a component is visible to everything rendered after it in the same pass.
#[derive(Default)]
pub struct PassStore {
	values: HashMap<String, Rc<dyn Any>>,
}

impl PassStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value` under `key`, replacing any previous value.
	pub fn insert<T: 'static>(&mut self, key: impl Into<String>, value: T) {
		self.values.insert(key.into(), Rc::new(value));
	}

	/// Reads the value under `key` if it has type `T`.
	pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
		self.values.get(key)?.downcast_ref::<T>()
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if nothing was provided.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Per-invocation access to hooks, lifecycle registration and pass-scoped data.
pub struct Context<'a> {
	key: ComponentKey,
	name: &'a str,
	path: &'a NodePath,
	chain: &'a mut HookChain,
	bus: &'a mut EventBus,
	store: &'a mut PassStore,
	updater: &'a Updater,
}

impl<'a> Context<'a> {
	pub(crate) fn new(
		key: ComponentKey,
		name: &'a str,
		path: &'a NodePath,
		chain: &'a mut HookChain,
		bus: &'a mut EventBus,
		store: &'a mut PassStore,
		updater: &'a Updater,
	) -> Self {
		Self {
			key,
			name,
			path,
			chain,
			bus,
			store,
			updater,
		}
	}

	/// Name of the rendering component.
	pub fn name(&self) -> &str {
		self.name
	}

	/// Position of the rendering component.
	pub fn path(&self) -> &NodePath {
		self.path
	}

	/// Identity of the rendering component.
	pub fn id(&self) -> NodeId {
		self.key.id
	}

	/// Runs `f` after the pass in which this component first appears.
	pub fn on_mount<F>(&mut self, f: F)
	where
		F: FnOnce() -> Result<()> + 'static,
	{
		self.bus.register(self.key, LifecycleEvent::Mount, Box::new(f));
	}

	/// Runs `f` after this pass.
	pub fn on_render<F>(&mut self, f: F)
	where
		F: FnOnce() -> Result<()> + 'static,
	{
		self.bus.register(self.key, LifecycleEvent::Render, Box::new(f));
	}

	/// Runs `f` after the first pass in which this component is gone. The
	/// registration from the component's latest render wins.
	pub fn on_unmount<F>(&mut self, f: F)
	where
		F: FnOnce() -> Result<()> + 'static,
	{
		self.bus.register(self.key, LifecycleEvent::Unmount, Box::new(f));
	}

	/// State that persists across renders.
	pub fn use_state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Result<State<T>> {
		self.use_state_with_deps((), init)
	}

	/// State that resets to `init()` whenever `deps` differs from the previous render.
	pub fn use_state_with_deps<T, D>(&mut self, deps: D, init: impl FnOnce() -> T) -> Result<State<T>>
	where
		T: 'static,
		D: PartialEq + 'static,
	{
		let cell = self.chain.use_state(deps, init)?;
		Ok(State::new(cell, self.updater.clone()))
	}

	/// Runs `effect` after the pass if `deps` changed since the previous render
	/// (always on the first). The cleanup it returns runs before the next run and
	/// on unmount.
	pub fn use_effect<D, F>(&mut self, deps: D, effect: F) -> Result<()>
	where
		D: PartialEq + 'static,
		F: FnOnce() -> Option<Cleanup> + 'static,
	{
		let (slot, changed) = self.chain.use_effect(deps)?;
		if changed {
			self.bus.queue_effect(self.key, slot, Box::new(effect));
		}
		Ok(())
	}

	/// Makes `value` available under `key` to everything rendered later in this pass.
	pub fn provide<T: 'static>(&mut self, key: impl Into<String>, value: T) {
		self.store.insert(key, value);
	}

	/// Reads a value provided earlier in this pass.
	pub fn consume<T: Clone + 'static>(&self, key: &str) -> Option<T> {
		self.store.get::<T>(key).cloned()
	}

	/// Like [`Context::consume`], but a missing provider is an error.
	pub fn require<T: Clone + 'static>(&self, key: &str) -> Result<T> {
		self.consume(key).ok_or_else(|| RenderError::MissingContext {
			key: key.to_string(),
		})
	}

	/// Handle for requesting a new render pass, e.g. from an event listener.
	pub fn updater(&self) -> Updater {
		self.updater.clone()
	}

	pub(crate) fn finish(self) {
		self.chain.finish();
	}
}
