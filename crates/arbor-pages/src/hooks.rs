//! Hook state chains.
//!
//! Every component instance owns a [`HookChain`]: an ordered list of slots, one
//! per hook call. Slots have no names. The `n`-th hook call of a render always
//! lands on the `n`-th slot, so components must call their hooks in the same
//! order on every render. A slot that is asked for a different kind of hook, or
//! for state of a different type, fails the render with
//! [`RenderError::HookOrder`].
//!
//! Chains are stored by [`ComponentKey`] in a [`HookStore`] owned by the render
//! environment. When a component leaves the tree its chain is dropped, so a new
//! component mounted at the same position starts from scratch.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tracing::{trace, warn};

use crate::env::Updater;
use crate::error::{RenderError, Result};
use crate::identity::{ComponentKey, NodeId, NodePath};

/// Cleanup returned by an effect, run before the effect re-runs and on unmount.
pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// What a slot was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
	/// `use_state` / `use_state_with_deps`.
	State,
	/// `use_effect`.
	Effect,
}

impl fmt::Display for HookKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			HookKind::State => "state",
			HookKind::Effect => "effect",
		})
	}
}

struct Slot {
	kind: HookKind,
	type_id: TypeId,
	type_name: &'static str,
	mounted: bool,
	value: Rc<dyn Any>,
	deps: Box<dyn Any>,
	changes: u64,
	cleanup: Option<Cleanup>,
}

impl Slot {
	fn new<D: 'static>(kind: HookKind, type_id: TypeId, type_name: &'static str, value: Rc<dyn Any>, deps: D) -> Self {
		Self {
			kind,
			type_id,
			type_name,
			mounted: false,
			value,
			deps: Box::new(deps),
			changes: 1,
			cleanup: None,
		}
	}

	fn describe(kind: HookKind, type_name: &str) -> String {
		format!("{kind}<{type_name}>")
	}

	fn deps_changed<D: PartialEq + 'static>(&self, deps: &D) -> bool {
		self.deps.downcast_ref::<D>() != Some(deps)
	}
}

/// Read-only view of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
	/// Hook kind.
	pub kind: HookKind,
	/// Name of the state type; `()` for effects.
	pub type_name: &'static str,
	/// Whether the owning component finished a pass with this slot.
	pub mounted: bool,
	/// How many times the slot was created or reset.
	pub changes: u64,
}

/// The slots of one component instance.
pub struct HookChain {
	component: String,
	slots: Vec<Slot>,
	cursor: usize,
}

impl fmt::Debug for HookChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookChain")
			.field("component", &self.component)
			.field("slots", &self.snapshot())
			.field("cursor", &self.cursor)
			.finish()
	}
}

impl HookChain {
	fn new(component: &str) -> Self {
		Self {
			component: component.to_string(),
			slots: Vec::new(),
			cursor: 0,
		}
	}

	/// Name of the owning component.
	pub fn component(&self) -> &str {
		&self.component
	}

	/// Number of slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns true if the component never called a hook.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Describes every slot, in call order.
	pub fn snapshot(&self) -> Vec<SlotSnapshot> {
		self.slots
			.iter()
			.map(|slot| SlotSnapshot {
				kind: slot.kind,
				type_name: slot.type_name,
				mounted: slot.mounted,
				changes: slot.changes,
			})
			.collect()
	}

	pub(crate) fn begin(&mut self) {
		self.cursor = 0;
	}

	pub(crate) fn finish(&mut self) {
		if self.cursor < self.slots.len() {
			warn!(
				component = %self.component,
				called = self.cursor,
				slots = self.slots.len(),
				"component called fewer hooks than on a previous render"
			);
		}
		self.cursor = 0;
	}

	fn check(&self, index: usize, kind: HookKind, type_id: TypeId, type_name: &'static str) -> Result<()> {
		let slot = &self.slots[index];
		if slot.kind != kind || slot.type_id != type_id {
			return Err(RenderError::HookOrder {
				component: self.component.clone(),
				slot: index,
				expected: Slot::describe(slot.kind, slot.type_name),
				found: Slot::describe(kind, type_name),
			});
		}
		Ok(())
	}

	/// Returns the state cell of the next slot, creating or resetting it as needed.
	pub(crate) fn use_state<T, D>(&mut self, deps: D, init: impl FnOnce() -> T) -> Result<Rc<RefCell<T>>>
	where
		T: 'static,
		D: PartialEq + 'static,
	{
		let index = self.cursor;
		self.cursor += 1;
		let type_id = TypeId::of::<T>();
		let type_name = std::any::type_name::<T>();

		if index == self.slots.len() {
			let cell = Rc::new(RefCell::new(init()));
			self.slots
				.push(Slot::new(HookKind::State, type_id, type_name, cell.clone(), deps));
			trace!(component = %self.component, slot = index, "state slot created");
			return Ok(cell);
		}

		self.check(index, HookKind::State, type_id, type_name)?;
		let slot = &mut self.slots[index];
		if slot.deps_changed(&deps) {
			let cell = Rc::new(RefCell::new(init()));
			slot.value = cell.clone();
			slot.deps = Box::new(deps);
			slot.changes += 1;
			trace!(component = %self.component, slot = index, "state slot reset");
			return Ok(cell);
		}
		slot.value
			.clone()
			.downcast::<RefCell<T>>()
			.map_err(|_| RenderError::HookOrder {
				component: self.component.clone(),
				slot: index,
				expected: Slot::describe(HookKind::State, slot.type_name),
				found: Slot::describe(HookKind::State, type_name),
			})
	}

	/// Advances over an effect slot. Returns the slot index and whether the
	/// effect must run this pass.
	pub(crate) fn use_effect<D>(&mut self, deps: D) -> Result<(usize, bool)>
	where
		D: PartialEq + 'static,
	{
		let index = self.cursor;
		self.cursor += 1;
		let type_id = TypeId::of::<()>();

		if index == self.slots.len() {
			self.slots
				.push(Slot::new(HookKind::Effect, type_id, "()", Rc::new(()), deps));
			trace!(component = %self.component, slot = index, "effect slot created");
			return Ok((index, true));
		}

		self.check(index, HookKind::Effect, type_id, "()")?;
		let slot = &mut self.slots[index];
		if slot.deps_changed(&deps) {
			slot.deps = Box::new(deps);
			slot.changes += 1;
			trace!(component = %self.component, slot = index, "effect dependencies changed");
			return Ok((index, true));
		}
		Ok((index, false))
	}

	/// Runs an effect body for `slot`, running the previous cleanup first.
	pub(crate) fn run_effect(&mut self, slot: usize, effect: EffectFn) {
		let Some(slot) = self.slots.get_mut(slot) else {
			return;
		};
		if let Some(cleanup) = slot.cleanup.take() {
			cleanup();
		}
		slot.cleanup = effect();
	}

	pub(crate) fn mark_mounted(&mut self) {
		for slot in &mut self.slots {
			slot.mounted = true;
		}
	}

	/// Runs pending effect cleanups, last slot first.
	pub(crate) fn teardown(&mut self) {
		for slot in self.slots.iter_mut().rev() {
			if let Some(cleanup) = slot.cleanup.take() {
				cleanup();
			}
			slot.mounted = false;
		}
	}
}

/// Hook chains of every mounted component.
#[derive(Debug, Default)]
pub struct HookStore {
	chains: HashMap<ComponentKey, HookChain>,
}

impl HookStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of chains.
	pub fn len(&self) -> usize {
		self.chains.len()
	}

	/// Returns true if no component holds a chain.
	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	/// Returns the chain of the component at `path`, whatever its render function.
	pub fn chain(&self, path: &NodePath) -> Option<&HookChain> {
		self.chain_by_id(path.id())
	}

	/// Returns the chain of the component with identity `id`.
	pub fn chain_by_id(&self, id: NodeId) -> Option<&HookChain> {
		self.chains
			.iter()
			.find_map(|(key, chain)| (key.id == id).then_some(chain))
	}

	/// Returns true if a component at `path` holds a chain.
	pub fn contains(&self, path: &NodePath) -> bool {
		self.chain(path).is_some()
	}

	pub(crate) fn entry(&mut self, key: ComponentKey, component: &str) -> &mut HookChain {
		self.chains
			.entry(key)
			.or_insert_with(|| HookChain::new(component))
	}

	pub(crate) fn get_mut(&mut self, key: &ComponentKey) -> Option<&mut HookChain> {
		self.chains.get_mut(key)
	}

	pub(crate) fn remove(&mut self, key: &ComponentKey) -> Option<HookChain> {
		self.chains.remove(key)
	}
}

/// Handle to a state slot.
///
/// Writes through [`State::set`], [`State::update`] or a [`StateGuard`] request a
/// new render pass from the owning environment.
pub struct State<T> {
	cell: Rc<RefCell<T>>,
	updater: Updater,
}

impl<T> Clone for State<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
			updater: self.updater.clone(),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("State").field(&self.cell).finish()
	}
}

impl<T> State<T> {
	pub(crate) fn new(cell: Rc<RefCell<T>>, updater: Updater) -> Self {
		Self { cell, updater }
	}

	/// Returns a copy of the value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.cell.borrow().clone()
	}

	/// Borrows the value for reading.
	pub fn read(&self) -> Ref<'_, T> {
		self.cell.borrow()
	}

	/// Runs `f` with a shared reference to the value.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&*self.cell.borrow())
	}

	/// Replaces the value and requests a render.
	pub fn set(&self, value: T) {
		*self.write() = value;
	}

	/// Mutates the value in place and requests a render.
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		let mut guard = self.write();
		f(&mut *guard);
	}

	/// Takes the write lock. The render request is issued when the guard is
	/// released.
	pub fn write(&self) -> StateGuard<'_, T> {
		StateGuard {
			value: self.cell.borrow_mut(),
			updater: &self.updater,
		}
	}

	/// Returns true if both handles point at the same slot value.
	pub fn ptr_eq(&self, other: &State<T>) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}
}

/// Write access to a state slot; requests a render on drop.
pub struct StateGuard<'a, T> {
	value: RefMut<'a, T>,
	updater: &'a Updater,
}

impl<T> Deref for StateGuard<'_, T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.value
	}
}

impl<T> DerefMut for StateGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut T {
		&mut self.value
	}
}

impl<T> Drop for StateGuard<'_, T> {
	fn drop(&mut self) {
		self.updater.request();
	}
}
