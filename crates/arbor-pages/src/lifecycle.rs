//! Lifecycle event bus.
//!
//! A fresh [`EventBus`] is created for every render pass. Components register
//! mount, render and unmount callbacks (and changed effects) against their
//! [`ComponentKey`] while they render. Once patches have been applied the
//! environment hands the bus to its [`Lifecycle`] tracker, which fires:
//!
//! 1. unmount callbacks of components present after the previous pass and absent
//!    now (the unmount callbacks they registered on their last render), followed by
//!    their effect cleanups; their hook chains are dropped;
//! 2. then, per component in the order first encountered this pass, mount
//!    callbacks (first pass only), render callbacks and changed effects.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{RenderError, Result};
use crate::hooks::{EffectFn, HookChain, HookStore};
use crate::identity::{ComponentKey, NodePath};

pub(crate) type Callback = Box<dyn FnOnce() -> Result<()>>;

/// Callback kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	/// First pass in which the component appears.
	Mount,
	/// Every pass in which the component renders.
	Render,
	/// First pass in which the component is gone.
	Unmount,
}

/// A component named in a pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
	/// Component name.
	pub name: String,
	/// Position of the component.
	pub path: NodePath,
}

#[derive(Default)]
struct Entry {
	name: String,
	path: NodePath,
	mount: Vec<Callback>,
	render: Vec<Callback>,
	unmount: Vec<Callback>,
	effects: Vec<(usize, EffectFn)>,
}

/// Per-pass registry of lifecycle callbacks.
#[derive(Default)]
pub struct EventBus {
	order: Vec<ComponentKey>,
	entries: HashMap<ComponentKey, Entry>,
}

impl EventBus {
	/// Creates an empty bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of components seen this pass.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// Returns true if no component rendered this pass.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Returns true if `key` rendered this pass.
	pub fn contains(&self, key: &ComponentKey) -> bool {
		self.entries.contains_key(key)
	}

	/// Records that a component is rendering. Order of first calls is firing order.
	pub(crate) fn enter(&mut self, key: ComponentKey, name: &str, path: &NodePath) {
		if !self.entries.contains_key(&key) {
			self.order.push(key);
			self.entries.insert(
				key,
				Entry {
					name: name.to_string(),
					path: path.clone(),
					..Entry::default()
				},
			);
		}
	}

	pub(crate) fn register(&mut self, key: ComponentKey, event: LifecycleEvent, callback: Callback) {
		let Some(entry) = self.entries.get_mut(&key) else {
			return;
		};
		match event {
			LifecycleEvent::Mount => entry.mount.push(callback),
			LifecycleEvent::Render => entry.render.push(callback),
			LifecycleEvent::Unmount => entry.unmount.push(callback),
		}
	}

	pub(crate) fn queue_effect(&mut self, key: ComponentKey, slot: usize, effect: EffectFn) {
		if let Some(entry) = self.entries.get_mut(&key) {
			entry.effects.push((slot, effect));
		}
	}
}

struct Retained {
	name: String,
	path: NodePath,
	unmount: Vec<Callback>,
}

impl Retained {
	fn record(&self) -> ComponentRecord {
		ComponentRecord {
			name: self.name.clone(),
			path: self.path.clone(),
		}
	}
}

/// Components that fired which events during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fired {
	/// Components mounted this pass, in firing order.
	pub mounted: Vec<ComponentRecord>,
	/// Components unmounted this pass, in firing order.
	pub unmounted: Vec<ComponentRecord>,
}

/// Cross-pass bookkeeping: which components are mounted, and the unmount
/// callbacks each registered on its latest render.
#[derive(Default)]
pub struct Lifecycle {
	known: Vec<ComponentKey>,
	retained: HashMap<ComponentKey, Retained>,
}

impl Lifecycle {
	/// Creates an empty tracker.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of mounted components.
	pub fn mounted_len(&self) -> usize {
		self.retained.len()
	}

	/// Fires the events of a finished pass.
	///
	/// Which components are mounted is settled before any callback runs, so a
	/// failing callback cannot leave a component half tracked. Every callback
	/// still runs; the first failure is returned.
	pub fn fire(&mut self, bus: EventBus, hooks: &mut HookStore) -> Result<Fired> {
		let mut fired = Fired::default();
		let current: HashSet<ComponentKey> = bus.order.iter().copied().collect();

		// Children were encountered after their parents; tear them down first.
		let removed: Vec<(Option<Retained>, Option<HookChain>)> = self
			.known
			.iter()
			.rev()
			.filter(|key| !current.contains(key))
			.map(|key| (self.retained.remove(key), hooks.remove(key)))
			.collect();

		let EventBus { order, mut entries } = bus;
		let mut pending = Vec::with_capacity(order.len());
		for key in &order {
			let Some(mut entry) = entries.remove(key) else {
				continue;
			};
			let first = !self.retained.contains_key(key);
			self.retained.insert(
				*key,
				Retained {
					name: entry.name.clone(),
					path: entry.path.clone(),
					unmount: std::mem::take(&mut entry.unmount),
				},
			);
			pending.push((*key, first, entry));
		}
		self.known = order;

		let mut outcome = Ok(());
		for (retained, chain) in removed {
			if let Some(retained) = retained {
				debug!(component = %retained.name, path = %retained.path, "unmount");
				fired.unmounted.push(retained.record());
				for callback in retained.unmount {
					keep_first(&mut outcome, run(callback, &retained.name));
				}
			}
			if let Some(mut chain) = chain {
				chain.teardown();
			}
		}

		for (key, first, entry) in pending {
			if first {
				debug!(component = %entry.name, path = %entry.path, "mount");
				fired.mounted.push(ComponentRecord {
					name: entry.name.clone(),
					path: entry.path.clone(),
				});
				for callback in entry.mount {
					keep_first(&mut outcome, run(callback, &entry.name));
				}
			}
			for callback in entry.render {
				keep_first(&mut outcome, run(callback, &entry.name));
			}
			if let Some(chain) = hooks.get_mut(&key) {
				for (slot, effect) in entry.effects {
					chain.run_effect(slot, effect);
				}
				chain.mark_mounted();
			}
		}
		outcome.map(|()| fired)
	}

	/// Drops the hook chains a failed pass created for components that never
	/// mounted, so a later first mount at the same position starts fresh.
	pub(crate) fn abandon(&self, bus: &EventBus, hooks: &mut HookStore) {
		for key in &bus.order {
			if !self.retained.contains_key(key) {
				hooks.remove(key);
			}
		}
	}
}

fn keep_first(outcome: &mut Result<()>, result: Result<()>) {
	if outcome.is_ok() {
		*outcome = result;
	}
}

fn run(callback: Callback, component: &str) -> Result<()> {
	callback().map_err(|err| match err {
		RenderError::Lifecycle { .. } => err,
		other => RenderError::lifecycle(component, other.to_string()),
	})
}
