//! The render environment.
//!
//! An [`Env`] owns everything that outlives a single render pass: the render
//! target, the template tree, the live tree currently shown by the target, hook
//! chains, lifecycle bookkeeping and the stylesheet injected so far.
//!
//! A pass runs in a fixed order:
//!
//! 1. build the next generation from the template (components render, hooks
//!    resolve, lifecycle callbacks register on a fresh bus);
//! 2. diff the live tree against it and, if enabled, validate the patch list;
//! 3. apply the patches to the target and carry handles over to the new tree;
//! 4. inject style fragments not seen before;
//! 5. fire unmount, mount and render callbacks and changed effects.
//!
//! A pass that fails before step 5 drops the hook chains it created for
//! components that were not mounted yet, so their next appearance starts fresh.
//!
//! Passes never start on their own. State changes only mark the environment as
//! pending; the host decides when to call [`Env::update`] or [`Env::flush`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, debug_span};

use crate::config::RenderOptions;
use crate::context::PassStore;
use crate::diff::diff;
use crate::dom::{NodeHandle, RenderTarget};
use crate::error::{RenderError, Result, TargetError};
use crate::hooks::HookStore;
use crate::lifecycle::{ComponentRecord, EventBus, Lifecycle};
use crate::node::{IntoNode, Node};
use crate::patch::{Executor, PatchKind, PatchRecord, transfer_handles, validate};
use crate::render::Renderer;
use crate::style::StyleSheet;

/// A handle for requesting another render pass.
///
/// Cloning is cheap and clones share the same flag. The handle is `Send + Sync`,
/// so other threads may request a pass; the pass itself still runs wherever the
/// environment lives.
#[derive(Debug, Clone, Default)]
pub struct Updater {
	pending: Arc<AtomicBool>,
}

impl Updater {
	/// Marks the environment as needing a pass.
	pub fn request(&self) {
		self.pending.store(true, Ordering::Release);
	}

	/// Returns true if a pass was requested and has not started yet.
	pub fn is_pending(&self) -> bool {
		self.pending.load(Ordering::Acquire)
	}

	pub(crate) fn take(&self) -> bool {
		self.pending.swap(false, Ordering::AcqRel)
	}
}

/// What one render pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
	/// Generation produced by the pass, starting at 1 for the initial mount.
	pub generation: u64,
	/// Applied patches, in execution order.
	pub patches: Vec<PatchRecord>,
	/// Components that appeared.
	pub mounted: Vec<ComponentRecord>,
	/// Components that disappeared.
	pub unmounted: Vec<ComponentRecord>,
}

impl PassReport {
	/// Number of applied patches of `kind`.
	pub fn count(&self, kind: PatchKind) -> usize {
		self.patches.iter().filter(|p| p.kind == kind).count()
	}

	/// Returns true if the pass changed nothing on the target.
	pub fn is_empty(&self) -> bool {
		self.patches.is_empty()
	}
}

/// A tree mounted into a render target.
pub struct Env<T: RenderTarget> {
	target: T,
	container: NodeHandle,
	base_offset: usize,
	template: Node,
	live: Node,
	hooks: HookStore,
	lifecycle: Lifecycle,
	styles: StyleSheet,
	options: RenderOptions,
	updater: Updater,
	generation: u64,
	last_report: Option<PassReport>,
}

/// Mounts `tree` into the element of `target` matching `selector` and runs the
/// first pass.
///
/// ```
/// use arbor_pages::builder::{html::div, text};
/// use arbor_pages::{MemoryDocument, RenderOptions, RenderTarget, mount};
///
/// let mut doc = MemoryDocument::new();
/// doc.append_container("div", "app").unwrap();
/// let env = mount(doc, "#app", div().child(text("hello")), RenderOptions::default()).unwrap();
/// let html = env.target().inner_markup(env.container()).unwrap();
/// assert_eq!(html, "<div>hello</div>");
/// ```
pub fn mount<T: RenderTarget>(
	mut target: T,
	selector: &str,
	tree: impl IntoNode,
	options: RenderOptions,
) -> Result<Env<T>> {
	let container = target
		.query_selector(selector)
		.ok_or_else(|| TargetError::SelectorNotFound(selector.to_string()))?;
	if options.clear_container {
		for child in target.children(container)? {
			target.remove_child(container, child)?;
		}
	}
	let base_offset = target.children(container)?.len();
	debug!(selector, container = %container, base_offset, "mount");

	let mut env = Env {
		target,
		container,
		base_offset,
		template: tree.into_node(),
		live: Node::empty(),
		hooks: HookStore::new(),
		lifecycle: Lifecycle::new(),
		styles: StyleSheet::new(),
		options,
		updater: Updater::default(),
		generation: 0,
		last_report: None,
	};
	env.update()?;
	Ok(env)
}

impl<T: RenderTarget> Env<T> {
	/// Runs one render pass against the current template.
	pub fn update(&mut self) -> Result<PassReport> {
		let span = debug_span!("render_pass", generation = self.generation + 1);
		let _entered = span.enter();
		self.updater.take();

		let mut bus = EventBus::new();
		let records = match self.reconcile(&mut bus) {
			Ok(records) => records,
			Err(err) => {
				self.lifecycle.abandon(&bus, &mut self.hooks);
				return Err(err);
			}
		};

		let mut sheet = StyleSheet::new();
		sheet.collect(&self.live);
		let added = self.styles.absorb(sheet);
		if self.options.inject_styles && !added.is_empty() {
			self.target.inject_stylesheet(&added.to_css())?;
		}

		let fired = self.lifecycle.fire(bus, &mut self.hooks)?;
		self.generation += 1;
		let report = PassReport {
			generation: self.generation,
			patches: records,
			mounted: fired.mounted,
			unmounted: fired.unmounted,
		};
		debug!(
			patches = report.patches.len(),
			mounted = report.mounted.len(),
			unmounted = report.unmounted.len(),
			"pass complete"
		);
		self.last_report = Some(report.clone());
		Ok(report)
	}

	/// Builds the next generation and brings the live tree and the target to it.
	fn reconcile(&mut self, bus: &mut EventBus) -> Result<Vec<PatchRecord>> {
		let mut next = self.template.clone();
		let mut store = PassStore::new();
		Renderer::new(&mut self.hooks, bus, &mut store, &self.updater).build(&mut next)?;

		let patches = diff(&self.live, &next);
		if self.options.validate_patches {
			validate(&self.live, &patches)?;
		}
		let records = Executor::new(&mut self.target, self.container, self.base_offset)
			.apply_all(&mut self.live, patches)?;
		transfer_handles(&self.live, &mut next)?;
		self.live = next;
		Ok(records)
	}

	/// Swaps in a new template and runs a pass.
	pub fn update_to(&mut self, tree: impl IntoNode) -> Result<PassReport> {
		self.template = tree.into_node();
		self.update()
	}

	/// Runs passes while render requests are pending.
	///
	/// A request issued during a pass (by a render function, a lifecycle callback
	/// or an effect) queues one more pass. Fails with [`RenderError::RenderLoop`]
	/// once `max_flush_passes` passes ran and a request is still pending.
	pub fn flush(&mut self) -> Result<Vec<PassReport>> {
		let mut reports = Vec::new();
		while self.updater.is_pending() {
			if reports.len() >= self.options.max_flush_passes {
				return Err(RenderError::RenderLoop {
					passes: reports.len(),
				});
			}
			reports.push(self.update()?);
		}
		Ok(reports)
	}

	/// Renders nothing, firing unmount callbacks for every component, and gives
	/// the target back.
	pub fn unmount(mut self) -> Result<T> {
		self.template = Node::empty();
		self.update()?;
		Ok(self.target)
	}

	/// A handle for requesting passes.
	pub fn updater(&self) -> Updater {
		self.updater.clone()
	}

	/// The live tree as of the last pass.
	pub fn tree(&self) -> &Node {
		&self.live
	}

	/// The render target.
	pub fn target(&self) -> &T {
		&self.target
	}

	/// Mutable access to the render target, e.g. to dispatch events.
	pub fn target_mut(&mut self) -> &mut T {
		&mut self.target
	}

	/// The element the tree is mounted into.
	pub fn container(&self) -> NodeHandle {
		self.container
	}

	/// Hook chains of the mounted components.
	pub fn hooks(&self) -> &HookStore {
		&self.hooks
	}

	/// Number of completed passes.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// The options this environment was mounted with.
	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	/// Report of the last completed pass.
	pub fn last_report(&self) -> Option<&PassReport> {
		self.last_report.as_ref()
	}

	/// Every style fragment injected so far.
	pub fn stylesheet(&self) -> &StyleSheet {
		&self.styles
	}
}
