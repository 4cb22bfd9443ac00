//! Hook chain and lifecycle integration tests
//!
//! Success Criteria:
//! 1. State survives re-renders at the same position
//! 2. State resets when its dependencies change
//! 3. A component leaving the tree drops its chain; a new one starts fresh
//! 4. Mount, render and unmount callbacks fire in tree order
//! 5. Effects run on dependency changes and clean up on unmount
//! 6. Queued renders drain through flush and are bounded
//! 7. A failed pass leaves no stale hook chains or mount bookkeeping
//!
//! Test Categories:
//! - Happy Path: 4 tests
//! - Error Path: 5 tests
//! - State Transitions: 4 tests
//! - Use Cases: 2 tests

use std::cell::RefCell;
use std::rc::Rc;

use arbor_pages::builder::html::{button, div, span};
use arbor_pages::builder::{component, component_with_children, fragment, text};
use arbor_pages::{
	Context, Env, Event, HookKind, MemoryDocument, Node, NodePath, RenderError, RenderOptions,
	RenderTarget, Result, mount,
};
use rstest::*;

type Log = Rc<RefCell<Vec<String>>>;

// ============================================================================
// Fixtures and components
// ============================================================================

#[fixture]
fn doc() -> MemoryDocument {
	let mut doc = MemoryDocument::new();
	doc.append_container("div", "app").unwrap();
	doc
}

#[fixture]
fn log() -> Log {
	Rc::default()
}

fn markup(env: &Env<MemoryDocument>) -> String {
	env.target().inner_markup(env.container()).unwrap()
}

fn click(env: &mut Env<MemoryDocument>, path: &[usize]) {
	let handle = env
		.tree()
		.find(&NodePath::from(path.to_vec()))
		.and_then(Node::handle)
		.unwrap();
	assert!(env.target().dispatch(&Event::new("click", handle)).unwrap());
	env.flush().unwrap();
}

fn counter(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
	let count = cx.use_state(|| 0_u32)?;
	let handle = count.clone();
	Ok(button()
		.text(count.get().to_string())
		.on_click(move |_| handle.update(|n| *n += 1))
		.into())
}

fn other_counter(cx: &mut Context<'_>, props: &(), children: &[Node]) -> Result<Node> {
	counter(cx, props, children)
}

fn paged(cx: &mut Context<'_>, page: &u32, _children: &[Node]) -> Result<Node> {
	let clicks = cx.use_state_with_deps(*page, || 0_u32)?;
	let handle = clicks.clone();
	Ok(button()
		.text(format!("{page}:{}", clicks.get()))
		.on_click(move |_| handle.update(|n| *n += 1))
		.into())
}

#[derive(Debug, PartialEq)]
struct Tracked {
	name: &'static str,
	log: Log,
}

fn tracked(name: &'static str, log: &Log) -> Tracked {
	Tracked {
		name,
		log: Rc::clone(log),
	}
}

fn push(log: &Log, line: String) -> impl FnOnce() -> Result<()> + 'static {
	let log = Rc::clone(log);
	move || {
		log.borrow_mut().push(line);
		Ok(())
	}
}

fn logged(cx: &mut Context<'_>, tracked: &Tracked, children: &[Node]) -> Result<Node> {
	let name = tracked.name;
	cx.on_mount(push(&tracked.log, format!("mount {name}")));
	cx.on_render(push(&tracked.log, format!("render {name}")));
	cx.on_unmount(push(&tracked.log, format!("unmount {name}")));
	Ok(fragment(children.to_vec()))
}

fn effectful(cx: &mut Context<'_>, tracked: &Tracked, _children: &[Node]) -> Result<Node> {
	let version = tracked.name;
	let log = Rc::clone(&tracked.log);
	cx.use_effect(version, move || {
		log.borrow_mut().push(format!("effect {version}"));
		let cleanup: Box<dyn FnOnce()> = Box::new(move || {
			log.borrow_mut().push(format!("cleanup {version}"));
		});
		Some(cleanup)
	})?;
	Ok(text(version))
}

// ============================================================================
// Happy Path Tests (4 tests)
// ============================================================================

/// State set from a listener persists into the next render
#[rstest]
fn test_state_persists_across_renders(doc: MemoryDocument) {
	let mut env = mount(doc, "#app", component(counter, ()), RenderOptions::default()).unwrap();
	assert_eq!(markup(&env), "<button>0</button>");

	click(&mut env, &[0]);
	click(&mut env, &[0]);

	assert_eq!(markup(&env), "<button>2</button>");
	let chain = env.hooks().chain(&NodePath::root()).unwrap();
	let slots = chain.snapshot();
	assert_eq!(slots.len(), 1);
	assert_eq!(slots[0].kind, HookKind::State);
	assert_eq!(slots[0].changes, 1);
	assert!(slots[0].mounted);
}

/// Callbacks fire parents first on mount and children first on unmount
#[rstest]
fn test_lifecycle_order(doc: MemoryDocument, log: Log) {
	let tree = || {
		div().child(component_with_children(
			logged,
			tracked("outer", &log),
			[component(logged, tracked("inner", &log))],
		))
	};
	let mut env = mount(doc, "#app", tree(), RenderOptions::default()).unwrap();
	assert_eq!(
		*log.borrow(),
		["mount outer", "render outer", "mount inner", "render inner"]
	);

	log.borrow_mut().clear();
	env.update_to(tree()).unwrap();
	assert_eq!(*log.borrow(), ["render outer", "render inner"]);

	log.borrow_mut().clear();
	let report = env.update_to(div()).unwrap();
	assert_eq!(*log.borrow(), ["unmount inner", "unmount outer"]);
	assert_eq!(report.unmounted.len(), 2);
	assert!(env.hooks().is_empty());
}

/// Providers make values available to components rendered after them
#[rstest]
fn test_context_flows_to_descendants(doc: MemoryDocument) {
	fn theme(cx: &mut Context<'_>, value: &&'static str, children: &[Node]) -> Result<Node> {
		cx.provide("theme", value.to_string());
		Ok(div().children(children.to_vec()).into())
	}

	fn themed(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		let theme: String = cx.require("theme")?;
		Ok(span().class(&theme).text(theme.clone()).into())
	}

	let env = mount(
		doc,
		"#app",
		component_with_children(theme, "dark", [component(themed, ())]),
		RenderOptions::default(),
	)
	.unwrap();

	assert_eq!(markup(&env), "<div><span class=\"dark\">dark</span></div>");
}

/// An effect that sets state queues exactly one follow-up pass
#[rstest]
fn test_effect_state_write_queues_pass(doc: MemoryDocument) {
	fn loader(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		let status = cx.use_state(|| "loading")?;
		let handle = status.clone();
		cx.use_effect((), move || {
			handle.set("ready");
			None
		})?;
		Ok(text(status.get()))
	}

	let mut env = mount(doc, "#app", component(loader, ()), RenderOptions::default()).unwrap();
	assert_eq!(markup(&env), "loading");
	assert!(env.updater().is_pending());

	let reports = env.flush().unwrap();
	assert_eq!(reports.len(), 1);
	assert_eq!(markup(&env), "ready");
	assert!(!env.updater().is_pending());
}

// ============================================================================
// Error Path Tests (5 tests)
// ============================================================================

/// Calling hooks in a different order fails the pass
#[rstest]
fn test_hook_order_change_is_rejected(doc: MemoryDocument) {
	fn flaky(cx: &mut Context<'_>, state_first: &bool, _children: &[Node]) -> Result<Node> {
		if *state_first {
			cx.use_state(|| 0_u32)?;
		} else {
			cx.use_effect((), || None)?;
		}
		Ok(Node::empty())
	}

	let mut env = mount(doc, "#app", component(flaky, true), RenderOptions::default()).unwrap();
	let err = env.update_to(component(flaky, false)).unwrap_err();

	match err {
		RenderError::HookOrder {
			slot,
			expected,
			found,
			..
		} => {
			assert_eq!(slot, 0);
			assert_eq!(expected, "state<u32>");
			assert_eq!(found, "effect<()>");
		}
		other => panic!("unexpected error {other:?}"),
	}
}

/// A failing mount callback surfaces as a lifecycle error
#[rstest]
fn test_failing_callback_is_reported(doc: MemoryDocument) {
	fn broken(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		cx.on_mount(|| {
			Err(RenderError::MissingContext {
				key: "router".to_string(),
			})
		});
		Ok(Node::empty())
	}

	let err = mount(doc, "#app", component(broken, ()), RenderOptions::default())
		.err()
		.unwrap();

	assert!(matches!(err, RenderError::Lifecycle { ref component, .. } if component == "broken"));
}

/// Components rendered before a failing sibling do not keep their new chains
#[rstest]
fn test_aborted_pass_drops_new_chains(doc: MemoryDocument, log: Log) {
	fn needy(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		let value: String = cx.require("missing")?;
		Ok(text(value))
	}

	let mut env = mount(doc, "#app", div(), RenderOptions::default()).unwrap();
	let err = env
		.update_to(
			div()
				.child(component(effectful, tracked("v1", &log)))
				.child(component(needy, ())),
		)
		.unwrap_err();
	assert_eq!(
		err,
		RenderError::MissingContext {
			key: "missing".to_string()
		}
	);
	assert!(env.hooks().is_empty());
	assert!(log.borrow().is_empty());

	let report = env
		.update_to(div().child(component(effectful, tracked("v1", &log))))
		.unwrap();

	assert_eq!(report.mounted.len(), 1);
	assert_eq!(report.mounted[0].name, "effectful");
	assert_eq!(*log.borrow(), ["effect v1"]);
	assert_eq!(markup(&env), "<div>v1</div>");
}

/// A failing mount callback does not keep its siblings from unmounting later
#[rstest]
fn test_unmount_after_failed_mount_callback(doc: MemoryDocument, log: Log) {
	fn refusing(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		cx.on_mount(|| Err(RenderError::Config("refused".to_string())));
		Ok(Node::empty())
	}

	let mut env = mount(doc, "#app", div(), RenderOptions::default()).unwrap();
	let err = env
		.update_to(
			div()
				.child(component(logged, tracked("good", &log)))
				.child(component(refusing, ())),
		)
		.unwrap_err();
	assert!(matches!(err, RenderError::Lifecycle { ref component, .. } if component == "refusing"));
	assert_eq!(*log.borrow(), ["mount good", "render good"]);
	log.borrow_mut().clear();

	let report = env.update_to(div()).unwrap();

	assert_eq!(*log.borrow(), ["unmount good"]);
	assert_eq!(report.unmounted.len(), 2);
	assert!(env.hooks().is_empty());
}

/// A component that re-requests a render every pass is cut off
#[rstest]
fn test_render_loop_is_bounded(doc: MemoryDocument) {
	fn restless(cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
		cx.updater().request();
		Ok(Node::empty())
	}

	let mut env = mount(
		doc,
		"#app",
		component(restless, ()),
		RenderOptions::default().max_flush_passes(3),
	)
	.unwrap();

	assert_eq!(env.flush().unwrap_err(), RenderError::RenderLoop { passes: 3 });
	assert_eq!(env.generation(), 4);
}

// ============================================================================
// State Transition Tests (4 tests)
// ============================================================================

/// Dependencies changing resets state to its initializer
#[rstest]
fn test_state_resets_when_deps_change(doc: MemoryDocument) {
	let mut env = mount(doc, "#app", component(paged, 1_u32), RenderOptions::default()).unwrap();
	click(&mut env, &[0]);
	click(&mut env, &[0]);
	assert_eq!(markup(&env), "<button>1:2</button>");

	env.update_to(component(paged, 1_u32)).unwrap();
	assert_eq!(markup(&env), "<button>1:2</button>");

	env.update_to(component(paged, 2_u32)).unwrap();
	assert_eq!(markup(&env), "<button>2:0</button>");
	let slots = env.hooks().chain(&NodePath::root()).unwrap().snapshot();
	assert_eq!(slots[0].changes, 2);
}

/// Removing and re-adding a component starts from fresh state
#[rstest]
fn test_remount_starts_fresh(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div().child(component(counter, ())),
		RenderOptions::default(),
	)
	.unwrap();
	click(&mut env, &[0, 0]);
	assert_eq!(markup(&env), "<div><button>1</button></div>");
	assert!(env.hooks().contains(&NodePath::from(vec![0])));

	env.update_to(div()).unwrap();
	assert!(!env.hooks().contains(&NodePath::from(vec![0])));

	env.update_to(div().child(component(counter, ()))).unwrap();
	assert_eq!(markup(&env), "<div><button>0</button></div>");
}

/// A different render function at the same position gets its own chain
#[rstest]
fn test_factory_change_starts_fresh(doc: MemoryDocument) {
	let mut env = mount(doc, "#app", component(counter, ()), RenderOptions::default()).unwrap();
	click(&mut env, &[0]);
	assert_eq!(markup(&env), "<button>1</button>");

	let report = env.update_to(component(other_counter, ())).unwrap();

	assert_eq!(markup(&env), "<button>0</button>");
	assert_eq!(report.unmounted[0].name, "counter");
	assert_eq!(report.mounted[0].name, "other_counter");
	assert_eq!(env.hooks().len(), 1);
	assert_eq!(
		env.hooks().chain(&NodePath::root()).unwrap().component(),
		"other_counter"
	);
}

/// Effects re-run only when their dependencies change and clean up on unmount
#[rstest]
fn test_effect_cleanup_sequence(doc: MemoryDocument, log: Log) {
	let mut env = mount(
		doc,
		"#app",
		component(effectful, tracked("v1", &log)),
		RenderOptions::default(),
	)
	.unwrap();
	env.update_to(component(effectful, tracked("v1", &log))).unwrap();
	assert_eq!(*log.borrow(), ["effect v1"]);

	env.update_to(component(effectful, tracked("v2", &log))).unwrap();
	assert_eq!(*log.borrow(), ["effect v1", "cleanup v1", "effect v2"]);

	env.unmount().unwrap();
	assert_eq!(
		*log.borrow(),
		["effect v1", "cleanup v1", "effect v2", "cleanup v2"]
	);
}

// ============================================================================
// Use Cases (2 tests)
// ============================================================================

/// Unmounting the environment fires every unmount callback and empties the target
#[rstest]
fn test_env_unmount_tears_everything_down(doc: MemoryDocument, log: Log) {
	let env = mount(
		doc,
		"#app",
		div().child(component(logged, tracked("only", &log))),
		RenderOptions::default(),
	)
	.unwrap();
	let container = env.container();

	let doc = env.unmount().unwrap();

	assert_eq!(log.borrow().last().map(String::as_str), Some("unmount only"));
	assert_eq!(doc.inner_markup(container).unwrap(), "");
}

/// Several independent counters keep separate state
#[rstest]
fn test_sibling_components_have_separate_chains(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div()
			.child(component(counter, ()))
			.child(component(counter, ())),
		RenderOptions::default(),
	)
	.unwrap();

	click(&mut env, &[1, 0]);
	click(&mut env, &[1, 0]);
	click(&mut env, &[0, 0]);

	assert_eq!(markup(&env), "<div><button>1</button><button>2</button></div>");
	assert_eq!(env.hooks().len(), 2);
}
