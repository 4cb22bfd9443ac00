//! Diff and patch integration tests
//!
//! Success Criteria:
//! 1. Unchanged siblings produce no patches
//! 2. Appending a child produces exactly one insert
//! 3. Swapping components replaces the rendered output on the target
//! 4. Positional matching shifts later siblings
//! 5. Removed trailing children leave the target
//!
//! Test Categories:
//! - Happy Path: 3 tests
//! - Edge Cases: 3 tests
//! - Use Cases: 2 tests

use arbor_pages::builder::html::{div, li, p, span, ul};
use arbor_pages::builder::{component, fragment, text};
use arbor_pages::{
	Context, Env, MemoryDocument, Node, NodePath, PatchKind, RenderOptions, RenderTarget, Result,
	mount,
};
use rstest::*;

// ============================================================================
// Fixtures
// ============================================================================

#[fixture]
fn doc() -> MemoryDocument {
	let mut doc = MemoryDocument::new();
	doc.append_container("div", "app").unwrap();
	doc
}

fn markup(env: &Env<MemoryDocument>) -> String {
	env.target().inner_markup(env.container()).unwrap()
}

fn paths(env: &Env<MemoryDocument>) -> Vec<(PatchKind, String)> {
	env.last_report()
		.unwrap()
		.patches
		.iter()
		.map(|record| (record.kind, record.path.to_string()))
		.collect()
}

fn pair(_cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
	Ok(fragment([text("x"), text("y")]))
}

fn single(_cx: &mut Context<'_>, _props: &(), _children: &[Node]) -> Result<Node> {
	Ok(text("z"))
}

// ============================================================================
// Happy Path Tests (3 tests)
// ============================================================================

/// Changing one text child patches only that child
#[rstest]
fn test_changed_text_yields_one_text_patch(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div().child(text("a")).child(text("b")),
		RenderOptions::default(),
	)
	.unwrap();

	let report = env
		.update_to(div().child(text("a")).child(text("c")))
		.unwrap();

	assert_eq!(report.patches.len(), 1);
	assert_eq!(paths(&env), [(PatchKind::Text, "/1".to_string())]);
	assert_eq!(markup(&env), "<div>ac</div>");
}

/// Appending a list item inserts it and leaves the first one alone
#[rstest]
fn test_appended_item_yields_one_insert(doc: MemoryDocument) {
	let mut env = mount(doc, "#app", ul().child(li().text("1")), RenderOptions::default()).unwrap();

	let report = env
		.update_to(ul().child(li().text("1")).child(li().text("2")))
		.unwrap();

	assert_eq!(report.count(PatchKind::Insert), 1);
	assert_eq!(report.patches.len(), 1);
	assert_eq!(paths(&env), [(PatchKind::Insert, "/1".to_string())]);
	assert_eq!(markup(&env), "<ul><li>1</li><li>2</li></ul>");
}

/// Swapping a fragment-rendering component for a text-rendering one
#[rstest]
fn test_component_swap_replaces_output(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div().child(component(pair, ())),
		RenderOptions::default(),
	)
	.unwrap();
	assert_eq!(markup(&env), "<div>xy</div>");

	let report = env.update_to(div().child(component(single, ()))).unwrap();

	assert_eq!(paths(&env), [(PatchKind::Replace, "/0".to_string())]);
	assert_eq!(markup(&env), "<div>z</div>");
	assert_eq!(report.unmounted.len(), 1);
	assert_eq!(report.unmounted[0].name, "pair");
	assert_eq!(report.mounted.len(), 1);
	assert_eq!(report.mounted[0].name, "single");
}

// ============================================================================
// Edge Cases (3 tests)
// ============================================================================

/// An identical tree produces an empty report
#[rstest]
fn test_identical_tree_yields_no_patches(doc: MemoryDocument) {
	let tree = || div().id("x").child(p().text("static"));
	let mut env = mount(doc, "#app", tree(), RenderOptions::default()).unwrap();

	let report = env.update_to(tree()).unwrap();

	assert!(report.is_empty());
	assert_eq!(markup(&env), "<div id=\"x\"><p>static</p></div>");
}

/// Trailing children are removed from the target, highest index first
#[rstest]
fn test_removed_children_leave_target(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		ul().children([li().text("1"), li().text("2"), li().text("3")]),
		RenderOptions::default(),
	)
	.unwrap();

	env.update_to(ul().child(li().text("1"))).unwrap();

	assert_eq!(
		paths(&env),
		[
			(PatchKind::Remove, "/2".to_string()),
			(PatchKind::Remove, "/1".to_string())
		]
	);
	assert_eq!(markup(&env), "<ul><li>1</li></ul>");
}

/// A fragment growing in the middle of a parent keeps later siblings in place
#[rstest]
fn test_fragment_growth_before_sibling(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div().child(fragment([text("a")])).child(span().text("end")),
		RenderOptions::default(),
	)
	.unwrap();

	env.update_to(
		div()
			.child(fragment([text("a"), text("b")]))
			.child(span().text("end")),
	)
	.unwrap();

	assert_eq!(paths(&env), [(PatchKind::Insert, "/0/1".to_string())]);
	assert_eq!(markup(&env), "<div>ab<span>end</span></div>");
}

// ============================================================================
// Use Cases (2 tests)
// ============================================================================

/// Inserting at the front of a list diffs every item positionally
#[rstest]
fn test_front_insertion_shifts_siblings(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		ul().child(li().text("b")).child(li().text("c")),
		RenderOptions::default(),
	)
	.unwrap();

	let report = env
		.update_to(
			ul().child(li().text("a"))
				.child(li().text("b"))
				.child(li().text("c")),
		)
		.unwrap();

	assert_eq!(report.count(PatchKind::Text), 2);
	assert_eq!(report.count(PatchKind::Insert), 1);
	assert_eq!(markup(&env), "<ul><li>a</li><li>b</li><li>c</li></ul>");
}

/// Handles survive across passes so the same target nodes are reused
#[rstest]
fn test_handles_are_stable_across_passes(doc: MemoryDocument) {
	let mut env = mount(
		doc,
		"#app",
		div().child(span().text("a")),
		RenderOptions::default(),
	)
	.unwrap();
	let before = env.tree().find(&NodePath::from(vec![0])).and_then(Node::handle);

	env.update_to(div().child(span().text("b"))).unwrap();

	let after = env.tree().find(&NodePath::from(vec![0])).and_then(Node::handle);
	assert!(before.is_some());
	assert_eq!(before, after);
}
