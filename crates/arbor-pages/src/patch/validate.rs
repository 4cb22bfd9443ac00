use super::Patch;
use super::apply::{splice, take};
use crate::error::{RenderError, Result, TargetError};
use crate::identity::NodePath;
use crate::markup;
use crate::node::Node;

/// Checks that `patches` apply cleanly to `live` without touching any render
/// target.
///
/// The patches are replayed against a copy of the live tree so that paths created
/// or shifted by earlier patches resolve the way they will during execution. Every
/// path must exist, text patches must target text nodes, property and listener
/// patches must target elements, inserts must fit their parent, and every element
/// an insert or replace would create must have a valid tag name.
pub fn validate(live: &Node, patches: &[Patch]) -> Result<()> {
	let mut shadow = live.clone();
	for patch in patches {
		replay(&mut shadow, patch)?;
	}
	Ok(())
}

fn replay(shadow: &mut Node, patch: &Patch) -> Result<()> {
	match patch {
		Patch::Text { path, .. } => match at(shadow, path)? {
			Node::Text(_) => Ok(()),
			other => Err(mismatch(path, "text", other)),
		},
		Patch::Html { path, .. } | Patch::Listeners { path, .. } => match at(shadow, path)? {
			Node::Element(_) => Ok(()),
			other => Err(mismatch(path, "element", other)),
		},
		Patch::Insert {
			parent,
			index,
			node,
		} => {
			let target = shadow
				.find_mut(parent)
				.ok_or_else(|| RenderError::structural(parent, "insert into a missing parent"))?;
			let index = index.unwrap_or(target.child_nodes().len());
			check_tags(node)?;
			splice(target, parent, index, node.clone())
		}
		Patch::Remove { path } => {
			let parent = path
				.parent()
				.ok_or_else(|| RenderError::structural(path, "the root cannot be removed"))?;
			let target = shadow
				.find_mut(&parent)
				.ok_or_else(|| RenderError::structural(path, "no node at this position"))?;
			take(target, path, path.last().unwrap_or_default()).map(drop)
		}
		Patch::Replace { path, node } => {
			let target = shadow
				.find_mut(path)
				.ok_or_else(|| RenderError::structural(path, "no node at this position"))?;
			check_tags(node)?;
			*target = node.clone();
			Ok(())
		}
	}
}

fn check_tags(node: &Node) -> Result<()> {
	if let Node::Element(element) = node
		&& !markup::is_valid_tag(element.tag())
	{
		return Err(TargetError::InvalidTag(element.tag().to_string()).into());
	}
	node.child_nodes().iter().try_for_each(check_tags)
}

fn at<'n>(shadow: &'n Node, path: &NodePath) -> Result<&'n Node> {
	shadow
		.find(path)
		.ok_or_else(|| RenderError::structural(path, "no node at this position"))
}

fn mismatch(path: &NodePath, expected: &str, found: &Node) -> RenderError {
	RenderError::structural(path, format!("expected {expected}, found {}", found.kind()))
}
