//! HTML serialization helpers shared by the node model and the in-memory target.
//!
//! Both sides go through the same functions so that a mounted tree and the
//! markup read back from the render target agree byte for byte.

use std::borrow::Cow;

/// Elements that never have children and serialize as `<tag />`.
pub fn is_void_element(tag: &str) -> bool {
	matches!(
		tag,
		"area"
			| "base" | "br"
			| "col" | "embed"
			| "hr" | "img"
			| "input" | "link"
			| "meta" | "source"
			| "track" | "wbr"
	)
}

/// Returns true if `tag` can name an element: ASCII letters, digits, `-`, `:`
/// and `_`, at least one character.
pub fn is_valid_tag(tag: &str) -> bool {
	!tag.is_empty()
		&& tag
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_')
}

/// Escapes HTML special characters.
pub fn escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Writes an opening tag.
///
/// Attribute order is fixed: `id`, then `class`, then the remaining attributes in
/// the iteration order of `attrs` (callers pass sorted maps). Void elements are
/// closed in place.
pub fn open_tag<'a>(
	out: &mut String,
	tag: &str,
	id: Option<&str>,
	classes: &[String],
	attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
	out.push('<');
	out.push_str(tag);
	if let Some(id) = id {
		push_attr(out, "id", id);
	}
	if !classes.is_empty() {
		push_attr(out, "class", &classes.join(" "));
	}
	for (name, value) in attrs {
		if name == "id" || name == "class" {
			continue;
		}
		push_attr(out, name, value);
	}
	if is_void_element(tag) {
		out.push_str(" />");
	} else {
		out.push('>');
	}
}

/// Writes a closing tag; nothing for void elements.
pub fn close_tag(out: &mut String, tag: &str) {
	if !is_void_element(tag) {
		out.push_str("</");
		out.push_str(tag);
		out.push('>');
	}
}

fn push_attr(out: &mut String, name: &str, value: &str) {
	out.push(' ');
	out.push_str(name);
	if !value.is_empty() {
		out.push_str("=\"");
		out.push_str(&escape(value));
		out.push('"');
	}
}
