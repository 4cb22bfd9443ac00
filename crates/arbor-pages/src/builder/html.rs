//! HTML element constructors.
//!
//! One function per common tag, each returning a fresh [`Element`] ready for the
//! fluent methods on it (`attr`, `class`, `child`, `on_click`, `css`, ...).

use crate::node::{Element, SVG_NAMESPACE};

/// Macro for defining HTML element creation functions
macro_rules! define_element {
	($(#[$meta:meta])* $name:ident, $tag:literal) => {
		$(#[$meta])*
		pub fn $name() -> Element {
			Element::new($tag)
		}
	};
}

define_element!(
	/// Create a `<div>` element
	///
	/// ## Example
	///
	/// ```
	/// use arbor_pages::builder::html::{div, p};
	///
	/// let container = div().class("container").child(p().text("Content"));
	/// assert_eq!(container.tag(), "div");
	/// ```
	div, "div"
);

define_element!(
	/// Create a `<span>` element
	span, "span"
);

define_element!(
	/// Create a `<p>` element (paragraph)
	p, "p"
);

define_element!(
	/// Create an `<a>` element
	a, "a"
);

define_element!(
	/// Create a `<button>` element
	///
	/// ## Example
	///
	/// ```
	/// use arbor_pages::builder::html::button;
	///
	/// let button = button().text("Click me").on_click(|_| {});
	/// assert!(button.listeners().contains_key("click"));
	/// ```
	button, "button"
);

define_element!(
	/// Create an `<input>` element
	input, "input"
);

define_element!(
	/// Create a `<textarea>` element
	textarea, "textarea"
);

define_element!(
	/// Create a `<label>` element
	label, "label"
);

define_element!(
	/// Create a `<form>` element
	form, "form"
);

define_element!(
	/// Create a `<ul>` element (unordered list)
	ul, "ul"
);

define_element!(
	/// Create an `<ol>` element (ordered list)
	ol, "ol"
);

define_element!(
	/// Create a `<li>` element (list item)
	li, "li"
);

define_element!(
	/// Create an `<h1>` element
	h1, "h1"
);

define_element!(
	/// Create an `<h2>` element
	h2, "h2"
);

define_element!(
	/// Create an `<h3>` element
	h3, "h3"
);

define_element!(
	/// Create a `<section>` element
	section, "section"
);

define_element!(
	/// Create a `<header>` element
	header, "header"
);

define_element!(
	/// Create a `<footer>` element
	footer, "footer"
);

define_element!(
	/// Create a `<nav>` element
	nav, "nav"
);

define_element!(
	/// Create an `<img>` element
	img, "img"
);

define_element!(
	/// Create a `<br>` element
	br, "br"
);

define_element!(
	/// Create a `<table>` element
	table, "table"
);

define_element!(
	/// Create a `<tr>` element
	tr, "tr"
);

define_element!(
	/// Create a `<td>` element
	td, "td"
);

/// Create an `<svg>` element in the SVG namespace
pub fn svg() -> Element {
	Element::new("svg").ns(SVG_NAMESPACE)
}
