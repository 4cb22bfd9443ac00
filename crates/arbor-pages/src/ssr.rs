//! String rendering.
//!
//! Renders a tree to HTML without a render target. Components render once with
//! throwaway hook state; lifecycle callbacks and effects are registered but never
//! fired.

use crate::error::Result;
use crate::markup;
use crate::node::IntoNode;
use crate::render::prepare;
use crate::style::StyleSheet;

/// Options for string rendering.
#[derive(Debug, Clone)]
pub struct SsrOptions {
	/// Language attribute for the `html` element of full pages.
	pub lang: String,
	/// Whether full pages embed the collected stylesheet in a `<style>` element.
	pub include_styles: bool,
}

impl Default for SsrOptions {
	fn default() -> Self {
		Self {
			lang: "en".to_string(),
			include_styles: true,
		}
	}
}

impl SsrOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the language.
	pub fn lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = lang.into();
		self
	}

	/// Leaves generated styles out of full pages.
	pub fn no_styles(mut self) -> Self {
		self.include_styles = false;
		self
	}
}

/// Renders trees to HTML strings.
#[derive(Debug, Clone, Default)]
pub struct SsrRenderer {
	options: SsrOptions,
}

impl SsrRenderer {
	/// Creates a renderer with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a renderer with custom options.
	pub fn with_options(options: SsrOptions) -> Self {
		Self { options }
	}

	/// The renderer's options.
	pub fn options(&self) -> &SsrOptions {
		&self.options
	}

	/// Renders `tree` to an HTML fragment.
	///
	/// ```
	/// use arbor_pages::SsrRenderer;
	/// use arbor_pages::builder::html::{br, p};
	///
	/// let html = SsrRenderer::new().render(p().text("a < b").child(br())).unwrap();
	/// assert_eq!(html, "<p>a &lt; b<br /></p>");
	/// ```
	pub fn render(&self, tree: impl IntoNode) -> Result<String> {
		Ok(prepare(tree)?.to_string())
	}

	/// Renders `tree` to an HTML fragment and collects its generated styles.
	pub fn render_with_styles(&self, tree: impl IntoNode) -> Result<(String, StyleSheet)> {
		let tree = prepare(tree)?;
		let mut sheet = StyleSheet::new();
		sheet.collect(&tree);
		Ok((tree.to_string(), sheet))
	}

	/// Renders `tree` as the body of a complete HTML document.
	pub fn render_page(&self, tree: impl IntoNode) -> Result<String> {
		let (body, sheet) = self.render_with_styles(tree)?;
		let mut html = String::with_capacity(body.len() + 128);
		html.push_str("<!DOCTYPE html>\n");
		html.push_str(&format!(
			"<html lang=\"{}\">\n",
			markup::escape(&self.options.lang)
		));
		html.push_str("<head>\n<meta charset=\"UTF-8\">\n");
		if self.options.include_styles && !sheet.is_empty() {
			html.push_str("<style>");
			html.push_str(&sheet.to_css());
			html.push_str("</style>\n");
		}
		html.push_str("</head>\n<body>\n");
		html.push_str(&body);
		html.push_str("\n</body>\n</html>");
		Ok(html)
	}
}
