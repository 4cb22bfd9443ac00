//! Component tree renderer
//!
//! This module provides access to arbor-pages: the node model, the diff engine,
//! patch execution, hook state chains and lifecycle callbacks.
//!
//! ## Architecture
//!
//! - **Node Model**: Elements, text, fragments and components built with [`builder`]
//! - **Diffing**: Positional comparison of two generations into ordered patches
//! - **Patch Execution**: Ordered mutation of a [`RenderTarget`]
//! - **Hooks**: Per-component state that survives re-renders
//!
//! ## Example
//!
//! ```
//! use arbor::pages::prelude::*;
//! use arbor::pages::builder::html::span;
//!
//! fn label(_cx: &mut Context<'_>, text: &String, _children: &[Node]) -> Result<Node> {
//!     Ok(span().text(text.clone()).into())
//! }
//!
//! let html = arbor::pages::SsrRenderer::new()
//!     .render(component(label, "hi".to_string()))
//!     .unwrap();
//! assert_eq!(html, "<span>hi</span>");
//! ```

// Re-export all arbor-pages functionality
pub use arbor_pages::*;
