//! # Arbor
//!
//! Declarative UI trees rendered through positional diffing and ordered patches.
//!
//! Arbor describes a user interface as a tree of elements, text, fragments and
//! components. Every update rebuilds the tree, compares it position by position
//! with the previous generation and applies the resulting patches to a render
//! target.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - The component tree renderer ([`pages`])
//!
//! ## Quick Example
//!
//! ```
//! use arbor::pages::prelude::*;
//! use arbor::pages::builder::html::p;
//!
//! let mut doc = MemoryDocument::new();
//! doc.append_container("div", "app").unwrap();
//! let mut env = mount(doc, "#app", p().text("hello"), RenderOptions::default()).unwrap();
//! env.update_to(p().text("bye")).unwrap();
//! assert_eq!(env.target().inner_markup(env.container()).unwrap(), "<p>bye</p>");
//! ```

#[cfg(feature = "pages")]
pub mod pages;
