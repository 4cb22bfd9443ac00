//! Arbor Pages - Component Tree Renderer
//!
//! A renderer for declarative UI trees. Application code describes the UI as a
//! tree of elements, text, fragments and components; the renderer mounts it into a
//! render target and, on every update, rebuilds the tree, diffs it against the
//! previous generation and applies the minimal list of patches.
//!
//! ## Architecture
//!
//! - [`node`]: the node model (Element, Text, Fragment, Component)
//! - [`identity`]: positional identities and content signatures
//! - [`diff`]: the diff engine producing ordered [`Patch`]es
//! - [`patch`]: patch execution against a [`RenderTarget`]
//! - [`hooks`]: per-component state chains
//! - [`lifecycle`]: mount, render and unmount callbacks
//! - [`context`]: what component render functions receive
//! - [`env`]: mounting, updates and render scheduling
//! - [`dom`]: the render target abstraction and [`MemoryDocument`]
//! - [`style`]: generated per-node styles
//! - [`ssr`]: rendering to HTML strings
//!
//! ## Example
//!
//! ```
//! use arbor_pages::prelude::*;
//! use arbor_pages::builder::html::{button, div, span};
//!
//! fn counter(cx: &mut Context<'_>, start: &i32, _children: &[Node]) -> Result<Node> {
//!     let count = cx.use_state(|| *start)?;
//!     let on_click = count.clone();
//!     Ok(div()
//!         .child(span().text(count.get().to_string()))
//!         .child(button().text("+").on_click(move |_| on_click.update(|n| *n += 1)))
//!         .into())
//! }
//!
//! let mut doc = MemoryDocument::new();
//! doc.append_container("div", "app").unwrap();
//! let mut env = mount(doc, "#app", component(counter, 1), RenderOptions::default()).unwrap();
//!
//! let button = env.tree().find(&NodePath::from(vec![0, 1])).and_then(Node::handle).unwrap();
//! env.target().dispatch(&Event::new("click", button)).unwrap();
//! env.flush().unwrap();
//!
//! let html = env.target().inner_markup(env.container()).unwrap();
//! assert_eq!(html, "<div><span>2</span><button>+</button></div>");
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod context;
pub mod diff;
pub mod dom;
pub mod env;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod lifecycle;
pub mod markup;
pub mod node;
pub mod patch;
pub mod render;
pub mod ssr;
pub mod style;

pub mod prelude;

pub use config::RenderOptions;
pub use context::{Context, PassStore};
pub use diff::diff;
pub use dom::{Event, Listener, MemoryDocument, NodeHandle, RenderTarget};
pub use env::{Env, PassReport, Updater, mount};
pub use error::{RenderError, Result, TargetError};
pub use hooks::{Cleanup, HookChain, HookKind, HookStore, SlotSnapshot, State, StateGuard};
pub use identity::{NodeId, NodePath, Signature};
pub use lifecycle::{ComponentRecord, LifecycleEvent};
pub use node::{AttrValue, Component, Element, Fragment, IntoNode, Node, NodeKind, Text};
pub use patch::{Executor, Patch, PatchKind, PatchRecord};
pub use ssr::{SsrOptions, SsrRenderer};
pub use style::{StyleFragment, StyleSheet};
