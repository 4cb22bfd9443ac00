//! Common imports for application and component code.
//!
//! ```
//! use arbor_pages::prelude::*;
//! ```

pub use crate::builder::{component, component_with_children, element, fragment, text};
pub use crate::config::RenderOptions;
pub use crate::context::Context;
pub use crate::dom::{Event, MemoryDocument, RenderTarget};
pub use crate::env::{Env, mount};
pub use crate::error::{RenderError, Result};
pub use crate::hooks::State;
pub use crate::identity::NodePath;
pub use crate::node::{IntoNode, Node};
