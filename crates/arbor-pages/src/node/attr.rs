//! Attribute values.

use crate::dom::{Event, Listener};
use crate::error::{RenderError, Result};

/// A typed attribute value, resolved when the tree is built.
#[derive(Debug, Clone)]
pub enum AttrValue {
	/// A string value.
	Str(String),
	/// A number, serialized in its shortest decimal form.
	Number(f64),
	/// `true` is a present, empty attribute; `false` removes the attribute.
	Bool(bool),
	/// An event listener binding.
	Listener(Listener),
}

impl AttrValue {
	/// The serialized attribute value, or `None` if the value produces no attribute.
	pub fn to_attr_string(&self) -> Option<String> {
		match self {
			AttrValue::Str(s) => Some(s.clone()),
			AttrValue::Number(n) => Some(n.to_string()),
			AttrValue::Bool(true) => Some(String::new()),
			AttrValue::Bool(false) | AttrValue::Listener(_) => None,
		}
	}

	/// Short name of the variant, for error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			AttrValue::Str(_) => "string",
			AttrValue::Number(_) => "number",
			AttrValue::Bool(_) => "boolean",
			AttrValue::Listener(_) => "listener",
		}
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::Str(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		AttrValue::Str(value)
	}
}

impl From<&String> for AttrValue {
	fn from(value: &String) -> Self {
		AttrValue::Str(value.clone())
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

impl From<Listener> for AttrValue {
	fn from(value: Listener) -> Self {
		AttrValue::Listener(value)
	}
}

macro_rules! impl_number_attr {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for AttrValue {
				fn from(value: $ty) -> Self {
					AttrValue::Number(f64::from(value))
				}
			}
		)*
	};
}

impl_number_attr!(i8, i16, i32, u8, u16, u32, f32, f64);

impl From<i64> for AttrValue {
	fn from(value: i64) -> Self {
		AttrValue::Number(value as f64)
	}
}

impl From<usize> for AttrValue {
	fn from(value: usize) -> Self {
		AttrValue::Number(value as f64)
	}
}

impl TryFrom<serde_json::Value> for AttrValue {
	type Error = RenderError;

	/// Converts scalar JSON values. `null` maps to an absent attribute; arrays and
	/// objects are rejected.
	fn try_from(value: serde_json::Value) -> Result<Self> {
		use serde_json::Value;

		match value {
			Value::Null => Ok(AttrValue::Bool(false)),
			Value::Bool(b) => Ok(AttrValue::Bool(b)),
			Value::Number(n) => n
				.as_f64()
				.map(AttrValue::Number)
				.ok_or_else(|| RenderError::attribute("", format!("number {n} is out of range"))),
			Value::String(s) => Ok(AttrValue::Str(s)),
			Value::Array(_) => Err(RenderError::attribute("", "arrays are not attribute values")),
			Value::Object(_) => Err(RenderError::attribute("", "objects are not attribute values")),
		}
	}
}

/// Wraps a closure as a listener attribute value.
pub fn listener<F>(f: F) -> AttrValue
where
	F: Fn(&Event) + 'static,
{
	AttrValue::Listener(Listener::new(f))
}

/// Validates an attribute name.
pub(crate) fn validate_name(name: &str) -> Result<()> {
	if name.is_empty() {
		return Err(RenderError::attribute(name, "name is empty"));
	}
	if let Some(bad) = name
		.chars()
		.find(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '<' | '/' | '='))
	{
		return Err(RenderError::attribute(
			name,
			format!("name contains invalid character {bad:?}"),
		));
	}
	Ok(())
}

/// Strips the `on` prefix of an event attribute name, if present.
pub(crate) fn event_name(name: &str) -> Option<&str> {
	name.strip_prefix("on").filter(|rest| !rest.is_empty())
}
