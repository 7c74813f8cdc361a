use serde::{Deserialize, Serialize};

/// A coordinate pair. In layout space `x` is the breadth coordinate and `y`
/// the depth offset; in screen space they are plain SVG user units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate, or breadth in layout space.
	pub x: f64,
	/// Vertical coordinate, or depth in layout space.
	pub y: f64,
}

impl Point {
	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Width and height of the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl Size {
	/// A `width` by `height` size.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Space between the surface edge and the drawn tree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
	/// Top margin.
	pub top: f64,
	/// Right margin.
	pub right: f64,
	/// Bottom margin.
	pub bottom: f64,
	/// Left margin; wide by default to fit root labels.
	pub left: f64,
}

impl Default for Margin {
	fn default() -> Self {
		Self {
			top: 20.0,
			right: 20.0,
			bottom: 20.0,
			left: 100.0,
		}
	}
}

/// Keys used to read the label and the children out of JSON input records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
	/// Key holding the label.
	pub label: String,
	/// Key holding the child array.
	pub children: String,
}

impl Default for FieldNames {
	fn default() -> Self {
		Self {
			label: "name".into(),
			children: "children".into(),
		}
	}
}

/// Typed input record, for callers that build trees in Rust instead of JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
	/// Label text.
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	/// Explicit identity token; zero counts as absent.
	pub id: Option<u32>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	/// Child records; empty means leaf.
	pub children: Vec<TreeRecord>,
}

impl TreeRecord {
	/// A record without children.
	pub fn leaf(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// A record with `children`.
	pub fn branch(name: impl Into<String>, children: Vec<TreeRecord>) -> Self {
		Self {
			name: name.into(),
			id: None,
			children,
		}
	}
}
