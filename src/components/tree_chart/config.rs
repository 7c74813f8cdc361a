//! Presentation options and the orientation axis mapping.

use serde::{Deserialize, Serialize};

use super::transition::Easing;
use super::types::{FieldNames, Margin, Point, Size};

/// Direction the tree grows in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
	#[default]
	/// Root on the left, depth along x.
	Horizontal,
	/// Root on top, depth along y.
	Vertical,
}

impl Orientation {
	/// `"vertical"` selects the vertical layout, anything else is horizontal.
	pub fn parse(value: &str) -> Self {
		if value == "vertical" {
			Orientation::Vertical
		} else {
			Orientation::Horizontal
		}
	}

	/// Name accepted by `parse`.
	pub fn as_str(self) -> &'static str {
		match self {
			Orientation::Horizontal => "horizontal",
			Orientation::Vertical => "vertical",
		}
	}

	/// Screen axis mapping for this orientation.
	pub fn axes(self) -> AxisMapping {
		match self {
			Orientation::Horizontal => AxisMapping {
				depth_axis: Axis::X,
				rotation: 0.0,
			},
			Orientation::Vertical => AxisMapping {
				depth_axis: Axis::Y,
				rotation: 90.0,
			},
		}
	}
}

/// A screen axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	/// Horizontal.
	X,
	/// Vertical.
	Y,
}

/// Which screen axis carries depth, and the label rotation in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMapping {
	/// Axis along which depth grows.
	pub depth_axis: Axis,
	/// Label rotation in degrees.
	pub rotation: f64,
}

impl AxisMapping {
	/// Maps a layout point (`x` breadth, `y` depth) to screen coordinates.
	pub fn project(&self, p: Point) -> Point {
		match self.depth_axis {
			Axis::X => Point::new(p.y, p.x),
			Axis::Y => Point::new(p.x, p.y),
		}
	}
}

impl Default for AxisMapping {
	fn default() -> Self {
		Orientation::default().axes()
	}
}

/// Every presentation option of a tree chart. Missing JSON keys take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeChartConfig {
	/// Surface width.
	pub width: f64,
	/// Surface height.
	pub height: f64,
	/// Inset of the drawing group.
	pub margin: Margin,
	/// Fill of nodes whose children are showing (and of leaves).
	pub expanded_color: String,
	/// Fill of nodes whose children are collapsed.
	pub closed_color: String,
	/// Outline of nodes with children.
	pub branch_stroke_color: String,
	/// Outline width of nodes with children.
	pub branch_stroke_width: f64,
	/// Outline of leaves.
	pub leaf_stroke_color: String,
	/// Outline width of leaves.
	pub leaf_stroke_width: f64,
	/// Label fill.
	pub text_color: String,
	/// Label size in pixels.
	pub font_size: f64,
	/// Milliseconds.
	pub anim_duration: f64,
	/// Curve applied to every transition.
	pub easing: Easing,
	/// Node circle radius.
	pub radius: f64,
	/// Distance between consecutive depth levels.
	pub link_length: f64,
	/// Edge stroke width.
	pub link_width: f64,
	/// Edge stroke colour.
	pub link_color: String,
	/// Growth direction.
	pub orientation: Orientation,
	/// Keys read from JSON records.
	pub fields: FieldNames,
}

impl Default for TreeChartConfig {
	fn default() -> Self {
		Self {
			width: 1200.0,
			height: 800.0,
			margin: Margin::default(),
			expanded_color: "lightsteelblue".into(),
			closed_color: "steelblue".into(),
			branch_stroke_color: "blue".into(),
			branch_stroke_width: 1.5,
			leaf_stroke_color: "blue".into(),
			leaf_stroke_width: 0.0,
			text_color: "#000".into(),
			font_size: 11.0,
			anim_duration: 500.0,
			easing: Easing::default(),
			radius: 4.5,
			link_length: 180.0,
			link_width: 1.5,
			link_color: "#ccc".into(),
			orientation: Orientation::default(),
			fields: FieldNames::default(),
		}
	}
}

impl TreeChartConfig {
	/// Parses options from JSON, defaulting what is missing.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Full surface size.
	pub fn surface(&self) -> Size {
		Size::new(self.width, self.height)
	}

	/// Drawing area inside the margins.
	pub fn inner(&self) -> Size {
		Size::new(
			self.width - self.margin.left - self.margin.right,
			self.height - self.margin.top - self.margin.bottom,
		)
	}

	/// `(breadth, depth)` extents handed to the layout.
	pub fn layout_extent(&self) -> (f64, f64) {
		let inner = self.inner();
		match self.orientation {
			Orientation::Horizontal => (inner.height, inner.width),
			Orientation::Vertical => (inner.width, inner.height),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn orientation_parse_is_lenient() {
		assert_eq!(Orientation::parse("vertical"), Orientation::Vertical);
		assert_eq!(Orientation::parse("horizontal"), Orientation::Horizontal);
		assert_eq!(Orientation::parse("diagonal"), Orientation::Horizontal);
		assert_eq!(Orientation::parse("Vertical"), Orientation::Horizontal);
	}

	#[test]
	fn axis_projection() {
		let p = Point::new(3.0, 180.0);
		assert_eq!(Orientation::Horizontal.axes().project(p), Point::new(180.0, 3.0));
		assert_eq!(Orientation::Vertical.axes().project(p), p);
		assert_eq!(Orientation::Vertical.axes().rotation, 90.0);
	}

	#[test]
	fn layout_extent_follows_orientation() {
		let mut config = TreeChartConfig::default();
		assert_eq!(config.layout_extent(), (760.0, 1080.0));
		config.orientation = Orientation::Vertical;
		assert_eq!(config.layout_extent(), (1080.0, 760.0));
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config = TreeChartConfig::from_json(
			r#"{ "radius": 7, "orientation": "vertical", "margin": { "left": 10 }, "fields": { "label": "title" } }"#,
		)
		.unwrap();
		assert_eq!(config.radius, 7.0);
		assert_eq!(config.orientation, Orientation::Vertical);
		assert_eq!(config.margin.left, 10.0);
		assert_eq!(config.margin.top, 20.0);
		assert_eq!(config.fields.label, "title");
		assert_eq!(config.fields.children, "children");
		assert_eq!(config.link_color, "#ccc");
	}
}
