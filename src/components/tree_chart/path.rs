//! SVG path data for tree edges.

use std::fmt::Write;

use super::config::Axis;
use super::types::Point;

/// Cubic Bézier connector from `source` to `target` whose control points sit
/// halfway along the depth axis, giving the classic S-shaped tree edge.
pub fn diagonal(source: Point, target: Point, depth_axis: Axis) -> String {
	let (c1, c2) = match depth_axis {
		Axis::X => {
			let mid = (source.x + target.x) / 2.0;
			(Point::new(mid, source.y), Point::new(mid, target.y))
		}
		Axis::Y => {
			let mid = (source.y + target.y) / 2.0;
			(Point::new(source.x, mid), Point::new(target.x, mid))
		}
	};
	let mut d = String::with_capacity(64);
	let _ = write!(
		d,
		"M{},{}C{},{} {},{} {},{}",
		source.x, source.y, c1.x, c1.y, c2.x, c2.y, target.x, target.y
	);
	d
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn horizontal_controls_share_the_mid_depth() {
		let d = diagonal(Point::new(0.0, 10.0), Point::new(180.0, 50.0), Axis::X);
		assert_eq!(d, "M0,10C90,10 90,50 180,50");
	}

	#[test]
	fn vertical_controls_share_the_mid_depth() {
		let d = diagonal(Point::new(10.0, 0.0), Point::new(50.5, 180.0), Axis::Y);
		assert_eq!(d, "M10,0C10,90 50.5,90 50.5,180");
	}

	#[test]
	fn collapsed_edge_is_a_point() {
		let o = Point::new(4.0, 4.0);
		assert_eq!(diagonal(o, o, Axis::X), "M4,4C4,4 4,4 4,4");
	}
}
