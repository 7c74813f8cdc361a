//! The chart: configuration accessors plus the render/update cycle.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};
use serde_json::Value;

use super::config::{AxisMapping, Orientation, TreeChartConfig};
use super::layout::{Comparator, sort_children, tidy_tree};
use super::scene::{Frame, LinkStyle, LinkTarget, NodeStyle, NodeTarget, Scene, SceneUpdate};
use super::transition::Easing;
use super::tree::{NodeId, Tree, TreeError, TreeNode};
use super::types::{FieldNames, Margin, Point};

macro_rules! value_accessors {
	($($field:ident / $setter:ident: $ty:ty;)*) => {
		$(
			#[doc = concat!("Current `", stringify!($field), "` option.")]
			pub fn $field(&self) -> $ty {
				self.config.$field
			}

			#[doc = concat!("Sets `", stringify!($field), "`; applied on the next render.")]
			pub fn $setter(&mut self, value: $ty) -> &mut Self {
				self.config.$field = value;
				self
			}
		)*
	};
}

macro_rules! text_accessors {
	($($field:ident / $setter:ident;)*) => {
		$(
			#[doc = concat!("Current `", stringify!($field), "` option.")]
			pub fn $field(&self) -> &str {
				&self.config.$field
			}

			#[doc = concat!("Sets `", stringify!($field), "`; applied on the next render.")]
			pub fn $setter(&mut self, value: impl Into<String>) -> &mut Self {
				self.config.$field = value.into();
				self
			}
		)*
	};
}

/// A collapsible node-link tree diagram.
///
/// Setters return `&mut Self` so configuration chains; nothing is validated.
/// `render` binds the current tree, later clicks go through `click`/`toggle`,
/// and `tick` drives the animation clock that `frame` samples.
pub struct TreeChart {
	config: TreeChartConfig,
	axes: AxisMapping,
	sort: Option<Rc<Comparator>>,
	tree: Option<Tree>,
	/// JSON and field names behind `tree` when it came from `bind_data`.
	source: Option<(Value, FieldNames)>,
	scene: Scene,
}

impl Default for TreeChart {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for TreeChart {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TreeChart")
			.field("config", &self.config)
			.field("axes", &self.axes)
			.field("sorted", &self.sort.is_some())
			.field("nodes", &self.tree.as_ref().map_or(0, Tree::len))
			.finish_non_exhaustive()
	}
}

impl TreeChart {
	/// A chart with default options and no data.
	pub fn new() -> Self {
		Self::with_config(TreeChartConfig::default())
	}

	/// A chart with the given options and no data.
	pub fn with_config(config: TreeChartConfig) -> Self {
		Self {
			axes: config.orientation.axes(),
			config,
			sort: None,
			tree: None,
			source: None,
			scene: Scene::default(),
		}
	}

	/// All options at once.
	pub fn config(&self) -> &TreeChartConfig {
		&self.config
	}

	/// Replaces every option, including orientation and field names.
	pub fn set_config(&mut self, config: TreeChartConfig) -> &mut Self {
		self.axes = config.orientation.axes();
		self.config = config;
		self
	}

	value_accessors! {
		width / set_width: f64;
		height / set_height: f64;
		margin / set_margin: Margin;
		branch_stroke_width / set_branch_stroke_width: f64;
		leaf_stroke_width / set_leaf_stroke_width: f64;
		font_size / set_font_size: f64;
		anim_duration / set_anim_duration: f64;
		easing / set_easing: Easing;
		radius / set_radius: f64;
		link_length / set_link_length: f64;
		link_width / set_link_width: f64;
	}

	text_accessors! {
		expanded_color / set_expanded_color;
		closed_color / set_closed_color;
		branch_stroke_color / set_branch_stroke_color;
		leaf_stroke_color / set_leaf_stroke_color;
		text_color / set_text_color;
		link_color / set_link_color;
	}

	/// Key labels are read from.
	pub fn label_field(&self) -> &str {
		&self.config.fields.label
	}

	/// Key read for labels by the next `set_data`.
	pub fn set_label_field(&mut self, value: impl Into<String>) -> &mut Self {
		self.config.fields.label = value.into();
		self
	}

	/// Key children are read from.
	pub fn children_field(&self) -> &str {
		&self.config.fields.children
	}

	/// Key read for children by the next `set_data`.
	pub fn set_children_field(&mut self, value: impl Into<String>) -> &mut Self {
		self.config.fields.children = value.into();
		self
	}

	/// Current orientation.
	pub fn orientation(&self) -> Orientation {
		self.config.orientation
	}

	/// Switches orientation, updating the axis mapping and label rotation.
	pub fn set_orientation(&mut self, value: Orientation) -> &mut Self {
		self.config.orientation = value;
		self.axes = value.axes();
		self
	}

	/// Axis mapping derived from the orientation.
	pub fn axes(&self) -> AxisMapping {
		self.axes
	}

	/// Sibling comparator, if one is set.
	pub fn sort(&self) -> Option<&Comparator> {
		self.sort.as_deref()
	}

	/// Orders siblings with `compare` before every layout.
	pub fn set_sort(
		&mut self,
		compare: impl Fn(&TreeNode, &TreeNode) -> std::cmp::Ordering + 'static,
	) -> &mut Self {
		self.sort = Some(Rc::new(compare));
		self
	}

	/// Keeps siblings in input order.
	pub fn clear_sort(&mut self) -> &mut Self {
		self.sort = None;
		self
	}

	/// Replaces the bound tree with JSON records read through the configured
	/// field names.
	pub fn set_data(&mut self, data: &Value) -> Result<&mut Self, TreeError> {
		let tree = Tree::from_json(data, &self.config.fields)?;
		Ok(self.set_tree(tree))
	}

	/// Loads `data` unless it and the field names match the previous call.
	/// Returns whether the bound tree was replaced.
	pub fn bind_data(&mut self, data: &Value) -> Result<bool, TreeError> {
		let fields = &self.config.fields;
		if self
			.source
			.as_ref()
			.is_some_and(|(bound, read_with)| bound == data && read_with == fields)
		{
			return Ok(false);
		}
		self.set_data(data)?;
		self.source = Some((data.clone(), self.config.fields.clone()));
		Ok(true)
	}

	/// Replaces the bound tree.
	pub fn set_tree(&mut self, tree: Tree) -> &mut Self {
		info!("tree chart bound to {} records", tree.len());
		self.tree = Some(tree);
		self.source = None;
		self
	}

	/// The bound tree, if any.
	pub fn tree(&self) -> Option<&Tree> {
		self.tree.as_ref()
	}

	/// Sizes the drawing surface, resets the root's previous position and
	/// runs an update from the root.
	pub fn render(&mut self) -> &mut Self {
		self.scene.resize(
			self.config.surface(),
			self.config.margin,
			self.config.anim_duration,
			self.config.easing,
		);
		let Some(tree) = self.tree.as_mut() else {
			debug!("render skipped: no tree bound");
			return self;
		};
		let (breadth, _) = self.config.layout_extent();
		tree.node_mut(Tree::ROOT).previous = Some(Point::new(breadth / 2.0, 0.0));
		self.update(Tree::ROOT);
		self
	}

	/// Lays the tree out again and reconciles the scene, animating entering
	/// visuals out of `local_root`'s previous position and exiting ones into
	/// its new position.
	pub fn update(&mut self, local_root: NodeId) {
		let Some(tree) = self.tree.as_mut() else {
			return;
		};
		if let Some(compare) = &self.sort {
			sort_children(tree, Tree::ROOT, compare.as_ref());
		}
		let (breadth, depth) = self.config.layout_extent();
		let order = tidy_tree(tree, Tree::ROOT, breadth, depth);
		for &id in &order {
			let node = tree.node_mut(id);
			node.position.y = node.depth as f64 * self.config.link_length;
		}

		let axes = self.axes;
		let origin = tree.node(local_root);
		let enter_from = axes.project(origin.previous.unwrap_or(origin.position));
		let exit_to = axes.project(origin.position);
		let link_style = LinkStyle {
			stroke: self.config.link_color.clone(),
			stroke_width: self.config.link_width,
		};

		let mut nodes = Vec::with_capacity(order.len());
		let mut links = Vec::with_capacity(order.len().saturating_sub(1));
		for &id in &order {
			let key = tree.ensure_token(id);
			let node = tree.node(id);
			let position = axes.project(node.position);
			nodes.push(NodeTarget {
				key,
				node: id,
				position,
				radius: self.config.radius,
				style: node_style(&self.config, axes, node),
			});
			if let Some(parent) = node.parent {
				links.push(LinkTarget {
					key,
					source: axes.project(tree.node(parent).position),
					target: position,
					style: link_style.clone(),
				});
			}
		}

		self.scene.update(SceneUpdate {
			nodes,
			links,
			enter_from,
			exit_to,
			depth_axis: axes.depth_axis,
			duration: self.config.anim_duration,
			easing: self.config.easing,
		});

		for &id in &order {
			let node = tree.node_mut(id);
			node.previous = Some(node.position);
		}
	}

	/// Collapses or expands `id`, then updates with the animation rooted there.
	pub fn toggle(&mut self, id: NodeId) -> &mut Self {
		if let Some(tree) = self.tree.as_mut() {
			tree.toggle(id);
		}
		self.update(id);
		self
	}

	/// Collapses `id` and every expanded node beneath it.
	pub fn toggle_all(&mut self, id: NodeId) -> &mut Self {
		if let Some(tree) = self.tree.as_mut() {
			tree.toggle_all(id);
		}
		self.update(id);
		self
	}

	/// Handles a click on the node carrying `token`. Returns false when no
	/// bound node has that token.
	pub fn click(&mut self, token: u32) -> bool {
		let Some(id) = self.tree.as_ref().and_then(|tree| tree.find_by_token(token)) else {
			return false;
		};
		debug!("node {token} clicked");
		self.toggle(id);
		true
	}

	/// Advances the animation clock by `dt` milliseconds. Returns whether the
	/// frame changed.
	pub fn tick(&mut self, dt: f64) -> bool {
		self.scene.tick(dt)
	}

	/// Whether any transition is still running.
	pub fn is_animating(&self) -> bool {
		self.scene.is_animating()
	}

	/// Snapshot of every visual at the current clock.
	pub fn frame(&self) -> Frame {
		self.scene.frame()
	}
}

fn node_style(config: &TreeChartConfig, axes: AxisMapping, node: &TreeNode) -> NodeStyle {
	let expandable = node.is_expandable();
	let gap = config.radius + 5.0;
	NodeStyle {
		label: node.label.clone(),
		fill: if node.is_collapsed() {
			config.closed_color.clone()
		} else {
			config.expanded_color.clone()
		},
		stroke: if expandable {
			config.branch_stroke_color.clone()
		} else {
			config.leaf_stroke_color.clone()
		},
		stroke_width: if expandable {
			config.branch_stroke_width
		} else {
			config.leaf_stroke_width
		},
		expandable,
		label_offset: if expandable { -gap } else { gap },
		text_anchor: if expandable { "end" } else { "start" },
		rotation: axes.rotation,
		font_size: config.font_size,
		text_color: config.text_color.clone(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::tree_chart::config::Axis;

	fn chart() -> TreeChart {
		let mut chart = TreeChart::new();
		chart
			.set_data(&json!({
				"name": "root",
				"children": [
					{ "name": "a", "children": [{ "name": "a1" }] },
					{ "name": "b" }
				]
			}))
			.unwrap();
		chart
	}

	#[test]
	fn accessors_round_trip_and_chain() {
		let mut chart = TreeChart::new();
		let same: *const TreeChart = chart
			.set_width(640.0)
			.set_height(480.0)
			.set_margin(Margin {
				top: 1.0,
				right: 2.0,
				bottom: 3.0,
				left: 4.0,
			})
			.set_radius(-2.0)
			.set_anim_duration(250.0)
			.set_easing(Easing::Linear)
			.set_link_length(90.0)
			.set_link_width(3.0)
			.set_font_size(14.0)
			.set_branch_stroke_width(2.0)
			.set_leaf_stroke_width(0.5)
			.set_expanded_color("white")
			.set_closed_color("black")
			.set_branch_stroke_color("red")
			.set_leaf_stroke_color("green")
			.set_text_color("#333")
			.set_link_color("#999")
			.set_label_field("title")
			.set_children_field("kids")
			.set_orientation(Orientation::Vertical);
		assert!(std::ptr::eq(same, &chart));

		assert_eq!(chart.width(), 640.0);
		assert_eq!(chart.height(), 480.0);
		assert_eq!(chart.margin().left, 4.0);
		assert_eq!(chart.radius(), -2.0);
		assert_eq!(chart.anim_duration(), 250.0);
		assert_eq!(chart.easing(), Easing::Linear);
		assert_eq!(chart.link_length(), 90.0);
		assert_eq!(chart.link_width(), 3.0);
		assert_eq!(chart.font_size(), 14.0);
		assert_eq!(chart.branch_stroke_width(), 2.0);
		assert_eq!(chart.leaf_stroke_width(), 0.5);
		assert_eq!(chart.expanded_color(), "white");
		assert_eq!(chart.closed_color(), "black");
		assert_eq!(chart.branch_stroke_color(), "red");
		assert_eq!(chart.leaf_stroke_color(), "green");
		assert_eq!(chart.text_color(), "#333");
		assert_eq!(chart.link_color(), "#999");
		assert_eq!(chart.label_field(), "title");
		assert_eq!(chart.children_field(), "kids");
		assert_eq!(chart.orientation(), Orientation::Vertical);
	}

	#[test]
	fn orientation_round_trip_restores_axes() {
		let mut chart = TreeChart::new();
		let original = chart.axes();
		assert_eq!(original.depth_axis, Axis::X);
		assert_eq!(original.rotation, 0.0);

		chart.set_orientation(Orientation::parse("vertical"));
		assert_eq!(chart.axes().depth_axis, Axis::Y);
		assert_eq!(chart.axes().rotation, 90.0);

		chart.set_orientation(Orientation::parse("anything"));
		assert_eq!(chart.axes(), original);
		assert_eq!(chart.orientation(), Orientation::Horizontal);
	}

	#[test]
	fn tokens_are_assigned_once_and_kept() {
		let mut chart = chart();
		chart.render();
		let tokens: Vec<_> = chart.tree().unwrap().nodes().map(|(_, n)| n.token).collect();
		assert!(tokens.iter().all(Option::is_some));

		chart.render();
		chart.tick(1000.0);
		chart.render();
		let again: Vec<_> = chart.tree().unwrap().nodes().map(|(_, n)| n.token).collect();
		assert_eq!(tokens, again);
	}

	#[test]
	fn collapsed_descendants_get_tokens_once_revealed() {
		let mut chart = chart();
		chart.toggle(1);
		chart.render();
		assert!(chart.tree().unwrap().node(2).token.is_none());
		chart.toggle(1);
		assert!(chart.tree().unwrap().node(2).token.is_some());
	}

	#[test]
	fn previous_positions_are_stashed() {
		let mut chart = chart();
		chart.render();
		for (_, node) in chart.tree().unwrap().nodes() {
			assert_eq!(node.previous, Some(node.position));
		}
		let root = chart.tree().unwrap().node(Tree::ROOT);
		assert_eq!(root.position, Point::new(380.0, 0.0));
		let a1 = chart.tree().unwrap().node(2);
		assert_eq!(a1.position.y, 360.0);
	}

	#[test]
	fn horizontal_frame_puts_depth_on_x() {
		let mut chart = chart();
		chart.render();
		chart.tick(1000.0);
		let frame = chart.frame();
		let root = frame.nodes.iter().find(|n| n.node == Tree::ROOT).unwrap();
		assert_eq!(root.position, Point::new(0.0, 380.0));
		let b = frame.nodes.iter().find(|n| n.node == 3).unwrap();
		assert_eq!(b.position.x, 180.0);
		assert_eq!(b.style.text_anchor, "start");
		assert_eq!(root.style.text_anchor, "end");
		assert_eq!(root.style.label_offset, -9.5);
		assert_eq!(frame.surface.width, 1200.0);
	}

	#[test]
	fn collapsed_nodes_use_closed_fill_and_branch_stroke() {
		let mut chart = chart();
		chart.render();
		chart.toggle(1);
		let frame = chart.frame();
		let key = chart.tree().unwrap().node(1).token.unwrap();
		let a = frame.node(key).unwrap();
		assert_eq!(a.style.fill, "steelblue");
		assert_eq!(a.style.stroke_width, 1.5);
		assert!(a.style.expandable);

		let leaf_key = chart.tree().unwrap().node(3).token.unwrap();
		let leaf = frame.node(leaf_key).unwrap();
		assert_eq!(leaf.style.fill, "lightsteelblue");
		assert_eq!(leaf.style.stroke_width, 0.0);
		assert!(!leaf.style.expandable);
	}

	#[test]
	fn click_animates_from_the_clicked_node() {
		let mut chart = chart();
		chart.render();
		chart.tick(1000.0);
		let a_key = chart.tree().unwrap().node(1).token.unwrap();
		let a1_key = chart.tree().unwrap().node(2).token.unwrap();
		let a_pos = chart.frame().node(a_key).unwrap().position;

		assert!(chart.click(a_key));
		chart.tick(250.0);
		assert!(chart.frame().node(a1_key).unwrap().exiting);
		chart.tick(250.0);
		assert!(chart.frame().node(a1_key).is_none());

		assert!(chart.click(a_key));
		let entering = chart.frame();
		let new_a = entering.node(a_key).unwrap().position;
		// enters from where `a` was before this update
		assert_eq!(entering.node(a1_key).unwrap().position, new_a);
		assert_eq!(new_a, a_pos);
		assert!(!chart.click(9999));
	}

	#[test]
	fn exiting_children_converge_on_the_clicked_node_new_position() {
		let mut chart = TreeChart::new();
		chart
			.set_data(&json!({
				"name": "root",
				"children": [
					{ "name": "left", "children": [{ "name": "l1" }, { "name": "l2" }] },
					{ "name": "right", "children": [{ "name": "r1" }, { "name": "r2" }] }
				]
			}))
			.unwrap()
			.render();
		chart.tick(1000.0);
		let left = chart.tree().unwrap().node(1).token.unwrap();
		let l1 = chart.tree().unwrap().node(2).token.unwrap();
		let before = chart.frame().node(left).unwrap().position;

		assert!(chart.click(left));
		let after = chart.axes().project(chart.tree().unwrap().node(1).position);
		// collapsing `left` widens the gap to `right`, so it moves
		assert!(distance(before, after) > 10.0);

		chart.tick(chart.anim_duration() - 1.0);
		let frame = chart.frame();
		let sprite = frame.node(l1).unwrap();
		assert!(sprite.exiting);
		assert!(distance(sprite.position, after) < 0.01);
		assert!(distance(sprite.position, before) > 10.0);
		let edge = frame.link(l1).unwrap();
		assert!(edge.exiting);
		let (x, y) = edge.path.rsplit(' ').next().unwrap().split_once(',').unwrap();
		let end = Point::new(x.parse().unwrap(), y.parse().unwrap());
		assert!(distance(end, after) < 0.01);
	}

	#[test]
	fn bind_data_reloads_when_field_names_change() {
		let data = json!({
			"name": "root",
			"title": "top",
			"children": [{ "name": "c" }],
			"kids": [{ "title": "k1" }, { "title": "k2" }]
		});
		let mut chart = TreeChart::new();
		assert_eq!(chart.bind_data(&data), Ok(true));
		assert_eq!(chart.bind_data(&data), Ok(false));
		assert_eq!(chart.tree().unwrap().len(), 2);

		let mut config = chart.config().clone();
		config.fields = FieldNames {
			label: "title".into(),
			children: "kids".into(),
		};
		chart.set_config(config);
		assert_eq!(chart.bind_data(&data), Ok(true));
		let tree = chart.tree().unwrap();
		assert_eq!(tree.len(), 3);
		assert_eq!(tree.node(Tree::ROOT).label, "top");

		chart.set_tree(Tree::from_record(&crate::TreeRecord::leaf("solo")));
		assert_eq!(chart.bind_data(&data), Ok(true));
	}

	fn distance(a: Point, b: Point) -> f64 {
		(a.x - b.x).hypot(a.y - b.y)
	}

	#[test]
	fn sort_hook_orders_siblings() {
		let mut chart = chart();
		chart.set_sort(|a, b| b.label.cmp(&a.label));
		assert!(chart.sort().is_some());
		chart.render();
		let tree = chart.tree().unwrap();
		assert_eq!(tree.node(Tree::ROOT).children.as_deref(), Some(&[3, 1][..]));
		chart.clear_sort();
		assert!(chart.sort().is_none());
	}

	#[test]
	fn render_without_data_only_sizes_the_surface() {
		let mut chart = TreeChart::new();
		chart.render();
		let frame = chart.frame();
		assert!(frame.nodes.is_empty());
		assert_eq!(frame.surface.height, 800.0);
	}
}
