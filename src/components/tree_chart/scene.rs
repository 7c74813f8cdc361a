//! Keyed enter/update/exit reconciliation of node and edge visuals.
//!
//! Visuals are keyed by node identity token (edges by their target's token).
//! Every update retargets the affected tweens from wherever they currently
//! are, so a new update issued mid-animation simply takes over.

use log::debug;

use super::config::Axis;
use super::path::diagonal;
use super::transition::{Easing, Transition, Tween};
use super::tree::NodeId;
use super::types::{Margin, Point, Size};

/// Radius and opacity used for "invisible" so interpolation stays finite.
pub const VANISHED: f64 = 1e-6;

/// Non-animated presentation of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Label text.
	pub label: String,
	/// Circle fill.
	pub fill: String,
	/// Circle outline.
	pub stroke: String,
	/// Circle outline width.
	pub stroke_width: f64,
	/// Whether the node has children, shown or not.
	pub expandable: bool,
	/// Label offset along the depth axis.
	pub label_offset: f64,
	/// SVG `text-anchor` of the label.
	pub text_anchor: &'static str,
	/// Label rotation in degrees.
	pub rotation: f64,
	/// Label size.
	pub font_size: f64,
	/// Label fill.
	pub text_color: String,
}

/// Non-animated presentation of an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
	/// Edge colour.
	pub stroke: String,
	/// Edge width.
	pub stroke_width: f64,
}

/// Where a live node should end up after an update.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTarget {
	/// Identity token.
	pub key: u32,
	/// Node in the tree.
	pub node: NodeId,
	/// Screen position.
	pub position: Point,
	/// Circle radius.
	pub radius: f64,
	/// Presentation.
	pub style: NodeStyle,
}

/// Where a live edge should end up after an update.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkTarget {
	/// Token of the edge's child node.
	pub key: u32,
	/// Parent end, in screen space.
	pub source: Point,
	/// Child end, in screen space.
	pub target: Point,
	/// Presentation.
	pub style: LinkStyle,
}

/// Everything one update cycle hands to the scene.
#[derive(Clone, Debug)]
pub struct SceneUpdate {
	/// Live nodes in pre-order.
	pub nodes: Vec<NodeTarget>,
	/// Live edges.
	pub links: Vec<LinkTarget>,
	/// Screen position entering visuals start from.
	pub enter_from: Point,
	/// Screen position exiting visuals collapse into.
	pub exit_to: Point,
	/// Axis edge curves bend along.
	pub depth_axis: Axis,
	/// Transition length in milliseconds.
	pub duration: f64,
	/// Transition curve.
	pub easing: Easing,
}

#[derive(Clone, Debug)]
struct NodeVisual {
	key: u32,
	node: NodeId,
	position: Tween<Point>,
	radius: Tween<f64>,
	label_opacity: Tween<f64>,
	style: NodeStyle,
	transition: Transition,
	exiting: bool,
}

#[derive(Clone, Debug)]
struct LinkVisual {
	key: u32,
	source: Tween<Point>,
	target: Tween<Point>,
	depth_axis: Axis,
	style: LinkStyle,
	transition: Transition,
	exiting: bool,
}

#[derive(Clone, Debug)]
struct SurfaceVisual {
	sized: bool,
	size: Tween<Size>,
	margin: Margin,
	transition: Transition,
}

/// A node as drawn in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
	/// Identity token.
	pub key: u32,
	/// Node in the tree.
	pub node: NodeId,
	/// Current screen position.
	pub position: Point,
	/// Current radius.
	pub radius: f64,
	/// Current label opacity.
	pub label_opacity: f64,
	/// Presentation.
	pub style: NodeStyle,
	/// Whether the node is on its way out.
	pub exiting: bool,
}

/// An edge as drawn in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSprite {
	/// Token of the edge's child node.
	pub key: u32,
	/// SVG path data.
	pub path: String,
	/// Presentation.
	pub style: LinkStyle,
	/// Whether the edge is on its way out.
	pub exiting: bool,
}

/// Snapshot of the scene at one instant, in paint order: edges under nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	/// Current surface size.
	pub surface: Size,
	/// Inset of the drawing group.
	pub margin: Margin,
	/// Edges, painted first.
	pub links: Vec<LinkSprite>,
	/// Nodes, exiting ones first.
	pub nodes: Vec<NodeSprite>,
}

impl Frame {
	/// The node sprite keyed `key`.
	pub fn node(&self, key: u32) -> Option<&NodeSprite> {
		self.nodes.iter().find(|n| n.key == key)
	}

	/// The edge sprite keyed `key`.
	pub fn link(&self, key: u32) -> Option<&LinkSprite> {
		self.links.iter().find(|l| l.key == key)
	}
}

/// Animated visuals of one chart, driven by its own clock.
#[derive(Clone, Debug)]
pub struct Scene {
	now: f64,
	surface: SurfaceVisual,
	nodes: Vec<NodeVisual>,
	links: Vec<LinkVisual>,
	dirty: bool,
}

impl Default for Scene {
	fn default() -> Self {
		Self {
			now: 0.0,
			surface: SurfaceVisual {
				sized: false,
				size: Tween::fixed(Size::default()),
				margin: Margin::default(),
				transition: Transition::new(0.0, 0.0, Easing::default()),
			},
			nodes: Vec::new(),
			links: Vec::new(),
			dirty: true,
		}
	}
}

impl Scene {
	/// Current clock in milliseconds.
	pub fn now(&self) -> f64 {
		self.now
	}

	/// Animates the drawing surface towards a new size. The first call sizes
	/// it immediately.
	pub fn resize(&mut self, size: Size, margin: Margin, duration: f64, easing: Easing) {
		let surface = &mut self.surface;
		let t = surface.transition.progress(self.now);
		surface.size.retarget(t, size);
		surface.margin = margin;
		let duration = if surface.sized { duration } else { 0.0 };
		surface.sized = true;
		surface.transition = Transition::new(self.now, duration, easing);
		self.dirty = true;
	}

	/// Reconciles visuals with the targets of one update.
	pub fn update(&mut self, update: SceneUpdate) {
		let transition = Transition::new(self.now, update.duration, update.easing);
		let entered = self.update_nodes(&update, transition);
		self.update_links(&update, transition);
		let exiting = self.nodes.iter().filter(|v| v.exiting).count()
			+ self.links.iter().filter(|v| v.exiting).count();
		debug!(
			"scene update: {} nodes ({} entering), {} links, {} exiting visuals",
			update.nodes.len(),
			entered,
			update.links.len(),
			exiting
		);
		self.dirty = true;
	}

	fn update_nodes(&mut self, update: &SceneUpdate, transition: Transition) -> usize {
		let now = self.now;
		let mut previous = std::mem::take(&mut self.nodes);
		let mut live = Vec::with_capacity(update.nodes.len());
		let mut entered = 0;

		for target in &update.nodes {
			let visual = match previous.iter().position(|v| v.key == target.key) {
				Some(at) => {
					let mut visual = previous.remove(at);
					let t = visual.transition.progress(now);
					visual.position.retarget(t, target.position);
					visual.radius.retarget(t, target.radius);
					visual.label_opacity.retarget(t, 1.0);
					visual.node = target.node;
					visual.exiting = false;
					visual
				}
				None => {
					entered += 1;
					NodeVisual {
						key: target.key,
						node: target.node,
						position: Tween::new(update.enter_from, target.position),
						radius: Tween::new(VANISHED, target.radius),
						label_opacity: Tween::new(VANISHED, 1.0),
						style: target.style.clone(),
						transition,
						exiting: false,
					}
				}
			};
			live.push(NodeVisual {
				style: target.style.clone(),
				transition,
				..visual
			});
		}

		// leftovers are exiting; they keep their place below the live nodes
		for visual in &mut previous {
			let t = visual.transition.progress(now);
			visual.position.retarget(t, update.exit_to);
			visual.radius.retarget(t, VANISHED);
			visual.label_opacity.retarget(t, VANISHED);
			visual.transition = transition;
			visual.exiting = true;
		}
		previous.extend(live);
		self.nodes = previous;
		entered
	}

	fn update_links(&mut self, update: &SceneUpdate, transition: Transition) {
		let now = self.now;
		let mut seen = vec![false; self.links.len()];

		for target in &update.links {
			match self.links.iter().position(|v| v.key == target.key) {
				Some(at) => {
					if let Some(flag) = seen.get_mut(at) {
						*flag = true;
					}
					let visual = &mut self.links[at];
					let t = visual.transition.progress(now);
					visual.source.retarget(t, target.source);
					visual.target.retarget(t, target.target);
					visual.depth_axis = update.depth_axis;
					visual.style = target.style.clone();
					visual.transition = transition;
					visual.exiting = false;
				}
				None => self.links.push(LinkVisual {
					key: target.key,
					source: Tween::new(update.enter_from, target.source),
					target: Tween::new(update.enter_from, target.target),
					depth_axis: update.depth_axis,
					style: target.style.clone(),
					transition,
					exiting: false,
				}),
			}
		}

		for (visual, _) in self.links.iter_mut().zip(seen).filter(|(_, seen)| !seen) {
			let t = visual.transition.progress(now);
			visual.source.retarget(t, update.exit_to);
			visual.target.retarget(t, update.exit_to);
			visual.transition = transition;
			visual.exiting = true;
		}
	}

	/// Whether any transition is still running.
	pub fn is_animating(&self) -> bool {
		let now = self.now;
		!self.surface.transition.is_finished(now)
			|| self.nodes.iter().any(|v| !v.transition.is_finished(now))
			|| self.links.iter().any(|v| !v.transition.is_finished(now))
	}

	/// Advances the clock by `dt` milliseconds and drops visuals that finished
	/// exiting. Returns whether the frame needs to be redrawn.
	pub fn tick(&mut self, dt: f64) -> bool {
		let redraw = std::mem::take(&mut self.dirty) || self.is_animating();
		self.now += dt.max(0.0);
		let now = self.now;
		let before = self.nodes.len() + self.links.len();
		self.nodes
			.retain(|v| !(v.exiting && v.transition.is_finished(now)));
		self.links
			.retain(|v| !(v.exiting && v.transition.is_finished(now)));
		redraw || before != self.nodes.len() + self.links.len()
	}

	/// Samples every visual at the current clock.
	pub fn frame(&self) -> Frame {
		let now = self.now;
		Frame {
			surface: self.surface.size.at(self.surface.transition.progress(now)),
			margin: self.surface.margin,
			links: self
				.links
				.iter()
				.map(|v| {
					let t = v.transition.progress(now);
					LinkSprite {
						key: v.key,
						path: diagonal(v.source.at(t), v.target.at(t), v.depth_axis),
						style: v.style.clone(),
						exiting: v.exiting,
					}
				})
				.collect(),
			nodes: self
				.nodes
				.iter()
				.map(|v| {
					let t = v.transition.progress(now);
					NodeSprite {
						key: v.key,
						node: v.node,
						position: v.position.at(t),
						radius: v.radius.at(t),
						label_opacity: v.label_opacity.at(t),
						style: v.style.clone(),
						exiting: v.exiting,
					}
				})
				.collect(),
		}
	}
}
