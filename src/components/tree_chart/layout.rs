//! Tidy tree layout (Reingold-Tilford, with Walker's linear-time apportioning
//! as described by Buchheim, Jünger and Leipert).
//!
//! Breadth coordinates are normalised so the outermost nodes sit half a
//! separation unit inside `[0, breadth]`; depth is spread evenly over
//! `[0, depth]`. Siblings are one unit apart, cousins two.

use std::cmp::Ordering;

use super::tree::{NodeId, Tree, TreeNode};

/// Sibling order hook applied to expanded children before layout.
pub type Comparator = dyn Fn(&TreeNode, &TreeNode) -> Ordering;

/// Working record per laid-out node. Index 0 is a virtual parent of the root.
#[derive(Clone, Debug)]
struct Slot {
	node: NodeId,
	parent: usize,
	children: Vec<usize>,
	/// Position among siblings.
	index: usize,
	depth: usize,
	/// Greatest uncommon ancestor candidate.
	ancestor: usize,
	/// Default ancestor handed to the next sibling's apportion.
	default_ancestor: Option<usize>,
	thread: Option<usize>,
	prelim: f64,
	modifier: f64,
	change: f64,
	shift: f64,
	x: f64,
}

impl Slot {
	fn new(node: NodeId, parent: usize, index: usize, depth: usize, me: usize) -> Self {
		Self {
			node,
			parent,
			children: Vec::new(),
			index,
			depth,
			ancestor: me,
			default_ancestor: None,
			thread: None,
			prelim: 0.0,
			modifier: 0.0,
			change: 0.0,
			shift: 0.0,
			x: 0.0,
		}
	}
}

struct Walker {
	slots: Vec<Slot>,
}

impl Walker {
	fn build(tree: &Tree, root: NodeId) -> Self {
		let mut slots = vec![Slot::new(root, 0, 0, 0, 0), Slot::new(root, 0, 0, 0, 1)];
		slots[0].children.push(1);
		let mut queue = vec![1];
		while let Some(at) = queue.pop() {
			let Some(children) = &tree.node(slots[at].node).children else {
				continue;
			};
			for (index, &child) in children.iter().enumerate() {
				let me = slots.len();
				slots.push(Slot::new(child, at, index, slots[at].depth + 1, me));
				slots[at].children.push(me);
				queue.push(me);
			}
		}
		Self { slots }
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		if self.slots[a].parent == self.slots[b].parent {
			1.0
		} else {
			2.0
		}
	}

	fn left(&self, v: usize) -> Option<usize> {
		self.slots[v].children.first().copied().or(self.slots[v].thread)
	}

	fn right(&self, v: usize) -> Option<usize> {
		self.slots[v].children.last().copied().or(self.slots[v].thread)
	}

	/// Children before parents, left subtrees before right ones.
	fn post_order(&self) -> Vec<usize> {
		let mut stack = vec![1];
		let mut visited = Vec::with_capacity(self.slots.len());
		while let Some(v) = stack.pop() {
			visited.push(v);
			stack.extend(self.slots[v].children.iter().copied());
		}
		visited.reverse();
		visited
	}

	fn pre_order(&self) -> Vec<usize> {
		let mut stack = vec![1];
		let mut visited = Vec::with_capacity(self.slots.len());
		while let Some(v) = stack.pop() {
			visited.push(v);
			stack.extend(self.slots[v].children.iter().rev().copied());
		}
		visited
	}

	fn first_walk(&mut self, v: usize) {
		let parent = self.slots[v].parent;
		let index = self.slots[v].index;
		let left_sibling = (index > 0).then(|| self.slots[parent].children[index - 1]);

		let children = &self.slots[v].children;
		let bounds = children.first().copied().zip(children.last().copied());
		if let Some((first, last)) = bounds {
			self.execute_shifts(v);
			let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
			if let Some(w) = left_sibling {
				self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
				self.slots[v].modifier = self.slots[v].prelim - midpoint;
			} else {
				self.slots[v].prelim = midpoint;
			}
		} else if let Some(w) = left_sibling {
			self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
		}

		let default_ancestor = self.slots[parent]
			.default_ancestor
			.unwrap_or(self.slots[parent].children[0]);
		let ancestor = self.apportion(v, left_sibling, default_ancestor);
		self.slots[parent].default_ancestor = Some(ancestor);
	}

	fn second_walk(&mut self, v: usize) {
		let parent_modifier = self.slots[self.slots[v].parent].modifier;
		let slot = &mut self.slots[v];
		slot.x = slot.prelim + parent_modifier;
		slot.modifier += parent_modifier;
	}

	fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
		let Some(w) = left_sibling else {
			return ancestor;
		};
		let (mut vip, mut vop, mut vim) = (v, v, w);
		let mut vom = self.slots[self.slots[v].parent].children[0];
		let mut sip = self.slots[vip].modifier;
		let mut sop = self.slots[vop].modifier;
		let mut sim = self.slots[vim].modifier;
		let mut som = self.slots[vom].modifier;

		let mut next_im = self.right(vim);
		let mut next_ip = self.left(vip);
		while let (Some(im), Some(ip)) = (next_im, next_ip) {
			vim = im;
			vip = ip;
			let (Some(om), Some(op)) = (self.left(vom), self.right(vop)) else {
				break;
			};
			vom = om;
			vop = op;
			self.slots[vop].ancestor = v;

			let shift = self.slots[vim].prelim + sim - self.slots[vip].prelim - sip
				+ self.separation(vim, vip);
			if shift > 0.0 {
				let wm = self.greatest_ancestor(vim, v, ancestor);
				self.move_subtree(wm, v, shift);
				sip += shift;
				sop += shift;
			}
			sim += self.slots[vim].modifier;
			sip += self.slots[vip].modifier;
			som += self.slots[vom].modifier;
			sop += self.slots[vop].modifier;

			next_im = self.right(vim);
			next_ip = self.left(vip);
		}

		if let Some(im) = next_im {
			if self.right(vop).is_none() {
				self.slots[vop].thread = Some(im);
				self.slots[vop].modifier += sim - sop;
			}
		}
		if let Some(ip) = next_ip {
			if self.left(vom).is_none() {
				self.slots[vom].thread = Some(ip);
				self.slots[vom].modifier += sip - som;
				ancestor = v;
			}
		}
		ancestor
	}

	fn greatest_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
		let candidate = self.slots[vim].ancestor;
		if self.slots[candidate].parent == self.slots[v].parent {
			candidate
		} else {
			ancestor
		}
	}

	fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
		let subtrees = (self.slots[wp].index - self.slots[wm].index) as f64;
		let change = shift / subtrees;
		self.slots[wp].change -= change;
		self.slots[wp].shift += shift;
		self.slots[wm].change += change;
		self.slots[wp].prelim += shift;
		self.slots[wp].modifier += shift;
	}

	fn execute_shifts(&mut self, v: usize) {
		let (mut shift, mut change) = (0.0, 0.0);
		for i in (0..self.slots[v].children.len()).rev() {
			let w = self.slots[v].children[i];
			let slot = &mut self.slots[w];
			slot.prelim += shift;
			slot.modifier += shift;
			change += slot.change;
			shift += slot.shift + change;
		}
	}
}

/// Sorts expanded children of every visible node with `compare`.
pub fn sort_children(tree: &mut Tree, root: NodeId, compare: &Comparator) {
	for id in tree.visible(root) {
		let Some(mut children) = tree.node_mut(id).children.take() else {
			continue;
		};
		children.sort_by(|&a, &b| compare(tree.node(a), tree.node(b)));
		tree.node_mut(id).children = Some(children);
	}
}

/// Lays out the expanded part of the tree under `root`, writing `depth` and
/// `position` into each visited node. Returns the visited nodes in pre-order.
pub fn tidy_tree(tree: &mut Tree, root: NodeId, breadth: f64, depth: f64) -> Vec<NodeId> {
	let mut walker = Walker::build(tree, root);
	for v in walker.post_order() {
		walker.first_walk(v);
	}
	walker.slots[0].modifier = -walker.slots[1].prelim;
	let order = walker.pre_order();
	for &v in &order {
		walker.second_walk(v);
	}

	let (mut left, mut right, mut bottom) = (1, 1, 1);
	for &v in &order {
		let slot = &walker.slots[v];
		if slot.x < walker.slots[left].x {
			left = v;
		}
		if slot.x > walker.slots[right].x {
			right = v;
		}
		if slot.depth > walker.slots[bottom].depth {
			bottom = v;
		}
	}
	let tx = walker.separation(left, right) / 2.0 - walker.slots[left].x;
	let kx = breadth / (walker.slots[right].x + walker.separation(right, left) / 2.0 + tx);
	let ky = depth / walker.slots[bottom].depth.max(1) as f64;

	order
		.into_iter()
		.map(|v| {
			let slot = &walker.slots[v];
			let node = tree.node_mut(slot.node);
			node.depth = slot.depth;
			node.position.x = (slot.x + tx) * kx;
			node.position.y = slot.depth as f64 * ky;
			slot.node
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::tree_chart::types::TreeRecord;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	fn three_level() -> Tree {
		Tree::from_record(&TreeRecord::branch(
			"root",
			vec![
				TreeRecord::branch("a", vec![TreeRecord::leaf("a1"), TreeRecord::leaf("a2")]),
				TreeRecord::branch("b", vec![TreeRecord::leaf("b1"), TreeRecord::leaf("b2")]),
			],
		))
	}

	fn xs(tree: &Tree, order: &[NodeId]) -> Vec<(String, f64)> {
		order
			.iter()
			.map(|&id| (tree.node(id).label.clone(), tree.node(id).position.x))
			.collect()
	}

	#[test]
	fn single_node_is_centred() {
		let mut tree = Tree::from_record(&TreeRecord::leaf("alone"));
		let order = tidy_tree(&mut tree, Tree::ROOT, 600.0, 300.0);
		assert_eq!(order, [Tree::ROOT]);
		assert!(close(tree.node(0).position.x, 300.0));
		assert!(close(tree.node(0).position.y, 0.0));
	}

	#[test]
	fn cousins_get_double_separation() {
		let mut tree = three_level();
		let order = tidy_tree(&mut tree, Tree::ROOT, 600.0, 200.0);
		let expected = [
			("root", 300.0),
			("a", 150.0),
			("a1", 100.0),
			("a2", 200.0),
			("b", 450.0),
			("b1", 400.0),
			("b2", 500.0),
		];
		for ((label, x), (want_label, want_x)) in xs(&tree, &order).into_iter().zip(expected) {
			assert_eq!(label, want_label);
			assert!(close(x, want_x), "{label}: {x} != {want_x}");
		}
		assert!(close(tree.node(order[2]).position.y, 200.0));
		assert_eq!(tree.node(order[2]).depth, 2);
	}

	#[test]
	fn collapsed_subtrees_are_skipped() {
		let mut tree = three_level();
		tree.toggle(1);
		let order = tidy_tree(&mut tree, Tree::ROOT, 600.0, 200.0);
		assert_eq!(order.len(), 5);
		let (root, a, b) = (
			tree.node(0).position.x,
			tree.node(1).position.x,
			tree.node(4).position.x,
		);
		assert!(a < root && root < b);
		// leaf `a` sits beside `b`'s children: -0.5 vs 0..1, spread over 3.5 units
		assert!(close(a, 600.0 / 3.5));
	}

	#[test]
	fn uneven_subtrees_do_not_overlap() {
		let mut tree = Tree::from_record(&TreeRecord::branch(
			"root",
			vec![
				TreeRecord::branch(
					"deep",
					vec![TreeRecord::branch(
						"mid",
						vec![TreeRecord::leaf("x"), TreeRecord::leaf("y"), TreeRecord::leaf("z")],
					)],
				),
				TreeRecord::leaf("small"),
				TreeRecord::branch(
					"wide",
					vec![
						TreeRecord::branch("p", vec![TreeRecord::leaf("p1"), TreeRecord::leaf("p2")]),
						TreeRecord::leaf("q"),
					],
				),
			],
		));
		let order = tidy_tree(&mut tree, Tree::ROOT, 1000.0, 300.0);
		assert_eq!(order.len(), tree.len());

		let mut by_depth: Vec<Vec<f64>> = Vec::new();
		for &id in &order {
			let node = tree.node(id);
			if by_depth.len() <= node.depth {
				by_depth.resize(node.depth + 1, Vec::new());
			}
			by_depth[node.depth].push(node.position.x);
		}
		for row in by_depth {
			assert!(row.windows(2).all(|w| w[0] < w[1]), "{row:?}");
		}
		for (_, node) in tree.nodes() {
			assert!(node.position.x >= 0.0 && node.position.x <= 1000.0);
		}
	}

	#[test]
	fn comparator_reorders_children() {
		let mut tree = three_level();
		sort_children(&mut tree, Tree::ROOT, &|a, b| b.label.cmp(&a.label));
		let order = tidy_tree(&mut tree, Tree::ROOT, 600.0, 200.0);
		let labels: Vec<_> = order.iter().map(|&id| tree.node(id).label.as_str()).collect();
		assert_eq!(labels, ["root", "b", "b2", "b1", "a", "a2", "a1"]);
	}
}
