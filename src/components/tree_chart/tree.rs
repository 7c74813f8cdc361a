//! Arena-backed hierarchy with collapse/expand state and identity tokens.

use std::collections::HashSet;

use log::trace;
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{FieldNames, Point, TreeRecord};

/// Index of a node in its [`Tree`].
pub type NodeId = usize;

/// Structural problems found while loading JSON records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
	/// A record (the root or a child) is not a JSON object.
	#[error("record at {path} is not an object")]
	NotAnObject {
		/// JSON path of the record, e.g. `$.children[2]`.
		path: String,
	},

	/// The children field holds something other than an array or null.
	#[error("field `{field}` of record at {path} is not an array")]
	ChildrenNotArray {
		/// Configured children key.
		field: String,
		/// JSON path of the record.
		path: String,
	},
}

/// One record of the hierarchy plus its layout and animation state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeNode {
	/// Text drawn next to the node.
	pub label: String,
	/// Expanded children. Never populated together with `collapsed`.
	pub children: Option<Vec<NodeId>>,
	/// Children hidden by a collapse.
	pub collapsed: Option<Vec<NodeId>>,
	/// Parent node; `None` for the root.
	pub parent: Option<NodeId>,
	/// Identity key used to match visuals across updates. Never zero.
	pub token: Option<u32>,
	/// Distance from the root, set by the layout.
	pub depth: usize,
	/// Layout position: `x` along the breadth, `y` along the depth.
	pub position: Point,
	/// Position after the last update, the origin of entering visuals.
	pub previous: Option<Point>,
}

impl TreeNode {
	/// Whether the node has children, expanded or collapsed.
	pub fn is_expandable(&self) -> bool {
		self.children.is_some() || self.collapsed.is_some()
	}

	/// Whether the node's children are hidden.
	pub fn is_collapsed(&self) -> bool {
		self.collapsed.is_some()
	}
}

/// Arena of nodes in pre-order; the root is always at [`Tree::ROOT`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
	nodes: Vec<TreeNode>,
	/// Next token above every explicit id, `None` once that range is used up.
	next_token: Option<u32>,
}

impl Tree {
	/// Id of the root node.
	pub const ROOT: NodeId = 0;

	/// Builds a tree from typed records.
	pub fn from_record(record: &TreeRecord) -> Self {
		let mut tree = Self {
			nodes: Vec::new(),
			next_token: Some(1),
		};
		tree.push_record(record, None);
		tree.reserve_explicit_tokens();
		tree
	}

	/// Builds a tree from JSON records, reading labels and children through
	/// the given field names.
	pub fn from_json(value: &Value, fields: &FieldNames) -> Result<Self, TreeError> {
		let mut tree = Self {
			nodes: Vec::new(),
			next_token: Some(1),
		};
		tree.push_json(value, fields, None, "$".into())?;
		tree.reserve_explicit_tokens();
		Ok(tree)
	}

	fn push_record(&mut self, record: &TreeRecord, parent: Option<NodeId>) -> NodeId {
		let id = self.nodes.len();
		self.nodes.push(TreeNode {
			label: record.name.clone(),
			parent,
			token: record.id.filter(|&id| id != 0),
			..TreeNode::default()
		});
		if !record.children.is_empty() {
			let children = record
				.children
				.iter()
				.map(|child| self.push_record(child, Some(id)))
				.collect();
			self.nodes[id].children = Some(children);
		}
		id
	}

	fn push_json(
		&mut self,
		value: &Value,
		fields: &FieldNames,
		parent: Option<NodeId>,
		path: String,
	) -> Result<NodeId, TreeError> {
		let Value::Object(record) = value else {
			return Err(TreeError::NotAnObject { path });
		};
		let id = self.nodes.len();
		self.nodes.push(TreeNode {
			label: json_label(record, &fields.label),
			parent,
			token: json_token(record),
			..TreeNode::default()
		});

		let children = match record.get(&fields.children) {
			None | Some(Value::Null) => return Ok(id),
			Some(Value::Array(children)) => children,
			Some(_) => {
				return Err(TreeError::ChildrenNotArray {
					field: fields.children.clone(),
					path,
				});
			}
		};
		if !children.is_empty() {
			let mut ids = Vec::with_capacity(children.len());
			for (i, child) in children.iter().enumerate() {
				let child_path = format!("{path}.{}[{i}]", fields.children);
				ids.push(self.push_json(child, fields, Some(id), child_path)?);
			}
			self.nodes[id].children = Some(ids);
		}
		Ok(id)
	}

	fn reserve_explicit_tokens(&mut self) {
		let max = self.nodes.iter().filter_map(|n| n.token).max().unwrap_or(0);
		self.next_token = max.checked_add(1);
	}

	fn issue_token(&mut self) -> u32 {
		if let Some(token) = self.next_token {
			self.next_token = token.checked_add(1);
			return token;
		}
		// an explicit id took u32::MAX: fall back to the smallest free token
		let taken: HashSet<u32> = self.nodes.iter().filter_map(|n| n.token).collect();
		(1..=u32::MAX).find(|t| !taken.contains(t)).unwrap_or(u32::MAX)
	}

	/// Number of nodes, including collapsed ones.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the tree has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The node at `id`. Panics on an id from another tree.
	pub fn node(&self, id: NodeId) -> &TreeNode {
		&self.nodes[id]
	}

	/// Mutable access to the node at `id`.
	pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
		&mut self.nodes[id]
	}

	/// Every node with its id, in load order.
	pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
		self.nodes.iter().enumerate()
	}

	/// Returns the node's token, issuing a fresh one on first encounter.
	pub fn ensure_token(&mut self, id: NodeId) -> u32 {
		if let Some(token) = self.nodes[id].token {
			return token;
		}
		let token = self.issue_token();
		self.nodes[id].token = Some(token);
		trace!("issued token {token} to {:?}", self.nodes[id].label);
		token
	}

	/// The node carrying `token`, if any.
	pub fn find_by_token(&self, token: u32) -> Option<NodeId> {
		self.nodes.iter().position(|n| n.token == Some(token))
	}

	/// Swaps the active children with the collapsed backup. No-op on leaves.
	pub fn toggle(&mut self, id: NodeId) {
		let node = &mut self.nodes[id];
		if node.children.is_some() {
			node.collapsed = node.children.take();
		} else {
			node.children = node.collapsed.take();
		}
	}

	/// Collapses every expanded descendant of `id`, then `id` itself.
	pub fn toggle_all(&mut self, id: NodeId) {
		let Some(children) = self.nodes[id].children.clone() else {
			return;
		};
		for child in children {
			self.toggle_all(child);
		}
		self.toggle(id);
	}

	/// Expanded nodes reachable from `root`, in pre-order.
	pub fn visible(&self, root: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			out.push(id);
			if let Some(children) = &self.nodes[id].children {
				stack.extend(children.iter().rev());
			}
		}
		out
	}
}

fn json_label(record: &Map<String, Value>, field: &str) -> String {
	match record.get(field) {
		None | Some(Value::Null) => String::new(),
		Some(Value::String(label)) => label.clone(),
		Some(other) => other.to_string(),
	}
}

/// Positive integer ids become tokens. Zero, strings and anything else are
/// ignored and the node gets a generated token instead.
fn json_token(record: &Map<String, Value>) -> Option<u32> {
	record
		.get("id")
		.and_then(Value::as_u64)
		.and_then(|id| u32::try_from(id).ok())
		.filter(|&id| id != 0)
}
