use std::collections::{HashMap, HashSet};

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::scene::{Frame, LinkSprite, NodeSprite};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Attribute carrying a node group's identity token, read back on click.
pub const TOKEN_ATTR: &str = "data-token";

struct NodeElements {
	group: Element,
	circle: Element,
	text: Element,
}

/// The `svg.outer-svg > g.inner-g` drawing surface inside a host element,
/// with one `path.link` per edge and one `g.node` per node keyed by token.
pub struct SvgSurface {
	document: Document,
	svg: Element,
	group: Element,
	links: HashMap<u32, Element>,
	nodes: HashMap<u32, NodeElements>,
	link_order: Vec<u32>,
	node_order: Vec<u32>,
}

impl SvgSurface {
	/// Reuses the host's existing surface if there is one, otherwise creates it.
	pub fn attach(host: &Element) -> Result<Self, JsValue> {
		let document = host
			.owner_document()
			.ok_or_else(|| JsValue::from_str("host element is not in a document"))?;

		let (svg, group) = match host.query_selector("svg.outer-svg")? {
			Some(svg) => match svg.query_selector("g.inner-g")? {
				Some(group) => (svg, group),
				None => {
					let group = document.create_element_ns(Some(SVG_NS), "g")?;
					svg.append_child(&group)?;
					(svg, group)
				}
			},
			None => {
				let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
				let group = document.create_element_ns(Some(SVG_NS), "g")?;
				svg.append_child(&group)?;
				host.append_child(&svg)?;
				(svg, group)
			}
		};
		svg.set_attribute("class", "outer-svg")?;
		group.set_attribute("class", "inner-g")?;
		// stale children from an earlier surface can't be matched to tokens
		group.set_inner_html("");

		Ok(Self {
			document,
			svg,
			group,
			links: HashMap::new(),
			nodes: HashMap::new(),
			link_order: Vec::new(),
			node_order: Vec::new(),
		})
	}

	/// Brings the SVG elements in line with `frame`.
	pub fn draw(&mut self, frame: &Frame) -> Result<(), JsValue> {
		self.svg
			.set_attribute("width", &frame.surface.width.to_string())?;
		self.svg
			.set_attribute("height", &frame.surface.height.to_string())?;
		self.group.set_attribute(
			"transform",
			&format!("translate({},{})", frame.margin.left, frame.margin.top),
		)?;

		let live_links: HashSet<u32> = frame.links.iter().map(|l| l.key).collect();
		let live_nodes: HashSet<u32> = frame.nodes.iter().map(|n| n.key).collect();
		self.links
			.retain(|key, el| keep(live_links.contains(key), el));
		self.nodes
			.retain(|key, els| keep(live_nodes.contains(key), &els.group));

		for sprite in &frame.links {
			self.draw_link(sprite)?;
		}
		for sprite in &frame.nodes {
			self.draw_node(sprite)?;
		}

		// nodes paint above links
		let link_order: Vec<u32> = frame.links.iter().map(|l| l.key).collect();
		let node_order: Vec<u32> = frame.nodes.iter().map(|n| n.key).collect();
		if link_order != self.link_order || node_order != self.node_order {
			for key in &link_order {
				if let Some(el) = self.links.get(key) {
					self.group.append_child(el)?;
				}
			}
			for key in &node_order {
				if let Some(els) = self.nodes.get(key) {
					self.group.append_child(&els.group)?;
				}
			}
			self.link_order = link_order;
			self.node_order = node_order;
		}
		Ok(())
	}

	fn draw_link(&mut self, sprite: &LinkSprite) -> Result<(), JsValue> {
		if !self.links.contains_key(&sprite.key) {
			let el = self.document.create_element_ns(Some(SVG_NS), "path")?;
			el.set_attribute("class", "link")?;
			self.group.append_child(&el)?;
			self.links.insert(sprite.key, el);
		}
		let Some(el) = self.links.get(&sprite.key) else {
			return Ok(());
		};
		el.set_attribute("d", &sprite.path)?;
		el.set_attribute(
			"style",
			&format!(
				"stroke-width: {}px; stroke: {}; fill: none;",
				sprite.style.stroke_width, sprite.style.stroke
			),
		)?;
		Ok(())
	}

	fn draw_node(&mut self, sprite: &NodeSprite) -> Result<(), JsValue> {
		if !self.nodes.contains_key(&sprite.key) {
			let group = self.document.create_element_ns(Some(SVG_NS), "g")?;
			group.set_attribute("class", "node")?;
			group.set_attribute(TOKEN_ATTR, &sprite.key.to_string())?;
			let circle = self.document.create_element_ns(Some(SVG_NS), "circle")?;
			let text = self.document.create_element_ns(Some(SVG_NS), "text")?;
			group.append_child(&circle)?;
			group.append_child(&text)?;
			self.group.append_child(&group)?;
			self.nodes.insert(
				sprite.key,
				NodeElements {
					group,
					circle,
					text,
				},
			);
		}
		let Some(els) = self.nodes.get(&sprite.key) else {
			return Ok(());
		};
		let style = &sprite.style;

		els.group.set_attribute(
			"transform",
			&format!("translate({},{})", sprite.position.x, sprite.position.y),
		)?;

		els.circle.set_attribute("r", &sprite.radius.to_string())?;
		els.circle.set_attribute(
			"style",
			&format!(
				"fill: {}; stroke: {}; stroke-width: {}; cursor: {};",
				style.fill,
				style.stroke,
				style.stroke_width,
				if style.expandable { "pointer" } else { "default" }
			),
		)?;

		if els.text.text_content().as_deref() != Some(style.label.as_str()) {
			els.text.set_text_content(Some(&style.label));
		}
		els.text.set_attribute("x", &style.label_offset.to_string())?;
		els.text.set_attribute("dy", ".35em")?;
		els.text.set_attribute("text-anchor", style.text_anchor)?;
		els.text
			.set_attribute("transform", &format!("rotate({})", style.rotation))?;
		els.text.set_attribute(
			"style",
			&format!(
				"fill: {}; fill-opacity: {}; font-size: {}px;",
				style.text_color, sprite.label_opacity, style.font_size
			),
		)?;
		Ok(())
	}
}

fn keep(present: bool, el: &Element) -> bool {
	if !present {
		el.remove();
	}
	present
}
