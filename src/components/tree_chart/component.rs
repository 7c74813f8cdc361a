use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

use super::chart::TreeChart;
use super::config::TreeChartConfig;
use super::render::{SvgSurface, TOKEN_ATTR};

/// Renders `data` as a collapsible tree inside a `div`. Clicking a node with
/// children collapses or expands it. Config changes re-render with an
/// animated resize; a new tree replaces the bound one.
#[component]
pub fn TreeChartView(
	#[prop(into)] data: Signal<Value>,
	#[prop(optional, into)] config: Option<Signal<TreeChartConfig>>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let chart = Rc::new(RefCell::new(TreeChart::new()));
	let surface: Rc<RefCell<Option<SvgSurface>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let (chart_init, surface_init, animate_init) = (chart.clone(), surface.clone(), animate.clone());

	Effect::new(move |_| {
		let config = config.map(|c| c.get()).unwrap_or_default();
		let data = data.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		let host: Element = container.into();

		if surface_init.borrow().is_none() {
			match SvgSurface::attach(&host) {
				Ok(s) => *surface_init.borrow_mut() = Some(s),
				Err(err) => {
					error!("tree chart surface unavailable: {err:?}");
					return;
				}
			}
		}

		{
			let mut chart = chart_init.borrow_mut();
			chart.set_config(config);
			if let Err(err) = chart.bind_data(&data) {
				error!("tree chart data rejected: {err}");
				return;
			}
			chart.render();
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let (chart_anim, surface_anim, animate_inner) =
			(chart_init.clone(), surface_init.clone(), animate_init.clone());
		let last = Cell::new(None::<f64>);
		*animate_init.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let dt = last.replace(Some(timestamp)).map_or(0.0, |prev| timestamp - prev);
			let mut chart = chart_anim.borrow_mut();
			if chart.tick(dt) {
				if let Some(ref mut s) = *surface_anim.borrow_mut() {
					if let Err(err) = s.draw(&chart.frame()) {
						error!("tree chart draw failed: {err:?}");
					}
				}
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (&*animate_init.borrow(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let chart_click = chart.clone();
	let on_click = move |ev: MouseEvent| {
		if let Some(token) = clicked_token(&ev) {
			chart_click.borrow_mut().click(token);
		}
	};

	view! {
		<div node_ref=container_ref class="tree-chart" on:click=on_click />
	}
}

fn clicked_token(ev: &MouseEvent) -> Option<u32> {
	let target: Element = ev.target()?.dyn_into().ok()?;
	let group = target.closest("g.node").ok()??;
	group.get_attribute(TOKEN_ATTR)?.parse().ok()
}
