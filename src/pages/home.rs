use leptos::prelude::*;
use serde_json::{Value, json};

use crate::components::tree_chart::{Orientation, TreeChartConfig, TreeChartView};

/// Sample hierarchy, a trimmed-down package tree.
fn sample_tree() -> Value {
	json!({
		"name": "analytics",
		"children": [
			{
				"name": "cluster",
				"children": [
					{ "name": "AgglomerativeCluster" },
					{ "name": "CommunityStructure" },
					{ "name": "HierarchicalCluster" },
					{ "name": "MergeEdge" }
				]
			},
			{
				"name": "graph",
				"children": [
					{ "name": "BetweennessCentrality" },
					{ "name": "LinkDistance" },
					{ "name": "MaxFlowMinCut" },
					{ "name": "ShortestPaths" },
					{ "name": "SpanningTree" }
				]
			},
			{
				"name": "optimization",
				"children": [{ "name": "AspectRatioBanker" }]
			}
		]
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let data = Signal::derive(sample_tree);
	let config = RwSignal::new(TreeChartConfig::default());

	let flip = move |_| {
		config.update(|c| {
			c.orientation = match c.orientation {
				Orientation::Horizontal => Orientation::Vertical,
				Orientation::Vertical => Orientation::Horizontal,
			};
		});
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="tree-page">
				<div class="tree-toolbar">
					<h1>"Tree Chart"</h1>
					<p class="subtitle">"Click a node to collapse or expand it."</p>
					<button on:click=flip>
						{move || format!("Orientation: {}", config.get().orientation.as_str())}
					</button>
				</div>
				<TreeChartView data=data config=config />
			</div>
		</ErrorBoundary>
	}
}
