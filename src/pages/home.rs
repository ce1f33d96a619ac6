use leptos::prelude::*;
use log::error;

use crate::components::network_graph::{
	LayoutConfig, NetworkGraph, RawDataset, RawEdge, RawNode, Summary,
};

const SAMPLE_NETWORK: &str = include_str!("../../assets/sample_network.json");

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const ORGANIZATIONS: &[&str] = &[
	"Sales", "Finance", "Engineering", "Operations", "People", "Legal", "Marketing",
];

const GRADES: &[&str] = &["G1", "G2", "G3", "G4", "G5"];

fn load_sample() -> Option<RawDataset> {
	RawDataset::from_json(SAMPLE_NETWORK)
		.inspect_err(|err| error!("bundled sample network: {err}"))
		.ok()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// A larger organization where everyone is evaluated by up to three colleagues, some of them
/// from outside the analyzed population.
fn generate_organization(people: usize) -> RawDataset {
	let employee_id = |i: usize| format!("{}", 20_000 + i);

	let mut nodes: Vec<RawNode> = (0..people)
		.map(|i| {
			let org = ORGANIZATIONS[i % ORGANIZATIONS.len()];
			let name = format!("Employee {i}");
			RawNode {
				id: employee_id(i),
				label: name.clone(),
				title: format!(
					"Name: {name}\nID: {}\nORG1: {org}\nORG2: {org} Team {}\nGrade: {}",
					employee_id(i),
					i % 4 + 1,
					GRADES[i % GRADES.len()]
				),
				color: Some(COLORS[i % ORGANIZATIONS.len()].into()),
				is_ghost: false,
			}
		})
		.collect();

	let mut edges = Vec::new();
	let mut ghosts = 0;
	for i in 1..people {
		for k in 0..3 {
			let roll = rand_simple(i * 3 + k);
			if roll < 0.08 {
				let ghost = format!("X{}", 90_000 + ghosts);
				let org = ORGANIZATIONS[(i + k) % ORGANIZATIONS.len()];
				nodes.push(RawNode {
					id: ghost.clone(),
					label: ghost.clone(),
					title: format!("[external] ORG1: {org}"),
					color: None,
					is_ghost: true,
				});
				edges.push(RawEdge {
					from: ghost,
					to: employee_id(i),
					dashes: true,
				});
				ghosts += 1;
			} else if k == 0 || roll > 0.5 {
				let evaluator = (roll * i as f64) as usize;
				edges.push(RawEdge {
					from: employee_id(evaluator),
					to: employee_id(i),
					dashes: false,
				});
			}
		}
	}

	RawDataset {
		summary: Summary {
			node_count: people,
			edge_count: edges.len(),
			ghost_count: ghosts,
		},
		color_legend: ORGANIZATIONS
			.iter()
			.zip(COLORS)
			.map(|(org, color)| (org.to_string(), color.to_string()))
			.collect(),
		nodes,
		edges,
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (dataset, set_dataset) = signal(load_sample());
	let (focused, set_focused) = signal(None::<String>);
	let layout = LayoutConfig {
		stabilization_iterations: 300,
		..Default::default()
	};

	let show = move |data: Option<RawDataset>| {
		set_focused.set(None);
		set_dataset.set(data);
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

			<div class="network-page">
				<div class="network-toolbar">
					<h1>"Evaluation Network"</h1>
					<button on:click=move |_| show(load_sample())>"Sample network"</button>
					<button on:click=move |_| show(Some(generate_organization(300)))>
						"Generated organization"
					</button>
					<button on:click=move |_| show(None)>"Clear"</button>
				</div>
				<p class="subtitle">
					{move || match focused.get() {
						Some(id) => format!("Showing direct connections of {id}. Click empty space to reset."),
						None => "Click a person to isolate their connections. Drag to pan, scroll to zoom.".to_string(),
					}}
				</p>
				<div id="network-container">
					<NetworkGraph
						data=dataset
						layout=layout
						on_select={move |id: Option<String>| set_focused.set(id)}
					/>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_sample_decodes() {
		let data = load_sample().expect("sample network should decode");
		assert!(!data.is_empty());
		let ids: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		for edge in &data.edges {
			assert!(ids.contains(&edge.from.as_str()) && ids.contains(&edge.to.as_str()));
		}
		let ghosts = data.nodes.iter().filter(|n| n.is_ghost).count();
		assert_eq!(data.summary.ghost_count, ghosts);
		assert_eq!(data.summary.node_count, data.nodes.len() - ghosts);
	}

	#[test]
	fn generated_organization_is_consistent() {
		let data = generate_organization(120);
		let ghosts = data.nodes.iter().filter(|n| n.is_ghost).count();
		assert_eq!(data.summary.ghost_count, ghosts);
		assert_eq!(data.summary.node_count + ghosts, data.nodes.len());
		assert_eq!(data.summary.edge_count, data.edges.len());
		assert!(data.edges.iter().all(|e| e.dashes == e.from.starts_with('X')));
		assert_eq!(generate_organization(120), data);
	}
}
