use super::types::RawDataset;

pub const GHOST_LEGEND_LABEL: &str = "External connection (ghost)";
pub const GHOST_SWATCH_FILL: &str = "rgba(180,180,180,0.4)";
pub const GHOST_SWATCH_BORDER: &str = "#999";

#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
	pub fill: String,
	pub border: Option<String>,
	pub dashed: bool,
}

impl Swatch {
	/// Inline CSS for the legend dot.
	pub fn css(&self) -> String {
		let mut css = format!("background:{}", self.fill);
		if let Some(border) = &self.border {
			let style = if self.dashed { "dashed" } else { "solid" };
			css.push_str(&format!("; border:1.5px {style} {border}"));
		}
		css
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub label: String,
	pub swatch: Swatch,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
	pub entries: Vec<LegendEntry>,
	pub summary_line: String,
}

pub fn project(dataset: &RawDataset) -> Legend {
	let mut entries: Vec<LegendEntry> = dataset
		.color_legend
		.iter()
		.map(|(org, color)| LegendEntry {
			label: org.clone(),
			swatch: Swatch {
				fill: color.clone(),
				border: None,
				dashed: false,
			},
		})
		.collect();
	entries.push(ghost_entry());

	let summary = &dataset.summary;
	Legend {
		entries,
		summary_line: format!(
			"Nodes {} · Edges {} · Ghosts {}",
			summary.node_count, summary.edge_count, summary.ghost_count
		),
	}
}

fn ghost_entry() -> LegendEntry {
	LegendEntry {
		label: GHOST_LEGEND_LABEL.into(),
		swatch: Swatch {
			fill: GHOST_SWATCH_FILL.into(),
			border: Some(GHOST_SWATCH_BORDER.into()),
			dashed: true,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::types::Summary;
	use pretty_assertions::assert_eq;

	#[test]
	fn organizations_keep_payload_order_and_ghost_comes_last() {
		let data = RawDataset {
			color_legend: vec![
				("Sales".into(), "#e41a1c".into()),
				("Finance".into(), "#377eb8".into()),
			],
			summary: Summary {
				node_count: 12,
				edge_count: 30,
				ghost_count: 4,
			},
			..Default::default()
		};
		let legend = project(&data);
		let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, vec!["Sales", "Finance", GHOST_LEGEND_LABEL]);
		assert_eq!(legend.entries[1].swatch.css(), "background:#377eb8");
		assert_eq!(legend.summary_line, "Nodes 12 · Edges 30 · Ghosts 4");
	}

	#[test]
	fn ghost_entry_is_shown_without_ghosts() {
		let legend = project(&RawDataset::default());
		assert_eq!(legend.entries.len(), 1);
		assert_eq!(
			legend.entries[0].swatch.css(),
			"background:rgba(180,180,180,0.4); border:1.5px dashed #999"
		);
		assert_eq!(legend.summary_line, "Nodes 0 · Edges 0 · Ghosts 0");
	}
}
