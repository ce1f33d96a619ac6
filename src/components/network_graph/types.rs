use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Identifier of a person (or external counterpart) in the network.
pub type NodeId = String;

/// Slot of an edge in the visual edge list of the current graph.
pub type EdgeId = usize;

/// Fill used for a non-ghost node whose payload carries no color.
pub const FALLBACK_NODE_COLOR: &str = "#97C2FC";

#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("malformed network payload: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
	#[serde(deserialize_with = "node_id")]
	pub id: NodeId,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub title: String,
	#[serde(default, deserialize_with = "css_color")]
	pub color: Option<String>,
	#[serde(default)]
	pub is_ghost: bool,
}

impl RawNode {
	pub fn fill_color(&self) -> &str {
		self.color.as_deref().unwrap_or(FALLBACK_NODE_COLOR)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawEdge {
	#[serde(deserialize_with = "node_id")]
	pub from: NodeId,
	#[serde(deserialize_with = "node_id")]
	pub to: NodeId,
	#[serde(default)]
	pub dashes: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Summary {
	#[serde(default)]
	pub node_count: usize,
	#[serde(default)]
	pub edge_count: usize,
	#[serde(default)]
	pub ghost_count: usize,
}

/// One analysis run as delivered by the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawDataset {
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	#[serde(default)]
	pub edges: Vec<RawEdge>,
	#[serde(default)]
	pub summary: Summary,
	/// Organization name to CSS color, in payload order.
	#[serde(default, deserialize_with = "ordered_legend")]
	pub color_legend: Vec<(String, String)>,
}

impl RawDataset {
	pub fn from_json(payload: &str) -> Result<Self, DatasetError> {
		Ok(serde_json::from_str(payload)?)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Employee numbers may arrive as JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
	Text(String),
	Int(i64),
	Float(f64),
}

fn node_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NodeId, D::Error> {
	Ok(match WireId::deserialize(deserializer)? {
		WireId::Text(s) => s,
		WireId::Int(n) => n.to_string(),
		WireId::Float(f) => f.to_string(),
	})
}

/// Ghost nodes are sometimes sent with a `{background, border}` object instead of a color.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireColor {
	Css(String),
	Styled { background: String },
}

fn css_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(
		Option::<WireColor>::deserialize(deserializer)?.map(|color| match color {
			WireColor::Css(css) => css,
			WireColor::Styled { background } => background,
		}),
	)
}

fn ordered_legend<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Vec<(String, String)>, D::Error> {
	let map = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
	Ok(map
		.unwrap_or_default()
		.into_iter()
		.filter_map(|(org, color)| color.as_str().map(|c| (org, c.to_owned())))
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn decodes_backend_payload() {
		let data = RawDataset::from_json(
			r##"{
				"nodes": [
					{"id": 1001, "label": "Kim", "title": "Name: Kim", "color": "#e41a1c", "org1": "Sales", "isGhost": false},
					{"id": "2002", "label": "Lee", "title": "[external] ORG1: HR",
					 "color": {"background": "rgba(180,180,180,0.3)", "border": "rgba(120,120,120,0.5)"},
					 "isGhost": true, "borderDashes": [5, 5]}
				],
				"edges": [{"from": 1001, "to": "2002", "dashes": true, "color": {"color": "rgba(150,150,150,0.4)"}}],
				"summary": {"node_count": 1, "edge_count": 1, "ghost_count": 1},
				"color_legend": {"Sales": "#e41a1c", "Finance": "#377eb8"}
			}"##,
		)
		.unwrap();

		assert_eq!(data.nodes[0].id, "1001");
		assert_eq!(data.nodes[1].color.as_deref(), Some("rgba(180,180,180,0.3)"));
		assert!(data.nodes[1].is_ghost);
		assert_eq!(
			data.edges,
			vec![RawEdge {
				from: "1001".into(),
				to: "2002".into(),
				dashes: true,
			}]
		);
		assert_eq!(
			data.color_legend,
			vec![
				("Sales".to_string(), "#e41a1c".to_string()),
				("Finance".to_string(), "#377eb8".to_string()),
			]
		);
		assert_eq!(data.summary.ghost_count, 1);
	}

	#[test]
	fn float_ids_match_integer_ids() {
		let data = RawDataset::from_json(
			r#"{"nodes": [{"id": 1001.0}, {"id": 1002}], "edges": [{"from": 1001, "to": 1002.0}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].id, "1001");
		assert_eq!(data.edges[0].from, data.nodes[0].id);
		assert_eq!(data.edges[0].to, data.nodes[1].id);
	}

	#[test]
	fn missing_fields_take_defaults() {
		let data = RawDataset::from_json(r#"{"nodes": [{"id": "a"}], "edges": [{"from": "a", "to": "a"}]}"#)
			.unwrap();
		let node = &data.nodes[0];
		assert!(!node.is_ghost);
		assert_eq!(node.fill_color(), FALLBACK_NODE_COLOR);
		assert!(!data.edges[0].dashes);
		assert_eq!(data.summary, Summary::default());
		assert!(data.color_legend.is_empty());
	}

	#[test]
	fn empty_object_is_an_empty_dataset() {
		assert!(RawDataset::from_json("{}").unwrap().is_empty());
	}

	#[test]
	fn malformed_payload_is_an_error() {
		let err = RawDataset::from_json(r#"{"nodes": 3}"#).unwrap_err();
		assert!(err.to_string().starts_with("malformed network payload"));
	}
}
