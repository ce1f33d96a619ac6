mod component;
mod focus;
mod legend;
mod model;
mod render;
mod state;
mod surface;
mod types;

pub use component::NetworkGraph;
pub use surface::LayoutConfig;
pub use types::{RawDataset, RawEdge, RawNode, Summary};
