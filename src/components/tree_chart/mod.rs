//! Collapsible, animated node-link tree diagram drawn into SVG.

mod chart;
mod component;
pub mod config;
pub mod layout;
pub mod path;
mod render;
pub mod scene;
pub mod transition;
pub mod tree;
mod types;

pub use chart::TreeChart;
pub use component::TreeChartView;
pub use config::{Axis, AxisMapping, Orientation, TreeChartConfig};
pub use scene::{Frame, LinkSprite, NodeSprite};
pub use transition::Easing;
pub use tree::{NodeId, Tree, TreeError, TreeNode};
pub use types::{FieldNames, Margin, Point, Size, TreeRecord};
