/// Collapsible node-link tree diagram.
pub mod tree_chart;
