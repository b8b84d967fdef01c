pub mod content;
pub mod usage;
pub mod variant;
