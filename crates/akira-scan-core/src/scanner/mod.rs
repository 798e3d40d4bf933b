mod walk;

pub use walk::{scan_tree, WalkContext};
