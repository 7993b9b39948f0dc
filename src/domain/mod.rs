pub mod graph;
pub mod run;
pub mod schedule;

pub use graph::*;
pub use run::*;
pub use schedule::*;
