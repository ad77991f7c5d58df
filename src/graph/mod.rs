//! Datamodel dat tussen de host (canvas) en de componenten wordt uitgewisseld.

pub mod node;
pub mod value;
