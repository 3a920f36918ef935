//! Normalization from raw source tables into store rows

pub mod build;
pub mod evolution;
pub mod matchup;
pub mod rows;
pub mod stats;
pub mod text;
pub mod translate;

pub use build::{normalize, BuildContext, NormalizedRows};
pub use evolution::{build_topology, EvolutionCondition, EvolutionEdge, EvolutionMember, Topology};
pub use matchup::{type_matchups, DamageFactors, Matchups, TypeMultiplier};
pub use rows::*;
pub use stats::{ordered_stats, StatValue, STAT_ORDER};
pub use translate::translate;
