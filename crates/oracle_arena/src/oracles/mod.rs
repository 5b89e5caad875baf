//! Built-in oracle adapters.
//!
//! These stand in for externally trained classifiers so the arena can run
//! on its own. Each one is just another [`Oracle`](crate::Oracle); the
//! session cannot tell them apart from any other implementation.

mod constant;
mod nearest;
mod random;
mod rule;

pub use constant::ConstantOracle;
pub use nearest::NearestNeighborOracle;
pub use random::RandomOracle;
pub use rule::RuleOracle;
