// Entity Models
// "Identity persists, values change"
//
// A leader's ID is its identity; name variants, email and credit counters
// are values attached to it.

pub mod leader;

pub use leader::{Leader, LeaderRegistry};
