//! # NK Game Tables
//!
//! Cooperative-game value tables over coalitions of players.
//!
//! ## Enumeration
//!
//! Coalitions are produced in canonical order: the empty coalition, then all
//! coalitions of size 1, size 2, ... up to `min(n, max_size)`, each size in
//! lexicographic position order. The number of coalitions is
//!
//! ```text
//! |table| = Σ_{k=0}^{m} C(n, k)
//! ```
//!
//! which is exponential in `n`; `max_size` is the only control.
//!
//! ## Builders
//!
//! | builder | player | per-coalition game |
//! |---|---|---|
//! | [`SocialTableBuilder`] | [`Agent`] | social learning on the induced subgraph |
//! | [`ConstrainedTableBuilder`] | [`SearchPlayer`] | hill climbing over the members' bits |
//! | [`ModularTableBuilder`] | [`ModuleDefinition`] | adopting mature module bits into a baseline |
//!
//! Randomized builders own one seeded generator and draw one sub-seed per
//! trial per coalition, in coalition-then-trial order.
//!
//! [`Agent`]: nkgames_common::Agent
//! [`SearchPlayer`]: nkgames_common::SearchPlayer
//! [`ModuleDefinition`]: nkgames_common::ModuleDefinition

pub mod builders;
pub mod coalition;
pub mod value;

pub use builders::{ConstrainedTableBuilder, ModularTableBuilder, SocialTableBuilder, ValueBasis};
pub use coalition::{coalition_count, enumerate_coalitions, CoalitionEnumerator};
pub use value::GameValueProtocol;
