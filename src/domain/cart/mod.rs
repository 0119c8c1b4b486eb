//! Cart domain module.
//!
//! # Module Structure
//!
//! - `entry` - CartEntry aggregate with unit add/remove rules
//! - `view` - CartView read model with totals
//! - `errors` - CartError

mod entry;
mod errors;
mod view;

pub use entry::{CartEntry, UnitRemoval};
pub use errors::CartError;
pub use view::CartView;
