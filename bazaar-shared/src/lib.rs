pub mod money;
pub mod pii;

pub use money::{approx_eq, round2, MONEY_EPSILON};
