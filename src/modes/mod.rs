pub mod human;

pub use human::{HumanMode, SessionEnd, SessionSummary};
