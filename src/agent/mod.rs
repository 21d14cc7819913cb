pub mod action;
pub mod grid;
pub mod local;
pub mod memory;
pub mod profile;
pub mod prompt;
pub mod runtime;
pub mod state;

pub use action::{Action, Decision, ParseError, parse_decision};
pub use grid::{GridClient, HttpGridClient};
pub use memory::MemoryLog;
pub use profile::AgentProfile;
pub use runtime::{Agent, TickOutcome};
pub use state::AgentState;
