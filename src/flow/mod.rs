pub mod date;
pub mod engine;
pub mod retry;
pub mod state;
pub mod wait;

pub use engine::{FlowReport, NavigationFlow};
pub use state::Checkpoint;
