pub mod congestion;
pub mod flow;
pub mod host;
pub mod queue;
pub mod router;
pub mod scenario_runner;
pub mod simulation;
pub mod trace;

pub use flow::Flow;
pub use host::{Host, HostAction};
pub use queue::{EventAction, EventHandle, EventQueue};
pub use router::{Router, RouterAction};
pub use scenario_runner::run_scenario;
pub use simulation::Simulation;
pub use trace::{Logger, SimulationReport};
