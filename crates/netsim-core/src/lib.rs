pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod link;
pub mod packet;
pub mod routing;
pub mod scenario;
pub mod topology;
pub mod tracker;

pub use buffer::{Buffer, Direction, EnqueueOutcome};
pub use clock::Clock;
pub use config::{CongestionAlgorithm, SimConfig};
pub use error::SimError;
pub use ids::{DeviceId, DeviceKind, FlowId, LinkId};
pub use link::{Link, LinkSpec};
pub use packet::{AckPacket, Packet, PayloadPacket, RoutingPacket};
pub use routing::{RoutingTable, UpdateOutcome};
pub use scenario::{SimConfigOverride, TestAction, TestAssertion, TestScenario};
pub use topology::{FlowSpec, Topology, TopologyDescription};
pub use tracker::PacketTracker;
