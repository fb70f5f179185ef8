pub mod unicast;

pub use unicast::{PhysicalTableBinding, UnicastCase, UnicastRoutingEngine};
