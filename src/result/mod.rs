pub mod route_result;

pub use route_result::{RouteResult, RouteUnit, TableUnit};
