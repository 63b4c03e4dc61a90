//! Route planning over the bus network.
//!
//! The planner answers "how do I get from this place to that one by bus":
//!
//! 1. `search` finds the path through `(location, route)` states that
//!    minimises distance plus a penalty per change of bus.
//! 2. `compose` turns that path into riding and transfer segments.
//! 3. `finder` drives the whole request, including walks to and from
//!    places no route serves, totals, and alerts.

mod compose;
mod config;
mod finder;
mod search;

pub use compose::{
    RideLeg, RideRun, Segment, SegmentComposer, StopRef, TransferStop, VehicleInfo, WalkLeg,
    ride_runs,
};
pub use config::PlannerConfig;
pub use finder::{
    FindError, RouteFailure, RouteFindOutcome, RouteFindRequest, RouteFinder, RoutePlan, Summary,
    USER_END_NAME, USER_START_NAME,
};
pub use search::{PathResult, PathStep, StateKey, shortest_path};
