//! hos-planner
//!
//! Plans multi-day truck trips that comply with Hours-of-Service rules: the
//! 11-hour driving limit, the 14-hour on-duty window, the 30-minute break
//! after 8 hours of driving, the 10-hour reset and the rolling on-duty cycle.
//!
//! Routing is delegated to a [`traits::RouteProvider`]; the planner itself is
//! a pure, deterministic simulation over whole minutes.

pub mod clock;
pub mod error;
pub mod haversine;
pub mod itinerary;
pub mod ors;
pub mod osrm;
pub mod osrm_data;
pub mod planner;
pub mod polyline;
pub mod rules;
pub mod segment;
pub mod traits;
pub mod trip;

pub use error::{PlanError, RouteError};
pub use itinerary::{DailyLog, DayBoundary, TripPlanResult, TripSummary};
pub use planner::{DriveLeg, ForcedStop, MileageProfile, PlanOptions, StopKind, TripPlanInput, plan, plan_many, simulate};
pub use rules::HosRules;
pub use segment::{DutyKind, DutySegment};
