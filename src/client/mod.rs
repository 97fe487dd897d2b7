//! Client introspection helpers
//!
//! Parsing of user-agent strings, viewport and scroll helpers, and page
//! route lookup for location paths.

pub mod routes;
pub mod user_agent;
pub mod viewport;

pub use routes::{path_segments, PageRoute, PageRoutes};
pub use user_agent::{Browser, ClientInfo, Device, DeviceType, Os};
pub use viewport::{is_mobile, Dimensions, ScrollPosition, MOBILE_MAX_WIDTH};
