pub mod api;
pub mod entities;
pub mod error;
pub mod external;
pub mod routing;
pub mod session;
pub mod tracking;
pub mod viewport;

pub mod simulation;
