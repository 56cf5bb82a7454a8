mod order;
mod phase;
mod point;
mod route;
mod sample;
mod view;

pub use order::Order;
pub use phase::{Delivery, Phase};
pub use point::{BoundingBox, GeoPoint};
pub use route::RouteResult;
pub use sample::PositionSample;
pub use view::{ViewMode, ViewModel, Viewport};
