//! Per-frame visual effects around the ship: wake trail, bubble wash and
//! clouds. These hold plain data; the client turns them into meshes.

pub mod bubbles;
pub mod clouds;
pub mod trail;

pub use bubbles::{Bubble, BubbleConfig, BubbleSystem};
pub use clouds::{Cloud, CloudConfig, CloudEvent, CloudField, CloudPuff};
pub use trail::{RibbonGeometry, TrailConfig, TrailPoint, WaterTrail};
