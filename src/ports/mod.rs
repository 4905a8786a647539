//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the application calls into infrastructure through these.
//! The binary is the sole driver, so there is no inbound port.

pub mod outbound;

pub use outbound::{
    BggGateway, BuildOutput, GameCache, ImageProcessor, PlaysCache, ProgressPort, ReportRenderer,
};
