//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Vrm`] | Validated vehicle registration mark |
//! | [`ValuationRequest`] | Validated VRM + mileage pair accepted by outer surfaces |
//! | [`Valuation`] | Provider-produced value range for a vehicle |
//!
//! The failure gate never validates; these checks belong to whoever builds
//! the request.

mod valuation;
mod vrm;

pub use valuation::{Valuation, ValuationRequest};
pub use vrm::Vrm;
