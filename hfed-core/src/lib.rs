pub mod catalog;
#[cfg(feature = "api")]
pub mod client;
pub mod date_range;
pub mod download;
pub mod normalize;
pub mod observation;
pub mod province;
pub mod query;
pub mod secondary_filter;
pub mod transport;
