//! HTTP host binding.
//!
//! [`ReqwestCapability`] implements [`RequestCapability`](tether_core::RequestCapability)
//! on top of `reqwest`.

mod client;

pub use client::ReqwestCapability;
