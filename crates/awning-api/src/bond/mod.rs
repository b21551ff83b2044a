// Bond Bridge local HTTP API (v2).
//
// `client` holds transport mechanics (URL construction, token header, retry);
// `device` holds the per-device endpoints.

mod client;
mod device;

pub use client::BondClient;
pub use device::BondAction;
