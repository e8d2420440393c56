//! Provider-facing descriptors (data), Meetup endpoint constants, and strategies (behavior).
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering the protocol
//! generation, HTTPS-only endpoints, and client authentication preferences. `meetup` packages
//! the fixed Meetup endpoints into ready-made descriptors. `strategy` defines
//! [`ProviderStrategy`], an HTTP-client-agnostic hook used by flows to augment outgoing token
//! requests and map provider responses into the crate error taxonomy.

pub mod descriptor;
pub mod meetup;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
