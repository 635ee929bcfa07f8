//! Shared fixtures for the integration suite: in-memory port adapters and an
//! application harness mirroring the production wiring.

// Each test binary exercises a subset of the fixtures.
#![expect(
    dead_code,
    reason = "each integration binary uses a subset of the shared fixtures"
)]

pub mod harness;
pub mod memory;
