//! Service-specific tests
//!
//! Tests for the services that talk to the outside world. The snapshot store
//! and random sources keep their tests next to the code.

mod solver_client;

// Common test utilities for services
pub mod common {
    use shared::{OptimizeRequest, SolveOptions, TableId, TableRecord};

    /// Minimal request with one table and no guests
    pub fn sample_request() -> OptimizeRequest {
        OptimizeRequest {
            tables: vec![TableRecord {
                id: TableId::new(),
                capacity: 8,
                label: Some("Table 1".to_string()),
            }],
            guests: Vec::new(),
            groups: Vec::new(),
            affinities: Vec::new(),
            options: Some(SolveOptions::default()),
        }
    }
}
