use crate::model::{ExecutionPolicy, LocatorPolicy, PolicySnapshot, RetryPolicy};

pub const DEFAULT_IDENTITY_ATTRIBUTES: [&str; 3] = ["data-mark-id", "data-element-id", "id"];
pub const DEFAULT_TEST_ID_ATTRIBUTES: [&str; 3] = ["data-testid", "data-test", "data-qa"];

pub fn default_snapshot() -> PolicySnapshot {
    PolicySnapshot {
        rev: 1,
        execution: ExecutionPolicy {
            command_budget_ms: 20_000,
            settle_timeout_ms: 2_000,
            verify_fill: false,
        },
        retry: RetryPolicy {
            backoff_ms: vec![1_000, 2_000, 4_000],
        },
        locator: LocatorPolicy {
            identity_attributes: DEFAULT_IDENTITY_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_id_attributes: DEFAULT_TEST_ID_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        },
        provenance: Default::default(),
    }
}
