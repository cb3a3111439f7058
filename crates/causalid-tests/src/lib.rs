//! Integration and property tests for causalid live under `tests/`.
