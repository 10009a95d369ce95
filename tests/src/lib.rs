//! Shared helpers for search-gate integration tests.
