//! Test Helpers
