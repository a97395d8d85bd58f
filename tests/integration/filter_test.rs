//! Integration tests for the filter engine.
//!
//! These tests are implemented in:
//! `crates/portwarden-engine/tests/filter_pipeline.rs`
//!
//! Covered scenarios:
//! - `pipeline_truncated_frames_pass_through`: fail-open parsing for short frames
//! - `pipeline_non_tcp_traffic_passes_through_even_with_strict_policy`: irrelevant traffic is never policed
//! - `pipeline_port_only_enforces_the_configured_port`: port-only variant semantics
//! - `pipeline_comm_variant_denies_everything_until_configured`: deny-by-default identity policy
//! - `pipeline_comm_prefix_never_matches`: fixed-width comm equality
//! - `pipeline_same_event_same_store_same_verdict`: decision idempotence
//! - `pipeline_readers_never_observe_a_torn_snapshot`: snapshot atomicity under a concurrent writer
