//! Integration test suite for taskdag.
//!
//! These tests drive the engine the way an editor front end does: load a
//! task listing, request dependency changes, route the resulting commands
//! through an in-memory task service, and feed its answers back.
//!
//! # Test Categories
//!
//! - `scenarios`: the reference graph scenarios end to end
//! - `service_roundtrip`: controller + fake service, including rejections
//! - `interaction`: layout, hover and drag through the controller
//! - `properties`: proptest checks of the acyclicity and reachability rules
//! - `cli`: the `taskdag` binary against listing files

mod fixtures;

mod cli;
mod scenarios;
mod service_roundtrip;
