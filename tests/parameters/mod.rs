//! Integration tests for the parameter system
//!
//! These tests verify that the parameter system behaves correctly in various scenarios.

// Tests for the Parameter struct
mod parameter_tests;

// Tests for the ParameterSet collection
mod parameters_tests;
