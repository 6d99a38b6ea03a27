//! Functional test suite

mod api_test;
