//! Unit test suite

mod registry_test;
mod response_test;
mod retry_test;
mod store_test;
