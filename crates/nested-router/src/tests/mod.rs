//! Test module for nested-router
//!
//! Property-based tests use proptest; pipeline tests run on tokio.



#[cfg(test)]
pub mod pipeline_tests;


#[cfg(test)]
pub mod navigator_tests;

#[cfg(test)]
pub mod config_tests;
