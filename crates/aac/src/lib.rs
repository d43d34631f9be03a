//! AAC audio specific config decoding & encoding.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

mod config;

pub use config::{AudioObjectType, AudioSpecificConfig, SampleFrequencyIndex};
