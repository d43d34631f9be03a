//! AV1 codec configuration record decoding & encoding.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

mod config;

pub use config::AV1CodecConfigurationRecord;
