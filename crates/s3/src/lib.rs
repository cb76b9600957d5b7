//! pl-s3: S3 SDK adapter for partload
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod cache;
pub mod client;

pub use cache::S3ClientCache;
pub use client::S3Client;
