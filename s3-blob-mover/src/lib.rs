/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */
//! Copies a single object from Amazon S3 to Azure Blob Storage.
//!
//! Source access uses temporary credentials obtained by assuming an IAM role through STS. The
//! destination is addressed with an Azure Storage connection string. The object is downloaded in
//! full before it is uploaded as one block blob; nothing is retried and the source is never
//! modified.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
mod credentials;
mod destination;
mod error;
mod mover;
mod request;
mod source;

#[cfg(test)]
mod test_util;

pub use credentials::{ProvideRoleCredentials, RoleCredentials, StsCredentialBroker};
pub use destination::{AzureBlobDestination, BlobSink};
pub use error::{Error, ErrorKind};
pub use mover::Mover;
pub use request::{
    DestinationLocation, SourceLocation, TransferBuffer, TransferOutcome, TransferRequest,
    TransferRequestBuilder,
};
pub use source::{ObjectSource, S3Source};
