/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::credentials::RoleCredentials;
use crate::error::{Error, ErrorKind, Stage};
use crate::request::{SourceLocation, TransferBuffer};
use aws_credential_types::Credentials;
use aws_smithy_types::retry::RetryConfig;
use aws_types::SdkConfig;
use std::future::Future;

/// A store objects are read from.
pub trait ObjectSource {
    /// Reads the whole object at `location` into memory.
    fn download(
        &self,
        location: &SourceLocation,
    ) -> impl Future<Output = Result<TransferBuffer, Error>> + Send;
}

/// [`ObjectSource`] backed by Amazon S3 `GetObject`.
#[derive(Debug, Clone)]
pub struct S3Source {
    client: aws_sdk_s3::Client,
}

impl S3Source {
    /// Uses the given S3 client as is.
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Builds an S3 client that signs with `credentials` and never retries.
    ///
    /// Everything else (region, HTTP client, timeouts) comes from `sdk_config`.
    pub fn with_credentials(sdk_config: &SdkConfig, credentials: RoleCredentials) -> Self {
        let config = aws_sdk_s3::config::Builder::from(sdk_config)
            .credentials_provider(Credentials::from(credentials))
            .retry_config(RetryConfig::disabled())
            .build();
        Self::new(aws_sdk_s3::Client::from_conf(config))
    }
}

impl ObjectSource for S3Source {
    async fn download(&self, location: &SourceLocation) -> Result<TransferBuffer, Error> {
        let output = self
            .client
            .get_object()
            .bucket(location.bucket())
            .key(location.key())
            .send()
            .await
            .map_err(|err| Error::from_sdk(Stage::Source, err))?;

        // the body is streamed, so a dropped connection shows up here rather than in `send`
        let body = output
            .body
            .collect()
            .await
            .map_err(|err| Error::with_source(ErrorKind::SourceTransient, err))?;
        Ok(TransferBuffer::new(body.into_bytes()))
    }
}
