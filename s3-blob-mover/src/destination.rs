/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{Error, ErrorKind, Stage};
use crate::request::{DestinationLocation, TransferBuffer};
use azure_core::request_options::IfMatchCondition;
use azure_core::RetryOptions;
use azure_storage::{CloudLocation, ConnectionString};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use std::fmt;
use std::future::Future;

/// A store blobs are written to.
pub trait BlobSink {
    /// Writes `buffer` to `location` in a single call.
    ///
    /// When `overwrite` is `false` and a blob already exists at `location`, the write fails with
    /// [`ErrorKind::DestinationConflict`](crate::ErrorKind::DestinationConflict) and the
    /// existing blob is left untouched.
    fn upload(
        &self,
        location: &DestinationLocation,
        buffer: TransferBuffer,
        overwrite: bool,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// [`BlobSink`] backed by Azure Blob Storage block blobs.
#[derive(Clone)]
pub struct AzureBlobDestination {
    service: BlobServiceClient,
}

impl AzureBlobDestination {
    /// Uses the given service client as is.
    pub fn new(service: BlobServiceClient) -> Self {
        Self { service }
    }

    /// Builds a service client from a storage account connection string.
    ///
    /// Connection strings naming an explicit `BlobEndpoint`, a non-default `EndpointSuffix`, or
    /// `UseDevelopmentStorage=true` are supported. No request is sent; a bad account key only
    /// surfaces on the first upload.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, Error> {
        let parsed = ConnectionString::new(connection_string)
            .map_err(|err| Error::with_source(ErrorKind::Configuration, err))?;

        let builder = if parsed.use_development_storage == Some(true) {
            ClientBuilder::emulator()
        } else {
            let account = parsed.account_name.ok_or_else(|| {
                Error::configuration("connection string does not name an AccountName")
            })?;
            let credentials = parsed
                .storage_credentials()
                .map_err(|err| Error::with_source(ErrorKind::Configuration, err))?;
            match (parsed.blob_endpoint, parsed.endpoint_suffix) {
                (Some(endpoint), _) => ClientBuilder::with_location(
                    CloudLocation::Custom {
                        account: account.to_owned(),
                        uri: endpoint.trim_end_matches('/').to_owned(),
                    },
                    credentials,
                ),
                (None, Some(suffix)) if suffix != DEFAULT_ENDPOINT_SUFFIX => {
                    ClientBuilder::with_location(
                        CloudLocation::Custom {
                            account: account.to_owned(),
                            uri: format!("https://{account}.blob.{suffix}"),
                        },
                        credentials,
                    )
                }
                _ => ClientBuilder::new(account, credentials),
            }
        };

        let service = builder.retry(RetryOptions::none()).blob_service_client();
        Ok(Self::new(service))
    }
}

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

impl fmt::Debug for AzureBlobDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBlobDestination").finish_non_exhaustive()
    }
}

impl BlobSink for AzureBlobDestination {
    async fn upload(
        &self,
        location: &DestinationLocation,
        buffer: TransferBuffer,
        overwrite: bool,
    ) -> Result<(), Error> {
        let blob = self
            .service
            .container_client(location.container())
            .blob_client(location.blob_name());

        let mut put = blob.put_block_blob(buffer.into_bytes());
        if !overwrite {
            // If-None-Match: * makes the service refuse to replace an existing blob
            put = put.if_match(IfMatchCondition::NotMatch("*".to_owned()));
        }
        put.await
            .map_err(|err| Error::from_azure(Stage::Destination, err))?;
        Ok(())
    }
}
