/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::Error;
use bytes::Bytes;
use std::fmt;

/// Location of the object to copy in Amazon S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    bucket: String,
    key: String,
}

impl SourceLocation {
    /// Creates a location from a bucket name and object key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The last `/`-separated segment of the key.
    pub fn basename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Location of the blob to write in Azure Blob Storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLocation {
    container: String,
    blob_name: String,
}

impl DestinationLocation {
    /// Creates a location from a container and blob name.
    pub fn new(container: impl Into<String>, blob_name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            blob_name: blob_name.into(),
        }
    }

    /// The container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The blob name inside the container.
    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }
}

impl fmt::Display for DestinationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.blob_name)
    }
}

/// A single object copy from S3 to Azure Blob Storage.
///
/// Build one with [`TransferRequest::builder`]. The destination blob name is resolved when the
/// request is built, so a request always names both ends of the copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source: SourceLocation,
    destination: DestinationLocation,
    overwrite: bool,
}

impl TransferRequest {
    /// Creates a new builder for constructing a transfer request.
    pub fn builder() -> TransferRequestBuilder {
        TransferRequestBuilder::default()
    }

    /// Where the object is read from.
    pub fn source(&self) -> &SourceLocation {
        &self.source
    }

    /// Where the object is written to.
    pub fn destination(&self) -> &DestinationLocation {
        &self.destination
    }

    /// Whether an existing blob at the destination may be replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

/// Builder for [`TransferRequest`].
#[derive(Debug, Default)]
pub struct TransferRequestBuilder {
    source_bucket: Option<String>,
    source_key: Option<String>,
    destination_container: Option<String>,
    destination_blob_name: Option<String>,
    overwrite: Option<bool>,
}

impl TransferRequestBuilder {
    /// Sets the S3 bucket to read from.
    pub fn source_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.source_bucket = Some(bucket.into());
        self
    }

    /// Sets the S3 object key to read.
    pub fn source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Sets the Azure container to write to.
    pub fn destination_container(mut self, container: impl Into<String>) -> Self {
        self.destination_container = Some(container.into());
        self
    }

    /// Sets the blob name to write. Defaults to the basename of the source key.
    pub fn destination_blob_name(mut self, blob_name: impl Into<String>) -> Self {
        self.destination_blob_name = Some(blob_name.into());
        self
    }

    /// Sets or clears the blob name to write.
    pub fn set_destination_blob_name(mut self, blob_name: Option<String>) -> Self {
        self.destination_blob_name = blob_name;
        self
    }

    /// Sets whether an existing blob may be replaced. Defaults to `true`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    /// Builds the transfer request.
    pub fn build(self) -> Result<TransferRequest, Error> {
        let bucket = required(self.source_bucket, "source bucket")?;
        let key = required(self.source_key, "source key")?;
        let container = required(self.destination_container, "destination container")?;
        let source = SourceLocation::new(bucket, key);

        let blob_name = match self.destination_blob_name {
            Some(name) => name,
            None => source.basename().to_owned(),
        };
        if blob_name.is_empty() {
            return Err(Error::invalid_request(format!(
                "cannot derive a blob name from key `{}`; set one explicitly",
                source.key()
            )));
        }

        Ok(TransferRequest {
            source,
            destination: DestinationLocation::new(container, blob_name),
            overwrite: self.overwrite.unwrap_or(true),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, Error> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::invalid_request(format!("{name} is required"))),
    }
}

/// The full contents of one object, held between download and upload.
#[derive(Debug)]
pub struct TransferBuffer {
    bytes: Bytes,
}

impl TransferBuffer {
    /// Wraps downloaded bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the object was empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning its contents.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// What a successful transfer copied, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TransferOutcome {
    /// The object that was read.
    pub source: SourceLocation,
    /// The blob that was written.
    pub destination: DestinationLocation,
    /// Number of bytes copied.
    pub bytes_transferred: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn base() -> TransferRequestBuilder {
        TransferRequest::builder()
            .source_bucket("my-source-bucket")
            .source_key("reports/2024/quarterly-report.pdf")
            .destination_container("archive-container")
    }

    #[test]
    fn blob_name_defaults_to_key_basename() {
        let request = base().build().unwrap();
        assert_eq!("quarterly-report.pdf", request.destination().blob_name());
        assert_eq!("archive-container", request.destination().container());
        assert!(request.overwrite());
    }

    #[test]
    fn explicit_blob_name_wins() {
        let request = base()
            .destination_blob_name("q4.pdf")
            .overwrite(false)
            .build()
            .unwrap();
        assert_eq!("q4.pdf", request.destination().blob_name());
        assert!(!request.overwrite());
    }

    #[test]
    fn key_without_slash_is_its_own_basename() {
        let request = base().source_key("flat.txt").build().unwrap();
        assert_eq!("flat.txt", request.destination().blob_name());
    }

    #[test]
    fn trailing_slash_key_needs_explicit_name() {
        let err = base().source_key("reports/2024/").build().unwrap_err();
        assert_eq!(ErrorKind::InvalidRequest, err.kind());

        let request = base()
            .source_key("reports/2024/")
            .destination_blob_name("2024")
            .build()
            .unwrap();
        assert_eq!("2024", request.destination().blob_name());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = TransferRequest::builder()
            .source_key("a/b")
            .destination_container("c")
            .build()
            .unwrap_err();
        assert_eq!(ErrorKind::InvalidRequest, err.kind());
        assert_eq!(
            "invalid transfer request: source bucket is required",
            err.to_string()
        );

        let err = base().destination_container("").build().unwrap_err();
        assert_eq!(ErrorKind::InvalidRequest, err.kind());
    }

    #[test]
    fn locations_display_as_paths() {
        let request = base().build().unwrap();
        assert_eq!(
            "my-source-bucket/reports/2024/quarterly-report.pdf",
            request.source().to_string()
        );
        assert_eq!(
            "archive-container/quarterly-report.pdf",
            request.destination().to_string()
        );
    }
}
