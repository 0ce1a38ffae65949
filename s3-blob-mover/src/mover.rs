/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::config::{MoverConfig, DEFAULT_REGION};
use crate::credentials::{ProvideRoleCredentials, StsCredentialBroker};
use crate::destination::{AzureBlobDestination, BlobSink};
use crate::error::Error;
use crate::request::{TransferOutcome, TransferRequest};
use crate::source::{ObjectSource, S3Source};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_smithy_types::retry::RetryConfig;
use aws_types::region::Region;
use aws_types::SdkConfig;

/// Copies single objects from a source store to a destination store.
///
/// The name is historical: the source object is read, never deleted, so every transfer is a copy.
///
/// ```no_run
/// # async fn run() -> Result<(), s3_blob_mover::Error> {
/// use s3_blob_mover::config::MoverConfig;
/// use s3_blob_mover::{Mover, TransferRequest};
///
/// let config = MoverConfig::new(
///     "AccountName=archive;AccountKey=bm90LWEtcmVhbC1rZXk=",
///     "arn:aws:iam::123456789012:role/s3-reader",
/// );
/// let mover = Mover::connect(&config).await?;
/// let request = TransferRequest::builder()
///     .source_bucket("my-source-bucket")
///     .source_key("reports/2024/quarterly-report.pdf")
///     .destination_container("archive-container")
///     .build()?;
/// let outcome = mover.move_single_file(&request).await?;
/// println!("copied {} bytes to {}", outcome.bytes_transferred, outcome.destination);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Mover<S = S3Source, D = AzureBlobDestination> {
    source: S,
    destination: D,
}

impl Mover {
    /// Loads AWS configuration from the environment and connects both stores.
    ///
    /// The region is taken from `config`, then the default region provider chain, then
    /// `us-east-1`.
    pub async fn connect(config: &MoverConfig) -> Result<Self, Error> {
        let explicit = config.region().map(|region| Region::new(region.to_owned()));
        let region = RegionProviderChain::first_try(explicit)
            .or_default_provider()
            .or_else(Region::from_static(DEFAULT_REGION));
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        Self::connect_with(&sdk_config, config).await
    }

    /// Connects both stores using already loaded AWS configuration.
    ///
    /// The role is assumed through STS using the identity in `sdk_config`.
    pub async fn connect_with(
        sdk_config: &SdkConfig,
        config: &MoverConfig,
    ) -> Result<Self, Error> {
        let broker = StsCredentialBroker::from_conf(sdk_config);
        Self::connect_via(&broker, sdk_config, config).await
    }

    /// Connects both stores, obtaining source credentials from `broker`.
    ///
    /// The role is assumed first; if that fails no other client is built.
    pub async fn connect_via(
        broker: &impl ProvideRoleCredentials,
        sdk_config: &SdkConfig,
        config: &MoverConfig,
    ) -> Result<Self, Error> {
        let credentials = broker
            .assume_role(config.role_arn(), config.session_name())
            .await?;
        let source = S3Source::with_credentials(sdk_config, credentials);
        tracing::debug!(region = ?sdk_config.region(), "built source client");

        let destination =
            AzureBlobDestination::from_connection_string(config.connection_string())?;
        tracing::debug!("built destination client");

        Ok(Self::from_parts(source, destination))
    }
}

impl<S, D> Mover<S, D>
where
    S: ObjectSource,
    D: BlobSink,
{
    /// Assembles a mover from already built stores.
    pub fn from_parts(source: S, destination: D) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Copies one object, holding its full contents in memory between download and upload.
    ///
    /// Nothing is retried and a failed upload is not rolled back.
    pub async fn move_single_file(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, Error> {
        let source = request.source();
        let destination = request.destination();

        tracing::info!(%source, "downloading object");
        let buffer = self.source.download(source).await?;
        let bytes_transferred = buffer.len() as u64;

        tracing::info!(
            %destination,
            bytes = bytes_transferred,
            overwrite = request.overwrite(),
            "uploading blob"
        );
        self.destination
            .upload(destination, buffer, request.overwrite())
            .await?;

        tracing::info!(%source, %destination, bytes = bytes_transferred, "transfer complete");
        Ok(TransferOutcome {
            source: source.clone(),
            destination: destination.clone(),
            bytes_transferred,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DestinationLocation, SourceLocation, TransferBuffer};
    use crate::ErrorKind;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        objects: HashMap<(String, String), Bytes>,
        downloads: AtomicUsize,
    }

    impl FakeSource {
        fn with_object(bucket: &str, key: &str, contents: &'static [u8]) -> Self {
            let mut objects = HashMap::new();
            objects.insert((bucket.to_owned(), key.to_owned()), Bytes::from_static(contents));
            Self {
                objects,
                ..Default::default()
            }
        }
    }

    impl ObjectSource for FakeSource {
        async fn download(&self, location: &SourceLocation) -> Result<TransferBuffer, Error> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            self.objects
                .get(&(location.bucket().to_owned(), location.key().to_owned()))
                .cloned()
                .map(TransferBuffer::new)
                .ok_or_else(|| Error::from(ErrorKind::SourceNotFound))
        }
    }

    #[derive(Default)]
    struct FakeSink {
        blobs: Mutex<HashMap<(String, String), Bytes>>,
        uploads: AtomicUsize,
    }

    impl FakeSink {
        fn blob(&self, container: &str, name: &str) -> Option<Bytes> {
            self.blobs
                .lock()
                .unwrap()
                .get(&(container.to_owned(), name.to_owned()))
                .cloned()
        }
    }

    impl BlobSink for FakeSink {
        async fn upload(
            &self,
            location: &DestinationLocation,
            buffer: TransferBuffer,
            overwrite: bool,
        ) -> Result<(), Error> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            let mut blobs = self.blobs.lock().unwrap();
            let key = (
                location.container().to_owned(),
                location.blob_name().to_owned(),
            );
            if !overwrite && blobs.contains_key(&key) {
                return Err(ErrorKind::DestinationConflict.into());
            }
            blobs.insert(key, buffer.into_bytes());
            Ok(())
        }
    }

    const BUCKET: &str = "my-source-bucket";
    const KEY: &str = "reports/2024/quarterly-report.pdf";
    const CONTAINER: &str = "archive-container";

    fn request(overwrite: bool) -> TransferRequest {
        TransferRequest::builder()
            .source_bucket(BUCKET)
            .source_key(KEY)
            .destination_container(CONTAINER)
            .overwrite(overwrite)
            .build()
            .unwrap()
    }

    fn mover() -> Mover<FakeSource, FakeSink> {
        Mover::from_parts(
            FakeSource::with_object(BUCKET, KEY, b"quarterly numbers"),
            FakeSink::default(),
        )
    }

    #[tokio::test]
    async fn copies_bytes_under_key_basename() {
        let mover = mover();

        let outcome = mover.move_single_file(&request(true)).await.unwrap();

        assert_eq!(17, outcome.bytes_transferred);
        assert_eq!("quarterly-report.pdf", outcome.destination.blob_name());
        assert_eq!(&SourceLocation::new(BUCKET, KEY), &outcome.source);
        assert_eq!(
            Some(Bytes::from_static(b"quarterly numbers")),
            mover.destination.blob(CONTAINER, "quarterly-report.pdf")
        );
    }

    #[tokio::test]
    async fn repeated_overwrite_is_idempotent() {
        let mover = mover();

        mover.move_single_file(&request(true)).await.unwrap();
        let first = mover.destination.blob(CONTAINER, "quarterly-report.pdf");
        mover.move_single_file(&request(true)).await.unwrap();

        assert_eq!(first, mover.destination.blob(CONTAINER, "quarterly-report.pdf"));
        assert_eq!(2, mover.destination.uploads.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn conflict_leaves_existing_blob_untouched() {
        let mover = mover();
        mover.destination.blobs.lock().unwrap().insert(
            (CONTAINER.to_owned(), "quarterly-report.pdf".to_owned()),
            Bytes::from_static(b"last quarter"),
        );

        let err = mover.move_single_file(&request(false)).await.unwrap_err();

        assert_eq!(ErrorKind::DestinationConflict, err.kind());
        assert_eq!(
            Some(Bytes::from_static(b"last quarter")),
            mover.destination.blob(CONTAINER, "quarterly-report.pdf")
        );
    }

    #[tokio::test]
    async fn missing_source_never_touches_destination() {
        let mover = Mover::from_parts(FakeSource::default(), FakeSink::default());

        let err = mover.move_single_file(&request(true)).await.unwrap_err();

        assert_eq!(ErrorKind::SourceNotFound, err.kind());
        assert_eq!(1, mover.source.downloads.load(Ordering::SeqCst));
        assert_eq!(0, mover.destination.uploads.load(Ordering::SeqCst));
    }

    struct RejectingBroker;

    impl ProvideRoleCredentials for RejectingBroker {
        async fn assume_role(
            &self,
            _role_arn: &str,
            _session_name: &str,
        ) -> Result<crate::RoleCredentials, Error> {
            Err(ErrorKind::Authorization.into())
        }
    }

    #[tokio::test]
    async fn failed_role_assumption_stops_construction() {
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        // never parsed, so a malformed string is not reported
        let config = MoverConfig::new("not a connection string", "arn:aws:iam::1:role/r");

        let err = Mover::connect_via(&RejectingBroker, &sdk_config, &config)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Authorization, err.kind());
    }
}
