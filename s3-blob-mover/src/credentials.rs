/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{Error, ErrorKind, Stage};
use aws_credential_types::Credentials;
use aws_sdk_sts::config::Builder as StsConfigBuilder;
use aws_smithy_types::retry::RetryConfig;
use aws_types::SdkConfig;
use std::fmt;
use std::future::Future;
use std::time::SystemTime;

/// Session name used when none is configured.
pub(crate) const DEFAULT_SESSION_NAME: &str = "S3ToAzureSession";

const PROVIDER_NAME: &str = "AssumeRole";

/// Temporary credentials returned by a successful role assumption.
#[derive(Clone)]
pub struct RoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: Option<SystemTime>,
}

impl RoleCredentials {
    /// Creates role credentials from their parts.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: Option<SystemTime>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration,
        }
    }

    /// The access key ID.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// The session token.
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// When the issuing service will stop accepting these credentials.
    pub fn expiration(&self) -> Option<SystemTime> {
        self.expiration
    }
}

impl fmt::Debug for RoleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl From<RoleCredentials> for Credentials {
    fn from(value: RoleCredentials) -> Self {
        Credentials::new(
            value.access_key_id,
            value.secret_access_key,
            Some(value.session_token),
            value.expiration,
            PROVIDER_NAME,
        )
    }
}

/// Exchanges a role identifier for temporary credentials.
pub trait ProvideRoleCredentials {
    /// Assumes `role_arn`, tagging the session with `session_name`.
    ///
    /// Each call starts a new session; nothing is cached.
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> impl Future<Output = Result<RoleCredentials, Error>> + Send;
}

/// [`ProvideRoleCredentials`] backed by the STS `AssumeRole` operation.
#[derive(Debug, Clone)]
pub struct StsCredentialBroker {
    client: aws_sdk_sts::Client,
}

impl StsCredentialBroker {
    /// Uses the given STS client as is.
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }

    /// Builds an STS client from shared configuration with retries turned off.
    pub fn from_conf(sdk_config: &SdkConfig) -> Self {
        let config = StsConfigBuilder::from(sdk_config)
            .retry_config(RetryConfig::disabled())
            .build();
        Self::new(aws_sdk_sts::Client::from_conf(config))
    }
}

impl ProvideRoleCredentials for StsCredentialBroker {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<RoleCredentials, Error> {
        if role_arn.is_empty() {
            return Err(Error::configuration("role ARN must not be empty"));
        }
        tracing::debug!(role_arn, session_name, "assuming role");

        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|err| Error::from_sdk(Stage::Identity, err))?;
        let credentials = output.credentials.ok_or_else(|| {
            Error::with_message(
                ErrorKind::Unhandled,
                "AssumeRole response did not include credentials",
            )
        })?;

        let expiration = SystemTime::try_from(credentials.expiration).ok();
        tracing::debug!(
            access_key_id = %credentials.access_key_id,
            ?expiration,
            "assumed role"
        );
        Ok(RoleCredentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            credentials.session_token,
            expiration,
        ))
    }
}
