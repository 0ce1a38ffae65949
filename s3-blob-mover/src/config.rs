/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Process configuration read from environment variables.

use crate::credentials::DEFAULT_SESSION_NAME;
use crate::error::{Error, ErrorKind};
use crate::request::{TransferRequest, TransferRequestBuilder};
use aws_types::os_shim_internal::Env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const AZURE_CONN: &str = "AZURE_CONN";
const AWS_ROLE_ARN: &str = "AWS_ROLE_ARN";
const AWS_REGION: &str = "AWS_REGION";
const AWS_ROLE_SESSION_NAME: &str = "AWS_ROLE_SESSION_NAME";
const S3_BUCKET: &str = "S3_BUCKET";
const S3_KEY: &str = "S3_KEY";
const AZURE_CONTAINER: &str = "AZURE_CONTAINER";
const AZURE_BLOB_NAME: &str = "AZURE_BLOB_NAME";
const AZURE_OVERWRITE: &str = "AZURE_OVERWRITE";

/// Region used when neither the environment nor the default provider chain names one.
pub const DEFAULT_REGION: &str = "us-east-1";

const DEFAULT_BUCKET: &str = "my-source-bucket";
const DEFAULT_KEY: &str = "reports/2024/quarterly-report.pdf";
const DEFAULT_CONTAINER: &str = "archive-container";

/// Failure to read configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable was unset or empty.
    #[error("environment variable `{name}` must be set")]
    MissingVariable {
        /// Name of the variable.
        name: &'static str,
    },
    /// A boolean variable held something other than `true` or `false`.
    #[error("environment variable `{name}` must be `true` or `false`, got `{value}`")]
    InvalidBool {
        /// Name of the variable.
        name: &'static str,
        /// The value that was found.
        value: String,
    },
    /// A dotenv file existed but could not be read.
    #[error("failed to load environment file `{}`", path.display())]
    EnvFile {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse or I/O error.
        #[source]
        source: dotenv::Error,
    },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::with_source(ErrorKind::Configuration, err)
    }
}

/// Settings needed to build a [`Mover`](crate::Mover).
#[derive(Clone)]
pub struct MoverConfig {
    connection_string: String,
    role_arn: String,
    region: Option<String>,
    session_name: String,
}

impl MoverConfig {
    /// Creates a configuration from the destination connection string and the role to assume.
    pub fn new(connection_string: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            role_arn: role_arn.into(),
            region: None,
            session_name: DEFAULT_SESSION_NAME.to_owned(),
        }
    }

    /// Sets the source region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the session name passed to the role assumption.
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// The Azure Storage connection string.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// The role to assume for source access.
    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    /// The source region, if one was given.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The session name for the role assumption.
    pub fn session_name(&self) -> &str {
        &self.session_name
    }
}

impl fmt::Debug for MoverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoverConfig")
            .field("connection_string", &"** redacted **")
            .field("role_arn", &self.role_arn)
            .field("region", &self.region)
            .field("session_name", &self.session_name)
            .finish()
    }
}

/// Transfer values read from the environment, before command line overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TransferSettings {
    /// Source bucket.
    pub bucket: String,
    /// Source object key.
    pub key: String,
    /// Destination container.
    pub container: String,
    /// Destination blob name, if one was given.
    pub blob_name: Option<String>,
    /// Whether an existing blob may be replaced.
    pub overwrite: bool,
}

impl TransferSettings {
    /// Replaces each value that `overrides` sets.
    pub fn apply_overrides(&mut self, overrides: TransferOverrides) {
        if let Some(bucket) = overrides.bucket {
            self.bucket = bucket;
        }
        if let Some(key) = overrides.key {
            self.key = key;
        }
        if let Some(container) = overrides.container {
            self.container = container;
        }
        if overrides.blob_name.is_some() {
            self.blob_name = overrides.blob_name;
        }
        if let Some(overwrite) = overrides.overwrite {
            self.overwrite = overwrite;
        }
    }

    /// Returns a request builder seeded with these settings.
    pub fn to_request_builder(&self) -> TransferRequestBuilder {
        TransferRequest::builder()
            .source_bucket(&self.bucket)
            .source_key(&self.key)
            .destination_container(&self.container)
            .set_destination_blob_name(self.blob_name.clone())
            .overwrite(self.overwrite)
    }
}

/// Values given on the command line. Unset fields keep the environment value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOverrides {
    /// Source bucket.
    pub bucket: Option<String>,
    /// Source object key.
    pub key: Option<String>,
    /// Destination container.
    pub container: Option<String>,
    /// Destination blob name.
    pub blob_name: Option<String>,
    /// Whether an existing blob may be replaced.
    pub overwrite: Option<bool>,
}

/// Reads [`MoverConfig`] and [`TransferSettings`] from environment variables.
///
/// | Variable | Default |
/// |---|---|
/// | `AZURE_CONN` | required |
/// | `AWS_ROLE_ARN` | required |
/// | `AWS_REGION` | default provider chain, then `us-east-1` |
/// | `AWS_ROLE_SESSION_NAME` | `S3ToAzureSession` |
/// | `S3_BUCKET` | `my-source-bucket` |
/// | `S3_KEY` | `reports/2024/quarterly-report.pdf` |
/// | `AZURE_CONTAINER` | `archive-container` |
/// | `AZURE_BLOB_NAME` | basename of the key |
/// | `AZURE_OVERWRITE` | `true` |
///
/// Empty values are treated as unset.
#[derive(Debug)]
pub struct EnvironmentConfigLoader {
    env: Env,
}

impl EnvironmentConfigLoader {
    /// Reads from the process environment.
    pub fn new() -> Self {
        Self::new_with_env(Env::real())
    }

    /// Reads from the given environment.
    pub fn new_with_env(env: Env) -> Self {
        Self { env }
    }

    /// Loads the settings needed to connect.
    pub fn mover_config(&self) -> Result<MoverConfig, ConfigError> {
        let connection_string = self.required(AZURE_CONN)?;
        let role_arn = self.required(AWS_ROLE_ARN)?;

        let mut config = MoverConfig::new(connection_string, role_arn);
        if let Some(region) = self.optional(AWS_REGION) {
            config = config.with_region(region);
        }
        if let Some(session_name) = self.optional(AWS_ROLE_SESSION_NAME) {
            config = config.with_session_name(session_name);
        }
        Ok(config)
    }

    /// Loads the values of the transfer to run.
    pub fn transfer_settings(&self) -> Result<TransferSettings, ConfigError> {
        let overwrite = match self.optional(AZURE_OVERWRITE) {
            None => true,
            Some(value) if value.eq_ignore_ascii_case("true") => true,
            Some(value) if value.eq_ignore_ascii_case("false") => false,
            Some(value) => {
                return Err(ConfigError::InvalidBool {
                    name: AZURE_OVERWRITE,
                    value,
                })
            }
        };
        Ok(TransferSettings {
            bucket: self.or_default(S3_BUCKET, DEFAULT_BUCKET),
            key: self.or_default(S3_KEY, DEFAULT_KEY),
            container: self.or_default(AZURE_CONTAINER, DEFAULT_CONTAINER),
            blob_name: self.optional(AZURE_BLOB_NAME),
            overwrite,
        })
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.env.get(name).ok().filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::MissingVariable { name })
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_owned())
    }
}

impl Default for EnvironmentConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads variables from a dotenv file into the process environment.
///
/// With no `path`, `.env` is searched for from the working directory upward and a missing file is
/// not an error. An explicit `path` must exist. Variables already set are not replaced.
pub fn load_dotenv(path: Option<&Path>) -> Result<(), ConfigError> {
    let result = match path {
        Some(path) => dotenv::from_path(path),
        None => dotenv::dotenv().map(|_| ()),
    };
    match result {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(err)) if path.is_none() && err.kind() == io::ErrorKind::NotFound => {
            Ok(())
        }
        Err(source) => Err(ConfigError::EnvFile {
            path: path.map_or_else(|| PathBuf::from(".env"), Path::to_path_buf),
            source,
        }),
    }
}
