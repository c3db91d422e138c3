//! CLI command implementations

pub mod convert;
pub mod init;
pub mod locate;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use weftline_core::{ArtifactDeclaration, ArtifactSerializer, SerializationFormat};

/// Read and validate an artifact file, picking the format from its extension
pub async fn load_artifact(file: &str) -> Result<(ArtifactDeclaration, SerializationFormat)> {
    let format = SerializationFormat::from_path(file).with_context(|| {
        format!("Cannot tell the format of '{file}' (expected .json, .yaml or .yml)")
    })?;

    let contents = tokio::fs::read_to_string(Path::new(file))
        .await
        .with_context(|| format!("Failed to read '{file}'"))?;

    let artifact = format
        .serializer(false)
        .deserialize(&contents)
        .with_context(|| format!("Invalid artifact '{file}'"))?;

    tracing::debug!("Loaded '{}' as {:?}", file, format);
    Ok((artifact, format))
}
