//! Validate artifact command

use anyhow::Result;
use weftline_core::{ElementDeclaration, fingerprint};

use super::load_artifact;

/// Run the validate command
pub async fn run(file: &str) -> Result<()> {
    tracing::info!("Validating artifact: {}", file);

    let (artifact, format) = load_artifact(file).await?;

    tracing::info!("✓ Format: {:?}", format);
    tracing::info!("✓ Configurations: {}", artifact.configurations().count());
    tracing::info!("✓ Flows: {}", artifact.constructs().count());
    tracing::info!("✓ Global parameters: {}", artifact.top_level_parameters().count());

    println!("Artifact: {}", artifact.name());
    println!("Global elements: {}", artifact.global_elements().len());
    println!("Fingerprint: {}", fingerprint(&artifact)?);
    Ok(())
}
