//! Re-serialize an artifact

use anyhow::{Context, Result};
use weftline_core::{ArtifactSerializer, SerializationFormat};

use super::load_artifact;

/// Run the convert command
pub async fn run(
    file: &str,
    to: Option<SerializationFormat>,
    compact: bool,
    output: Option<&str>,
) -> Result<()> {
    let (artifact, source_format) = load_artifact(file).await?;

    let target_format = to
        .or_else(|| output.and_then(SerializationFormat::from_path))
        .unwrap_or(SerializationFormat::Json);
    tracing::info!("Converting {} from {:?} to {:?}", file, source_format, target_format);

    let text = target_format.serializer(!compact).serialize(&artifact)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &text)
                .await
                .with_context(|| format!("Failed to write '{path}'"))?;
            tracing::info!("✓ Wrote {}", path);
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}
