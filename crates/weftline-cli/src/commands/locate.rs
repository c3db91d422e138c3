//! Resolve locations against an artifact

use anyhow::{Context, Result};
use weftline_core::Location;

use super::load_artifact;

/// Print the declaration found at `location` as JSON
pub async fn run(file: &str, location: &str) -> Result<()> {
    let location: Location = location
        .parse()
        .with_context(|| format!("Invalid location '{location}'"))?;
    let (artifact, _) = load_artifact(file).await?;

    let Some(found) = artifact.find_element(&location) else {
        anyhow::bail!("Nothing declared at '{}' in '{}'", location, file);
    };
    tracing::info!("Found {:?} '{}' at {}", found.kind(), found.name(), location);

    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

/// Print every addressable location with the name of its declaration
pub async fn list(file: &str) -> Result<()> {
    let (artifact, _) = load_artifact(file).await?;
    let locations = artifact.locations()?;
    tracing::info!("{} locations in {}", locations.len(), file);

    for (location, declaration) in locations {
        println!("{location}\t{}", declaration.name());
    }
    Ok(())
}
