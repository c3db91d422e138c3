//! Write a sample artifact

use anyhow::{Context, Result};
use std::path::Path;
use weftline_core::{
    ArtifactDeclaration, ArtifactSerializer, DeclarationBuilder, ElementDeclarer,
    ParameterizedBuilder, SerializationFormat,
};

/// Run the init command
pub async fn run(path: &str, name: Option<&str>, format: SerializationFormat) -> Result<()> {
    let dir = Path::new(path);

    // Create directory if it doesn't exist
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create '{}'", dir.display()))?;

    // Derive artifact name from directory name if not provided
    let artifact_name = match name {
        Some(n) => n.to_string(),
        None => tokio::fs::canonicalize(dir)
            .await?
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine artifact name from path"))?,
    };

    let target = dir.join(format!("artifact.{}", format.extension()));
    if tokio::fs::try_exists(&target).await? {
        anyhow::bail!("'{}' already exists", target.display());
    }

    tracing::info!("Creating sample artifact: {}", artifact_name);

    let artifact = sample_artifact(&artifact_name)?;
    let text = format.serializer(true).serialize(&artifact)?;
    tokio::fs::write(&target, text)
        .await
        .with_context(|| format!("Failed to write '{}'", target.display()))?;

    tracing::info!("✓ Wrote {}", target.display());
    println!();
    println!("Next steps:");
    println!("  weftline validate {}", target.display());
    println!("  weftline locate {} bridge/processors/1/processors/1", target.display());
    Ok(())
}

/// An HTTP bridge: a listener feeding a logger and a foreach scope, with a
/// choice router and an error handler.
fn sample_artifact(name: &str) -> Result<ArtifactDeclaration> {
    let core = ElementDeclarer::for_extension("mule");
    let http = ElementDeclarer::for_extension("http");

    let listener_config = http
        .new_configuration("listener-config")
        .with_ref_name("listenerConfig")
        .with_connection(
            http.new_connection("listener-connection")
                .with_parameter_group("Connection", |g| {
                    g.with_parameter("host", "0.0.0.0")
                        .with_parameter("port", "8081")
                })
                .build(),
        )
        .build();

    let foreach = core
        .new_scope("foreach")
        .with_parameter_group("General", |g| g.with_parameter("collection", "#[payload.items]"))
        .with_component(
            core.new_router("choice")
                .with_route("when", |route| {
                    route
                        .with_parameter_group("General", |g| {
                            g.with_parameter("expression", "#[payload.priority == 'high']")
                        })
                        .with_component(core.new_operation("flow-ref").build())
                })?
                .with_route("otherwise", Ok)?
                .build(),
        )?
        .with_component(
            core.new_operation("logger")
                .with_parameter_group("General", |g| {
                    g.with_parameter("message", "<![CDATA[Processed item #[payload.id]]]>")
                })
                .build(),
        )?
        .build();

    let flow = core
        .new_construct("flow")
        .with_ref_name("bridge")
        .with_component(
            http.new_source("listener")
                .with_config("listenerConfig")
                .with_parameter_group("General", |g| g.with_parameter("path", "/orders"))
                .build(),
        )
        .with_component(
            core.new_operation("logger")
                .with_parameter_group("General", |g| g.with_parameter("message", "#[payload]"))
                .build(),
        )
        .with_component(foreach)
        .with_error_handler(
            core.new_scope("on-error-continue")
                .with_component(core.new_operation("logger").build())?
                .build(),
        )
        .with_custom_parameter("doc:name", "Order bridge")
        .build();

    Ok(ElementDeclarer::new_artifact()
        .with_name(name)
        .with_global_element(listener_config)?
        .with_global_element(flow)?
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weftline_core::{ComponentKind, DeclarationKind, Location};

    #[test]
    fn test_sample_artifact_resolves() {
        let artifact = sample_artifact("demo").unwrap();
        let location: Location = "bridge/processors/1/processors/1".parse().unwrap();
        let found = artifact.find_element(&location).unwrap();
        assert_eq!(found.name(), "logger");
        assert_eq!(found.kind(), DeclarationKind::Component(ComponentKind::Operation));
    }
}
