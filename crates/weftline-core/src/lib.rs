//! Weftline Core Library
//!
//! This crate provides the declarative model of an integration application:
//! - Parameter values (simple, list, object)
//! - Declarations of configurations, flows and components, and their builders
//! - Hierarchical locations and their resolution against a declaration tree
//! - JSON and YAML serialization of artifacts
//! - Read-only component location and annotation data supplied by a runtime
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Declarer   │────▶│  Artifact   │────▶│ Serializer  │
//! │ (builders)  │     │   (tree)    │     │ (JSON/YAML) │
//! └─────────────┘     └──────┬──────┘     └─────────────┘
//!                            │
//!                     ┌──────▼──────┐
//!                     │  Resolver   │◀──── Location
//!                     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use weftline_core::{ElementDeclarer, Location};
//!
//! let core = ElementDeclarer::for_extension("mule");
//! let flow = core
//!     .new_construct("flow")
//!     .with_ref_name("bridge")
//!     .with_component(core.new_operation("logger").build())
//!     .build();
//! let artifact = ElementDeclarer::new_artifact()
//!     .with_name("app")
//!     .with_global_element(flow)?
//!     .build();
//!
//! let location: Location = "bridge/processors/0".parse()?;
//! assert_eq!(artifact.find_element(&location).map(|d| d.name()), Some("logger"));
//! # Ok::<(), weftline_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod declaration;
pub mod declarer;
pub mod error;
pub mod location;
pub mod resolver;
pub mod serializer;
pub mod value;

pub use component::{Annotations, Component, ComponentLocation, QualifiedName};
pub use declaration::{
    ArtifactDeclaration, ComponentContainer, ComponentDeclaration, ComponentKind, DeclarationKind,
    ElementDeclaration, GlobalElementDeclaration, MAX_COMPONENT_DEPTH, MAX_VALUE_DEPTH,
    ParameterizedElement,
};
pub use declarer::{DeclarationBuilder, ElementDeclarer, ParameterizedBuilder};
pub use error::{Error, Result};
pub use location::{Location, LocationBuilder};
pub use resolver::{DeclarationRef, find};
pub use serializer::{
    ArtifactSerializer, JsonArtifactSerializer, SerializationFormat, YamlArtifactSerializer,
    fingerprint,
};
pub use value::{ListValue, ObjectValue, ParameterValue, SimpleValue, ValueKind};
