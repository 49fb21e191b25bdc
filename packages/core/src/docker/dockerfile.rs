//! Embedded Dockerfile for the runner image
//!
//! The image bundles the vendor Actions runner with the `runner-agent`
//! entrypoint and is embedded at compile time so `runner-fleet build` works
//! from any working directory.

/// The Dockerfile for building the runner image
pub const DOCKERFILE: &str = include_str!("Dockerfile");

/// Local image repository used for fleet containers.
///
/// The image is built locally, never pulled: it embeds this checkout's
/// `runner-agent` binary.
pub const IMAGE_NAME: &str = "runner-fleet/runner";

/// Default image tag
pub const IMAGE_TAG_DEFAULT: &str = "latest";

/// Actions runner release baked into the image unless overridden with
/// `build --runner-version`.
pub const RUNNER_VERSION_DEFAULT: &str = "2.332.0";
