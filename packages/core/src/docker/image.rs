//! Image build and removal
//!
//! The runner image is built from the embedded Dockerfile via the Engine
//! API with streaming progress. A short tail of build output is kept so
//! failures come with context instead of a bare engine message.

use super::progress::ProgressReporter;
use super::{DOCKERFILE, DockerClient, DockerError, IMAGE_NAME, IMAGE_TAG_DEFAULT};
use bollard::models::BuildInfoAux;
use bollard::query_parameters::{
    BuildImageOptions, BuilderVersion, ListImagesOptionsBuilder, RemoveImageOptionsBuilder,
};
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use futures_util::StreamExt;
use http_body_util::{Either, Full};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};
use tar::Builder as TarBuilder;
use tracing::debug;

/// Number of recent build log lines kept for error context
const BUILD_LOG_TAIL: usize = 20;

/// Check if an image exists locally
pub async fn image_exists(
    client: &DockerClient,
    image: &str,
    tag: &str,
) -> Result<bool, DockerError> {
    let full_name = format!("{image}:{tag}");
    debug!("Checking if image exists: {}", full_name);

    match client.inner().inspect_image(&full_name).await {
        Ok(_) => Ok(true),
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => Ok(false),
        Err(e) => Err(DockerError::from(e)),
    }
}

/// Build the runner image from the embedded Dockerfile.
///
/// Returns the full `image:tag` string on success.
///
/// # Arguments
/// * `tag` - image tag (defaults to [`IMAGE_TAG_DEFAULT`])
/// * `no_cache` - build without the layer cache
/// * `build_args` - `RUNNER_VERSION` / `RUNNER_SHA256` / `AGENT_VERSION` overrides
pub async fn build_image(
    client: &DockerClient,
    tag: Option<&str>,
    no_cache: bool,
    build_args: HashMap<String, String>,
    progress: &mut ProgressReporter,
) -> Result<String, DockerError> {
    let tag = tag.unwrap_or(IMAGE_TAG_DEFAULT);
    let full_name = format!("{IMAGE_NAME}:{tag}");
    debug!("Building image {} (no_cache: {})", full_name, no_cache);

    let context = create_build_context()
        .map_err(|e| DockerError::Build(format!("Failed to create build context: {e}")))?;

    // The Dockerfile uses cache mounts, so the build must go through
    // BuildKit; BuildKit wants a unique session ID per build.
    let session_id = format!(
        "runner-fleet-build-{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let options = BuildImageOptions {
        t: Some(full_name.clone()),
        dockerfile: "Dockerfile".to_string(),
        version: BuilderVersion::BuilderBuildKit,
        session: Some(session_id),
        rm: true,
        nocache: no_cache,
        buildargs: Some(build_args),
        platform: String::new(),
        target: String::new(),
        ..Default::default()
    };

    let body: Either<Full<Bytes>, _> = Either::Left(Full::new(Bytes::from(context)));
    let mut stream = client.inner().build_image(options, None, Some(body));

    progress.add_spinner("build", "Initializing...");
    let mut recent_logs: VecDeque<String> = VecDeque::with_capacity(BUILD_LOG_TAIL);

    while let Some(result) = stream.next().await {
        let info = match result {
            Ok(info) => info,
            Err(e) => {
                progress.abandon_all("Build failed");
                return Err(DockerError::Build(with_log_tail(
                    &e.to_string(),
                    &recent_logs,
                )));
            }
        };

        if let Some(stream_msg) = info.stream.as_deref() {
            let msg = stream_msg.trim();
            if !msg.is_empty() {
                progress.update_spinner("build", msg);
                push_tail(&mut recent_logs, msg);
            }
        }

        if let Some(error_detail) = &info.error_detail
            && let Some(error_msg) = &error_detail.message
        {
            progress.abandon_all("Build failed");
            return Err(DockerError::Build(with_log_tail(error_msg, &recent_logs)));
        }

        if let Some(BuildInfoAux::BuildKit(status)) = &info.aux {
            for vertex in &status.vertexes {
                if !vertex.name.is_empty() {
                    progress.update_spinner("build", &vertex.name);
                    push_tail(&mut recent_logs, &vertex.name);
                }
                if !vertex.error.is_empty() {
                    progress.abandon_all("Build failed");
                    return Err(DockerError::Build(with_log_tail(
                        &vertex.error,
                        &recent_logs,
                    )));
                }
            }
        }
    }

    progress.finish("build", &format!("Built {full_name}"));
    Ok(full_name)
}

/// Remove every local image tagged with the fleet repository.
///
/// Returns the number of images removed.
pub async fn remove_fleet_images(client: &DockerClient) -> Result<usize, DockerError> {
    debug!("Removing Docker images for {}", IMAGE_NAME);

    let list_options = ListImagesOptionsBuilder::new().all(true).build();
    let images = client
        .inner()
        .list_images(Some(list_options))
        .await
        .map_err(|e| DockerError::Image(format!("Failed to list images: {e}")))?;

    let image_ids: HashSet<String> = images
        .iter()
        .filter(|image| {
            image
                .repo_tags
                .iter()
                .any(|tag| tag.starts_with(IMAGE_NAME))
        })
        .map(|image| image.id.clone())
        .collect();

    if image_ids.is_empty() {
        return Ok(0);
    }

    let remove_options = RemoveImageOptionsBuilder::new().force(true).build();
    let mut removed = 0usize;
    for image_id in image_ids {
        match client
            .inner()
            .remove_image(&image_id, Some(remove_options.clone()), None)
            .await
        {
            Ok(_) => removed += 1,
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Image already removed: {}", image_id);
            }
            Err(e) => {
                return Err(DockerError::Image(format!(
                    "Failed to remove image {image_id}: {e}"
                )));
            }
        }
    }

    Ok(removed)
}

fn push_tail(tail: &mut VecDeque<String>, line: &str) {
    if tail.len() >= BUILD_LOG_TAIL {
        tail.pop_front();
    }
    tail.push_back(line.to_string());
}

/// Attach the recent build output to an error message.
fn with_log_tail(error: &str, tail: &VecDeque<String>) -> String {
    if tail.is_empty() {
        return error.to_string();
    }
    let mut message = String::from(error);
    message.push_str("\n\nRecent build output:");
    for line in tail {
        message.push_str("\n  ");
        message.push_str(line);
    }
    message
}

/// Create a gzipped tar archive containing the Dockerfile.
///
/// The Dockerfile is the whole context: the image fetches its sources from
/// the network, so the build works from any working directory.
fn create_build_context() -> Result<Vec<u8>, std::io::Error> {
    let mut archive_buffer = Vec::new();

    {
        let encoder = GzEncoder::new(&mut archive_buffer, Compression::default());
        let mut tar = TarBuilder::new(encoder);

        let dockerfile_bytes = DOCKERFILE.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_path("Dockerfile")?;
        header.set_size(dockerfile_bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append(&header, dockerfile_bytes)?;
        tar.finish()?;

        let encoder = tar.into_inner()?;
        encoder.finish()?;
    }

    Ok(archive_buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_build_context_succeeds() {
        let context = create_build_context().expect("should create context");
        assert!(!context.is_empty());
        // gzip magic bytes
        assert_eq!(&context[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn log_tail_is_bounded() {
        let mut tail = VecDeque::new();
        for i in 0..100 {
            push_tail(&mut tail, &format!("line {i}"));
        }
        assert_eq!(tail.len(), BUILD_LOG_TAIL);
        assert_eq!(tail.back().map(String::as_str), Some("line 99"));
    }

    #[test]
    fn error_message_includes_tail() {
        let mut tail = VecDeque::new();
        push_tail(&mut tail, "Step 3/9 : RUN curl ...");
        let message = with_log_tail("exit code 7", &tail);
        assert!(message.contains("exit code 7"));
        assert!(message.contains("Step 3/9"));
    }

    #[test]
    fn empty_tail_keeps_error_verbatim() {
        let tail = VecDeque::new();
        assert_eq!(with_log_tail("boom", &tail), "boom");
    }
}
