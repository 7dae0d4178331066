//! Frontend build inspection and serving-mode selection.
//!
//! The build directory is inspected exactly once at startup. The three
//! presence flags are reduced to a [`ServingMode`] by a pure function, so the
//! decision can be tested without touching the filesystem. A stale build
//! requires a restart.
//!
//! | dist | assets | index | mode |
//! |------|--------|-------|------|
//! | no   | -      | -     | [`ServingMode::Degraded`] |
//! | yes  | no     | yes   | [`ServingMode::Partial`] |
//! | yes  | yes    | no    | [`ServingMode::AssetsOnly`] |
//! | yes  | yes    | yes   | [`ServingMode::Full`] |
//! | yes  | no     | no    | [`ServingMode::Empty`] |

use crate::error::ApiError;
use crate::models::FrontendNotBuiltResponse;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Static asset directory name inside the build directory.
pub const ASSETS_DIR: &str = "assets";

/// Page shell file name inside the build directory.
pub const INDEX_FILE: &str = "index.html";

/// URL prefix the asset directory is mounted under.
pub const ASSETS_PREFIX: &str = "/assets";

/// Number of build directory entries listed in the startup log.
const LISTED_ENTRIES: usize = 10;

const RULE: &str = "============================================================";

/// Presence snapshot of the frontend build directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildArtifacts {
    /// The build directory exists.
    pub dist_exists: bool,
    /// `assets/` exists inside the build directory.
    pub assets_exists: bool,
    /// `index.html` exists inside the build directory.
    pub index_exists: bool,
}

impl BuildArtifacts {
    /// Creates a snapshot; child flags are forced false when the directory is absent.
    #[must_use]
    pub const fn new(dist_exists: bool, assets_exists: bool, index_exists: bool) -> Self {
        Self {
            dist_exists,
            assets_exists: dist_exists && assets_exists,
            index_exists: dist_exists && index_exists,
        }
    }

    /// Checks the filesystem under `dist_dir`.
    #[must_use]
    pub fn inspect(dist_dir: &Path) -> Self {
        let dist_exists = dist_dir.is_dir();
        Self::new(
            dist_exists,
            dist_exists && dist_dir.join(ASSETS_DIR).is_dir(),
            dist_exists && dist_dir.join(INDEX_FILE).is_file(),
        )
    }
}

/// Terminal serving mode for frontend paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServingMode {
    /// No build directory: `/` returns a JSON diagnostic.
    Degraded,
    /// Page shell only: SPA catch-all without an asset mount.
    Partial,
    /// Assets only: asset mount without a catch-all.
    AssetsOnly,
    /// Asset mount plus SPA catch-all.
    Full,
    /// Build directory exists but holds neither assets nor a page shell.
    Empty,
}

impl ServingMode {
    /// Selects the mode for a build snapshot.
    #[must_use]
    pub const fn resolve(artifacts: BuildArtifacts) -> Self {
        match (
            artifacts.dist_exists,
            artifacts.assets_exists,
            artifacts.index_exists,
        ) {
            (false, _, _) => ServingMode::Degraded,
            (true, false, true) => ServingMode::Partial,
            (true, true, false) => ServingMode::AssetsOnly,
            (true, true, true) => ServingMode::Full,
            (true, false, false) => ServingMode::Empty,
        }
    }

    /// Whether `/assets` is mounted.
    #[must_use]
    pub const fn mounts_assets(self) -> bool {
        matches!(self, ServingMode::AssetsOnly | ServingMode::Full)
    }

    /// Whether the SPA catch-all is registered.
    #[must_use]
    pub const fn serves_spa(self) -> bool {
        matches!(self, ServingMode::Partial | ServingMode::Full)
    }

    /// Whether `/` serves the missing-build diagnostic.
    #[must_use]
    pub const fn serves_diagnostic(self) -> bool {
        matches!(self, ServingMode::Degraded)
    }

    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ServingMode::Degraded => "degraded",
            ServingMode::Partial => "partial",
            ServingMode::AssetsOnly => "assets-only",
            ServingMode::Full => "full",
            ServingMode::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ServingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frontend build location, snapshot and selected mode.
#[derive(Debug, Clone)]
pub struct FrontendBuild {
    dist_dir: PathBuf,
    artifacts: BuildArtifacts,
    mode: ServingMode,
}

impl FrontendBuild {
    /// Inspects `dist_dir` once and logs the outcome.
    #[must_use]
    pub fn inspect(dist_dir: impl Into<PathBuf>) -> Self {
        let dist_dir = dist_dir.into();
        let build = Self::from_artifacts(dist_dir.clone(), BuildArtifacts::inspect(&dist_dir));
        build.log_diagnostics();
        build
    }

    /// Builds from an already known snapshot without touching the filesystem.
    #[must_use]
    pub fn from_artifacts(dist_dir: impl Into<PathBuf>, artifacts: BuildArtifacts) -> Self {
        Self {
            dist_dir: dist_dir.into(),
            artifacts,
            mode: ServingMode::resolve(artifacts),
        }
    }

    /// The build directory that was checked.
    #[must_use]
    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    /// The presence snapshot.
    #[must_use]
    pub fn artifacts(&self) -> BuildArtifacts {
        self.artifacts
    }

    /// The selected serving mode.
    #[must_use]
    pub fn mode(&self) -> ServingMode {
        self.mode
    }

    /// Path of the asset directory.
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.dist_dir.join(ASSETS_DIR)
    }

    /// Path of the page shell.
    #[must_use]
    pub fn index_file(&self) -> PathBuf {
        self.dist_dir.join(INDEX_FILE)
    }

    /// Diagnostic body served at `/` in degraded mode.
    #[must_use]
    pub fn diagnostic(&self) -> FrontendNotBuiltResponse {
        FrontendNotBuiltResponse::new(self.dist_dir.display().to_string())
    }

    /// Logs the inspection result with exact paths, directory contents and
    /// remediation hints.
    fn log_diagnostics(&self) {
        info!("{}", RULE);
        info!("Frontend build directory check:");
        info!("   path: {}", self.dist_dir.display());
        if let Ok(absolute) = std::path::absolute(&self.dist_dir) {
            info!("   absolute path: {}", absolute.display());
        }
        info!("   exists: {}", self.artifacts.dist_exists);

        if !self.artifacts.dist_exists {
            error!("{}", RULE);
            error!(
                "Frontend build directory does not exist: {}",
                self.dist_dir.display()
            );
            error!("{}", RULE);
            error!("The web interface will be unavailable!");
            error!("Possible causes:");
            error!("  1. The frontend failed to compile during the Docker build");
            error!("  2. The COPY instruction points at the wrong path");
            error!("  3. The frontend build output directory is not 'dist'");
            error!("");
            error!("Please check:");
            error!("  - Dockerfile: COPY --from=frontend-builder /build/dist /app/web/dist");
            error!("  - The frontend build succeeds: npm run build");
            error!("  - The frontend output directory setting (vite.config.ts)");
            error!("{}", RULE);
            info!("Serving mode: {}", self.mode);
            return;
        }

        match list_entries(&self.dist_dir, LISTED_ENTRIES) {
            Ok(entries) => info!("   contents: {:?}", entries),
            Err(e) => warn!("   unable to list build directory: {}", e),
        }

        if self.artifacts.assets_exists {
            info!(
                "Static assets mounted: {} -> {}",
                ASSETS_PREFIX,
                self.assets_dir().display()
            );
        } else {
            warn!("assets directory does not exist: {}", self.assets_dir().display());
        }

        if self.artifacts.index_exists {
            info!("Frontend SPA route configured");
            info!("index.html: {}", self.index_file().display());
        } else {
            error!("index.html does not exist: {}", self.index_file().display());
            error!("   The frontend will not be reachable!");
        }

        info!("Serving mode: {}", self.mode);
    }
}

/// Lists up to `limit` entry names of `dir`, sorted.
fn list_entries(dir: &Path, limit: usize) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    names.truncate(limit);
    Ok(names)
}

/// Returns true if `path` equals `prefix` or continues it at a segment boundary.
///
/// `/api/configs/templates` is under `/api/configs`; `/api/configsx` is not.
#[must_use]
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Decodes percent escapes and resolves empty, `.` and `..` segments.
///
/// `//api/x`, `/%61pi/x` and `/app/../api/x` all normalize to `/api/x`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

/// The SPA catch-all: serves the page shell for any unclaimed path.
#[derive(Debug, Clone)]
pub struct SpaShell {
    index_file: PathBuf,
    reserved_prefixes: Vec<String>,
}

impl SpaShell {
    /// Creates a shell serving `index_file`; paths under `reserved_prefixes` get a 404.
    #[must_use]
    pub fn new(index_file: PathBuf, reserved_prefixes: Vec<String>) -> Self {
        Self {
            index_file,
            reserved_prefixes,
        }
    }

    /// Prefixes the shell never answers for.
    #[must_use]
    pub fn reserved_prefixes(&self) -> &[String] {
        &self.reserved_prefixes
    }

    /// Returns true if the shell would serve `path`, in any spelling.
    #[must_use]
    pub fn claims(&self, path: &str) -> bool {
        let path = normalize_path(path);
        !self
            .reserved_prefixes
            .iter()
            .any(|prefix| path_has_prefix(&path, prefix))
    }

    /// Handles an unmatched request.
    pub async fn serve(&self, method: Method, uri: Uri) -> Response {
        let path = uri.path();

        if !self.claims(path) {
            return ApiError::NotFound(path.to_string()).into_response();
        }
        if method != Method::GET && method != Method::HEAD {
            return ApiError::MethodNotAllowed(method.to_string()).into_response();
        }

        match tokio::fs::read(&self.index_file).await {
            Ok(bytes) => (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("text/html; charset=utf-8"),
                    ),
                    (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                bytes,
            )
                .into_response(),
            Err(e) => {
                error!(
                    "Failed to read page shell {}: {}",
                    self.index_file.display(),
                    e
                );
                ApiError::Internal("frontend page shell is unavailable".to_string())
                    .into_response()
            }
        }
    }
}
