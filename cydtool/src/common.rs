use std::path::{Path, PathBuf};

use cydlib::{ArtifactKind, ArtifactName, BuildContext, FirmwareVersion};

/// Where the build lives. Defaults come from the host build system's
/// environment, so the tool can run as a post-build step unconfigured.
#[derive(clap::Args, Debug, Clone)]
pub struct ContextArgs {
    /// Project root, containing src/main.cpp and bin/.
    #[arg(long, env = "PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,
    /// Build output directory [default: <project-dir>/.pio/build/<env>]
    #[arg(long, env = "BUILD_DIR")]
    pub build_dir: Option<PathBuf>,
    /// Build environment name; anything containing "debug" is a debug build.
    #[arg(short, long = "env", env = "PIOENV", default_value = "release")]
    pub env_name: String,
    /// Program name, the application binary is <progname>.bin.
    #[arg(long, env = "PROGNAME", default_value = "firmware")]
    pub progname: String,
    /// Product name used in artifact file names.
    #[arg(long, env = "CYD_PRODUCT", default_value = cydlib::DEFAULT_PRODUCT)]
    pub product: String,
}

/// Everything a target needs to know before it touches the disk.
#[derive(Debug, Clone)]
pub struct Target {
    pub ctx: BuildContext,
    pub name: ArtifactName,
}

impl ContextArgs {
    pub fn context(&self) -> BuildContext {
        let build_dir = self
            .build_dir
            .clone()
            .unwrap_or_else(|| cydlib::default_build_dir(&self.project_dir, &self.env_name));
        BuildContext::new(&self.project_dir, build_dir, &self.env_name, &self.progname)
    }

    pub fn target(&self, kind: ArtifactKind) -> Target {
        let ctx = self.context();
        let version = firmware_version(&ctx);
        let name = ArtifactName::new(&self.product, version, ctx.variant(), kind);
        Target { ctx, name }
    }
}

/// Firmware version, or the sentinel if the source can't tell us.
pub fn firmware_version(ctx: &BuildContext) -> FirmwareVersion {
    match FirmwareVersion::from_project(ctx) {
        Ok(version) => version,
        Err(e) => {
            tracing::warn!("{}", e);
            FirmwareVersion::unknown()
        }
    }
}

pub fn ensure_output_dir(ctx: &BuildContext) -> anyhow::Result<PathBuf> {
    let dir = ctx.output_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Older artifacts in `dir` that `name` would replace.
pub fn stale_files(dir: &Path, name: &ArtifactName) -> std::io::Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(file_name) = entry.file_name().to_str() {
            if name.is_stale(file_name) {
                stale.push(entry.path());
            }
        }
    }
    stale.sort();
    Ok(stale)
}

/// Delete older artifacts. A file that won't go away is only a warning.
pub fn remove_stale(dir: &Path, name: &ArtifactName) -> anyhow::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for old in stale_files(dir, name)? {
        match std::fs::remove_file(&old) {
            Ok(()) => {
                tracing::info!("Removed old binary: {}", display_name(&old));
                removed.push(old);
            }
            Err(e) => tracing::warn!("could not remove {}: {}", old.display(), e),
        }
    }
    Ok(removed)
}

/// Copy `src` to `dst`, keeping permissions and modification time.
/// Returns the size of the published file.
pub fn publish(src: &Path, dst: &Path) -> anyhow::Result<u64> {
    std::fs::copy(src, dst)?;

    // not every platform lets us set this, and the copy is good either way
    let mtime = std::fs::metadata(src).and_then(|m| m.modified());
    let set = mtime.and_then(|t| {
        std::fs::File::options()
            .write(true)
            .open(dst)
            .and_then(|f| f.set_modified(t))
    });
    if let Err(e) = set {
        tracing::debug!("could not keep modification time on {}: {}", dst.display(), e);
    }

    Ok(std::fs::metadata(dst)?.len())
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Byte count with thousands separators, `1234567` -> `1,234,567`.
pub fn format_size(size: u64) -> String {
    let digits = size.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
