use std::path::{Path, PathBuf};

use crate::Variant;

/// Where a build lives, as described by the host build system.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BuildContext {
    pub project_dir: PathBuf,
    pub build_dir: PathBuf,
    pub env_name: String,
    pub program_name: String,
}

/// Build directory used by the host build system for an environment.
pub fn default_build_dir(project_dir: &Path, env_name: &str) -> PathBuf {
    project_dir.join(".pio").join("build").join(env_name)
}

impl BuildContext {
    pub fn new(
        project_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        env_name: impl Into<String>,
        program_name: impl Into<String>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            build_dir: build_dir.into(),
            env_name: env_name.into(),
            program_name: program_name.into(),
        }
    }

    pub fn variant(&self) -> Variant {
        Variant::from_env_name(&self.env_name)
    }

    /// File name of the compiled application, `<program>.bin`.
    pub fn firmware_name(&self) -> String {
        format!("{}.bin", self.program_name)
    }

    pub fn firmware_path(&self) -> PathBuf {
        self.build_dir.join(self.firmware_name())
    }

    pub fn bootloader_path(&self) -> PathBuf {
        self.build_dir.join("bootloader.bin")
    }

    pub fn partitions_path(&self) -> PathBuf {
        self.build_dir.join("partitions.bin")
    }

    pub fn boot_app0_path(&self) -> PathBuf {
        self.build_dir.join("boot_app0.bin")
    }

    /// Source file holding the `FIRMWARE_VERSION` declaration.
    pub fn version_source(&self) -> PathBuf {
        self.project_dir.join("src").join("main.cpp")
    }

    /// Where finished artifacts are published.
    pub fn output_dir(&self) -> PathBuf {
        self.project_dir.join("bin")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn paths() {
        let ctx = BuildContext::new("/proj", "/proj/.pio/build/debug", "debug", "firmware");
        assert_eq!(
            ctx.firmware_path(),
            Path::new("/proj/.pio/build/debug/firmware.bin")
        );
        assert_eq!(
            ctx.boot_app0_path(),
            Path::new("/proj/.pio/build/debug/boot_app0.bin")
        );
        assert_eq!(ctx.version_source(), Path::new("/proj/src/main.cpp"));
        assert_eq!(ctx.output_dir(), Path::new("/proj/bin"));
        assert_eq!(ctx.variant(), Variant::Debug);
        assert_eq!(
            default_build_dir(Path::new("/proj"), "release"),
            Path::new("/proj/.pio/build/release")
        );
    }
}
