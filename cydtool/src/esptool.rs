use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use cydlib::layout::CHIP;
use cydlib::FlashLayout;

/// Executable name of a system-wide esptool install.
pub const SYSTEM_TOOL: &str = "esptool";

/// Package that ships esptool.py inside a PlatformIO install.
pub const BUNDLED_PACKAGE: &str = "tool-esptoolpy";

#[derive(clap::Args, Debug, Clone)]
pub struct EsptoolArgs {
    /// System esptool executable [default: esptool found on PATH]
    #[arg(long = "esptool", env = "ESPTOOL")]
    pub esptool_exe: Option<PathBuf>,
    /// Directory holding the bundled esptool.py
    /// [default: <platformio core>/packages/tool-esptoolpy]
    #[arg(long, env = "ESPTOOL_PACKAGE_DIR")]
    pub esptool_dir: Option<PathBuf>,
    /// Python interpreter used to run the bundled esptool.py.
    #[arg(long, env = "PYTHONEXE", default_value = "python3")]
    pub python: String,
}

/// Look for an executable on `PATH`, like a shell would.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }

        #[cfg(windows)]
        {
            let candidate = candidate.with_extension("exe");
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }

        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

impl EsptoolArgs {
    /// The system esptool, if there is one.
    pub fn system_tool(&self) -> Option<PathBuf> {
        match self.esptool_exe {
            Some(ref exe) if is_executable(exe) => Some(exe.clone()),
            Some(_) => None,
            None => find_on_path(SYSTEM_TOOL),
        }
    }

    /// The bundled esptool package, if one is installed.
    pub fn package_dir(&self) -> Option<PathBuf> {
        let dir = if let Some(ref dir) = self.esptool_dir {
            dir.clone()
        } else if let Some(core) = std::env::var_os("PLATFORMIO_CORE_DIR") {
            PathBuf::from(core).join("packages").join(BUNDLED_PACKAGE)
        } else {
            home_dir()?
                .join(".platformio")
                .join("packages")
                .join(BUNDLED_PACKAGE)
        };

        if dir.is_dir() {
            Some(dir)
        } else {
            None
        }
    }

    /// `esptool --chip esp32 merge-bin -o <output> <segments...>`, if there is
    /// a system esptool.
    pub fn system_command(&self, output: &Path, layout: &FlashLayout) -> Option<Command> {
        let exe = self.system_tool()?;
        let mut cmd = Command::new(exe);
        cmd.args(merge_args("merge-bin", output, layout));
        Some(cmd)
    }

    /// `python esptool.py --chip esp32 merge_bin -o <output> <segments...>`,
    /// if the bundled package is installed.
    pub fn bundled_command(&self, output: &Path, layout: &FlashLayout) -> Option<Command> {
        let script = self.package_dir()?.join("esptool.py");
        let mut cmd = Command::new(&self.python);
        cmd.arg(script);
        cmd.args(merge_args("merge_bin", output, layout));
        Some(cmd)
    }
}

// older esptool.py spells the subcommand with an underscore
fn merge_args(subcommand: &str, output: &Path, layout: &FlashLayout) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--chip".into(),
        CHIP.into(),
        subcommand.into(),
        "-o".into(),
        output.as_os_str().to_owned(),
    ];
    args.extend(layout.merge_args());
    args
}

pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a merge command to completion. Any failure to start, or a non-zero
/// exit, is an error.
pub fn run(mut cmd: Command) -> anyhow::Result<()> {
    let status = cmd
        .status()
        .map_err(|e| anyhow::anyhow!("could not run {:?}: {}", cmd.get_program(), e))?;
    anyhow::ensure!(status.success(), "{:?} exited with {}", cmd.get_program(), status);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use cydlib::BuildContext;

    #[test]
    fn bundled_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join(BUNDLED_PACKAGE);
        std::fs::create_dir_all(&package).unwrap();

        let ctx = BuildContext::new(dir.path(), dir.path().join("build"), "release", "firmware");
        std::fs::create_dir_all(&ctx.build_dir).unwrap();
        std::fs::write(ctx.bootloader_path(), [0u8]).unwrap();
        std::fs::write(ctx.partitions_path(), [0u8]).unwrap();
        std::fs::write(ctx.firmware_path(), [0u8]).unwrap();
        let layout = FlashLayout::for_context(&ctx);

        let args = EsptoolArgs {
            esptool_exe: None,
            esptool_dir: Some(package.clone()),
            python: "python3".to_owned(),
        };
        let out = dir.path().join("out.bin");
        let cmd = args.bundled_command(&out, &layout).unwrap();

        let expected = format!(
            "python3 {} --chip esp32 merge_bin -o {} 0x1000 {} 0x8000 {} 0x10000 {}",
            package.join("esptool.py").display(),
            out.display(),
            ctx.bootloader_path().display(),
            ctx.partitions_path().display(),
            ctx.firmware_path().display(),
        );
        assert_eq!(describe(&cmd), expected);
    }

    #[test]
    fn missing_package() {
        let dir = tempfile::tempdir().unwrap();
        let args = EsptoolArgs {
            esptool_exe: Some(dir.path().join("nope").join("esptool")),
            esptool_dir: Some(dir.path().join("nope")),
            python: "python3".to_owned(),
        };
        assert_eq!(args.package_dir(), None);
        assert_eq!(args.system_tool(), None);
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_an_error() {
        assert!(run(Command::new("false")).is_err());
        assert!(run(Command::new("/nonexistent/esptool")).is_err());
        assert!(run(Command::new("true")).is_ok());
    }
}
