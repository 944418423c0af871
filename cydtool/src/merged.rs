use std::path::Path;

use anyhow::Context;

use cydlib::{ArtifactKind, FlashLayout};

use crate::common::{ensure_output_dir, format_size, publish, remove_stale, ContextArgs};
use crate::esptool::EsptoolArgs;

/// Ways of producing a full flash image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// esptool found on PATH.
    Esptool,
    /// esptool.py bundled with PlatformIO.
    Bundled,
    /// Place segments into a 0xFF-filled image ourselves.
    ///
    /// This does no esptool-specific image handling, so the result can
    /// differ from what esptool would produce.
    Stitch,

    /// Try esptool, then bundled, then stitch. First success wins.
    Auto,
}

impl Strategy {
    const CHAIN: [Strategy; 3] = [Strategy::Esptool, Strategy::Bundled, Strategy::Stitch];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strategy::Esptool => write!(f, "system esptool"),
            Strategy::Bundled => write!(f, "bundled esptool.py"),
            Strategy::Stitch => write!(f, "segment stitch"),
            Strategy::Auto => write!(f, "auto"),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct MergedOpts {
    #[command(flatten)]
    pub context: ContextArgs,
    #[command(flatten)]
    pub esptool: EsptoolArgs,
    #[arg(long, value_enum, default_value = "auto")]
    pub strategy: Strategy,
}

impl crate::ToolRun for MergedOpts {
    fn run(&self) -> anyhow::Result<()> {
        let _span = tracing::info_span!("merged target").entered();
        self.merge().context("merged target failed")?;
        Ok(())
    }
}

impl MergedOpts {
    /// Build and publish the full image. Returns the published path.
    pub fn merge(&self) -> anyhow::Result<std::path::PathBuf> {
        let target = self.context.target(ArtifactKind::Full);

        // nothing is written or deleted until every input is known present
        let layout = FlashLayout::for_context(&target.ctx);
        layout.check()?;

        let out_dir = ensure_output_dir(&target.ctx)?;
        remove_stale(&out_dir, &target.name)?;

        let file_name = target.name.to_string();
        let tmp = target.ctx.build_dir.join(&file_name);
        let dst = out_dir.join(&file_name);

        let used = self.write_image(&layout, &tmp)?;
        tracing::debug!("merged with {}", used);

        let size = publish(&tmp, &dst)?;
        tracing::info!("Created: {} ({} bytes)", dst.display(), format_size(size));
        Ok(dst)
    }

    /// Write the merged image to `output`, with the first strategy that works.
    fn write_image(&self, layout: &FlashLayout, output: &Path) -> anyhow::Result<Strategy> {
        // never mistake an old image for a fresh one
        if let Err(e) = std::fs::remove_file(output) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }

        if self.strategy != Strategy::Auto {
            anyhow::ensure!(
                self.try_strategy(self.strategy, layout, output)?,
                "{} is not available",
                self.strategy
            );
            return Ok(self.strategy);
        }

        for strategy in Strategy::CHAIN {
            match self.try_strategy(strategy, layout, output) {
                Ok(true) => return Ok(strategy),
                Ok(false) => tracing::debug!("{} not available", strategy),
                Err(e) => tracing::warn!("{} failed: {:#}", strategy, e),
            }
        }

        anyhow::bail!("every merge strategy failed")
    }

    /// Returns `Ok(false)` if the strategy can't be used on this machine.
    fn try_strategy(
        &self,
        strategy: Strategy,
        layout: &FlashLayout,
        output: &Path,
    ) -> anyhow::Result<bool> {
        let cmd = match strategy {
            Strategy::Esptool => self.esptool.system_command(output, layout),
            Strategy::Bundled => self.esptool.bundled_command(output, layout),
            Strategy::Stitch => {
                if self.strategy == Strategy::Auto {
                    tracing::info!("Falling back to segment stitching");
                }
                let image = cydlib::stitch(&layout.read_segments()?);
                std::fs::write(output, image.into_inner())?;
                return Ok(true);
            }
            Strategy::Auto => anyhow::bail!("auto is not a single strategy"),
        };

        let Some(cmd) = cmd else {
            return Ok(false);
        };

        tracing::info!("Using {}: {}", strategy, crate::esptool::describe(&cmd));
        crate::esptool::run(cmd)?;
        anyhow::ensure!(
            output.exists(),
            "{} reported success but wrote no image",
            strategy
        );
        Ok(true)
    }
}
