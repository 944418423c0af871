use anyhow::Context;

use cydlib::{ArtifactError, ArtifactKind};

use crate::common::{ensure_output_dir, format_size, publish, remove_stale, ContextArgs};

#[derive(clap::Args, Debug)]
pub struct OtaOpts {
    #[command(flatten)]
    pub context: ContextArgs,
}

impl crate::ToolRun for OtaOpts {
    fn run(&self) -> anyhow::Result<()> {
        let _span = tracing::info_span!("ota target").entered();
        self.export().context("ota target failed")?;
        Ok(())
    }
}

impl OtaOpts {
    /// Publish the application binary as-is. Returns the published path.
    pub fn export(&self) -> anyhow::Result<std::path::PathBuf> {
        let target = self.context.target(ArtifactKind::Ota);

        let firmware = target.ctx.firmware_path();
        if !firmware.exists() {
            return Err(ArtifactError::MissingInputs(vec![target.ctx.firmware_name()]))
                .with_context(|| format!("not found: {}", firmware.display()));
        }

        let out_dir = ensure_output_dir(&target.ctx)?;
        remove_stale(&out_dir, &target.name)?;

        let dst = out_dir.join(target.name.to_string());
        let size = publish(&firmware, &dst)?;
        tracing::info!("Created: {} ({} bytes)", dst.display(), format_size(size));
        Ok(dst)
    }
}
