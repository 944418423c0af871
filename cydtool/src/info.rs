use cydlib::{ArtifactKind, FlashLayout};

use crate::common::{display_name, format_size, stale_files, ContextArgs};
use crate::esptool::EsptoolArgs;

#[derive(clap::Args, Debug)]
pub struct InfoOpts {
    #[command(flatten)]
    context: ContextArgs,
    #[command(flatten)]
    esptool: EsptoolArgs,
}

impl crate::ToolRun for InfoOpts {
    fn run(&self) -> anyhow::Result<()> {
        let full = self.context.target(ArtifactKind::Full);
        let ota = self.context.target(ArtifactKind::Ota);
        let ctx = &full.ctx;
        let out_dir = ctx.output_dir();

        if full.name.version.is_known() {
            println!("Version:     {}", full.name.version);
        } else {
            println!(
                "Version:     {} (no FIRMWARE_VERSION in {})",
                full.name.version,
                ctx.version_source().display()
            );
        }
        println!("Variant:     {}", full.name.variant);
        println!("Build dir:   {}", ctx.build_dir.display());
        println!("Output dir:  {}", out_dir.display());
        println!("Full image:  {}", full.name);
        println!("OTA image:   {}", ota.name);
        println!();

        println!("Segments:");
        let layout = FlashLayout::for_context(ctx);
        for source in layout.sources() {
            let state = match std::fs::metadata(&source.path) {
                Ok(m) => format!("{} bytes", format_size(m.len())),
                Err(_) if source.required => "MISSING".to_owned(),
                Err(_) => "absent, skipped".to_owned(),
            };
            println!("  {:>8}  {:<16} {}", source.offset_arg(), source.name, state);
        }
        println!();

        println!("Stale artifacts:");
        let mut any = false;
        if out_dir.is_dir() {
            for name in [&full.name, &ota.name] {
                for old in stale_files(&out_dir, name)? {
                    println!("  {}", display_name(&old));
                    any = true;
                }
            }
        }
        if !any {
            println!("  (none)");
        }
        println!();

        println!("Merge tools:");
        match self.esptool.system_tool() {
            Some(path) => println!("  system esptool:      {}", path.display()),
            None => println!("  system esptool:      not found"),
        }
        match self.esptool.package_dir() {
            Some(dir) => println!(
                "  bundled esptool.py:  {} (via {})",
                dir.join("esptool.py").display(),
                self.esptool.python
            ),
            None => println!("  bundled esptool.py:  not found"),
        }
        println!("  segment stitch:      always available");

        let missing = layout.missing();
        if !missing.is_empty() {
            println!();
            println!("merged would fail: missing {}", missing.join(", "));
        }

        Ok(())
    }
}
