use std::path::PathBuf;

use crate::{ArtifactError, BuildContext, Segment};

/// Chip family passed to the merge tool.
pub const CHIP: &str = "esp32";

// ESP32 classic flash map
pub const OFFSET_BOOTLOADER: usize = 0x1000;
pub const OFFSET_PARTITIONS: usize = 0x8000;
pub const OFFSET_BOOT_APP0: usize = 0xE000;
pub const OFFSET_APP: usize = 0x10000;

/// A build output that belongs at a fixed flash offset.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SegmentSource {
    pub name: String,
    pub offset: usize,
    pub path: PathBuf,
    pub required: bool,
}

impl SegmentSource {
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Offset as the merge tool expects it, e.g. `0xE000`.
    pub fn offset_arg(&self) -> String {
        format!("0x{:X}", self.offset)
    }

    pub fn read(&self) -> std::io::Result<Segment> {
        Ok(Segment::new(self.offset, std::fs::read(&self.path)?))
    }
}

/// Every segment of a full flash image, in ascending offset order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FlashLayout {
    sources: Vec<SegmentSource>,
}

impl FlashLayout {
    pub fn for_context(ctx: &BuildContext) -> Self {
        let source = |name: &str, offset, path, required| SegmentSource {
            name: name.to_owned(),
            offset,
            path,
            required,
        };

        Self {
            sources: vec![
                source("bootloader.bin", OFFSET_BOOTLOADER, ctx.bootloader_path(), true),
                source("partitions.bin", OFFSET_PARTITIONS, ctx.partitions_path(), true),
                source("boot_app0.bin", OFFSET_BOOT_APP0, ctx.boot_app0_path(), false),
                source(&ctx.firmware_name(), OFFSET_APP, ctx.firmware_path(), true),
            ],
        }
    }

    pub fn sources(&self) -> &[SegmentSource] {
        &self.sources
    }

    /// Names of required sources that are not on disk, application first.
    pub fn missing(&self) -> Vec<String> {
        let (app, rest): (Vec<_>, Vec<_>) =
            self.sources.iter().partition(|s| s.offset == OFFSET_APP);
        app.into_iter()
            .chain(rest)
            .filter(|s| s.required && !s.exists())
            .map(|s| s.name.clone())
            .collect()
    }

    /// Fail with every missing required file named.
    pub fn check(&self) -> Result<(), ArtifactError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ArtifactError::MissingInputs(missing))
        }
    }

    /// Sources that will go into the image. Absent optional ones are skipped.
    pub fn present(&self) -> impl Iterator<Item = &SegmentSource> {
        self.sources.iter().filter(|s| s.exists())
    }

    /// Segments in stitching order: required ones by offset, then the
    /// optional boot stub. Where segments overlap, later ones win.
    pub fn read_segments(&self) -> std::io::Result<Vec<Segment>> {
        let (required, optional): (Vec<_>, Vec<_>) = self.present().partition(|s| s.required);
        required
            .into_iter()
            .chain(optional)
            .map(SegmentSource::read)
            .collect()
    }

    /// Flat `offset path offset path ...` list for the merge tool.
    pub fn merge_args(&self) -> Vec<std::ffi::OsString> {
        let mut args = Vec::new();
        for source in self.present() {
            args.push(source.offset_arg().into());
            args.push(source.path.clone().into_os_string());
        }
        args
    }
}
