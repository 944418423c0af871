use crate::{FirmwareVersion, Variant};

/// Product name used in artifact file names.
pub const DEFAULT_PRODUCT: &str = "CYD_DataDisplay";

/// The two kinds of release artifact.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ArtifactKind {
    /// Bootloader, partition table, boot stub and application in one image.
    Full,
    /// The application binary alone, as applied by the on-device updater.
    Ota,
}

impl ArtifactKind {
    pub const fn tag(&self) -> &'static str {
        match self {
            ArtifactKind::Full => "FULL",
            ArtifactKind::Ota => "OTA",
        }
    }
}

/// File name of a published artifact.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArtifactName {
    pub product: String,
    pub version: FirmwareVersion,
    pub variant: Variant,
    pub kind: ArtifactKind,
}

impl ArtifactName {
    pub fn new(
        product: impl Into<String>,
        version: FirmwareVersion,
        variant: Variant,
        kind: ArtifactKind,
    ) -> Self {
        Self {
            product: product.into(),
            version,
            variant,
            kind,
        }
    }

    /// Does `file_name` belong to an older build of this same artifact?
    ///
    /// This is the glob `<product>_*<suffix>_<KIND>.bin`. The release suffix
    /// is empty, so a release name also claims debug artifacts of its kind.
    pub fn is_stale(&self, file_name: &str) -> bool {
        let prefix = format!("{}_", self.product);
        let tail = format!("{}_{}.bin", self.variant.suffix(), self.kind.tag());

        file_name.len() >= prefix.len() + tail.len()
            && file_name.starts_with(&prefix)
            && file_name.ends_with(&tail)
    }
}

impl core::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{}_v{}{}_{}.bin",
            self.product,
            self.version,
            self.variant.suffix(),
            self.kind.tag()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn name(variant: Variant, kind: ArtifactKind) -> ArtifactName {
        ArtifactName::new(
            DEFAULT_PRODUCT,
            FirmwareVersion::new("1.4.1"),
            variant,
            kind,
        )
    }

    #[test]
    fn file_names() {
        let cases = [
            (Variant::Release, ArtifactKind::Full, "CYD_DataDisplay_v1.4.1_FULL.bin"),
            (Variant::Release, ArtifactKind::Ota, "CYD_DataDisplay_v1.4.1_OTA.bin"),
            (Variant::Debug, ArtifactKind::Full, "CYD_DataDisplay_v1.4.1_debug_FULL.bin"),
            (Variant::Debug, ArtifactKind::Ota, "CYD_DataDisplay_v1.4.1_debug_OTA.bin"),
        ];
        for (variant, kind, expected) in cases {
            assert_eq!(name(variant, kind).to_string(), expected);
        }

        let unknown = ArtifactName::new(
            "X",
            FirmwareVersion::unknown(),
            Variant::Release,
            ArtifactKind::Ota,
        );
        assert_eq!(unknown.to_string(), "X_vUNKNOWN_OTA.bin");
    }

    #[test]
    fn stale_release() {
        let full = name(Variant::Release, ArtifactKind::Full);
        assert!(full.is_stale("CYD_DataDisplay_v1.4.1_FULL.bin"));
        assert!(full.is_stale("CYD_DataDisplay_v1.3.0_FULL.bin"));
        assert!(full.is_stale("CYD_DataDisplay_vUNKNOWN_FULL.bin"));
        assert!(full.is_stale("CYD_DataDisplay_v1.3.0_debug_FULL.bin"));
        assert!(!full.is_stale("CYD_DataDisplay_v1.3.0_OTA.bin"));
        assert!(!full.is_stale("Other_v1.3.0_FULL.bin"));
        assert!(!full.is_stale("CYD_DataDisplay_FULL.bin"));
    }

    #[test]
    fn stale_debug() {
        let ota = name(Variant::Debug, ArtifactKind::Ota);
        assert!(ota.is_stale("CYD_DataDisplay_v1.0_debug_OTA.bin"));
        assert!(ota.is_stale("CYD_DataDisplay__debug_OTA.bin"));
        assert!(!ota.is_stale("CYD_DataDisplay_v1.0_OTA.bin"));
        assert!(!ota.is_stale("CYD_DataDisplay_v1.0_debug_FULL.bin"));
    }
}
