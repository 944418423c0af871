use nom::bytes::complete::take_till1;
use nom::character::complete::{char, multispace0};
use nom::sequence::{delimited, preceded, tuple};
use nom::IResult;

use crate::{BuildContext, VersionError};

/// Identifier the firmware source assigns its version string to.
pub const VERSION_IDENT: &str = "FIRMWARE_VERSION";

/// Stand-in used when no version can be found.
pub const UNKNOWN_VERSION: &str = "UNKNOWN";

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FirmwareVersion(String);

// `= "..."`, with optional whitespace around the `=`
fn assignment(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((multispace0, char('='), multispace0)),
        delimited(char('"'), take_till1(|c| c == '"'), char('"')),
    )(input)
}

impl FirmwareVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_VERSION)
    }

    pub fn is_known(&self) -> bool {
        self.0 != UNKNOWN_VERSION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find the first `FIRMWARE_VERSION = "..."` assignment in source text.
    ///
    /// Declarations without an initializer, like
    /// `extern const char *FIRMWARE_VERSION;`, are skipped. The string
    /// literal must sit on the same line as the identifier.
    pub fn from_source(text: &str) -> Option<Self> {
        for line in text.lines() {
            for (idx, _) in line.match_indices(VERSION_IDENT) {
                if let Ok((_, value)) = assignment(&line[idx + VERSION_IDENT.len()..]) {
                    return Some(Self::new(value));
                }
            }
        }
        None
    }

    /// Read the version from the project's main source file.
    pub fn from_project(ctx: &BuildContext) -> Result<Self, VersionError> {
        let path = ctx.version_source();
        let text =
            std::fs::read_to_string(&path).map_err(|e| VersionError::Read(path.clone(), e))?;
        Self::from_source(&text).ok_or(VersionError::NotFound(path))
    }
}

impl Default for FirmwareVersion {
    fn default() -> Self {
        Self::unknown()
    }
}

impl core::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::ops::Deref for FirmwareVersion {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn version(text: &str) -> Option<String> {
        FirmwareVersion::from_source(text).map(|v| v.as_str().to_owned())
    }

    #[test]
    fn plain_declaration() {
        assert_eq!(
            version("const char *FIRMWARE_VERSION = \"1.4.1\";").as_deref(),
            Some("1.4.1")
        );
    }

    #[test]
    fn trailing_comment_and_spacing() {
        let src = "#include <Arduino.h>\n\
                   \n\
                   const char *FIRMWARE_VERSION=\"2.0.0-rc1\";  // CURRENT VERSION\n";
        assert_eq!(version(src).as_deref(), Some("2.0.0-rc1"));
    }

    #[test]
    fn first_match_wins() {
        let src = "extern const char *FIRMWARE_VERSION;\n\
                   const char *FIRMWARE_VERSION = \"1.0\";\n\
                   const char *FIRMWARE_VERSION = \"2.0\";\n";
        assert_eq!(version(src).as_deref(), Some("1.0"));
    }

    #[test]
    fn missing_declaration() {
        assert_eq!(version("int main() { return 0; }\n"), None);
        assert_eq!(version("extern const char *FIRMWARE_VERSION;\n"), None);
        assert_eq!(version("const char *FIRMWARE_VERSION = \"\";\n"), None);
        assert_eq!(version("const char *FIRMWARE_VERSION = 3;\n"), None);
    }

    #[test]
    fn from_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(dir.path(), dir.path(), "release", "firmware");

        assert!(matches!(
            FirmwareVersion::from_project(&ctx),
            Err(VersionError::Read(..))
        ));

        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(ctx.version_source(), "void setup() {}\n").unwrap();
        assert!(matches!(
            FirmwareVersion::from_project(&ctx),
            Err(VersionError::NotFound(_))
        ));

        std::fs::write(
            ctx.version_source(),
            "const char *FIRMWARE_VERSION = \"1.4.1\";  // CURRENT VERSION\n",
        )
        .unwrap();
        let v = FirmwareVersion::from_project(&ctx).unwrap();
        assert_eq!(v.as_str(), "1.4.1");
        assert!(v.is_known());
        assert!(!FirmwareVersion::unknown().is_known());
    }
}
