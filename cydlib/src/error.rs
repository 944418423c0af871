#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ArtifactError {
    /// Required build outputs, by file name.
    MissingInputs(Vec<String>),
}

impl std::error::Error for ArtifactError {}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ArtifactError::MissingInputs(names) => {
                write!(f, "missing required files: {}", names.join(", "))
            }
        }
    }
}

#[derive(Debug)]
pub enum VersionError {
    Read(std::path::PathBuf, std::io::Error),
    NotFound(std::path::PathBuf),
}

impl std::error::Error for VersionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VersionError::Read(_, e) => Some(e),
            VersionError::NotFound(_) => None,
        }
    }
}

impl std::fmt::Display for VersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VersionError::Read(path, e) => {
                write!(f, "could not read version from {}: {}", path.display(), e)
            }
            VersionError::NotFound(path) => {
                write!(f, "no FIRMWARE_VERSION declaration in {}", path.display())
            }
        }
    }
}
