/// Which flavor of build produced the artifacts.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub enum Variant {
    #[default]
    Release,
    Debug,
}

impl Variant {
    /// Any environment with "debug" in its name, in any case, is a debug build.
    pub fn from_env_name(name: &str) -> Self {
        if name.to_lowercase().contains("debug") {
            Variant::Debug
        } else {
            Variant::Release
        }
    }

    /// Filename suffix that keeps debug artifacts apart from release ones.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Variant::Release => "",
            Variant::Debug => "_debug",
        }
    }
}

impl core::fmt::Display for Variant {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Variant::Release => write!(f, "release"),
            Variant::Debug => write!(f, "debug"),
        }
    }
}
