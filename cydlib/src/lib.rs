mod artifact;
pub use artifact::*;

mod context;
pub use context::*;

mod error;
pub use error::*;

pub mod layout;
pub use layout::FlashLayout;

pub mod stitch;
pub use stitch::{stitch, FlashImage, Segment};

mod variant;
pub use variant::*;

mod version;
pub use version::*;
