pub mod environment;
pub mod image;
pub mod launcher;
pub mod trace;

pub use self::environment::Environment;
pub use self::image::CommandLine;
pub use self::launcher::{launch, LaunchConfig};
