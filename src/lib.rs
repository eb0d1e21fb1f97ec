pub mod builder;
pub mod encoding;
pub mod error;
pub mod keyboard;
pub mod model;
pub mod policy;
pub mod profile;
pub mod repair;
pub mod sim;
pub mod synth;
pub mod timing;

pub use error::{Error, Result};
pub use model::{Event, Key, NamedKey, Sequence};
pub use profile::Profile;
pub use synth::{synthesize, SynthConfig};
