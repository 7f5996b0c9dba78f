pub mod cli;
pub mod core;
pub mod effect;
pub mod loaders;

pub use effect::{Compositor, EffectSettings, FrameParams, PointerFilter, SourceImages};
