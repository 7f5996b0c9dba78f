pub mod compositor;
pub mod pointer;
pub mod settings;
pub mod source;

pub use compositor::{displacement, panned_uv, Compositor, FrameParams};
pub use pointer::PointerFilter;
pub use settings::EffectSettings;
pub use source::SourceImages;
