pub mod display_context;
pub mod gpu_context;
pub mod pointer_adapter;
pub mod surface_renderer;

pub use display_context::DisplayContext;
pub use gpu_context::GpuContext;
pub use pointer_adapter::PointerAdapter;
pub use surface_renderer::SurfaceRenderer;
