pub mod textures;

pub use textures::load_source_images;
