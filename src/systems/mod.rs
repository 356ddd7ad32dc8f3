pub mod assets;
pub mod billboard;
pub mod camera;
pub mod geospatial;
pub mod globe;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod overlay;
pub mod pipelines;
pub mod window;
