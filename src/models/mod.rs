pub mod analysis;
pub mod bar;
