pub mod mesh;
pub mod scene_object;
pub mod scene_utils;
