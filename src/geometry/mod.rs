// geometry/mod.rs
// 导出相机、变换、视锥与剔除相关模块
pub mod camera;
pub mod culling;
pub mod frustum;
pub mod transform;
