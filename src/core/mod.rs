pub mod buffer_clear;
pub mod clear_token;
pub mod frame_buffer;
pub mod rasterizer;
pub mod renderer;
pub mod work_queue;
