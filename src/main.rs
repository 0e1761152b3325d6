use log::{debug, info};
use soft_rasterizer::core::renderer::Renderer;
use soft_rasterizer::core::work_queue::WorkQueue;
use soft_rasterizer::io::simple_cli::SimpleCli;
use soft_rasterizer::scene::scene_utils::Scene;
use soft_rasterizer::utils::save_utils::save_frame;
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = SimpleCli::process()?;
    settings.validate()?;

    std::fs::create_dir_all(&settings.output_dir)
        .map_err(|e| format!("创建输出目录 '{}' 失败: {}", settings.output_dir, e))?;

    let mut scene = Scene::from_settings(&settings)?;
    let stats = scene.get_scene_stats();
    info!(
        "场景: {} 个对象，{} 个顶点，{} 个三角形，输出 {}x{}，{} 帧",
        stats.object_count,
        stats.vertex_count,
        stats.triangle_count,
        settings.width,
        settings.height,
        settings.frames
    );

    let queue = if settings.workers == 0 {
        WorkQueue::new()?
    } else {
        WorkQueue::with_workers(settings.workers)?
    };
    info!("后台清除线程数: {}", queue.worker_count());

    let mut renderer = Renderer::with_background(Arc::new(queue), settings.background_color()?);

    let start = Instant::now();
    for frame_index in 0..settings.frames {
        let frame_start = Instant::now();
        let frame = renderer.render(&scene.camera, &scene.objects);
        let render_time = frame_start.elapsed();

        save_frame(
            &frame,
            &settings.output_dir,
            &settings.frame_output_name(frame_index),
            settings.save_depth,
        )?;
        renderer.presented();

        let frame_stats = renderer.last_stats();
        debug!(
            "第{}帧: 渲染 {:?}，可见对象 {}/{}",
            frame_index + 1,
            render_time,
            frame_stats.objects_total - frame_stats.objects_culled,
            frame_stats.objects_total
        );

        scene.advance_frame();
    }

    info!(
        "完成 {} 帧，总耗时 {:?}",
        settings.frames,
        start.elapsed()
    );
    Ok(())
}
