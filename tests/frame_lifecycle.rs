use nalgebra::{Point3, Vector3};
use soft_rasterizer::core::buffer_clear;
use soft_rasterizer::core::frame_buffer::{Color32, FAR_DEPTH};
use soft_rasterizer::core::renderer::{FrameView, Renderer};
use soft_rasterizer::core::work_queue::WorkQueue;
use soft_rasterizer::geometry::camera::Camera;
use soft_rasterizer::scene::mesh::Mesh;
use soft_rasterizer::scene::scene_object::{SceneObject, Transformable};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

type Pixel = (usize, usize);

/// 正交相机，世界坐标与像素一一对应：像素 = (x + width/2, height/2 - y)
fn pixel_camera(width: usize, height: usize) -> Camera {
    Camera::new_orthographic(
        Point3::new(0.0, 0.0, 5.0),
        Point3::origin(),
        Vector3::y(),
        height as f32,
        width,
        height,
        0.1,
        10.0,
    )
}

fn perspective_camera() -> Camera {
    Camera::new_perspective(
        Point3::new(0.0, 0.0, 5.0),
        Point3::origin(),
        Vector3::y(),
        60.0,
        64,
        64,
        0.1,
        100.0,
    )
}

/// 16x8 画面上屏幕坐标为 (2,2) (4,5) (6,2) 的三角形
fn screen_triangle(color: Color32) -> SceneObject {
    let mesh = Mesh::new(
        "screen-triangle",
        vec![
            Point3::new(-6.0, 2.0, 0.0),
            Point3::new(-4.0, -1.0, 0.0),
            Point3::new(-2.0, 2.0, 0.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    SceneObject::new(Arc::new(mesh), color)
}

fn expected_triangle_pixels(shift_x: usize) -> BTreeSet<Pixel> {
    [(2, 2), (3, 2), (4, 2), (5, 2), (3, 3), (4, 3)]
        .into_iter()
        .map(|(x, y)| (x + shift_x, y))
        .collect()
}

fn drawn(frame: &FrameView<'_>, background: Color32) -> BTreeSet<Pixel> {
    (0..frame.height)
        .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.color_at(x, y) != background)
        .collect()
}

fn assert_untouched_outside(frame: &FrameView<'_>, drawn: &BTreeSet<Pixel>, background: Color32) {
    for y in 0..frame.height {
        for x in 0..frame.width {
            if !drawn.contains(&(x, y)) {
                assert_eq!(frame.color_at(x, y), background, "color at ({x}, {y})");
                assert_eq!(frame.depth_at(x, y), FAR_DEPTH, "depth at ({x}, {y})");
            }
        }
    }
}

fn renderer(workers: usize) -> Renderer {
    Renderer::new(Arc::new(WorkQueue::with_workers(workers).unwrap()))
}

#[test]
fn end_to_end_single_triangle() {
    let mut renderer = renderer(2);
    let camera = pixel_camera(16, 8);
    let objects = [screen_triangle(Color32::RED)];

    let frame = renderer.render(&camera, &objects);
    assert_eq!((frame.width, frame.height), (16, 8));
    assert_eq!(frame.color.len(), 128);
    assert_eq!(frame.depth.len(), 128);

    let pixels = drawn(&frame, Color32::TRANSPARENT);
    assert_eq!(pixels, expected_triangle_pixels(0));
    for &(x, y) in &pixels {
        assert_eq!(frame.color_at(x, y), Color32::RED);
        let depth = frame.depth_at(x, y);
        assert!(depth > -1.0 && depth < 0.0, "depth {depth}");
    }
    assert_untouched_outside(&frame, &pixels, Color32::TRANSPARENT);

    let stats = renderer.last_stats();
    assert_eq!(stats.objects_total, 1);
    assert_eq!(stats.objects_culled, 0);
    assert_eq!(stats.triangles_submitted, 1);
}

#[test]
fn presented_buffers_come_back_cleared() {
    let mut renderer = renderer(2);
    let camera = pixel_camera(16, 8);
    let mut objects = [screen_triangle(Color32::RED)];

    let first = renderer.render(&camera, &objects);
    assert_eq!(drawn(&first, Color32::TRANSPARENT), expected_triangle_pixels(0));
    renderer.presented();

    objects[0].translate(&Vector3::new(8.0, 0.0, 0.0));
    let second = renderer.render(&camera, &objects);
    let pixels = drawn(&second, Color32::TRANSPARENT);
    assert_eq!(pixels, expected_triangle_pixels(8));
    assert_untouched_outside(&second, &pixels, Color32::TRANSPARENT);
    assert_eq!(renderer.pending_clears(), 0);
}

#[test]
fn rendering_again_without_present_clears_synchronously() {
    let mut renderer = renderer(1);
    let camera = pixel_camera(16, 8);
    let mut objects = [screen_triangle(Color32::RED)];

    renderer.render(&camera, &objects);
    objects[0].translate(&Vector3::new(8.0, 0.0, 0.0));
    let frame = renderer.render(&camera, &objects);

    let pixels = drawn(&frame, Color32::TRANSPARENT);
    assert_eq!(pixels, expected_triangle_pixels(8));
    assert_untouched_outside(&frame, &pixels, Color32::TRANSPARENT);
}

#[test]
fn resize_reallocates_buffers() {
    let mut renderer = renderer(2);
    let mut camera = pixel_camera(16, 8);
    let objects = [screen_triangle(Color32::RED)];

    renderer.render(&camera, &objects);
    renderer.presented();

    camera.set_viewport(8, 4);
    let small = renderer.render(&camera, &objects);
    assert_eq!((small.width, small.height), (8, 4));
    assert_eq!(small.color.len(), 32);
    assert_eq!(small.depth.len(), 32);

    // 未 presented 就再次改变分辨率
    camera.set_viewport(16, 8);
    let frame = renderer.render(&camera, &objects);
    assert_eq!((frame.width, frame.height), (16, 8));
    let pixels = drawn(&frame, Color32::TRANSPARENT);
    assert_eq!(pixels, expected_triangle_pixels(0));
    assert_untouched_outside(&frame, &pixels, Color32::TRANSPARENT);
}

/// 在唯一的工作线程上排入一个阻塞任务，`delay` 之后由另一个线程放行
fn block_worker(
    queue: &WorkQueue,
    delay: Duration,
) -> (Arc<AtomicBool>, thread::JoinHandle<()>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    queue.enqueue(move || {
        let _ = release_rx.recv();
    });
    let released = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&released);
    let releaser = thread::spawn(move || {
        thread::sleep(delay);
        flag.store(true, Ordering::SeqCst);
        let _ = release_tx.send(());
    });
    (released, releaser)
}

#[test]
fn same_size_waits_for_clears_but_resize_does_not() {
    let queue = Arc::new(WorkQueue::with_workers(1).unwrap());
    let mut renderer = Renderer::new(Arc::clone(&queue));
    let mut camera = pixel_camera(16, 8);
    let objects = [screen_triangle(Color32::RED)];

    renderer.render(&camera, &objects);
    let (released, releaser) = block_worker(&queue, Duration::from_millis(500));
    renderer.presented();
    assert_eq!(renderer.pending_clears(), 2);

    // 清除任务排在阻塞任务之后，分辨率变化时不能等它们
    camera.set_viewport(8, 4);
    let small = renderer.render(&camera, &objects);
    assert_eq!((small.width, small.height), (8, 4));
    let small_color = small.color.as_ptr();
    let small_depth = small.depth.as_ptr();
    assert!(!released.load(Ordering::SeqCst), "resize waited for stale clears");
    assert_eq!(renderer.pending_clears(), 0);
    releaser.join().unwrap();

    // 分辨率不变时必须等到两个清除任务完成，并取回同一对缓冲区
    let (released, releaser) = block_worker(&queue, Duration::from_millis(200));
    renderer.presented();
    let frame = renderer.render(&camera, &objects);
    assert!(released.load(Ordering::SeqCst), "render started before clears finished");
    assert_eq!(frame.color.as_ptr(), small_color);
    assert_eq!(frame.depth.as_ptr(), small_depth);
    assert_eq!((frame.width, frame.height), (8, 4));
    assert_eq!(renderer.pending_clears(), 0);
    releaser.join().unwrap();
}

#[test]
fn background_color_is_used_for_every_clear() {
    let queue = Arc::new(WorkQueue::with_workers(2).unwrap());
    let mut renderer = Renderer::with_background(queue, Color32::BLUE);
    assert_eq!(renderer.background(), Color32::BLUE);
    let camera = pixel_camera(16, 8);
    let mut objects = [screen_triangle(Color32::RED)];

    for frame_index in 0..3 {
        let frame = renderer.render(&camera, &objects);
        let pixels = drawn(&frame, Color32::BLUE);
        assert_eq!(pixels, expected_triangle_pixels(frame_index * 4));
        assert_untouched_outside(&frame, &pixels, Color32::BLUE);
        renderer.presented();
        objects[0].translate(&Vector3::new(4.0, 0.0, 0.0));
    }
}

#[test]
fn many_frames_with_background_clearing() {
    let mut renderer = renderer(4);
    let camera = pixel_camera(16, 8);
    let mut objects = [screen_triangle(Color32::GREEN)];

    for frame_index in 0..60 {
        let shift = frame_index % 9;
        objects[0].set_position(Vector3::new(shift as f32, 0.0, 0.0));
        let frame = renderer.render(&camera, &objects);
        assert_eq!(
            drawn(&frame, Color32::TRANSPARENT),
            expected_triangle_pixels(shift),
            "frame {frame_index}"
        );
        renderer.presented();
    }
}

#[test]
fn objects_outside_frustum_submit_nothing() {
    let mut renderer = renderer(1);
    let camera = pixel_camera(16, 8);
    let mut beside = screen_triangle(Color32::RED);
    beside.set_position(Vector3::new(100.0, 0.0, 0.0));
    let mut behind = screen_triangle(Color32::RED);
    behind.set_position(Vector3::new(0.0, 0.0, 50.0));

    let frame = renderer.render(&camera, &[beside.clone(), behind]);
    assert!(drawn(&frame, Color32::TRANSPARENT).is_empty());
    assert!(frame.depth.iter().all(|&d| d == FAR_DEPTH));

    let stats = renderer.last_stats();
    assert_eq!(stats.objects_culled, 2);
    assert_eq!(stats.triangles_submitted, 0);
    assert_eq!(stats.object_visible, vec![false, false]);

    let visible = screen_triangle(Color32::RED);
    renderer.render(&camera, &[visible.clone(), beside, visible]);
    assert_eq!(renderer.last_stats().object_visible, vec![true, false, true]);
    assert_eq!(renderer.last_stats().triangles_submitted, 2);
}

#[test]
fn only_front_faces_of_cube_are_drawn() {
    let mut renderer = renderer(1);
    let camera = perspective_camera();
    let cube = SceneObject::new(Arc::new(Mesh::cube()), Color32::GREEN);

    let frame = renderer.render(&camera, &[cube]);
    assert_eq!(frame.color_at(32, 32), Color32::GREEN);
    assert!(frame.depth_at(32, 32) < FAR_DEPTH);

    let stats = renderer.last_stats();
    assert_eq!(stats.triangles_submitted, 2);
    assert_eq!(stats.triangles_backfacing, 10);
}

#[test]
fn negative_scale_keeps_outward_faces_visible() {
    let mut renderer = renderer(1);
    let camera = perspective_camera();
    let mirrored = SceneObject::new(Arc::new(Mesh::cube()), Color32::GREEN)
        .with_scale(Vector3::new(-1.0, 1.0, 1.0));

    let frame = renderer.render(&camera, &[mirrored]);
    assert_eq!(frame.color_at(32, 32), Color32::GREEN);
    assert_eq!(renderer.last_stats().triangles_submitted, 2);
    assert_eq!(renderer.last_stats().triangles_backfacing, 10);
}

#[test]
fn quad_facing_away_is_culled() {
    let mut renderer = renderer(1);
    let camera = perspective_camera();
    let turned = SceneObject::new(Arc::new(Mesh::quad()), Color32::RED)
        .with_rotation_degrees(Vector3::new(0.0, 180.0, 0.0));

    let frame = renderer.render(&camera, &[turned]);
    assert!(drawn(&frame, Color32::TRANSPARENT).is_empty());
    assert_eq!(renderer.last_stats().triangles_backfacing, 2);
}

#[test]
fn triangle_crossing_near_plane_is_rejected_whole() {
    let mut renderer = renderer(1);
    let camera = perspective_camera();
    let mesh = Mesh::new(
        "sliver",
        vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 10.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let object = SceneObject::new(Arc::new(mesh), Color32::RED);

    let frame = renderer.render(&camera, &[object]);
    assert!(drawn(&frame, Color32::TRANSPARENT).is_empty());

    let stats = renderer.last_stats();
    assert_eq!(stats.object_visible, vec![true]);
    assert_eq!(stats.triangles_depth_rejected, 1);
    assert_eq!(stats.triangles_submitted, 0);
}

#[test]
fn buffer_clear_handles_lengths_around_seed_size() {
    for len in [0, 1, 2, 63, 127, 128, 129, 1000, 4097] {
        let mut colors = vec![Color32::RED; len];
        let mut depths = vec![0.25f32; len];
        buffer_clear::fill(&mut colors, Color32::TRANSPARENT);
        buffer_clear::fill(&mut depths, FAR_DEPTH);
        assert!(colors.iter().all(|&c| c == Color32::TRANSPARENT), "len {len}");
        assert!(depths.iter().all(|&d| d == FAR_DEPTH), "len {len}");
    }
}
