mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use bmfr::*;
use glam::{uvec2, vec2, vec3, UVec2, Vec3, Vec4};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use self::common::*;

const SIZE: UVec2 = UVec2::new(64, 48);

/// Flat wall facing the camera, lit uniformly; `radiance` gets the noise.
fn wall(pos: UVec2, radiance: Vec3) -> Pixel {
    Pixel {
        radiance,
        position: vec3(pos.x as f32 * 0.01, pos.y as f32 * 0.01, 0.0),
        ..Default::default()
    }
}

#[test]
fn missing_binding() {
    let scene = Scene::new(SIZE);
    let mut config = scene.config();

    config.motion = None;

    assert_eq!(
        Some(DenoiserError::MissingBinding(Binding::Motion)),
        Denoiser::new(config).err()
    );
}

#[test]
fn label() {
    assert_eq!("BMFR Denoiser", Scene::new(SIZE).denoiser().label());
}

#[test]
fn history_lifecycle() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.draw(|pos| wall(pos, Vec3::splat(0.5)));

    assert!(!denoiser.is_history_valid());

    scene.render(&mut denoiser, 0);

    assert!(denoiser.is_history_valid());

    denoiser.ignore_history_next_frame();

    assert!(!denoiser.is_history_valid());

    scene.render(&mut denoiser, 1);

    assert!(denoiser.is_history_valid());

    // ---

    let size = uvec2(100, 20);

    scene.resize(size);
    scene.draw(|pos| wall(pos, Vec3::splat(0.5)));
    denoiser.resize(size);

    assert!(!denoiser.is_history_valid());
    assert_eq!(size, denoiser.size());
    assert_eq!(uvec2(5, 2), denoiser.dispatch_grid().size());

    scene.render(&mut denoiser, 2);

    assert!(denoiser.is_history_valid());
    assert_eq!(size, denoiser.filter_image().size());
}

#[test]
#[should_panic(expected = "did you forget to call `resize()`?")]
fn render_with_mismatched_size() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.resize(uvec2(32, 32));
    scene.render(&mut denoiser, 0);
}

#[test]
fn resize_to_empty_size_is_ignored() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.draw(|pos| wall(pos, Vec3::splat(0.5)));
    scene.render(&mut denoiser, 0);

    for size in [uvec2(0, 0), uvec2(0, 48), uvec2(64, 0)] {
        denoiser.resize(size);

        assert_eq!(SIZE, denoiser.size());
        assert_eq!(SIZE, denoiser.filter_image().size());
        assert!(denoiser.is_history_valid());
    }

    scene.render(&mut denoiser, 1);

    assert!(denoiser.is_history_valid());
    assert_relative_eq!(
        0.5,
        scene.read_output(uvec2(10, 10)).x,
        epsilon = 0.001
    );
}

#[test]
fn overflowing_radiance_passes_through() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.draw(|pos| wall(pos, Vec3::splat(0.5)));
    scene.render(&mut denoiser, 0);

    let stats = denoiser.regression_stats();

    assert!(stats.solved > 0);
    assert_eq!(0, stats.pass_through);

    // ---

    denoiser.ignore_history_next_frame();
    scene.draw(|pos| wall(pos, Vec3::splat(f32::MAX)));
    scene.render(&mut denoiser, 1);

    let stats = denoiser.regression_stats();

    assert_eq!(0, stats.solved);
    assert!(stats.pass_through > 0);

    assert_eq!(
        denoiser.dispatch_grid().len(),
        stats.empty + stats.pass_through
    );

    assert!(denoiser
        .filter_image()
        .data()
        .iter()
        .all(|texel| texel.is_finite()));

    assert!(scene.output().data().iter().all(|texel| texel.is_finite()));
}

#[test]
fn destroy() {
    let scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    denoiser.destroy();
    denoiser.resize(uvec2(32, 32));
    denoiser.ignore_history_next_frame();
    denoiser.destroy();

    assert!(denoiser.is_destroyed());
    assert!(!denoiser.is_history_valid());
}

#[test]
#[should_panic(expected = "denoiser has been destroyed")]
fn render_after_destroy() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    denoiser.destroy();
    scene.render(&mut denoiser, 0);
}

#[test]
fn accumulation_without_history_is_raw_input() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();
    let mut rng = StdRng::seed_from_u64(1234);

    for frame in 0..3 {
        scene.draw(|pos| wall(pos, Vec3::splat(rng.gen())));

        if frame == 2 {
            denoiser.ignore_history_next_frame();
        }

        scene.render(&mut denoiser, frame);
    }

    let accumulation = denoiser.accumulation(Frame::new(2).write_slot());
    let primary = scene.primary.read();

    let texels = accumulation.data().iter().zip(primary.data());

    for (accumulated, sample) in texels {
        assert_eq!(sample.truncate(), accumulated.truncate());
        assert_eq!(1.0, accumulated.w);
    }

    assert!(denoiser.accepts().data().iter().all(|mask| *mask == 0));
}

#[test]
fn rejected_history_outputs_filtered_image() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();
    let mut rng = StdRng::seed_from_u64(1234);

    for frame in 0..4 {
        // Teleport the wall every frame, so that nothing can be reprojected
        let depth = frame as f32;

        scene.draw(|pos| {
            let mut pixel = wall(pos, Vec3::splat(rng.gen()));

            pixel.position.z = depth;
            pixel
        });

        scene.render(&mut denoiser, frame);

        let filter = denoiser.filter_image();
        let output = scene.output();

        for (filtered, output) in filter.data().iter().zip(output.data()) {
            assert_eq!(filtered.truncate(), output.truncate());
        }
    }
}

#[test]
fn converges_under_zero_motion() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();
    let mut rng = StdRng::seed_from_u64(1234);

    let expected = Texture::from_fn("expected", SIZE, |_| Vec4::splat(0.5));
    let mut errors = Vec::new();

    for frame in 0..32 {
        scene.draw(|pos| wall(pos, Vec3::splat(rng.gen())));
        scene.render(&mut denoiser, frame);

        errors.push(mean_abs_diff(&scene.output(), &expected));
    }

    let noise = mean_abs_diff(&scene.primary.read(), &expected);

    assert!(noise > 0.2, "noise = {noise}");
    assert!(errors[31] < 0.03, "errors = {errors:?}");
    assert!(errors[31] < errors[0], "errors = {errors:?}");
}

#[test]
fn constant_input_is_stable() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.draw(|pos| wall(pos, Vec3::splat(0.3)));

    for frame in 0..6 {
        scene.render(&mut denoiser, frame);

        let accumulation =
            denoiser.accumulation(Frame::new(frame).write_slot());

        for texel in accumulation.data() {
            assert_relative_eq!(0.3, texel.x, epsilon = 0.00001);
            assert_eq!((frame + 1) as f32, texel.w);
        }

        for texel in scene.output().data() {
            assert_relative_eq!(0.3, texel.x, epsilon = 0.001);
        }
    }
}

#[test]
fn accumulation_follows_motion() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    // Camera pans right by one pixel per frame, so the wall moves left
    for frame in 0..5 {
        scene.draw(|pos| {
            let world = pos.x + frame;

            Pixel {
                radiance: Vec3::splat(frame as f32),
                position: vec3(world as f32, pos.y as f32, 0.0),
                motion: vec2(-1.0 / SIZE.x as f32, 0.0),
                ..Default::default()
            }
        });

        scene.render(&mut denoiser, frame);
    }

    let accumulation = denoiser.accumulation(Frame::new(4).write_slot());

    for y in 0..SIZE.y {
        for x in 0..(SIZE.x - 4) {
            let texel = accumulation.read(uvec2(x, y));

            assert_eq!(5.0, texel.w, "x={x}, y={y}");

            // Mean of 0, 1, 2, 3 and 4
            assert_relative_eq!(2.0, texel.x, epsilon = 0.0001);
        }

        assert_eq!(1.0, accumulation.read(uvec2(SIZE.x - 1, y)).w);
    }
}

#[test]
fn no_bleeding_across_depth_discontinuity() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    let is_near = |pos: UVec2| pos.x < SIZE.x / 2;

    scene.draw(|pos| {
        let mut pixel = wall(pos, Vec3::ZERO);

        if is_near(pos) {
            pixel.radiance = Vec3::ONE;
        } else {
            pixel.position.z = 100.0;
        }

        pixel
    });

    scene.render(&mut denoiser, 0);

    for y in 0..SIZE.y {
        for x in 0..SIZE.x {
            let pos = uvec2(x, y);
            let expected = if is_near(pos) { 1.0 } else { 0.0 };
            let actual = scene.read_output(pos);

            assert!(
                (actual.x - expected).abs() < 0.01,
                "pos={pos}, actual={actual}"
            );
        }
    }
}

#[test]
fn debug_modes_dont_affect_state() {
    let mut scene_a = Scene::new(SIZE);
    let mut scene_b = Scene::new(SIZE);
    let mut denoiser_a = scene_a.denoiser();
    let mut denoiser_b = scene_b.denoiser();
    let mut rng = StdRng::seed_from_u64(1234);

    for (frame, mode) in DebugMode::ALL.into_iter().enumerate() {
        let radiance: Vec<f32> =
            (0..(SIZE.x * SIZE.y)).map(|_| rng.gen()).collect();

        for scene in [&scene_a, &scene_b] {
            scene.draw(|pos| {
                let idx = (pos.y * SIZE.x + pos.x) as usize;

                wall(pos, Vec3::splat(radiance[idx]))
            });
        }

        denoiser_b.set_debug_mode(mode);

        scene_a.render(&mut denoiser_a, frame as u32);
        scene_b.render(&mut denoiser_b, frame as u32);

        for slot in 0..2 {
            assert_eq!(
                denoiser_a.accumulation(slot).data(),
                denoiser_b.accumulation(slot).data()
            );

            assert_eq!(
                denoiser_a.filtered_history(slot).data(),
                denoiser_b.filtered_history(slot).data()
            );
        }

        assert_eq!(denoiser_a.accepts().data(), denoiser_b.accepts().data());

        if mode == DebugMode::None {
            assert_eq!(scene_a.output().data(), scene_b.output().data());
        }
    }
}

#[test]
fn debug_mode_routes_stage_output() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    scene.draw(|pos| wall(pos, Vec3::splat(0.25)));

    denoiser.set_debug_mode(DebugMode::PreprocessOutput);
    scene.render(&mut denoiser, 0);

    assert_eq!(DebugMode::PreprocessOutput, denoiser.debug_mode());

    assert!(scene
        .output()
        .data()
        .iter()
        .all(|texel| *texel == vec3(0.25, 0.25, 0.25).extend(1.0)));

    // History is still invalid for the first frame, so nothing is accepted
    denoiser.ignore_history_next_frame();
    denoiser.set_debug_mode(DebugMode::PreprocessAccepts);
    scene.render(&mut denoiser, 1);

    assert!(scene
        .output()
        .data()
        .iter()
        .all(|texel| *texel == Vec4::new(1.0, 0.0, 0.0, 1.0)));

    denoiser.set_debug_mode(DebugMode::PostprocessAccepts);
    scene.render(&mut denoiser, 2);

    assert_eq!(Vec4::ONE, scene.read_output(uvec2(10, 10)));
}

#[test]
fn command_stream() {
    let mut scene = Scene::new(SIZE);
    let mut denoiser = scene.denoiser();

    let encoder = scene.render(&mut denoiser, 0);

    assert_eq!(
        vec![
            "bmfr_preprocess_pass",
            "bmfr_regression_pass",
            "bmfr_regression_resolve_pass",
            "bmfr_postprocess_pass",
        ],
        encoder.dispatches().collect::<Vec<_>>()
    );

    assert_eq!(0, encoder.timestamps().count());

    let accumulation_barriers: Vec<_> = encoder
        .barriers()
        .filter(|barrier| barrier.resource == "bmfr_accumulation")
        .map(|barrier| barrier.dst)
        .collect();

    assert_eq!(vec![Access::ReadWrite, Access::Read], accumulation_barriers);

    let copies: Vec<_> = encoder
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::Copy { src, dst } => Some((src.as_str(), dst.as_str())),
            _ => None,
        })
        .collect();

    assert_eq!(
        vec![
            ("position", "bmfr_history_position"),
            ("normal", "bmfr_history_normal"),
        ],
        copies
    );

    let Some(Command::Dispatch { params, groups, .. }) = encoder
        .commands()
        .iter()
        .find(|command| matches!(command, Command::Dispatch { .. }))
    else {
        panic!("no dispatches recorded");
    };

    let params: gpu::PreprocessPassParams =
        bytemuck::pod_read_unaligned(params);

    assert_eq!(uvec2(4, 3), groups.truncate());
    assert!(!params.history_enabled());
    assert_eq!(0.15, params.max_position_difference);
}

#[derive(Clone, Default)]
struct RecordingBenchmark {
    labels: Arc<Mutex<Vec<String>>>,
}

impl Benchmark for RecordingBenchmark {
    fn begin(&mut self, frame: Frame) {
        self.labels.lock().push(format!("begin {}", frame.get()));
    }

    fn timestamp(&mut self, _: Frame, label: &'static str) {
        self.labels.lock().push(label.into());
    }

    fn end(&mut self, frame: Frame) {
        self.labels.lock().push(format!("end {}", frame.get()));
    }
}

#[test]
fn benchmark() {
    let mut scene = Scene::new(SIZE);
    let benchmark = RecordingBenchmark::default();

    let mut denoiser = Denoiser::new(DenoiserConfig {
        benchmark: Some(Box::new(benchmark.clone())),
        ..scene.config()
    })
    .unwrap();

    let encoder = scene.render(&mut denoiser, 7);

    assert_eq!(
        vec!["begin 7", "PreProcess", "Regression", "PostProcess", "end 7"],
        *benchmark.labels.lock()
    );

    assert_eq!(
        TIMESTAMPS.to_vec(),
        encoder.timestamps().collect::<Vec<_>>()
    );
}
