use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{Vec2, Vec3};
use glidecam::physics::sphere::step_sphere;
use glidecam::physics::{GroundSurface, GroundSurfaces, SphereBody, SphereBodyView};
use glidecam::player::{
    apply_friction, clamp_horizontal, Action, InputState, MovementController, OrbitCamera, SnapDirection,
};
use glidecam::settings::{CameraPolicy, CameraSettings, ControlsSettings, Settings};

fn flat_ground(settings: &Settings) -> GroundSurfaces {
    GroundSurfaces(vec![GroundSurface::new(Vec3::ZERO, Vec2::splat(settings.physics.ground_size))])
}

/// Controller tick plus body integration, holding forward and tapping jump.
fn bench_controller_ticks(c: &mut Criterion) {
    let settings = Settings::default();
    let ground = flat_ground(&settings);
    let walking = InputState::with(&[Action::Forward, Action::Right]);
    let jumping = InputState::with(&[Action::Forward, Action::Jump]);

    c.bench_function("controller_many_ticks", |b| {
        b.iter(|| {
            let mut controller =
                MovementController::new(settings.motion, settings.ground_probe).expect("default tuning is valid");
            let mut body = SphereBody::from_settings(&settings.physics);
            let mut position = settings.physics.spawn_point();
            let dt = 1.0f32 / 60.0f32;

            for i in 0..5_000usize {
                let input = if i % 120 == 0 { &jumping } else { &walking };
                let yaw = (i as f32) * 0.001;
                let mut view = SphereBodyView::new(position, &mut body);
                controller.tick(&mut view, &ground, input, &yaw, dt);
                step_sphere(&mut position, &mut body, &ground, &settings.physics, dt);
            }

            black_box((position, controller.state().air_time()));
        })
    });
}

/// Friction then clamp over a spread of velocities.
fn bench_velocity_shaping(c: &mut Criterion) {
    let params = Settings::default().motion;
    c.bench_function("friction_and_clamp", |b| {
        b.iter(|| {
            let mut state: u32 = 0x1234_5678;
            let mut acc = Vec3::ZERO;
            for i in 0..10_000usize {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let x = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 40.0 - 20.0;
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let z = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 40.0 - 20.0;
                let v = apply_friction(black_box(Vec3::new(x, -1.0, z)), &params, i % 2 == 0);
                acc += clamp_horizontal(v, params.max_velocity);
            }
            black_box(acc);
        })
    });
}

/// Snap-orbit requests interleaved with interpolation and placement.
fn bench_camera_snap(c: &mut Criterion) {
    let settings = CameraSettings { policy: CameraPolicy::SnapOrbit, ..Default::default() };
    c.bench_function("camera_snap_orbit", |b| {
        b.iter(|| {
            let mut camera =
                OrbitCamera::new(settings, &ControlsSettings::default()).expect("default camera is valid");
            let mut placed = Vec3::ZERO;
            for i in 0..1_000usize {
                let direction = if (i / 40) % 2 == 0 { SnapDirection::Left } else { SnapDirection::Right };
                camera.request_snap(direction);
                camera.step_snap();
                placed += camera.placement(black_box(Vec3::new(i as f32, 1.0, 0.0)));
            }
            black_box((camera.yaw(), placed));
        })
    });
}

/// Large free-look deltas to exercise angle wrapping.
fn bench_camera_look(c: &mut Criterion) {
    c.bench_function("camera_free_look", |b| {
        b.iter(|| {
            let mut camera = OrbitCamera::new(CameraSettings::default(), &ControlsSettings::default())
                .expect("default camera is valid");
            for i in 0..1_000usize {
                let d = if (i & 1) == 0 { 1000.0 } else { -750.0 };
                camera.apply_look_delta(black_box(d));
            }
            black_box(camera.yaw());
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(200);
    targets =
        bench_controller_ticks,
        bench_velocity_shaping,
        bench_camera_snap,
        bench_camera_look
}
criterion_main!(benches);
