//! Two mirrors rendered through the headless host.
//!
//! Run with: RUST_LOG=debug cargo run --example demo

use std::f32::consts::{FRAC_PI_2, TAU};

use planar_mirror::*;

const FLOOR_CONFIG: &str = r#"{
    "projection_direction": [0.0, 1.0, 0.0],
    "texture_size": 512,
    "frames_needed_to_update": 2
}"#;

fn mirror(name: &str, config: MirrorSurfaceConfig, transform: Transform) -> Result<MirrorSurface> {
    let material = shared(
        Material::new(format!("{name} glass"))
            .with_texture_property("_ReflectionTexLeft")
            .with_texture_property("_ReflectionTexRight"),
    );
    Ok(MirrorSurface::new(name, config)?
        .with_transform(transform)
        .with_renderer(MeshRenderer::new(vec![material])))
}

fn main() -> Result<()> {
    init_logging();

    let mut system = MirrorSystem::new();

    // Floor mirror, updated every third frame
    let floor_config = MirrorSurfaceConfig::from_json_str(FLOOR_CONFIG)?;
    system.register(mirror("floor", floor_config, Transform::identity())?)?;

    // Wall mirror at x = -3 facing +X
    let wall_transform = Transform::from_translation_rotation(
        Vec3::new(-3.0, 1.0, 0.0),
        Quat::from_rotation_y(FRAC_PI_2),
    );
    system.register(mirror("wall", MirrorSurfaceConfig::new(), wall_transform)?)?;

    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let mut camera = host.create_camera(CameraKind::Game);

    for frame in 0..8 {
        ctx.begin_frame();
        let angle = TAU * frame as f32 / 8.0;
        let eye = Vec3::new(4.0 * angle.cos(), 2.0, 4.0 * angle.sin());
        camera.transform = Transform::looking_at(eye, Vec3::ZERO, Vec3::Y);

        let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
        println!(
            "frame {}: rendered {}, skipped {}, failed {}",
            ctx.frame, summary.rendered, summary.skipped, summary.failed
        );
    }

    for surface in system.iter() {
        if let Some(render) = surface.last_render(StereoEye::Left) {
            println!(
                "{}: {} from {:.2?} (oblique: {})",
                surface.name(),
                render.texture,
                render.position,
                render.oblique
            );
        }
    }

    system.release_all(&mut host);
    println!(
        "{} submissions, {} targets created, {} still live",
        host.submissions.len(),
        host.created_targets,
        host.live_targets()
    );
    Ok(())
}
