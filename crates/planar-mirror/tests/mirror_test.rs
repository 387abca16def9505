//! Integration tests driving a `MirrorSystem` through the headless host.

use planar_mirror::*;
use proptest::prelude::*;

const MIRROR: &str = "mirror";

fn mirror_material() -> SharedMaterial {
    shared(
        Material::new("mirror glass")
            .with_texture_property("_ReflectionTexLeft")
            .with_texture_property("_ReflectionTexRight"),
    )
}

/// A system with one mirror at the origin facing +Z.
fn scene(config: MirrorSurfaceConfig) -> (MirrorSystem, SharedMaterial) {
    let material = mirror_material();
    let surface = MirrorSurface::new(MIRROR, config)
        .expect("valid config")
        .with_renderer(MeshRenderer::new(vec![material.clone()]));
    let mut system = MirrorSystem::new();
    system.register(surface).expect("register failed");
    (system, material)
}

fn viewer(host: &mut HeadlessHost) -> Camera {
    host.create_camera(CameraKind::Game)
        .looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
}

fn stereo_viewer(host: &mut HeadlessHost) -> Camera {
    let camera = viewer(host);
    let view = camera.view_matrix();
    let projection = camera.projection_matrix();
    camera.with_stereo(StereoMatrices {
        view: [view, view],
        projection: [projection, projection],
    })
}

fn bound(material: &SharedMaterial, property: &str) -> Option<TextureHandle> {
    material.read().expect("material lock").texture(property)
}

#[test]
fn test_reflection_clips_behind_mirror() {
    init_logging();
    let (mut system, material) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::new(8);
    let camera = viewer(&mut host);

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.rendered, 1);

    let submission = host.last_submission().expect("reflection submitted");
    assert!((submission.position - Vec3::new(0.0, 0.0, -5.0)).length() < 0.01);

    // In front of the mirror: seen in the reflection
    assert!(submission.is_visible(Vec3::new(0.0, 0.0, 2.0)));
    // Behind the mirror: removed by the oblique near plane
    assert!(!submission.is_visible(Vec3::new(0.0, 0.0, -2.0)));

    assert!(submission.invert_culling);
    assert!(submission.inside_reflection);
    assert_eq!(submission.pixel_light_count, 0);
    assert_eq!(submission.far, 30.0);
    assert_eq!(submission.culling_mask, LayerMask::ALL);

    assert_eq!(bound(&material, "_ReflectionTexLeft"), submission.target);
    assert_eq!(bound(&material, "_ReflectionTexRight"), None);

    assert!(!ctx.inside_reflection);
    assert!(!ctx.invert_culling);
    assert_eq!(ctx.pixel_light_count, 8);
}

#[test]
fn test_pixel_lights_kept_when_configured() {
    let config = MirrorSurfaceConfig::new().with_disable_pixel_lights(false);
    let (mut system, _) = scene(config);
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::new(8);
    let camera = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(host.last_submission().unwrap().pixel_light_count, 8);
}

#[test]
fn test_layer_mask_reaches_reflection_camera() {
    let mask = LayerMask::NONE.with_layer(0).with_layer(4);
    let (mut system, _) = scene(MirrorSurfaceConfig::new().with_layer_mask(mask));
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let camera = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(host.last_submission().unwrap().culling_mask, mask);
}

#[test]
fn test_guard_blocks_nested_render() {
    let (mut system, material) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    ctx.inside_reflection = true;
    let camera = viewer(&mut host);

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.skipped, 1);
    assert_eq!(host.submission_attempts(), 0);
    assert_eq!(host.created_targets, 0);
    assert_eq!(bound(&material, "_ReflectionTexLeft"), None);
    assert!(system.get(MIRROR).unwrap().cameras().is_empty());
}

#[test]
fn test_resolution_change_reallocates_once() {
    let (mut system, _) = scene(MirrorSurfaceConfig::new().with_texture_size(256));
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let camera = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(host.created_targets, 1);

    let config = MirrorSurfaceConfig::new().with_texture_size(512);
    system.get_mut(MIRROR).unwrap().set_config(config).unwrap();

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(host.created_targets, 2);
    assert_eq!(host.destroyed_targets, 1);
    let target = host.last_submission().unwrap().target.unwrap();
    assert_eq!(host.target(target).unwrap().size, 512);

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(host.created_targets, 2);
    assert_eq!(host.live_targets(), 1);
}

#[test]
fn test_resolution_change_resizes_idle_eye() {
    let (mut system, material) = scene(MirrorSurfaceConfig::new().with_texture_size(256));
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let stereo = stereo_viewer(&mut host);
    let mono = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &stereo, &mut host, &NoTracking);
    assert_eq!(host.live_targets(), 2);

    let config = MirrorSurfaceConfig::new().with_texture_size(512);
    system.get_mut(MIRROR).unwrap().set_config(config).unwrap();

    // Only the left eye renders, the right target follows anyway
    system.on_before_camera_render(&mut ctx, &mono, &mut host, &NoTracking);
    let surface = system.get(MIRROR).unwrap();
    let targets = surface.targets();
    for eye in StereoEye::ALL {
        assert_eq!(targets.get(eye).unwrap().size, 512);
    }
    assert_eq!(host.live_targets(), 2);
    assert_eq!(host.destroyed_targets, 2);

    let right = targets.get(StereoEye::Right).unwrap().handle;
    assert_eq!(host.target(right).unwrap().size, 512);
    assert_eq!(bound(&material, "_ReflectionTexRight"), Some(right));
    assert!(surface.last_render(StereoEye::Right).is_none());
}

#[test]
fn test_right_eye_failure_keeps_left() {
    let (mut system, material) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let camera = stereo_viewer(&mut host);
    host.fail_submission(1);

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.rendered, 1);
    assert_eq!(summary.failed, 0);

    let left = host.submissions[0].target;
    assert!(left.is_some());
    assert_eq!(bound(&material, "_ReflectionTexLeft"), left);
    assert_eq!(bound(&material, "_ReflectionTexRight"), None);
    assert!(!ctx.inside_reflection);
    assert!(!ctx.invert_culling);

    let surface = system.get(MIRROR).unwrap();
    assert!(surface.last_render(StereoEye::Left).is_some());
    assert!(surface.last_render(StereoEye::Right).is_none());

    // The next frame renders both eyes again
    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert!(bound(&material, "_ReflectionTexRight").is_some());
}

#[test]
fn test_left_eye_failure_is_reported() {
    let (mut system, material) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::new(4);
    let camera = stereo_viewer(&mut host);
    host.fail_submission(0);

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.failed, 1);
    assert_eq!(host.submission_attempts(), 1);
    assert_eq!(bound(&material, "_ReflectionTexLeft"), None);
    assert!(!ctx.inside_reflection);
    assert_eq!(ctx.pixel_light_count, 4);
}

#[test]
fn test_stereo_eyes_use_their_own_offsets() {
    let (mut system, _) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let camera = stereo_viewer(&mut host);
    let tracking = vec![
        TrackedNode::new(XrNode::Head, Vec3::new(0.0, 0.0, 0.0)),
        TrackedNode::new(XrNode::LeftEye, Vec3::new(-0.03, 0.0, 0.02)),
        TrackedNode::new(XrNode::RightEye, Vec3::new(0.03, 0.0, 0.02)),
    ];

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &tracking);

    let surface = system.get(MIRROR).unwrap();
    let left = surface.last_render(StereoEye::Left).unwrap();
    let right = surface.last_render(StereoEye::Right).unwrap();
    assert!((left.position.x + 0.03).abs() < 1e-5);
    assert!((right.position.x - 0.03).abs() < 1e-5);
    assert!((left.position.z - right.position.z).abs() < 1e-5);
    assert_ne!(left.texture, right.texture);
    assert_eq!(left.camera_id, right.camera_id);
}

#[test]
fn test_camera_removal_releases_secondary_camera() {
    let (mut system, _) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let first = viewer(&mut host);
    let second = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &first, &mut host, &NoTracking);
    system.on_before_camera_render(&mut ctx, &second, &mut host, &NoTracking);
    assert_eq!(system.get(MIRROR).unwrap().cameras().len(), 2);

    let mirror_camera = host.submissions[0].camera_id;
    assert_eq!(system.notify_camera_removed(first.id, &mut host), 1);
    assert_eq!(host.destroyed_cameras, vec![mirror_camera]);
    assert_eq!(system.notify_camera_removed(first.id, &mut host), 0);
    assert_eq!(system.get(MIRROR).unwrap().cameras().len(), 1);
}

#[test]
fn test_disable_tears_down_and_enable_recovers() {
    let (mut system, _) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let camera = viewer(&mut host);

    system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    system.set_enabled(MIRROR, false, &mut host).unwrap();
    assert_eq!(host.live_targets(), 0);
    assert_eq!(host.destroyed_cameras.len(), 1);

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.skipped, 1);
    assert_eq!(host.submissions.len(), 1);

    system.set_enabled(MIRROR, true, &mut host).unwrap();
    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.rendered, 1);
    assert_eq!(host.created_targets, 2);
}

#[test]
fn test_reflection_cameras_never_trigger_mirrors() {
    let (mut system, _) = scene(MirrorSurfaceConfig::new());
    let mut host = HeadlessHost::new();
    let mut ctx = RenderContext::default();
    let mut camera = viewer(&mut host);
    camera.tag = MIRROR_CAMERA_TAG.to_string();

    let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
    assert_eq!(summary.skipped, 1);
    assert!(host.submissions.is_empty());
}

proptest! {
    #[test]
    fn prop_throttle_renders_once_per_interval(frames in 0u32..6, notifications in 1usize..40) {
        let config = MirrorSurfaceConfig::new().with_frames_needed_to_update(frames);
        let (mut system, _) = scene(config);
        let mut host = HeadlessHost::new();
        let mut ctx = RenderContext::default();
        let camera = viewer(&mut host);

        for _ in 0..notifications {
            system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
        }

        let interval = frames as usize + 1;
        prop_assert_eq!(host.submissions.len(), notifications.div_ceil(interval));
    }
}
