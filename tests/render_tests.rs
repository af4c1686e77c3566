//! End-to-End Render Tests
//!
//! Renders the built-in test scene, and variants of it with point lights,
//! spot lights and shadow casters, headlessly and reads the tone-mapped
//! output back. GPU tests are skipped when no adapter is available.

use glam::Vec3;

use umbra::renderer::OFFSCREEN_FORMAT;
use umbra::{
    AssetStore, OffscreenTarget, PointLight, RendererSettings, Scene, SceneRenderer, SpotLight, UmbraError,
    WgpuContext, create_test_scene,
};

const WIDTH: u32 = 96;
const HEIGHT: u32 = 64;

fn headless() -> Option<WgpuContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    match pollster::block_on(WgpuContext::new_headless(&RendererSettings::default())) {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

fn pixel(rgba: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * WIDTH + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

fn brightness(p: [u8; 4]) -> u32 {
    u32::from(p[0]) + u32::from(p[1]) + u32::from(p[2])
}

/// One frame from a fresh renderer with a zero time step, so every call
/// uses the same exposure.
fn render_once(ctx: &WgpuContext, scene: &Scene, assets: &AssetStore) -> anyhow::Result<Vec<u8>> {
    let mut renderer = SceneRenderer::new(&ctx.device, RendererSettings::default(), WIDTH, HEIGHT, OFFSCREEN_FORMAT)?;
    let target = OffscreenTarget::new(&ctx.device, WIDTH, HEIGHT);
    renderer.render(&ctx.device, &ctx.queue, scene, assets, target.view(), 0.0)?;
    Ok(target.read_rgba8(&ctx.device, &ctx.queue)?)
}

/// Test sphere at the origin plus a second one at (3, 0, 0), under a dim sun.
fn two_spheres(ctx: &WgpuContext) -> anyhow::Result<(Scene, AssetStore)> {
    let (mut scene, assets) = create_test_scene(&ctx.device, &ctx.queue, WIDTH as f32 / HEIGHT as f32)?;
    let sphere = scene.entities[0];
    scene
        .entities
        .push(sphere.with_transform(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Vec3::ONE));
    if let Some(sun) = scene.directional_light.as_mut() {
        sun.intensity = 5.0;
    }
    Ok((scene, assets))
}

/// Centre pixel of the sphere at the origin.
const CENTRE: (u32, u32) = (WIDTH / 2, HEIGHT / 2);
/// Centre pixel of the sphere at (3, 0, 0).
const SIDE: (u32, u32) = (81, HEIGHT / 2);
/// Pixel showing the origin sphere at (0, 0.71, 0.71), its normal halfway
/// between +Y and the camera.
const UPPER: (u32, u32) = (WIDTH / 2, 23);

/// Origin sphere alone in the dark, with a small sphere hanging between
/// (0, 2.5, 0) and the surface at [`UPPER`].
fn receiver_with_caster(ctx: &WgpuContext, with_caster: bool) -> anyhow::Result<(Scene, AssetStore)> {
    let (mut scene, assets) = create_test_scene(&ctx.device, &ctx.queue, WIDTH as f32 / HEIGHT as f32)?;
    scene.directional_light = None;
    if with_caster {
        let sphere = scene.entities[0];
        scene
            .entities
            .push(sphere.with_transform(Vec3::new(0.0, 1.6, 0.35), Vec3::ZERO, Vec3::splat(0.25)));
    }
    Ok((scene, assets))
}

// ============================================================================
// Readback
// ============================================================================

#[test]
fn failed_device_poll_is_a_readback_error() {
    match UmbraError::from(wgpu::PollError::Timeout) {
        UmbraError::Readback(message) => assert!(message.contains("poll"), "message: {message}"),
        other => panic!("unexpected error {other:?}"),
    }
}

// ============================================================================
// Frame
// ============================================================================

#[test]
fn test_scene_renders_lit_sphere() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let aspect = WIDTH as f32 / HEIGHT as f32;
    let (scene, assets) = create_test_scene(&ctx.device, &ctx.queue, aspect)?;
    let mut renderer = SceneRenderer::new(&ctx.device, RendererSettings::default(), WIDTH, HEIGHT, OFFSCREEN_FORMAT)?;
    let target = OffscreenTarget::new(&ctx.device, WIDTH, HEIGHT);

    renderer.render(&ctx.device, &ctx.queue, &scene, &assets, target.view(), 0.0)?;
    let rgba = target.read_rgba8(&ctx.device, &ctx.queue)?;
    assert_eq!(rgba.len(), (WIDTH * HEIGHT * 4) as usize);

    let centre = pixel(&rgba, WIDTH / 2, HEIGHT / 2);
    let corner = pixel(&rgba, 0, 0);
    assert!(brightness(centre) > 0, "sphere centre is black: {centre:?}");
    assert!(
        brightness(centre) > brightness(corner),
        "sphere {centre:?} should be brighter than the empty background {corner:?}"
    );
    Ok(())
}

#[test]
fn brighter_sun_never_darkens_the_sphere() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let aspect = WIDTH as f32 / HEIGHT as f32;
    let (mut scene, assets) = create_test_scene(&ctx.device, &ctx.queue, aspect)?;
    let target = OffscreenTarget::new(&ctx.device, WIDTH, HEIGHT);

    let mut samples = Vec::new();
    for intensity in [0.0, 50.0, 700.0, 10_000.0] {
        if let Some(sun) = scene.directional_light.as_mut() {
            sun.intensity = intensity;
        }
        // fresh renderer and a zero time step keep the exposure fixed
        let mut renderer =
            SceneRenderer::new(&ctx.device, RendererSettings::default(), WIDTH, HEIGHT, OFFSCREEN_FORMAT)?;
        renderer.render(&ctx.device, &ctx.queue, &scene, &assets, target.view(), 0.0)?;
        let rgba = target.read_rgba8(&ctx.device, &ctx.queue)?;
        samples.push(brightness(pixel(&rgba, WIDTH / 2, HEIGHT / 2)));
    }

    for pair in samples.windows(2) {
        assert!(pair[1] >= pair[0], "centre brightness decreased: {samples:?}");
    }
    assert!(samples[3] > samples[0], "sun had no visible effect: {samples:?}");
    Ok(())
}

#[test]
fn exposure_is_stable_with_zero_time_step() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let (scene, assets) = create_test_scene(&ctx.device, &ctx.queue, WIDTH as f32 / HEIGHT as f32)?;
    let mut renderer = SceneRenderer::new(&ctx.device, RendererSettings::default(), WIDTH, HEIGHT, OFFSCREEN_FORMAT)?;
    let target = OffscreenTarget::new(&ctx.device, WIDTH, HEIGHT);

    let before = renderer.physical_camera().exposure();
    renderer.render(&ctx.device, &ctx.queue, &scene, &assets, target.view(), 0.0)?;
    renderer.render(&ctx.device, &ctx.queue, &scene, &assets, target.view(), 0.0)?;
    assert_eq!(renderer.physical_camera().exposure(), before);

    // a real time step adapts towards the measured luminance
    renderer.render(&ctx.device, &ctx.queue, &scene, &assets, target.view(), 1.0)?;
    let measured = renderer.physical_camera().average_luminance();
    assert!(measured.is_finite() && measured >= 0.0, "average luminance {measured}");
    Ok(())
}

#[test]
fn sunlit_hemisphere_is_not_self_shadowed() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let (scene, assets) = create_test_scene(&ctx.device, &ctx.queue, WIDTH as f32 / HEIGHT as f32)?;
    let rgba = render_once(&ctx, &scene, &assets)?;

    // the sun comes from the upper right, in front of the sphere
    for dx in [2, 4, 6] {
        for dy in [2, 4, 6] {
            let p = pixel(&rgba, WIDTH / 2 + dx, HEIGHT / 2 - dy);
            assert!(brightness(p) > 0, "sunlit texel ({dx}, -{dy}) from the centre is black");
        }
    }
    Ok(())
}

// ============================================================================
// Point and spot lights
// ============================================================================

#[test]
fn point_light_brightens_only_surfaces_in_range() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let (mut scene, assets) = two_spheres(&ctx)?;
    let dark = render_once(&ctx, &scene, &assets)?;

    // reaches the front of the origin sphere, not the sphere at x = 3
    scene
        .point_lights
        .push(PointLight::new(Vec3::new(0.0, 0.0, 2.0), 800.0, Vec3::ONE, 2.0));
    let lit = render_once(&ctx, &scene, &assets)?;

    let (before, after) = (pixel(&dark, CENTRE.0, CENTRE.1), pixel(&lit, CENTRE.0, CENTRE.1));
    assert!(
        brightness(after) > brightness(before) + 30,
        "point light did not brighten the sphere: {before:?} -> {after:?}"
    );
    assert_eq!(
        pixel(&lit, SIDE.0, SIDE.1),
        pixel(&dark, SIDE.0, SIDE.1),
        "surface outside the light's range changed"
    );
    Ok(())
}

#[test]
fn spot_light_brightens_only_surfaces_in_cone() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let (mut scene, assets) = two_spheres(&ctx)?;
    let dark = render_once(&ctx, &scene, &assets)?;

    // both spheres are in range; only the origin sphere is inside the 17° cone
    scene.spot_lights.push(SpotLight::new(
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::NEG_Z,
        600.0,
        Vec3::ONE,
        5.0,
        0.3,
    ));
    let lit = render_once(&ctx, &scene, &assets)?;

    let (before, after) = (pixel(&dark, CENTRE.0, CENTRE.1), pixel(&lit, CENTRE.0, CENTRE.1));
    assert!(
        brightness(after) > brightness(before) + 30,
        "spot light did not brighten the sphere: {before:?} -> {after:?}"
    );
    assert_eq!(
        pixel(&lit, SIDE.0, SIDE.1),
        pixel(&dark, SIDE.0, SIDE.1),
        "surface outside the cone changed"
    );
    Ok(())
}

// ============================================================================
// Shadows
// ============================================================================

#[test]
fn point_light_caster_darkens_receiver() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let light = PointLight::new(Vec3::new(0.0, 2.5, 0.0), 2000.0, Vec3::ONE, 4.0);

    let (mut open, assets) = receiver_with_caster(&ctx, false)?;
    open.point_lights.push(light);
    let lit = brightness(pixel(&render_once(&ctx, &open, &assets)?, UPPER.0, UPPER.1));

    let (mut blocked, assets) = receiver_with_caster(&ctx, true)?;
    blocked.point_lights.push(light);
    let shadowed = brightness(pixel(&render_once(&ctx, &blocked, &assets)?, UPPER.0, UPPER.1));

    blocked.point_lights[0].use_shadow = false;
    let unshadowed = brightness(pixel(&render_once(&ctx, &blocked, &assets)?, UPPER.0, UPPER.1));

    assert!(lit > 30, "receiver is not lit without a caster: {lit}");
    assert!(shadowed + 30 < lit, "caster did not darken the receiver: {shadowed} vs {lit}");
    assert!(unshadowed + 5 >= lit, "disabling shadows should restore the light: {unshadowed} vs {lit}");
    Ok(())
}

#[test]
fn spot_light_caster_darkens_receiver() -> anyhow::Result<()> {
    let Some(ctx) = headless() else { return Ok(()) };
    let position = Vec3::new(0.0, 2.5, 0.0);
    let target = Vec3::new(0.0, 0.5_f32.sqrt(), 0.5_f32.sqrt());
    let light = SpotLight::new(position, target - position, 800.0, Vec3::ONE, 4.0, 0.5);

    let (mut open, assets) = receiver_with_caster(&ctx, false)?;
    open.spot_lights.push(light);
    let lit = brightness(pixel(&render_once(&ctx, &open, &assets)?, UPPER.0, UPPER.1));

    let (mut blocked, assets) = receiver_with_caster(&ctx, true)?;
    blocked.spot_lights.push(light);
    let shadowed = brightness(pixel(&render_once(&ctx, &blocked, &assets)?, UPPER.0, UPPER.1));

    assert!(lit > 30, "receiver is not lit without a caster: {lit}");
    assert!(shadowed + 30 < lit, "caster did not darken the receiver: {shadowed} vs {lit}");
    Ok(())
}
