use std::path::Path;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::assets::description::{CameraDescription, MaterialDescription, SceneDescription};
use crate::assets::store::AssetStore;
use crate::assets::{MaterialHandle, MeshHandle, TextureHandle};
use crate::errors::Result;
use crate::ibl::LUT_FILE_NAME;
use crate::resources::material::{Material, PbrMaps};
use crate::resources::mesh::MeshData;
use crate::resources::primitives::{SphereOptions, create_sphere};
use crate::resources::texture::ColorSpace;
use crate::scene::{Camera, DirectionalLight, MeshEntity, PointLight, Scene, Sky, SpecularEnvironment, SpotLight};

/// Baked specular IBL location, relative to the scene file's directory.
pub const SPECULAR_IBL_DIR: &str = "GlobalIBL/Specular";

/// Reads a scene file and uploads everything it references.
pub fn load_scene_file(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    aspect: f32,
) -> Result<(Scene, AssetStore)> {
    let description = SceneDescription::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut assets = AssetStore::new(device, queue)?;
    let scene = build_scene(device, queue, &mut assets, &description, base_dir, aspect)?;
    Ok((scene, assets))
}

/// Turns a description into a runtime scene, registering its assets in
/// `assets`.
///
/// Broken references and unreadable textures are logged and replaced by
/// defaults; only GPU upload failures abort the load.
pub fn build_scene(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    assets: &mut AssetStore,
    description: &SceneDescription,
    base_dir: &Path,
    aspect: f32,
) -> Result<Scene> {
    let camera = description.camera.clone().unwrap_or_default();
    let mut scene = Scene::new(camera_from(&camera, aspect));

    let mut meshes: FxHashMap<&str, (MeshHandle, MeshData)> = FxHashMap::default();
    for mesh in &description.meshes {
        let data = MeshData::from_corners(&mesh.positions, &mesh.normals, &mesh.uvs)?;
        let handle = assets.add_mesh(device, &mesh.name, &data)?;
        meshes.insert(mesh.name.as_str(), (handle, data));
    }

    let mut materials: FxHashMap<&str, MaterialHandle> = FxHashMap::default();
    for material in &description.materials {
        let resolved = resolve_material(device, queue, assets, material, base_dir);
        materials.insert(material.name.as_str(), assets.add_material(resolved));
    }
    let mut fallback_material = None;

    for entity in &description.entities {
        let Some((mesh, data)) = meshes.get(entity.mesh.as_str()) else {
            log::warn!("Entity '{}' references unknown mesh '{}', skipped", entity.name, entity.mesh);
            continue;
        };
        let Some(local_bounds) = data.bounds() else {
            log::warn!("Entity '{}' uses empty mesh '{}', skipped", entity.name, entity.mesh);
            continue;
        };
        let material = match materials.get(entity.material.as_str()) {
            Some(&handle) => handle,
            None => {
                log::warn!(
                    "Entity '{}' references unknown material '{}', using default",
                    entity.name,
                    entity.material
                );
                *fallback_material.get_or_insert_with(|| {
                    assets.add_material(Material::Albedo {
                        albedo: assets.defaults().white,
                    })
                })
            }
        };
        scene.entities.push(
            MeshEntity::new(*mesh, material, local_bounds).with_transform(
                entity.position,
                entity.rotation,
                entity.scale,
            ),
        );
    }

    if let Some(light) = &description.directional_light {
        scene.directional_light = Some(DirectionalLight::new(light.intensity, light.direction, light.color));
    }

    for light in &description.point_lights {
        let mut point = PointLight::new(light.position, light.intensity, light.color, light.range);
        point.near = light.clip_start;
        point.shadow_bias = light.shadow_bias;
        point.use_shadow = light.use_shadow;
        scene.point_lights.push(point);
    }

    for light in &description.spot_lights {
        let mut spot = SpotLight::new(
            light.position,
            light.direction,
            light.intensity,
            light.color,
            light.range,
            light.half_angle,
        );
        spot.near = light.clip_start;
        spot.blend = light.blend;
        scene.spot_lights.push(spot);
    }

    if let Some(sky) = &description.sky {
        let path = base_dir.join(&sky.image_path);
        match assets.load_hdr(device, queue, &path) {
            Ok(texture) => {
                scene.sky = Some(Sky {
                    texture,
                    intensity: sky.intensity,
                });
            }
            Err(e) => log::error!("Failed to load sky {}: {e}", path.display()),
        }
    }

    scene.specular_environment = load_specular_environment(device, queue, assets, &base_dir.join(SPECULAR_IBL_DIR));

    log::info!(
        "Scene loaded: {} entities, {} point lights, {} spot lights, directional light: {}, sky: {}, specular IBL: {}",
        scene.entities.len(),
        scene.point_lights.len(),
        scene.spot_lights.len(),
        scene.directional_light.is_some(),
        scene.sky.is_some(),
        scene.specular_environment.is_some()
    );

    Ok(scene)
}

/// Built-in scene: a unit white sphere at the origin, a 700 lux sun and a
/// camera five units back on +Z.
pub fn create_test_scene(device: &wgpu::Device, queue: &wgpu::Queue, aspect: f32) -> Result<(Scene, AssetStore)> {
    let mut assets = AssetStore::new(device, queue)?;
    let data = create_sphere(&SphereOptions::default());
    let mesh = assets.add_mesh(device, "Test Sphere", &data)?;
    let material = assets.add_material(Material::Albedo {
        albedo: assets.defaults().white,
    });

    let mut scene = Scene::new(camera_from(&CameraDescription::default(), aspect));
    if let Some(bounds) = data.bounds() {
        scene.entities.push(MeshEntity::new(mesh, material, bounds));
    }
    scene.directional_light = Some(DirectionalLight::new(700.0, Vec3::new(-0.5, -1.0, -0.5), Vec3::ONE));
    Ok((scene, assets))
}

fn camera_from(description: &CameraDescription, aspect: f32) -> Camera {
    Camera::new(
        description.position,
        description.rotation,
        description.fov_y,
        aspect,
        description.near,
        description.far,
    )
}

fn resolve_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    assets: &mut AssetStore,
    material: &MaterialDescription,
    base_dir: &Path,
) -> Material {
    let defaults = *assets.defaults();
    let mut load = |path: &Option<std::path::PathBuf>, color_space: ColorSpace, fallback: TextureHandle| {
        path.as_ref()
            .map(|p| assets.load_texture_or(device, queue, &base_dir.join(p), color_space, fallback))
    };

    let albedo = load(&material.base_color, ColorSpace::Srgb, defaults.white);
    let metallic = load(&material.metallic, ColorSpace::Linear, defaults.black);
    let roughness = load(&material.roughness, ColorSpace::Linear, defaults.white);
    let normal = load(&material.normal_map, ColorSpace::Linear, defaults.flat_normal);
    let emissive = load(&material.emission, ColorSpace::Srgb, defaults.black);

    match (albedo, metallic, roughness, normal, emissive) {
        (Some(albedo), None, None, None, None) => Material::Albedo { albedo },
        (Some(albedo), None, None, Some(normal), None) => Material::AlbedoNormal { albedo, normal },
        (albedo, metallic, roughness, normal, emissive) => Material::Pbr(PbrMaps {
            albedo: albedo.unwrap_or(defaults.white),
            metallic: metallic.unwrap_or(defaults.black),
            roughness: roughness.unwrap_or(defaults.white),
            normal: normal.unwrap_or(defaults.flat_normal),
            emissive: emissive.unwrap_or(defaults.black),
            emissive_intensity: material.emission_intensity,
        }),
    }
}

fn load_specular_environment(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    assets: &mut AssetStore,
    dir: &Path,
) -> Option<SpecularEnvironment> {
    if !dir.is_dir() {
        log::warn!("No baked specular IBL at {}, environment lighting disabled", dir.display());
        return None;
    }
    let loaded = assets.load_specular_cubemap(device, queue, dir).and_then(|cubemap| {
        let brdf_lut = assets.load_lut(device, queue, &dir.join(LUT_FILE_NAME))?;
        Ok(SpecularEnvironment { cubemap, brdf_lut })
    });
    match loaded {
        Ok(environment) => Some(environment),
        Err(e) => {
            log::error!("Failed to load specular IBL from {}: {e}", dir.display());
            None
        }
    }
}
