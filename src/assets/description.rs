//! Structured scene description.
//!
//! [`SceneDescription`] is the decoded form of a scene file, with every
//! value already converted into engine conventions: Y-up right-handed
//! coordinates, texture rows top-down, cone half-angles. It can be read from
//! the authoring tool's text format ([`SceneDescription::from_scenefile`]) or
//! from JSON ([`SceneDescription::from_json`]).

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::assets::scenefile::{self, Record};
use crate::errors::{Result, UmbraError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub position: Vec3,
    /// Euler angles in radians, Y-X-Z order.
    #[serde(default)]
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Non-indexed triangle list, one entry per corner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

/// Texture paths are relative to the scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescription {
    pub name: String,
    #[serde(default)]
    pub base_color: Option<PathBuf>,
    #[serde(default)]
    pub metallic: Option<PathBuf>,
    #[serde(default)]
    pub roughness: Option<PathBuf>,
    #[serde(default)]
    pub emission: Option<PathBuf>,
    #[serde(default)]
    pub normal_map: Option<PathBuf>,
    #[serde(default)]
    pub emission_intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub name: String,
    pub mesh: String,
    pub material: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightDescription {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    /// Illuminance in lux.
    pub intensity: f32,
    pub color: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLightDescription {
    pub name: String,
    pub position: Vec3,
    /// Luminous flux in lumens.
    pub intensity: f32,
    pub color: Vec3,
    pub range: f32,
    pub clip_start: f32,
    pub shadow_bias: f32,
    pub use_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotLightDescription {
    pub name: String,
    pub position: Vec3,
    /// Luminous flux in lumens.
    pub intensity: f32,
    pub color: Vec3,
    pub direction: Vec3,
    pub range: f32,
    pub clip_start: f32,
    /// Radians from the axis to the cone edge.
    pub half_angle: f32,
    pub blend: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyDescription {
    pub image_path: PathBuf,
    /// Luminance scale in cd/m².
    pub intensity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: Option<CameraDescription>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    #[serde(default)]
    pub materials: Vec<MaterialDescription>,
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
    #[serde(default)]
    pub directional_light: Option<DirectionalLightDescription>,
    #[serde(default)]
    pub point_lights: Vec<PointLightDescription>,
    #[serde(default)]
    pub spot_lights: Vec<SpotLightDescription>,
    #[serde(default)]
    pub sky: Option<SkyDescription>,
}

// ============================================================================
// Axis conventions of the authoring tool (right-handed, Z-up)
// ============================================================================

/// Positions, directions and normals: `(x, y, z) -> (x, z, -y)`.
#[must_use]
pub fn remap_position(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Euler angles: `(x, y, z) -> (x, z, -y)`.
#[must_use]
pub fn remap_rotation(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Scales have no sign: `(x, y, z) -> (x, z, y)`.
#[must_use]
pub fn remap_scale(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// Bottom-up texture coordinates to top-down.
#[must_use]
pub fn remap_uv(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

// ============================================================================
// Decoding
// ============================================================================

impl SceneDescription {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes the authoring tool's text format.
    pub fn from_scenefile(text: &str) -> Result<Self> {
        let mut description = Self::default();
        for record in scenefile::parse_records(text)? {
            match record.kind.as_str() {
                "Camera" => description.camera = Some(decode_camera(&record)?),
                "Mesh" => description.meshes.push(decode_mesh(&record)?),
                "Material" => description.materials.push(decode_material(&record)?),
                "MeshEntity" => description.entities.push(decode_entity(&record)?),
                "DirectionalLight" => {
                    if description.directional_light.is_some() {
                        log::warn!(
                            "Line {}: more than one DirectionalLight, keeping '{}'",
                            record.line,
                            record.name
                        );
                    }
                    description.directional_light = Some(decode_directional_light(&record)?);
                }
                "PointLight" => description.point_lights.push(decode_point_light(&record)?),
                "SpotLight" => description.spot_lights.push(decode_spot_light(&record)?),
                "Sky" => description.sky = Some(decode_sky(&record)?),
                other => {
                    log::warn!("Line {}: skipping unknown block '{other}'", record.line);
                }
            }
        }
        Ok(description)
    }

    /// Reads a scene from disk; `.json` files are JSON, anything else is the
    /// text format.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(UmbraError::AssetNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json(&text)
        } else {
            Self::from_scenefile(&text)
        }
    }

    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<&MeshDescription> {
        self.meshes.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn material(&self, name: &str) -> Option<&MaterialDescription> {
        self.materials.iter().find(|m| m.name == name)
    }
}

fn vec3(record: &Record, key: &str) -> Result<Vec3> {
    record.required(key)?.floats::<3>().map(Vec3::from)
}

fn optional_vec3(record: &Record, key: &str, default: Vec3) -> Result<Vec3> {
    match record.field(key) {
        Some(field) => field.floats::<3>().map(Vec3::from),
        None => Ok(default),
    }
}

fn optional_float(record: &Record, key: &str, default: f32) -> Result<f32> {
    record.field(key).map_or(Ok(default), |field| field.float())
}

fn rotation(record: &Record) -> Result<Vec3> {
    let Some(field) = record.field("Rotation") else {
        return Ok(Vec3::ZERO);
    };
    let (angles, tail) = field.floats_with_tail::<3>(1)?;
    if let Some(order) = tail.first()
        && *order != "YXZ"
    {
        return Err(UmbraError::SceneParse {
            line: field.line,
            message: format!("Rotation: unsupported Euler order '{order}', expected YXZ"),
        });
    }
    Ok(remap_rotation(Vec3::from(angles)))
}

fn decode_camera(record: &Record) -> Result<CameraDescription> {
    let defaults = CameraDescription::default();
    Ok(CameraDescription {
        position: remap_position(optional_vec3(record, "Position", Vec3::new(0.0, -5.0, 0.0))?),
        rotation: rotation(record)?,
        fov_y: optional_float(record, "FieldOfView", defaults.fov_y)?,
        near: optional_float(record, "ClipStart", defaults.near)?,
        far: optional_float(record, "ClipEnd", defaults.far)?,
    })
}

fn decode_mesh(record: &Record) -> Result<MeshDescription> {
    let positions = record
        .all("v")
        .map(|f| f.floats::<3>().map(|p| remap_position(Vec3::from(p)).to_array()))
        .collect::<Result<Vec<_>>>()?;
    let normals = record
        .all("vn")
        .map(|f| f.floats::<3>().map(|n| remap_position(Vec3::from(n)).to_array()))
        .collect::<Result<Vec<_>>>()?;
    let uvs = record
        .all("vt")
        .map(|f| f.floats::<2>().map(|uv| remap_uv(Vec2::from(uv)).to_array()))
        .collect::<Result<Vec<_>>>()?;

    if positions.len() != normals.len() || positions.len() != uvs.len() {
        return Err(UmbraError::SceneParse {
            line: record.line,
            message: format!(
                "Mesh '{}' has {} positions, {} normals and {} uvs",
                record.name,
                positions.len(),
                normals.len(),
                uvs.len()
            ),
        });
    }
    if positions.len() % 3 != 0 {
        return Err(UmbraError::SceneParse {
            line: record.line,
            message: format!("Mesh '{}' corner count {} is not a multiple of 3", record.name, positions.len()),
        });
    }

    Ok(MeshDescription {
        name: record.name.clone(),
        positions,
        normals,
        uvs,
    })
}

fn decode_material(record: &Record) -> Result<MaterialDescription> {
    let path = |key: &str| -> Result<Option<PathBuf>> {
        record.field(key).map(|f| f.text().map(PathBuf::from)).transpose()
    };
    Ok(MaterialDescription {
        name: record.name.clone(),
        base_color: path("baseColor")?,
        metallic: path("metallic")?,
        roughness: path("roughness")?,
        emission: path("emission")?,
        normal_map: path("normalMap")?,
        emission_intensity: optional_float(record, "emissionIntensity", 0.0)?,
    })
}

fn decode_entity(record: &Record) -> Result<EntityDescription> {
    Ok(EntityDescription {
        name: record.name.clone(),
        mesh: record.required("Mesh")?.text()?.to_string(),
        material: record.required("Material")?.text()?.to_string(),
        position: remap_position(optional_vec3(record, "Position", Vec3::ZERO)?),
        rotation: rotation(record)?,
        scale: remap_scale(optional_vec3(record, "Scale", Vec3::ONE)?),
    })
}

fn decode_directional_light(record: &Record) -> Result<DirectionalLightDescription> {
    Ok(DirectionalLightDescription {
        name: record.name.clone(),
        position: remap_position(optional_vec3(record, "Position", Vec3::ZERO)?),
        intensity: record.required("Intensity")?.float()?,
        color: optional_vec3(record, "Color", Vec3::ONE)?,
        direction: remap_position(vec3(record, "Direction")?),
    })
}

fn decode_point_light(record: &Record) -> Result<PointLightDescription> {
    Ok(PointLightDescription {
        name: record.name.clone(),
        position: remap_position(vec3(record, "Position")?),
        intensity: record.required("Intensity")?.float()?,
        color: optional_vec3(record, "Color", Vec3::ONE)?,
        range: record.required("Range")?.float()?,
        clip_start: optional_float(record, "ClipStart", 0.1)?,
        shadow_bias: optional_float(record, "ShadowBias", 0.005)?,
        use_shadow: record.field("UseShadow").map_or(Ok(true), |f| f.flag())?,
    })
}

fn decode_spot_light(record: &Record) -> Result<SpotLightDescription> {
    Ok(SpotLightDescription {
        name: record.name.clone(),
        position: remap_position(vec3(record, "Position")?),
        intensity: record.required("Intensity")?.float()?,
        color: optional_vec3(record, "Color", Vec3::ONE)?,
        direction: remap_position(vec3(record, "Direction")?),
        range: record.required("Range")?.float()?,
        clip_start: optional_float(record, "ClipStart", 0.1)?,
        // the file stores the full cone angle
        half_angle: record.required("Angle")?.float()? * 0.5,
        blend: optional_float(record, "Blend", 0.15)?,
    })
}

fn decode_sky(record: &Record) -> Result<SkyDescription> {
    Ok(SkyDescription {
        image_path: PathBuf::from(record.required("SkyImagePath")?.text()?),
        intensity: optional_float(record, "skyIntensity", 1.0)?,
    })
}
