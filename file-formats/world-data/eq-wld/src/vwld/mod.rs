//! Normalized WLD entity graph.
//!
//! Raw fragments reference each other by stream index, which makes them
//! hostile to editing: inserting one fragment shifts every later index.
//! [`VWld`] replaces index references with tags (names), so entities can
//! be added, removed and reordered freely. [`VWld::decode`] builds the
//! graph from a raw stream and [`VWld::encode`] lays it back out with
//! fresh indices and a rebuilt name table.

use glam::{Vec2, Vec3, Vec4};

use crate::raw::{
    ActorAction, MeshFace, MeshOp, RegionObstacle, RegionWall, Sprite3DBspNode, TrackTransform,
    VisList, VisNode,
};

mod decode;
mod encode;

/// A texture bitmap: one or more file names inside the archive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Bitmap {
    pub tag: String,
    pub textures: Vec<String>,
}

/// An animated sprite definition, a flipbook of bitmaps.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sprite {
    pub tag: String,
    pub flags: u32,
    pub current_frame: i32,
    /// Frame delay in milliseconds
    pub sleep: u32,
    pub bitmaps: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpriteInstance {
    pub tag: String,
    pub flags: u32,
    pub sprite: String,
}

/// A blit sprite, the visual of a particle system.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Particle {
    pub tag: String,
    pub flags: u32,
    pub sprite_instance: String,
    pub unknown: i32,
}

/// A particle cloud emitter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParticleInstance {
    pub tag: String,
    pub unk1: u32,
    pub unk2: u32,
    /// See the `PARTICLE_MOVEMENT_*` constants
    pub particle_movement: u32,
    pub flags: u32,
    pub simultaneous_particles: u32,
    pub unk6: u32,
    pub unk7: u32,
    pub unk8: u32,
    pub unk9: u32,
    pub unk10: u32,
    pub spawn_radius: f32,
    pub spawn_angle: f32,
    pub spawn_lifespan: u32,
    pub spawn_velocity: f32,
    pub spawn_normal_z: f32,
    pub spawn_normal_x: f32,
    pub spawn_normal_y: f32,
    pub spawn_rate: u32,
    pub spawn_scale: f32,
    pub color: [u8; 4],
    pub particle: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Material {
    pub tag: String,
    pub flags: u32,
    pub render_method: u32,
    pub rgb_pen: [u8; 4],
    pub brightness: f32,
    pub scaled_ambient: f32,
    /// Sprite instance providing the texture; empty when untextured
    pub texture: String,
    pub pair1: u32,
    pub pair2: f32,
}

/// An ordered material palette referenced by meshes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialInstance {
    pub tag: String,
    pub flags: u32,
    pub materials: Vec<String>,
}

/// A triangle mesh with fixed-point vertex data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    pub tag: String,
    pub flags: u32,
    pub material_instance: String,
    /// Vertex animation track; empty when static
    pub animation_instance: String,
    pub fragment3_ref: i32,
    pub fragment4_ref: i32,
    pub center: Vec3,
    pub params2: [u32; 3],
    pub max_distance: f32,
    pub min: Vec3,
    pub max: Vec3,
    /// Fixed-point shift: world units are `value / (1 << scale)`
    pub scale: u16,
    pub vertices: Vec<[i16; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[i8; 3]>,
    pub colors: Vec<[u8; 4]>,
    pub faces: Vec<MeshFace>,
    pub skin_assignment_groups: Vec<[i16; 2]>,
    pub face_material_groups: Vec<[u16; 2]>,
    pub vertex_material_groups: Vec<[i16; 2]>,
    pub mesh_ops: Vec<MeshOp>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshInstance {
    pub tag: String,
    pub mesh: String,
    pub params: u32,
}

/// A bone-transform track definition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Animation {
    pub tag: String,
    pub flags: u32,
    pub transforms: Vec<TrackTransform>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnimationInstance {
    pub tag: String,
    pub animation: String,
    pub flags: u32,
    pub sleep: u32,
}

/// An actor (model) definition grouping its levels of detail.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Actor {
    pub tag: String,
    pub flags: u32,
    pub callback_tag: String,
    pub bounds_ref: i32,
    pub current_action: u32,
    pub location: [f32; 6],
    pub unk1: u32,
    pub actions: Vec<ActorAction>,
    /// Sprites in LOD order; each names a skeleton, camera, mesh or
    /// sprite instance
    pub sprites: Vec<String>,
    pub user_data: String,
}

/// A placed actor in the world.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActorInstance {
    pub tag: String,
    pub actor: String,
    pub flags: u32,
    pub sphere: String,
    pub current_action: u32,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub unk1: u32,
    pub bounding_radius: f32,
    pub scale: f32,
    pub sound: String,
    pub unk2: i32,
}

/// One bone of a skeleton.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SkeletonBone {
    pub tag: String,
    pub flags: u32,
    pub track: String,
    /// Mesh, sprite or particle instance attached to the bone
    pub attachment: String,
    pub sub_bones: Vec<u32>,
}

/// A bone hierarchy definition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Skeleton {
    pub tag: String,
    pub flags: u32,
    pub collision_volume_ref: u32,
    pub center_offset: [f32; 3],
    pub bounding_radius: f32,
    pub bones: Vec<SkeletonBone>,
    /// Skin meshes, paired by index with `skin_links`
    pub skins: Vec<String>,
    pub skin_links: Vec<u32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SkeletonInstance {
    pub tag: String,
    pub skeleton: String,
    pub flags: u32,
}

/// A light source definition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Light {
    pub tag: String,
    pub flags: u32,
    pub frame_current_ref: u32,
    pub sleep: u32,
    pub levels: Vec<f32>,
    pub colors: Vec<Vec3>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LightInstance {
    pub tag: String,
    pub light: String,
    pub flags: u32,
}

/// An ambient light applied to a set of regions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AmbientLightInstance {
    pub tag: String,
    pub light_instance: String,
    pub flags: u32,
    pub regions: Vec<String>,
}

/// A point light placed in the world.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointLightInstance {
    pub tag: String,
    pub light_instance: String,
    pub flags: u32,
    pub location: Vec3,
    pub radius: f32,
}

/// A first-person camera volume.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Camera {
    pub tag: String,
    pub flags: u32,
    pub sphere_list_ref: u32,
    pub center_offset: Vec3,
    pub radius: f32,
    pub vertices: Vec<Vec3>,
    pub bsp_nodes: Vec<Sprite3DBspNode>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CameraInstance {
    pub tag: String,
    pub camera: String,
    pub flags: u32,
}

/// One node of the zone's spatial partition tree.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BspTreeNode {
    pub normal: Vec4,
    /// Tag of the leaf region; empty for interior nodes
    pub region: String,
    /// 1-based index of the front child node; 0 when none
    pub front: i32,
    /// 1-based index of the back child node; 0 when none
    pub back: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BspTree {
    pub tag: String,
    pub nodes: Vec<BspTreeNode>,
}

/// A leaf region of the spatial partition, with visibility data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Region {
    pub tag: String,
    pub flags: u32,
    pub ambient_light_ref: i32,
    pub cutting_obstacle_count: u32,
    pub region_vertices: Vec<Vec3>,
    pub region_proximals: Vec<Vec2>,
    pub render_vertices: Vec<Vec3>,
    pub walls: Vec<RegionWall>,
    pub obstacles: Vec<RegionObstacle>,
    pub vis_nodes: Vec<VisNode>,
    pub vis_lists: Vec<VisList>,
    pub sphere: [f32; 4],
    pub reverb_volume: f32,
    pub reverb_offset: i32,
    pub user_data: String,
    /// Geometry of the region; empty when it has none
    pub mesh: String,
}

/// A named zone grouping regions, e.g. water or lava volumes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionInstance {
    pub tag: String,
    pub flags: u32,
    pub regions: Vec<String>,
    pub user_data: String,
}

/// A bounding sphere attached to an actor instance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sphere {
    pub tag: String,
    pub radius: f32,
}

/// The normalized entity graph of a WLD stream.
///
/// Instances reference definitions by tag; definitions never reference
/// instances. The order of each list is the discovery order of the
/// decoding pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VWld {
    /// True for new-world streams (float mesh UVs)
    pub is_new_world: bool,
    /// Tag of the global ambient light; empty when absent
    pub global_ambient_light: String,
    pub bitmaps: Vec<Bitmap>,
    pub sprites: Vec<Sprite>,
    pub sprite_instances: Vec<SpriteInstance>,
    pub particles: Vec<Particle>,
    pub particle_instances: Vec<ParticleInstance>,
    pub materials: Vec<Material>,
    pub material_instances: Vec<MaterialInstance>,
    pub meshes: Vec<Mesh>,
    pub mesh_instances: Vec<MeshInstance>,
    pub animations: Vec<Animation>,
    pub animation_instances: Vec<AnimationInstance>,
    pub actors: Vec<Actor>,
    pub actor_instances: Vec<ActorInstance>,
    pub skeletons: Vec<Skeleton>,
    pub skeleton_instances: Vec<SkeletonInstance>,
    pub lights: Vec<Light>,
    pub light_instances: Vec<LightInstance>,
    pub ambient_light_instances: Vec<AmbientLightInstance>,
    pub point_light_instances: Vec<PointLightInstance>,
    pub cameras: Vec<Camera>,
    pub camera_instances: Vec<CameraInstance>,
    pub bsp_trees: Vec<BspTree>,
    pub regions: Vec<Region>,
    pub region_instances: Vec<RegionInstance>,
    pub spheres: Vec<Sphere>,
}

impl VWld {
    pub fn bitmap_by_tag(&self, tag: &str) -> Option<&Bitmap> {
        self.bitmaps.iter().find(|e| e.tag == tag)
    }

    pub fn sprite_by_tag(&self, tag: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|e| e.tag == tag)
    }

    pub fn sprite_instance_by_tag(&self, tag: &str) -> Option<&SpriteInstance> {
        self.sprite_instances.iter().find(|e| e.tag == tag)
    }

    pub fn particle_by_tag(&self, tag: &str) -> Option<&Particle> {
        self.particles.iter().find(|e| e.tag == tag)
    }

    pub fn material_by_tag(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|e| e.tag == tag)
    }

    pub fn material_instance_by_tag(&self, tag: &str) -> Option<&MaterialInstance> {
        self.material_instances.iter().find(|e| e.tag == tag)
    }

    pub fn mesh_by_tag(&self, tag: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|e| e.tag == tag)
    }

    pub fn animation_by_tag(&self, tag: &str) -> Option<&Animation> {
        self.animations.iter().find(|e| e.tag == tag)
    }

    pub fn animation_instance_by_tag(&self, tag: &str) -> Option<&AnimationInstance> {
        self.animation_instances.iter().find(|e| e.tag == tag)
    }

    pub fn actor_by_tag(&self, tag: &str) -> Option<&Actor> {
        self.actors.iter().find(|e| e.tag == tag)
    }

    pub fn skeleton_by_tag(&self, tag: &str) -> Option<&Skeleton> {
        self.skeletons.iter().find(|e| e.tag == tag)
    }

    pub fn skeleton_instance_by_tag(&self, tag: &str) -> Option<&SkeletonInstance> {
        self.skeleton_instances.iter().find(|e| e.tag == tag)
    }

    pub fn light_by_tag(&self, tag: &str) -> Option<&Light> {
        self.lights.iter().find(|e| e.tag == tag)
    }

    pub fn light_instance_by_tag(&self, tag: &str) -> Option<&LightInstance> {
        self.light_instances.iter().find(|e| e.tag == tag)
    }

    pub fn camera_by_tag(&self, tag: &str) -> Option<&Camera> {
        self.cameras.iter().find(|e| e.tag == tag)
    }

    pub fn mesh_instance_by_tag(&self, tag: &str) -> Option<&MeshInstance> {
        self.mesh_instances.iter().find(|e| e.tag == tag)
    }

    pub fn region_by_tag(&self, tag: &str) -> Option<&Region> {
        self.regions.iter().find(|e| e.tag == tag)
    }

    pub fn sphere_by_tag(&self, tag: &str) -> Option<&Sphere> {
        self.spheres.iter().find(|e| e.tag == tag)
    }
}
