//! Raw stream to entity graph conversion.
//!
//! One forward pass over the fragment list. Every fragment reference must
//! point at an already-decoded fragment; a reference to a missing or
//! later fragment fails with the offending index. Region ordinals are the
//! exception: the partition tree and zone lists name regions that appear
//! later in the stream, so those are resolved in a fix-up step once all
//! regions are known.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::raw::{Fragment, Wld};
use crate::vwld::{
    Actor, ActorInstance, AmbientLightInstance, Animation, AnimationInstance, Bitmap, BspTree,
    BspTreeNode, Camera, CameraInstance, Light, LightInstance, Material, MaterialInstance, Mesh,
    MeshInstance, Particle, ParticleInstance, PointLightInstance, Region, RegionInstance,
    Skeleton, SkeletonBone, SkeletonInstance, Sphere, Sprite, SpriteInstance, VWld,
};

/// Fragment id to entity list position, one per entity kind.
#[derive(Default)]
struct FragIndex {
    bitmaps: HashMap<u32, usize>,
    sprites: HashMap<u32, usize>,
    sprite_instances: HashMap<u32, usize>,
    particles: HashMap<u32, usize>,
    materials: HashMap<u32, usize>,
    material_instances: HashMap<u32, usize>,
    meshes: HashMap<u32, usize>,
    mesh_instances: HashMap<u32, usize>,
    animations: HashMap<u32, usize>,
    animation_instances: HashMap<u32, usize>,
    actors: HashMap<u32, usize>,
    skeletons: HashMap<u32, usize>,
    skeleton_instances: HashMap<u32, usize>,
    lights: HashMap<u32, usize>,
    light_instances: HashMap<u32, usize>,
    cameras: HashMap<u32, usize>,
    camera_instances: HashMap<u32, usize>,
    spheres: HashMap<u32, usize>,
}

/// Region ordinal lists that need resolving after the main pass.
struct PendingOrdinals {
    frag_index: usize,
    entity_index: usize,
    ordinals: Vec<u32>,
}

impl VWld {
    /// Builds the entity graph from a raw stream.
    pub fn decode(src: &Wld) -> Result<Self> {
        let mut out = VWld {
            is_new_world: src.is_new_world,
            ..VWld::default()
        };
        let mut ids = FragIndex::default();
        let mut pending_trees: Vec<PendingOrdinals> = Vec::new();
        let mut pending_zones: Vec<PendingOrdinals> = Vec::new();
        let mut pending_ambients: Vec<PendingOrdinals> = Vec::new();

        for (pos, fragment) in src.fragments.iter().enumerate() {
            let i = pos + 1;
            let id = i as u32;
            match fragment {
                Fragment::BmInfo(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_BMINFO"))?;
                    ids.bitmaps.insert(id, out.bitmaps.len());
                    out.bitmaps.push(Bitmap {
                        tag,
                        textures: f.texture_names.clone(),
                    });
                }
                Fragment::SimpleSpriteDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_SPRITE"))?;
                    let mut bitmaps = Vec::with_capacity(f.bitmap_refs.len());
                    for bitmap_ref in &f.bitmap_refs {
                        let target = lookup(&ids.bitmaps, *bitmap_ref, i, "BmInfo")?;
                        bitmaps.push(out.bitmaps[target].tag.clone());
                    }
                    ids.sprites.insert(id, out.sprites.len());
                    out.sprites.push(Sprite {
                        tag,
                        flags: f.flags,
                        current_frame: f.current_frame,
                        sleep: f.sleep,
                        bitmaps,
                    });
                }
                Fragment::SimpleSprite(f) => {
                    let target = lookup(
                        &ids.sprites,
                        f.sprite_ref as u32,
                        i,
                        "SimpleSpriteDef",
                    )?;
                    let sprite = out.sprites[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{sprite}_INST"))?;
                    ids.sprite_instances.insert(id, out.sprite_instances.len());
                    out.sprite_instances.push(SpriteInstance {
                        tag,
                        flags: f.flags,
                        sprite,
                    });
                }
                Fragment::BlitSpriteDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_SPB"))?;
                    let target = lookup(
                        &ids.sprite_instances,
                        f.sprite_instance_ref,
                        i,
                        "SimpleSprite",
                    )?;
                    ids.particles.insert(id, out.particles.len());
                    out.particles.push(Particle {
                        tag,
                        flags: f.flags,
                        sprite_instance: out.sprite_instances[target].tag.clone(),
                        unknown: f.unknown,
                    });
                }
                Fragment::ParticleCloudDef(f) => {
                    let target = lookup(&ids.particles, f.particle_ref, i, "BlitSpriteDef")?;
                    let particle = out.particles[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{particle}_PCD"))?;
                    out.particle_instances.push(ParticleInstance {
                        tag,
                        unk1: f.unk1,
                        unk2: f.unk2,
                        particle_movement: f.particle_movement,
                        flags: f.flags,
                        simultaneous_particles: f.simultaneous_particles,
                        unk6: f.unk6,
                        unk7: f.unk7,
                        unk8: f.unk8,
                        unk9: f.unk9,
                        unk10: f.unk10,
                        spawn_radius: f.spawn_radius,
                        spawn_angle: f.spawn_angle,
                        spawn_lifespan: f.spawn_lifespan,
                        spawn_velocity: f.spawn_velocity,
                        spawn_normal_z: f.spawn_normal_z,
                        spawn_normal_x: f.spawn_normal_x,
                        spawn_normal_y: f.spawn_normal_y,
                        spawn_rate: f.spawn_rate,
                        spawn_scale: f.spawn_scale,
                        color: f.color,
                        particle,
                    });
                }
                Fragment::MaterialDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_MDF"))?;
                    let texture = if f.sprite_instance_ref == 0 {
                        String::new()
                    } else {
                        let target = lookup(
                            &ids.sprite_instances,
                            f.sprite_instance_ref,
                            i,
                            "SimpleSprite",
                        )?;
                        out.sprite_instances[target].tag.clone()
                    };
                    ids.materials.insert(id, out.materials.len());
                    out.materials.push(Material {
                        tag,
                        flags: f.flags,
                        render_method: f.render_method,
                        rgb_pen: f.rgb_pen,
                        brightness: f.brightness,
                        scaled_ambient: f.scaled_ambient,
                        texture,
                        pair1: f.pair1,
                        pair2: f.pair2,
                    });
                }
                Fragment::MaterialPalette(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_MP"))?;
                    let mut materials = Vec::with_capacity(f.material_refs.len());
                    for material_ref in &f.material_refs {
                        let target = lookup(&ids.materials, *material_ref, i, "MaterialDef")?;
                        materials.push(out.materials[target].tag.clone());
                    }
                    ids.material_instances
                        .insert(id, out.material_instances.len());
                    out.material_instances.push(MaterialInstance {
                        tag,
                        flags: f.flags,
                        materials,
                    });
                }
                Fragment::DmSpriteDef2(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_DMSPRITEDEF"))?;
                    let target = lookup(
                        &ids.material_instances,
                        f.material_palette_ref,
                        i,
                        "MaterialPalette",
                    )?;
                    let animation_instance = if f.dm_track_ref == 0 {
                        String::new()
                    } else {
                        let target = lookup(
                            &ids.animation_instances,
                            f.dm_track_ref as u32,
                            i,
                            "Track",
                        )?;
                        out.animation_instances[target].tag.clone()
                    };
                    ids.meshes.insert(id, out.meshes.len());
                    out.meshes.push(Mesh {
                        tag,
                        flags: f.flags,
                        material_instance: out.material_instances[target].tag.clone(),
                        animation_instance,
                        fragment3_ref: f.fragment3_ref,
                        fragment4_ref: f.fragment4_ref,
                        center: f.center_offset.into(),
                        params2: f.params2,
                        max_distance: f.bounding_radius,
                        min: f.bounding_box_min.into(),
                        max: f.bounding_box_max.into(),
                        scale: f.scale,
                        vertices: f.vertices.clone(),
                        uvs: f.uvs.clone(),
                        normals: f.normals.clone(),
                        colors: f.colors.clone(),
                        faces: f.faces.clone(),
                        skin_assignment_groups: f.skin_assignment_groups.clone(),
                        face_material_groups: f.face_material_groups.clone(),
                        vertex_material_groups: f.vertex_material_groups.clone(),
                        mesh_ops: f.mesh_ops.clone(),
                    });
                }
                Fragment::DmSprite(f) => {
                    let target = lookup(&ids.meshes, f.dm_sprite_ref as u32, i, "DmSpriteDef2")?;
                    let mesh = out.meshes[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{mesh}_INST"))?;
                    ids.mesh_instances.insert(id, out.mesh_instances.len());
                    out.mesh_instances.push(MeshInstance {
                        tag,
                        mesh,
                        params: f.params,
                    });
                }
                Fragment::TrackDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_TRACKDEF"))?;
                    ids.animations.insert(id, out.animations.len());
                    out.animations.push(Animation {
                        tag,
                        flags: f.flags,
                        transforms: f.transforms.clone(),
                    });
                }
                Fragment::Track(f) => {
                    let target = lookup(&ids.animations, f.track_ref as u32, i, "TrackDef")?;
                    let animation = out.animations[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{animation}_TRACK"))?;
                    ids.animation_instances
                        .insert(id, out.animation_instances.len());
                    out.animation_instances.push(AnimationInstance {
                        tag,
                        animation,
                        flags: f.flags,
                        sleep: f.sleep,
                    });
                }
                Fragment::HierarchicalSpriteDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_HS_DEF"))?;
                    let mut bones = Vec::with_capacity(f.dags.len());
                    for dag in &f.dags {
                        let track = {
                            let target = lookup(
                                &ids.animation_instances,
                                dag.track_ref,
                                i,
                                "Track",
                            )?;
                            out.animation_instances[target].tag.clone()
                        };
                        let attachment = if dag.sprite_ref == 0 {
                            String::new()
                        } else {
                            attachment_tag(&out, &ids, dag.sprite_ref, i)?
                        };
                        bones.push(SkeletonBone {
                            tag: tag_or(src, dag.name_ref, String::new)?,
                            flags: dag.flags,
                            track,
                            attachment,
                            sub_bones: dag.sub_dags.clone(),
                        });
                    }
                    let mut skins = Vec::with_capacity(f.dm_sprite_refs.len());
                    for dm_ref in &f.dm_sprite_refs {
                        let target = lookup(&ids.mesh_instances, *dm_ref, i, "DmSprite")?;
                        skins.push(out.mesh_instances[target].tag.clone());
                    }
                    ids.skeletons.insert(id, out.skeletons.len());
                    out.skeletons.push(Skeleton {
                        tag,
                        flags: f.flags,
                        collision_volume_ref: f.collision_volume_ref,
                        center_offset: f.center_offset,
                        bounding_radius: f.bounding_radius,
                        bones,
                        skins,
                        skin_links: f.skin_links.clone(),
                    });
                }
                Fragment::HierarchicalSprite(f) => {
                    let target = lookup(
                        &ids.skeletons,
                        f.hierarchical_sprite_ref as u32,
                        i,
                        "HierarchicalSpriteDef",
                    )?;
                    let skeleton = out.skeletons[target].tag.clone();
                    let tag = tag_or(src, f.name_ref as i32, || format!("{skeleton}_INST"))?;
                    ids.skeleton_instances
                        .insert(id, out.skeleton_instances.len());
                    out.skeleton_instances.push(SkeletonInstance {
                        tag,
                        skeleton,
                        flags: f.flags,
                    });
                }
                Fragment::ActorDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_ACTORDEF"))?;
                    let mut sprites = Vec::with_capacity(f.sprite_refs.len());
                    for sprite_ref in &f.sprite_refs {
                        sprites.push(actor_sprite_tag(&out, &ids, *sprite_ref, i)?);
                    }
                    ids.actors.insert(id, out.actors.len());
                    out.actors.push(Actor {
                        tag,
                        flags: f.flags,
                        callback_tag: tag_or(src, f.callback_name_ref, String::new)?,
                        bounds_ref: f.bounds_ref,
                        current_action: f.current_action,
                        location: f.location,
                        unk1: f.unk1,
                        actions: f.actions.clone(),
                        sprites,
                        user_data: f.user_data.clone(),
                    });
                }
                Fragment::Actor(f) => {
                    // positive refs point at an ActorDef fragment, negative
                    // refs name a def (possibly in another stream) by tag
                    let actor = if f.actor_def_ref < 0 {
                        tag_or(src, f.actor_def_ref, String::new)?
                    } else {
                        let target =
                            lookup(&ids.actors, f.actor_def_ref as u32, i, "ActorDef")?;
                        out.actors[target].tag.clone()
                    };
                    let tag = tag_or(src, f.name_ref, || format!("{i}_ACTORINST"))?;
                    let sphere = if f.sphere_ref == 0 {
                        String::new()
                    } else {
                        let target = lookup(&ids.spheres, f.sphere_ref, i, "Sphere")?;
                        out.spheres[target].tag.clone()
                    };
                    out.actor_instances.push(ActorInstance {
                        tag,
                        actor,
                        flags: f.flags,
                        sphere,
                        current_action: f.current_action,
                        offset: f.offset,
                        rotation: f.rotation,
                        unk1: f.unk1,
                        bounding_radius: f.bounding_radius,
                        scale: f.scale,
                        sound: tag_or(src, f.sound_name_ref, String::new)?,
                        unk2: f.unk2,
                    });
                }
                Fragment::Sphere(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_SPHERE"))?;
                    ids.spheres.insert(id, out.spheres.len());
                    out.spheres.push(Sphere {
                        tag,
                        radius: f.radius,
                    });
                }
                Fragment::LightDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_LIGHTDEF"))?;
                    ids.lights.insert(id, out.lights.len());
                    out.lights.push(Light {
                        tag,
                        flags: f.flags,
                        frame_current_ref: f.frame_current_ref,
                        sleep: f.sleep,
                        levels: f.light_levels.clone(),
                        colors: f.colors.clone(),
                    });
                }
                Fragment::Light(f) => {
                    let target = lookup(&ids.lights, f.light_def_ref as u32, i, "LightDef")?;
                    let light = out.lights[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{light}_INST"))?;
                    ids.light_instances.insert(id, out.light_instances.len());
                    out.light_instances.push(LightInstance {
                        tag,
                        light,
                        flags: f.flags,
                    });
                }
                Fragment::PointLight(f) => {
                    let target =
                        lookup(&ids.light_instances, f.light_ref as u32, i, "Light")?;
                    let light_instance = out.light_instances[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{i}_POINTLIGHT"))?;
                    out.point_light_instances.push(PointLightInstance {
                        tag,
                        light_instance,
                        flags: f.flags,
                        location: f.location,
                        radius: f.radius,
                    });
                }
                Fragment::AmbientLight(f) => {
                    let target =
                        lookup(&ids.light_instances, f.light_ref as u32, i, "Light")?;
                    let light_instance = out.light_instances[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{i}_AMBIENTLIGHT"))?;
                    pending_ambients.push(PendingOrdinals {
                        frag_index: i,
                        entity_index: out.ambient_light_instances.len(),
                        ordinals: f.regions.clone(),
                    });
                    out.ambient_light_instances.push(AmbientLightInstance {
                        tag,
                        light_instance,
                        flags: f.flags,
                        regions: Vec::new(),
                    });
                }
                Fragment::GlobalAmbientLightDef(f) => {
                    out.global_ambient_light =
                        tag_or(src, f.name_ref, || format!("{i}_GLOBALAMBIENT"))?;
                }
                Fragment::Sprite3DDef(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_CAMERA"))?;
                    ids.cameras.insert(id, out.cameras.len());
                    out.cameras.push(Camera {
                        tag,
                        flags: f.flags,
                        sphere_list_ref: f.sphere_list_ref,
                        center_offset: f.center_offset,
                        radius: f.radius,
                        vertices: f.vertices.clone(),
                        bsp_nodes: f.bsp_nodes.clone(),
                    });
                }
                Fragment::Sprite3D(f) => {
                    let target = lookup(
                        &ids.cameras,
                        f.sprite_3d_def_ref as u32,
                        i,
                        "Sprite3DDef",
                    )?;
                    let camera = out.cameras[target].tag.clone();
                    let tag = tag_or(src, f.name_ref, || format!("{camera}_INST"))?;
                    ids.camera_instances.insert(id, out.camera_instances.len());
                    out.camera_instances.push(CameraInstance {
                        tag,
                        camera,
                        flags: f.flags,
                    });
                }
                Fragment::WorldTree(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_WORLDTREE"))?;
                    pending_trees.push(PendingOrdinals {
                        frag_index: i,
                        entity_index: out.bsp_trees.len(),
                        ordinals: f.nodes.iter().map(|n| n.region_ref as u32).collect(),
                    });
                    out.bsp_trees.push(BspTree {
                        tag,
                        nodes: f
                            .nodes
                            .iter()
                            .map(|n| BspTreeNode {
                                normal: n.normal,
                                region: String::new(),
                                front: n.front_ref,
                                back: n.back_ref,
                            })
                            .collect(),
                    });
                }
                Fragment::Region(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_REGION"))?;
                    let mesh = if f.flags & 0x100 == 0 {
                        String::new()
                    } else {
                        let target = lookup(&ids.meshes, f.mesh_ref as u32, i, "DmSpriteDef2")?;
                        out.meshes[target].tag.clone()
                    };
                    out.regions.push(Region {
                        tag,
                        flags: f.flags,
                        ambient_light_ref: f.ambient_light_ref,
                        cutting_obstacle_count: f.cutting_obstacle_count,
                        region_vertices: f.region_vertices.clone(),
                        region_proximals: f.region_proximals.clone(),
                        render_vertices: f.render_vertices.clone(),
                        walls: f.walls.clone(),
                        obstacles: f.obstacles.clone(),
                        vis_nodes: f.vis_nodes.clone(),
                        vis_lists: f.vis_lists.clone(),
                        sphere: f.sphere,
                        reverb_volume: f.reverb_volume,
                        reverb_offset: f.reverb_offset,
                        user_data: f.user_data.clone(),
                        mesh,
                    });
                }
                Fragment::Zone(f) => {
                    let tag = tag_or(src, f.name_ref, || format!("{i}_ZONE"))?;
                    pending_zones.push(PendingOrdinals {
                        frag_index: i,
                        entity_index: out.region_instances.len(),
                        ordinals: f.regions.clone(),
                    });
                    out.region_instances.push(RegionInstance {
                        tag,
                        flags: f.flags,
                        regions: Vec::new(),
                        user_data: f.user_data.clone(),
                    });
                }
                Fragment::Unrecognized { code, .. } => {
                    log::debug!("fragment {i}: skipping unhandled code {code:#04x}");
                }
            }
        }

        // partition trees reference regions 1-based, everything else 0-based
        for pending in pending_trees {
            for (node_index, ordinal) in pending.ordinals.into_iter().enumerate() {
                if ordinal == 0 {
                    continue;
                }
                let region = region_tag(&out, ordinal - 1, pending.frag_index)?;
                out.bsp_trees[pending.entity_index].nodes[node_index].region = region;
            }
        }
        for pending in pending_zones {
            let mut regions = Vec::with_capacity(pending.ordinals.len());
            for ordinal in pending.ordinals {
                regions.push(region_tag(&out, ordinal, pending.frag_index)?);
            }
            out.region_instances[pending.entity_index].regions = regions;
        }
        for pending in pending_ambients {
            let mut regions = Vec::with_capacity(pending.ordinals.len());
            for ordinal in pending.ordinals {
                regions.push(region_tag(&out, ordinal, pending.frag_index)?);
            }
            out.ambient_light_instances[pending.entity_index].regions = regions;
        }

        Ok(out)
    }
}

/// Resolves a fragment's name or falls back to a generated default.
fn tag_or(src: &Wld, name_ref: i32, default: impl FnOnce() -> String) -> Result<String> {
    match src.names.resolve(name_ref)? {
        Some(name) => Ok(name.to_string()),
        None => Ok(default()),
    }
}

fn lookup(
    map: &HashMap<u32, usize>,
    frag_ref: u32,
    index: usize,
    expected: &'static str,
) -> Result<usize> {
    map.get(&frag_ref).copied().ok_or(Error::DanglingRef {
        index,
        expected,
        target: frag_ref as i32,
    })
}

fn region_tag(out: &VWld, ordinal: u32, frag_index: usize) -> Result<String> {
    out.regions
        .get(ordinal as usize)
        .map(|r| r.tag.clone())
        .ok_or(Error::DanglingRef {
            index: frag_index,
            expected: "Region",
            target: ordinal as i32,
        })
}

/// A skeleton bone attachment can be a mesh, sprite or particle instance.
fn attachment_tag(out: &VWld, ids: &FragIndex, frag_ref: u32, index: usize) -> Result<String> {
    if let Some(target) = ids.mesh_instances.get(&frag_ref) {
        return Ok(out.mesh_instances[*target].tag.clone());
    }
    if let Some(target) = ids.sprite_instances.get(&frag_ref) {
        return Ok(out.sprite_instances[*target].tag.clone());
    }
    if let Some(target) = ids.particles.get(&frag_ref) {
        return Ok(out.particles[*target].tag.clone());
    }
    Err(Error::DanglingRef {
        index,
        expected: "DmSprite",
        target: frag_ref as i32,
    })
}

/// An actor LOD sprite can be a skeleton, camera, mesh or sprite instance.
fn actor_sprite_tag(out: &VWld, ids: &FragIndex, frag_ref: u32, index: usize) -> Result<String> {
    if let Some(target) = ids.skeleton_instances.get(&frag_ref) {
        return Ok(out.skeleton_instances[*target].tag.clone());
    }
    if let Some(target) = ids.camera_instances.get(&frag_ref) {
        return Ok(out.camera_instances[*target].tag.clone());
    }
    if let Some(target) = ids.mesh_instances.get(&frag_ref) {
        return Ok(out.mesh_instances[*target].tag.clone());
    }
    if let Some(target) = ids.sprite_instances.get(&frag_ref) {
        return Ok(out.sprite_instances[*target].tag.clone());
    }
    Err(Error::DanglingRef {
        index,
        expected: "HierarchicalSprite",
        target: frag_ref as i32,
    })
}
