//! Entity graph to raw stream conversion.
//!
//! The encoder walks instances in a fixed dependency order and allocates
//! fragment indices lazily: a definition is emitted the first time
//! something references it, memoized by tag so later references reuse the
//! index. A definition nothing references is never emitted. The name
//! table is rebuilt from scratch, so original byte offsets are not
//! preserved.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::names::WldNames;
use crate::raw;
use crate::raw::{Dag, Fragment, Wld, WorldTreeNode};
use crate::vwld::VWld;

struct Encoder<'a> {
    wld: &'a VWld,
    names: WldNames,
    fragments: Vec<Fragment>,
    ids: HashMap<(&'static str, String), u32>,
    region_ordinals: HashMap<String, u32>,
}

impl VWld {
    /// Lays the graph out as a raw fragment stream.
    pub fn encode(&self) -> Result<Wld> {
        let mut enc = Encoder {
            wld: self,
            names: WldNames::new(),
            fragments: Vec::new(),
            ids: HashMap::new(),
            region_ordinals: HashMap::new(),
        };
        enc.run()?;
        let string_count = enc.names.len() as u32;
        Ok(Wld {
            is_new_world: self.is_new_world,
            bsp_region_count: 0,
            string_count,
            names: enc.names,
            fragments: enc.fragments,
        })
    }
}

impl Encoder<'_> {
    fn run(&mut self) -> Result<()> {
        if !self.wld.global_ambient_light.is_empty() {
            let name_ref = self.names.add(&self.wld.global_ambient_light);
            self.push(Fragment::GlobalAmbientLightDef(raw::GlobalAmbientLightDef {
                name_ref,
            }));
        }
        for instance in &self.wld.sprite_instances {
            self.ensure_sprite_instance(&instance.tag, &instance.tag)?;
        }
        for instance in &self.wld.particle_instances {
            let particle_ref = self.ensure_particle(&instance.particle, &instance.tag)?;
            let name_ref = self.names.add(&instance.tag);
            self.push(Fragment::ParticleCloudDef(raw::ParticleCloudDef {
                name_ref,
                unk1: instance.unk1,
                unk2: instance.unk2,
                particle_movement: instance.particle_movement,
                flags: instance.flags,
                simultaneous_particles: instance.simultaneous_particles,
                unk6: instance.unk6,
                unk7: instance.unk7,
                unk8: instance.unk8,
                unk9: instance.unk9,
                unk10: instance.unk10,
                spawn_radius: instance.spawn_radius,
                spawn_angle: instance.spawn_angle,
                spawn_lifespan: instance.spawn_lifespan,
                spawn_velocity: instance.spawn_velocity,
                spawn_normal_z: instance.spawn_normal_z,
                spawn_normal_x: instance.spawn_normal_x,
                spawn_normal_y: instance.spawn_normal_y,
                spawn_rate: instance.spawn_rate,
                spawn_scale: instance.spawn_scale,
                color: instance.color,
                particle_ref,
            }));
        }
        // meshes are roots: zone geometry has no referencing instance
        for mesh in &self.wld.meshes {
            self.ensure_mesh(&mesh.tag, &mesh.tag)?;
        }
        for instance in &self.wld.mesh_instances {
            self.ensure_mesh_instance(&instance.tag, &instance.tag)?;
        }
        for instance in &self.wld.animation_instances {
            self.ensure_animation_instance(&instance.tag, &instance.tag)?;
        }
        for instance in &self.wld.skeleton_instances {
            self.ensure_skeleton_instance(&instance.tag, &instance.tag)?;
        }
        // actor defs are roots too: character archives carry them with no
        // placed instance
        for actor in &self.wld.actors {
            self.ensure_actor(&actor.tag, &actor.tag)?;
        }
        for instance in &self.wld.actor_instances {
            // a def this stream does not carry is referenced by name
            let actor_def_ref = if self.wld.actor_by_tag(&instance.actor).is_some() {
                self.ensure_actor(&instance.actor, &instance.tag)? as i32
            } else {
                self.names.add(&instance.actor)
            };
            let sphere_ref = if instance.sphere.is_empty() {
                0
            } else {
                self.ensure_sphere(&instance.sphere, &instance.tag)?
            };
            let sound_name_ref = if instance.sound.is_empty() {
                0
            } else {
                self.names.add(&instance.sound)
            };
            let name_ref = self.names.add(&instance.tag);
            self.push(Fragment::Actor(raw::Actor {
                name_ref,
                actor_def_ref,
                flags: instance.flags,
                sphere_ref,
                current_action: instance.current_action,
                offset: instance.offset,
                rotation: instance.rotation,
                unk1: instance.unk1,
                bounding_radius: instance.bounding_radius,
                scale: instance.scale,
                sound_name_ref,
                unk2: instance.unk2,
            }));
        }
        for instance in &self.wld.camera_instances {
            self.ensure_camera_instance(&instance.tag, &instance.tag)?;
        }
        for instance in &self.wld.light_instances {
            self.ensure_light_instance(&instance.tag, &instance.tag)?;
        }
        for instance in &self.wld.point_light_instances {
            let light_ref =
                self.ensure_light_instance(&instance.light_instance, &instance.tag)? as i32;
            let name_ref = self.names.add(&instance.tag);
            self.push(Fragment::PointLight(raw::PointLight {
                name_ref,
                light_ref,
                flags: instance.flags,
                location: instance.location,
                radius: instance.radius,
            }));
        }
        for (ordinal, region) in self.wld.regions.iter().enumerate() {
            let mesh_ref = if region.mesh.is_empty() {
                0
            } else {
                self.ensure_mesh(&region.mesh, &region.tag)? as i32
            };
            let name_ref = self.names.add(&region.tag);
            self.region_ordinals.insert(region.tag.clone(), ordinal as u32);
            self.push(Fragment::Region(raw::Region {
                name_ref,
                flags: region.flags,
                ambient_light_ref: region.ambient_light_ref,
                cutting_obstacle_count: region.cutting_obstacle_count,
                region_vertices: region.region_vertices.clone(),
                region_proximals: region.region_proximals.clone(),
                render_vertices: region.render_vertices.clone(),
                walls: region.walls.clone(),
                obstacles: region.obstacles.clone(),
                vis_nodes: region.vis_nodes.clone(),
                vis_lists: region.vis_lists.clone(),
                sphere: region.sphere,
                reverb_volume: region.reverb_volume,
                reverb_offset: region.reverb_offset,
                user_data: region.user_data.clone(),
                mesh_ref,
            }));
        }
        for tree in &self.wld.bsp_trees {
            let mut nodes = Vec::with_capacity(tree.nodes.len());
            for node in &tree.nodes {
                let region_ref = if node.region.is_empty() {
                    0
                } else {
                    self.region_ordinal(&node.region, &tree.tag)? as i32 + 1
                };
                nodes.push(WorldTreeNode {
                    normal: node.normal,
                    region_ref,
                    front_ref: node.front,
                    back_ref: node.back,
                });
            }
            let name_ref = self.names.add(&tree.tag);
            self.push(Fragment::WorldTree(raw::WorldTree { name_ref, nodes }));
        }
        for instance in &self.wld.region_instances {
            let mut regions = Vec::with_capacity(instance.regions.len());
            for region in &instance.regions {
                regions.push(self.region_ordinal(region, &instance.tag)?);
            }
            let name_ref = self.names.add(&instance.tag);
            self.push(Fragment::Zone(raw::Zone {
                name_ref,
                flags: instance.flags,
                regions,
                user_data: instance.user_data.clone(),
            }));
        }
        for instance in &self.wld.ambient_light_instances {
            let light_ref =
                self.ensure_light_instance(&instance.light_instance, &instance.tag)? as i32;
            let mut regions = Vec::with_capacity(instance.regions.len());
            for region in &instance.regions {
                regions.push(self.region_ordinal(region, &instance.tag)?);
            }
            let name_ref = self.names.add(&instance.tag);
            self.push(Fragment::AmbientLight(raw::AmbientLight {
                name_ref,
                light_ref,
                flags: instance.flags,
                regions,
            }));
        }
        Ok(())
    }

    /// Appends a fragment and returns its 1-based index.
    fn push(&mut self, fragment: Fragment) -> u32 {
        self.fragments.push(fragment);
        self.fragments.len() as u32
    }

    fn missing(&self, referrer: &str, kind: &'static str, tag: &str) -> Error {
        Error::MissingEntity {
            referrer: referrer.to_string(),
            kind,
            tag: tag.to_string(),
        }
    }

    fn region_ordinal(&self, tag: &str, referrer: &str) -> Result<u32> {
        self.region_ordinals
            .get(tag)
            .copied()
            .ok_or_else(|| self.missing(referrer, "Region", tag))
    }

    fn ensure_bitmap(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("bitmap", tag.to_string())) {
            return Ok(*id);
        }
        let bitmap = self
            .wld
            .bitmap_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Bitmap", tag))?;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::BmInfo(raw::BmInfo {
            name_ref,
            texture_names: bitmap.textures.clone(),
        }));
        self.ids.insert(("bitmap", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_sprite(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("sprite", tag.to_string())) {
            return Ok(*id);
        }
        let sprite = self
            .wld
            .sprite_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Sprite", tag))?;
        let mut bitmap_refs = Vec::with_capacity(sprite.bitmaps.len());
        for bitmap in &sprite.bitmaps {
            bitmap_refs.push(self.ensure_bitmap(bitmap, tag)?);
        }
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::SimpleSpriteDef(raw::SimpleSpriteDef {
            name_ref,
            flags: sprite.flags,
            current_frame: sprite.current_frame,
            sleep: sprite.sleep,
            bitmap_refs,
        }));
        self.ids.insert(("sprite", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_sprite_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("sprite_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .sprite_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "SpriteInstance", tag))?;
        let sprite_ref = self.ensure_sprite(&instance.sprite, tag)? as i16;
        let name_ref = self.names.add(tag);
        let flags = instance.flags;
        let id = self.push(Fragment::SimpleSprite(raw::SimpleSprite {
            name_ref,
            sprite_ref,
            flags,
        }));
        self.ids.insert(("sprite_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_particle(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("particle", tag.to_string())) {
            return Ok(*id);
        }
        let particle = self
            .wld
            .particle_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Particle", tag))?;
        let sprite_instance_ref = self.ensure_sprite_instance(&particle.sprite_instance, tag)?;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::BlitSpriteDef(raw::BlitSpriteDef {
            name_ref,
            flags: particle.flags,
            sprite_instance_ref,
            unknown: particle.unknown,
        }));
        self.ids.insert(("particle", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_material(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("material", tag.to_string())) {
            return Ok(*id);
        }
        let material = self
            .wld
            .material_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Material", tag))?;
        let sprite_instance_ref = if material.texture.is_empty() {
            0
        } else {
            self.ensure_sprite_instance(&material.texture, tag)?
        };
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::MaterialDef(raw::MaterialDef {
            name_ref,
            flags: material.flags,
            render_method: material.render_method,
            rgb_pen: material.rgb_pen,
            brightness: material.brightness,
            scaled_ambient: material.scaled_ambient,
            sprite_instance_ref,
            pair1: material.pair1,
            pair2: material.pair2,
        }));
        self.ids.insert(("material", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_material_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("material_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .material_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "MaterialInstance", tag))?;
        let mut material_refs = Vec::with_capacity(instance.materials.len());
        for material in &instance.materials {
            material_refs.push(self.ensure_material(material, tag)?);
        }
        let name_ref = self.names.add(tag);
        let flags = instance.flags;
        let id = self.push(Fragment::MaterialPalette(raw::MaterialPalette {
            name_ref,
            flags,
            material_refs,
        }));
        self.ids.insert(("material_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_animation(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("animation", tag.to_string())) {
            return Ok(*id);
        }
        let animation = self
            .wld
            .animation_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Animation", tag))?;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::TrackDef(raw::TrackDef {
            name_ref,
            flags: animation.flags,
            transforms: animation.transforms.clone(),
        }));
        self.ids.insert(("animation", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_animation_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("animation_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .animation_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "AnimationInstance", tag))?;
        let track_ref = self.ensure_animation(&instance.animation, tag)? as i32;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::Track(raw::Track {
            name_ref,
            track_ref,
            flags: instance.flags,
            sleep: instance.sleep,
        }));
        self.ids.insert(("animation_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_mesh(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("mesh", tag.to_string())) {
            return Ok(*id);
        }
        let mesh = self
            .wld
            .mesh_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Mesh", tag))?;
        let material_palette_ref = self.ensure_material_instance(&mesh.material_instance, tag)?;
        let dm_track_ref = if mesh.animation_instance.is_empty() {
            0
        } else {
            self.ensure_animation_instance(&mesh.animation_instance, tag)? as i32
        };
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::DmSpriteDef2(raw::DmSpriteDef2 {
            name_ref,
            flags: mesh.flags,
            material_palette_ref,
            dm_track_ref,
            fragment3_ref: mesh.fragment3_ref,
            fragment4_ref: mesh.fragment4_ref,
            center_offset: mesh.center.into(),
            params2: mesh.params2,
            bounding_radius: mesh.max_distance,
            bounding_box_min: mesh.min.into(),
            bounding_box_max: mesh.max.into(),
            scale: mesh.scale,
            vertices: mesh.vertices.clone(),
            uvs: mesh.uvs.clone(),
            normals: mesh.normals.clone(),
            colors: mesh.colors.clone(),
            faces: mesh.faces.clone(),
            skin_assignment_groups: mesh.skin_assignment_groups.clone(),
            face_material_groups: mesh.face_material_groups.clone(),
            vertex_material_groups: mesh.vertex_material_groups.clone(),
            mesh_ops: mesh.mesh_ops.clone(),
        }));
        self.ids.insert(("mesh", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_mesh_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("mesh_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .mesh_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "MeshInstance", tag))?;
        let dm_sprite_ref = self.ensure_mesh(&instance.mesh, tag)? as i32;
        let name_ref = self.names.add(tag);
        let params = instance.params;
        let id = self.push(Fragment::DmSprite(raw::DmSprite {
            name_ref,
            dm_sprite_ref,
            params,
        }));
        self.ids.insert(("mesh_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_skeleton(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("skeleton", tag.to_string())) {
            return Ok(*id);
        }
        let skeleton = self
            .wld
            .skeleton_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Skeleton", tag))?
            .clone();
        let mut dags = Vec::with_capacity(skeleton.bones.len());
        for bone in &skeleton.bones {
            let track_ref = self.ensure_animation_instance(&bone.track, tag)?;
            let sprite_ref = if bone.attachment.is_empty() {
                0
            } else {
                self.ensure_attachment(&bone.attachment, tag)?
            };
            let name_ref = self.names.add(&bone.tag);
            dags.push(Dag {
                name_ref,
                flags: bone.flags,
                track_ref,
                sprite_ref,
                sub_dags: bone.sub_bones.clone(),
            });
        }
        let mut dm_sprite_refs = Vec::with_capacity(skeleton.skins.len());
        for skin in &skeleton.skins {
            dm_sprite_refs.push(self.ensure_mesh_instance(skin, tag)?);
        }
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::HierarchicalSpriteDef(raw::HierarchicalSpriteDef {
            name_ref,
            flags: skeleton.flags,
            collision_volume_ref: skeleton.collision_volume_ref,
            center_offset: skeleton.center_offset,
            bounding_radius: skeleton.bounding_radius,
            dags,
            dm_sprite_refs,
            skin_links: skeleton.skin_links.clone(),
        }));
        self.ids.insert(("skeleton", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_skeleton_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("skeleton_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .skeleton_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "SkeletonInstance", tag))?;
        let skeleton = instance.skeleton.clone();
        let flags = instance.flags;
        let hierarchical_sprite_ref = self.ensure_skeleton(&skeleton, tag)? as i16;
        let name_ref = self.names.add(tag) as i16;
        let id = self.push(Fragment::HierarchicalSprite(raw::HierarchicalSprite {
            name_ref,
            flags,
            hierarchical_sprite_ref,
        }));
        self.ids.insert(("skeleton_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_actor(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("actor", tag.to_string())) {
            return Ok(*id);
        }
        let actor = self
            .wld
            .actor_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Actor", tag))?
            .clone();
        let mut sprite_refs = Vec::with_capacity(actor.sprites.len());
        for sprite in &actor.sprites {
            sprite_refs.push(self.ensure_lod_sprite(sprite, tag)?);
        }
        let callback_name_ref = self.names.add(&actor.callback_tag);
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::ActorDef(raw::ActorDef {
            name_ref,
            flags: actor.flags,
            callback_name_ref,
            bounds_ref: actor.bounds_ref,
            current_action: actor.current_action,
            location: actor.location,
            unk1: actor.unk1,
            actions: actor.actions.clone(),
            sprite_refs,
            user_data: actor.user_data.clone(),
        }));
        self.ids.insert(("actor", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_camera(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("camera", tag.to_string())) {
            return Ok(*id);
        }
        let camera = self
            .wld
            .camera_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Camera", tag))?;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::Sprite3DDef(raw::Sprite3DDef {
            name_ref,
            flags: camera.flags,
            sphere_list_ref: camera.sphere_list_ref,
            center_offset: camera.center_offset,
            radius: camera.radius,
            vertices: camera.vertices.clone(),
            bsp_nodes: camera.bsp_nodes.clone(),
        }));
        self.ids.insert(("camera", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_camera_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("camera_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .camera_instances
            .iter()
            .find(|e| e.tag == tag)
            .ok_or_else(|| self.missing(referrer, "CameraInstance", tag))?;
        let camera = instance.camera.clone();
        let flags = instance.flags;
        let sprite_3d_def_ref = self.ensure_camera(&camera, tag)? as i32;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::Sprite3D(raw::Sprite3D {
            name_ref,
            sprite_3d_def_ref,
            flags,
        }));
        self.ids.insert(("camera_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_light(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("light", tag.to_string())) {
            return Ok(*id);
        }
        let light = self
            .wld
            .light_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Light", tag))?;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::LightDef(raw::LightDef {
            name_ref,
            flags: light.flags,
            frame_current_ref: light.frame_current_ref,
            sleep: light.sleep,
            light_levels: light.levels.clone(),
            colors: light.colors.clone(),
        }));
        self.ids.insert(("light", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_light_instance(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("light_instance", tag.to_string())) {
            return Ok(*id);
        }
        let instance = self
            .wld
            .light_instance_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "LightInstance", tag))?;
        let light = instance.light.clone();
        let flags = instance.flags;
        let light_def_ref = self.ensure_light(&light, tag)? as i32;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::Light(raw::Light {
            name_ref,
            light_def_ref,
            flags,
        }));
        self.ids.insert(("light_instance", tag.to_string()), id);
        Ok(id)
    }

    fn ensure_sphere(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if let Some(id) = self.ids.get(&("sphere", tag.to_string())) {
            return Ok(*id);
        }
        let sphere = self
            .wld
            .sphere_by_tag(tag)
            .ok_or_else(|| self.missing(referrer, "Sphere", tag))?;
        let radius = sphere.radius;
        let name_ref = self.names.add(tag);
        let id = self.push(Fragment::Sphere(raw::Sphere { name_ref, radius }));
        self.ids.insert(("sphere", tag.to_string()), id);
        Ok(id)
    }

    /// A bone attachment names a mesh, sprite or particle instance.
    fn ensure_attachment(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if self.wld.mesh_instance_by_tag(tag).is_some() {
            return self.ensure_mesh_instance(tag, referrer);
        }
        if self.wld.sprite_instance_by_tag(tag).is_some() {
            return self.ensure_sprite_instance(tag, referrer);
        }
        if self.wld.particle_by_tag(tag).is_some() {
            return self.ensure_particle(tag, referrer);
        }
        Err(self.missing(referrer, "MeshInstance", tag))
    }

    /// An actor LOD names a skeleton, camera, mesh or sprite instance.
    fn ensure_lod_sprite(&mut self, tag: &str, referrer: &str) -> Result<u32> {
        if self
            .wld
            .skeleton_instances
            .iter()
            .any(|e| e.tag == tag)
        {
            return self.ensure_skeleton_instance(tag, referrer);
        }
        if self.wld.camera_instances.iter().any(|e| e.tag == tag) {
            return self.ensure_camera_instance(tag, referrer);
        }
        if self.wld.mesh_instance_by_tag(tag).is_some() {
            return self.ensure_mesh_instance(tag, referrer);
        }
        if self.wld.sprite_instance_by_tag(tag).is_some() {
            return self.ensure_sprite_instance(tag, referrer);
        }
        Err(self.missing(referrer, "SkeletonInstance", tag))
    }
}
