//! ParticleCloudDef (0x34): a particle emitter referencing a
//! BlitSpriteDef.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::Result;

/// Emitter movement styles stored in `particle_movement`.
pub const PARTICLE_MOVEMENT_SPHERE: u32 = 0x01;
pub const PARTICLE_MOVEMENT_PLANE: u32 = 0x02;
pub const PARTICLE_MOVEMENT_STREAM: u32 = 0x03;
pub const PARTICLE_MOVEMENT_NONE: u32 = 0x04;

/// ParticleCloudDef (0x34).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParticleCloudDef {
    pub name_ref: i32,
    pub unk1: u32,
    pub unk2: u32,
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
    pub particle_ref: u32,
}

impl ParticleCloudDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            unk1: r.read_u32_le()?,
            unk2: r.read_u32_le()?,
            particle_movement: r.read_u32_le()?,
            flags: r.read_u32_le()?,
            simultaneous_particles: r.read_u32_le()?,
            unk6: r.read_u32_le()?,
            unk7: r.read_u32_le()?,
            unk8: r.read_u32_le()?,
            unk9: r.read_u32_le()?,
            unk10: r.read_u32_le()?,
            spawn_radius: r.read_f32_le()?,
            spawn_angle: r.read_f32_le()?,
            spawn_lifespan: r.read_u32_le()?,
            spawn_velocity: r.read_f32_le()?,
            spawn_normal_z: r.read_f32_le()?,
            spawn_normal_x: r.read_f32_le()?,
            spawn_normal_y: r.read_f32_le()?,
            spawn_rate: r.read_u32_le()?,
            spawn_scale: r.read_f32_le()?,
            color: [
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
            ],
            particle_ref: r.read_u32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.unk1)?;
        w.write_u32_le(self.unk2)?;
        w.write_u32_le(self.particle_movement)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.simultaneous_particles)?;
        w.write_u32_le(self.unk6)?;
        w.write_u32_le(self.unk7)?;
        w.write_u32_le(self.unk8)?;
        w.write_u32_le(self.unk9)?;
        w.write_u32_le(self.unk10)?;
        w.write_f32_le(self.spawn_radius)?;
        w.write_f32_le(self.spawn_angle)?;
        w.write_u32_le(self.spawn_lifespan)?;
        w.write_f32_le(self.spawn_velocity)?;
        w.write_f32_le(self.spawn_normal_z)?;
        w.write_f32_le(self.spawn_normal_x)?;
        w.write_f32_le(self.spawn_normal_y)?;
        w.write_u32_le(self.spawn_rate)?;
        w.write_f32_le(self.spawn_scale)?;
        w.write_all(&self.color)?;
        w.write_u32_le(self.particle_ref)?;
        Ok(())
    }
}
