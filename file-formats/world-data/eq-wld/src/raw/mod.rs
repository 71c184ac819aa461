//! Raw WLD stream codec.
//!
//! A WLD stream is a header, a XOR-coded name blob, then an ordered list
//! of `(size, code, payload)` fragment chunks. Fragments are addressed by
//! 1-based index; index 0 is reserved. This module decodes each chunk into
//! a typed [`Fragment`] variant without resolving cross-references; the
//! [`crate::vwld`] module builds the normalized graph on top.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::names::{crypt, WldNames};

mod actor;
mod animation;
mod camera;
mod light;
mod material;
mod mesh;
mod particle;
mod world;

pub use actor::{
    Actor, ActorAction, ActorDef, ACTOR_HAS_BOUNDING_RADIUS, ACTOR_HAS_CURRENT_ACTION,
    ACTOR_HAS_LOCATION, ACTOR_HAS_SCALE_FACTOR, ACTOR_HAS_SOUND,
};
pub use animation::{
    Dag, HierarchicalSprite, HierarchicalSpriteDef, Track, TrackDef, TrackTransform,
};
pub use camera::{Sprite3D, Sprite3DBspNode, Sprite3DDef, Sprite3DUvInfo};
pub use light::{AmbientLight, GlobalAmbientLightDef, Light, LightDef, PointLight};
pub use material::{
    BlitSpriteDef, BmInfo, MaterialDef, MaterialPalette, SimpleSprite, SimpleSpriteDef,
};
pub use mesh::{DmSprite, DmSpriteDef2, MeshFace, MeshOp, Sphere};
pub use particle::{
    ParticleCloudDef, PARTICLE_MOVEMENT_NONE, PARTICLE_MOVEMENT_PLANE, PARTICLE_MOVEMENT_SPHERE,
    PARTICLE_MOVEMENT_STREAM,
};
pub use world::{
    Region, RegionObstacle, RegionWall, VisList, VisNode, WorldTree, WorldTreeNode, Zone,
};

/// Magic bytes at the start of every WLD stream.
pub const WLD_HEADER: [u8; 4] = [0x02, 0x3D, 0x50, 0x54];
/// Version of original-era zone files (16-bit fixed-point UVs).
pub const VERSION_OLD_WORLD: u32 = 0x0001_5500;
/// Version of later zone files (float UVs).
pub const VERSION_NEW_WORLD: u32 = 0x1000_C800;

/// One typed fragment of a WLD stream.
///
/// The set is closed: every known code decodes into its own variant and
/// anything else lands in [`Fragment::Unrecognized`] with its raw payload
/// preserved, so a stream round-trips even when it carries fragment kinds
/// this crate does not model.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    BmInfo(BmInfo),
    SimpleSpriteDef(SimpleSpriteDef),
    SimpleSprite(SimpleSprite),
    Sprite3DDef(Sprite3DDef),
    Sprite3D(Sprite3D),
    HierarchicalSpriteDef(HierarchicalSpriteDef),
    HierarchicalSprite(HierarchicalSprite),
    TrackDef(TrackDef),
    Track(Track),
    ActorDef(ActorDef),
    Actor(Actor),
    Sphere(Sphere),
    LightDef(LightDef),
    Light(Light),
    WorldTree(WorldTree),
    Region(Region),
    BlitSpriteDef(BlitSpriteDef),
    PointLight(PointLight),
    Zone(Zone),
    AmbientLight(AmbientLight),
    DmSprite(DmSprite),
    MaterialDef(MaterialDef),
    MaterialPalette(MaterialPalette),
    ParticleCloudDef(ParticleCloudDef),
    GlobalAmbientLightDef(GlobalAmbientLightDef),
    DmSpriteDef2(DmSpriteDef2),
    Unrecognized { code: u32, data: Vec<u8> },
}

impl Fragment {
    /// The wire type code of this fragment.
    pub fn code(&self) -> u32 {
        match self {
            Self::BmInfo(_) => 0x03,
            Self::SimpleSpriteDef(_) => 0x04,
            Self::SimpleSprite(_) => 0x05,
            Self::Sprite3DDef(_) => 0x08,
            Self::Sprite3D(_) => 0x09,
            Self::HierarchicalSpriteDef(_) => 0x10,
            Self::HierarchicalSprite(_) => 0x11,
            Self::TrackDef(_) => 0x12,
            Self::Track(_) => 0x13,
            Self::ActorDef(_) => 0x14,
            Self::Actor(_) => 0x15,
            Self::Sphere(_) => 0x16,
            Self::LightDef(_) => 0x1B,
            Self::Light(_) => 0x1C,
            Self::WorldTree(_) => 0x21,
            Self::Region(_) => 0x22,
            Self::BlitSpriteDef(_) => 0x26,
            Self::PointLight(_) => 0x28,
            Self::Zone(_) => 0x29,
            Self::AmbientLight(_) => 0x2A,
            Self::DmSprite(_) => 0x2D,
            Self::MaterialDef(_) => 0x30,
            Self::MaterialPalette(_) => 0x31,
            Self::ParticleCloudDef(_) => 0x34,
            Self::GlobalAmbientLightDef(_) => 0x35,
            Self::DmSpriteDef2(_) => 0x36,
            Self::Unrecognized { code, .. } => *code,
        }
    }

    /// A short human-readable tag for the fragment kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BmInfo(_) => "BmInfo",
            Self::SimpleSpriteDef(_) => "SimpleSpriteDef",
            Self::SimpleSprite(_) => "SimpleSprite",
            Self::Sprite3DDef(_) => "Sprite3DDef",
            Self::Sprite3D(_) => "Sprite3D",
            Self::HierarchicalSpriteDef(_) => "HierarchicalSpriteDef",
            Self::HierarchicalSprite(_) => "HierarchicalSprite",
            Self::TrackDef(_) => "TrackDef",
            Self::Track(_) => "Track",
            Self::ActorDef(_) => "ActorDef",
            Self::Actor(_) => "Actor",
            Self::Sphere(_) => "Sphere",
            Self::LightDef(_) => "LightDef",
            Self::Light(_) => "Light",
            Self::WorldTree(_) => "WorldTree",
            Self::Region(_) => "Region",
            Self::BlitSpriteDef(_) => "BlitSpriteDef",
            Self::PointLight(_) => "PointLight",
            Self::Zone(_) => "Zone",
            Self::AmbientLight(_) => "AmbientLight",
            Self::DmSprite(_) => "DmSprite",
            Self::MaterialDef(_) => "MaterialDef",
            Self::MaterialPalette(_) => "MaterialPalette",
            Self::ParticleCloudDef(_) => "ParticleCloudDef",
            Self::GlobalAmbientLightDef(_) => "GlobalAmbientLightDef",
            Self::DmSpriteDef2(_) => "DmSpriteDef2",
            Self::Unrecognized { .. } => "Unrecognized",
        }
    }

    fn parse(code: u32, payload: &[u8], index: usize, is_new_world: bool) -> Result<Self> {
        let r = &mut &payload[..];
        let frag = match code {
            0x03 => Self::BmInfo(BmInfo::read(r)?),
            0x04 => Self::SimpleSpriteDef(SimpleSpriteDef::read(r)?),
            0x05 => Self::SimpleSprite(SimpleSprite::read(r)?),
            0x08 => Self::Sprite3DDef(Sprite3DDef::read(r)?),
            0x09 => Self::Sprite3D(Sprite3D::read(r)?),
            0x10 => Self::HierarchicalSpriteDef(HierarchicalSpriteDef::read(r)?),
            0x11 => Self::HierarchicalSprite(HierarchicalSprite::read(r)?),
            0x12 => Self::TrackDef(TrackDef::read(r)?),
            0x13 => Self::Track(Track::read(r)?),
            0x14 => Self::ActorDef(ActorDef::read(r)?),
            0x15 => Self::Actor(Actor::read(r)?),
            0x16 => Self::Sphere(Sphere::read(r)?),
            0x1B => Self::LightDef(LightDef::read(r)?),
            0x1C => Self::Light(Light::read(r)?),
            0x21 => Self::WorldTree(WorldTree::read(r)?),
            0x22 => Self::Region(Region::read(r)?),
            0x26 => Self::BlitSpriteDef(BlitSpriteDef::read(r)?),
            0x28 => Self::PointLight(PointLight::read(r)?),
            0x29 => Self::Zone(Zone::read(r)?),
            0x2A => Self::AmbientLight(AmbientLight::read(r)?),
            0x2D => Self::DmSprite(DmSprite::read(r)?),
            0x30 => Self::MaterialDef(MaterialDef::read(r)?),
            0x31 => Self::MaterialPalette(MaterialPalette::read(r)?),
            0x34 => Self::ParticleCloudDef(ParticleCloudDef::read(r)?),
            0x35 => Self::GlobalAmbientLightDef(GlobalAmbientLightDef::read(r)?),
            0x36 => Self::DmSpriteDef2(DmSpriteDef2::read(r, is_new_world)?),
            _ => {
                log::debug!("fragment {index}: unrecognized code {code:#04x}, keeping raw");
                Self::Unrecognized {
                    code,
                    data: payload.to_vec(),
                }
            }
        };
        Ok(frag)
    }

    /// Serializes the fragment payload, padded to a 4-byte boundary.
    fn to_payload(&self, is_new_world: bool) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::BmInfo(f) => f.write(&mut buf)?,
            Self::SimpleSpriteDef(f) => f.write(&mut buf)?,
            Self::SimpleSprite(f) => f.write(&mut buf)?,
            Self::Sprite3DDef(f) => f.write(&mut buf)?,
            Self::Sprite3D(f) => f.write(&mut buf)?,
            Self::HierarchicalSpriteDef(f) => f.write(&mut buf)?,
            Self::HierarchicalSprite(f) => f.write(&mut buf)?,
            Self::TrackDef(f) => f.write(&mut buf)?,
            Self::Track(f) => f.write(&mut buf)?,
            Self::ActorDef(f) => f.write(&mut buf)?,
            Self::Actor(f) => f.write(&mut buf)?,
            Self::Sphere(f) => f.write(&mut buf)?,
            Self::LightDef(f) => f.write(&mut buf)?,
            Self::Light(f) => f.write(&mut buf)?,
            Self::WorldTree(f) => f.write(&mut buf)?,
            Self::Region(f) => f.write(&mut buf)?,
            Self::BlitSpriteDef(f) => f.write(&mut buf)?,
            Self::PointLight(f) => f.write(&mut buf)?,
            Self::Zone(f) => f.write(&mut buf)?,
            Self::AmbientLight(f) => f.write(&mut buf)?,
            Self::DmSprite(f) => f.write(&mut buf)?,
            Self::MaterialDef(f) => f.write(&mut buf)?,
            Self::MaterialPalette(f) => f.write(&mut buf)?,
            Self::ParticleCloudDef(f) => f.write(&mut buf)?,
            Self::GlobalAmbientLightDef(f) => f.write(&mut buf)?,
            Self::DmSpriteDef2(f) => f.write(&mut buf, is_new_world)?,
            Self::Unrecognized { data, .. } => buf.extend_from_slice(data),
        }
        buf.resize(buf.len().next_multiple_of(4), 0);
        Ok(buf)
    }
}

/// A decoded WLD stream: header metadata, the shared name table and the
/// ordered fragment list.
#[derive(Debug, Default, Clone)]
pub struct Wld {
    /// True for `VERSION_NEW_WORLD` streams
    pub is_new_world: bool,
    /// Region count from the header; recomputed on write
    pub bsp_region_count: u32,
    /// String count field from the header; preserved verbatim
    pub string_count: u32,
    /// Shared name table
    pub names: WldNames,
    /// Fragments in stream order. The first element is fragment index 1.
    pub fragments: Vec<Fragment>,
}

impl Wld {
    /// Reads a WLD stream.
    pub fn read(r: &mut impl Read) -> Result<Self> {
        let mut header = [0u8; 4];
        r.read_exact(&mut header)?;
        if header != WLD_HEADER {
            return Err(Error::InvalidHeader { found: header });
        }
        let version = r.read_u32_le()?;
        let is_new_world = match version {
            VERSION_OLD_WORLD => false,
            VERSION_NEW_WORLD => true,
            other => return Err(Error::UnsupportedVersion(other)),
        };
        let fragment_count = r.read_u32_le()?;
        let bsp_region_count = r.read_u32_le()?;
        let max_frag_size = r.read_u32_le()?;
        let hash_size = r.read_u32_le()?;
        let string_count = r.read_u32_le()?;

        let mut name_data = r.read_bytes(hash_size as usize)?;
        crypt(&mut name_data);
        let names = WldNames::parse(&name_data);

        let mut fragments = Vec::with_capacity(fragment_count as usize);
        for i in 0..fragment_count {
            let index = i as usize + 1;
            let size = r.read_u32_le()?;
            let code = r.read_u32_le()?;
            if size > max_frag_size {
                return Err(Error::FragmentTooLarge {
                    index,
                    size,
                    max: max_frag_size,
                });
            }
            let payload = r.read_bytes(size as usize)?;
            let fragment =
                Fragment::parse(code, &payload, index, is_new_world).map_err(|e| match e {
                    e @ (Error::InvalidFragment { .. } | Error::NameNotFound { .. }) => e,
                    other => Error::InvalidFragment {
                        index,
                        kind: "fragment",
                        reason: other.to_string(),
                    },
                })?;
            fragments.push(fragment);
        }

        let region_count = fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Region(_)))
            .count() as u32;
        if region_count != bsp_region_count {
            log::warn!(
                "header declares {bsp_region_count} bsp regions, stream contains {region_count}"
            );
        }

        Ok(Self {
            is_new_world,
            bsp_region_count,
            string_count,
            names,
            fragments,
        })
    }

    /// Writes the stream. Fragment count, region count, maximum fragment
    /// size and hash size are recomputed from the current contents.
    pub fn write(&self, w: &mut impl Write) -> Result<()> {
        let mut frag_buf = Vec::new();
        let mut max_frag_size = 0u32;
        for fragment in &self.fragments {
            let payload = fragment.to_payload(self.is_new_world)?;
            max_frag_size = max_frag_size.max(payload.len() as u32);
            frag_buf.write_u32_le(payload.len() as u32)?;
            frag_buf.write_u32_le(fragment.code())?;
            frag_buf.extend_from_slice(&payload);
        }
        let region_count = self
            .fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Region(_)))
            .count() as u32;

        w.write_all(&WLD_HEADER)?;
        w.write_u32_le(if self.is_new_world {
            VERSION_NEW_WORLD
        } else {
            VERSION_OLD_WORLD
        })?;
        w.write_u32_le(self.fragments.len() as u32)?;
        w.write_u32_le(region_count)?;
        w.write_u32_le(max_frag_size)?;
        let mut name_data = self.names.data().to_vec();
        w.write_u32_le(name_data.len() as u32)?;
        w.write_u32_le(self.string_count)?;
        crypt(&mut name_data);
        w.write_all(&name_data)?;
        w.write_all(&frag_buf)?;
        Ok(())
    }

    /// Looks up a fragment by 1-based index.
    pub fn fragment(&self, index: u32) -> Option<&Fragment> {
        if index == 0 {
            return None;
        }
        self.fragments.get(index as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_stream() -> Wld {
        let mut names = WldNames::new();
        let bm_ref = names.add("FIRE1_BMINFO");
        let sprite_ref = names.add("FIRE1_SPRITE");
        let inst_ref = names.add("FIRE1_SPRITE_INST");
        Wld {
            is_new_world: false,
            names,
            fragments: vec![
                Fragment::BmInfo(BmInfo {
                    name_ref: bm_ref,
                    texture_names: vec!["fire1.bmp".into()],
                }),
                Fragment::SimpleSpriteDef(SimpleSpriteDef {
                    name_ref: sprite_ref,
                    flags: 0,
                    bitmap_refs: vec![1],
                    ..SimpleSpriteDef::default()
                }),
                Fragment::SimpleSprite(SimpleSprite {
                    name_ref: inst_ref,
                    sprite_ref: 2,
                    flags: 0x50,
                }),
            ],
            ..Wld::default()
        }
    }

    #[test]
    fn stream_round_trip() {
        let wld = sample_stream();
        let mut buf = Vec::new();
        wld.write(&mut buf).unwrap();
        let reread = Wld::read(&mut &buf[..]).unwrap();
        assert_eq!(reread.fragments, wld.fragments);
        assert!(!reread.is_new_world);
        assert_eq!(reread.names.resolve(-14).unwrap(), Some("FIRE1_SPRITE"));
    }

    #[test]
    fn rejects_bad_header() {
        let err = Wld::read(&mut &b"NOPE....."[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&WLD_HEADER);
        buf.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 20]);
        let err = Wld::read(&mut &buf[..]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(0xDEAD_BEEF)));
    }

    #[test]
    fn unrecognized_fragment_survives_round_trip() {
        let mut wld = sample_stream();
        wld.fragments.push(Fragment::Unrecognized {
            code: 0x17,
            data: vec![1, 2, 3, 4],
        });
        let mut buf = Vec::new();
        wld.write(&mut buf).unwrap();
        let reread = Wld::read(&mut &buf[..]).unwrap();
        assert_eq!(
            reread.fragments.last(),
            Some(&Fragment::Unrecognized {
                code: 0x17,
                data: vec![1, 2, 3, 4],
            })
        );
    }

    #[test]
    fn oversized_fragment_is_rejected() {
        let wld = sample_stream();
        let mut buf = Vec::new();
        wld.write(&mut buf).unwrap();
        // inflate the first fragment's declared size past the header maximum
        let hash_size = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]) as usize;
        let frag_start = 28 + hash_size;
        buf[frag_start..frag_start + 4].copy_from_slice(&0xFFFFu32.to_le_bytes());
        let err = Wld::read(&mut &buf[..]).unwrap_err();
        assert!(matches!(err, Error::FragmentTooLarge { index: 1, .. }));
    }

    #[test]
    fn track_def_frame_encodings() {
        let frames = vec![TrackTransform {
            rotate_denominator: 100,
            rotate: [1, -2, 3],
            shift_denominator: 50,
            shift: [-4, 5, -6],
        }];
        for flags in [0u32, 0x08] {
            let def = TrackDef {
                name_ref: 0,
                flags,
                transforms: frames.clone(),
            };
            let mut buf = Vec::new();
            def.write(&mut buf).unwrap();
            let expected = 12 + if flags & 0x08 != 0 { 8 } else { 16 };
            assert_eq!(buf.len(), expected);
            let reread = TrackDef::read(&mut &buf[..]).unwrap();
            assert_eq!(reread, def);
        }
    }
}
