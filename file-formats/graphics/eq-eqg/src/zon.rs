//! ZON zone manifests.
//!
//! Two flavors share the extension: the binary `"EQGZ"` layout (models,
//! placeable objects, regions, lights) and the version 4 text `"EQTZ"`
//! layout of `*KEY value` lines. `read` dispatches on the magic.
//!
//! Object positions are stored Y-then-X-then-Z on disk; the decoded
//! struct always holds x/y/z in the conventional order.

use std::io::{BufRead, BufReader, Read, Write};

use glam::Vec3;

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::name::NameTable;

const MAGIC: &str = "EQGZ";
const MAGIC_V4: &str = "EQTZ";

/// A decoded zone manifest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Zon {
    pub version: u32,
    pub models: Vec<String>,
    pub objects: Vec<ZonObject>,
    pub regions: Vec<ZonRegion>,
    pub lights: Vec<ZonLight>,
    /// Present only for v4 text zones
    pub v4_info: Option<V4Info>,
}

/// A placed model instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZonObject {
    pub model_name: String,
    pub instance_name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    /// Per-vertex baked lighting, v2 and later
    pub lits: Vec<[u8; 4]>,
}

/// An axis-aligned named region
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZonRegion {
    pub name: String,
    pub center: Vec3,
    pub unknown: Vec3,
    pub extent: Vec3,
}

/// A point light
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZonLight {
    pub name: String,
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
}

/// Header block of a v4 text zone
#[derive(Debug, Clone, PartialEq, Default)]
pub struct V4Info {
    pub name: String,
    pub min_lng: i32,
    pub max_lng: i32,
    pub min_lat: i32,
    pub max_lat: i32,
    pub min_extents: Vec3,
    pub max_extents: Vec3,
    pub units_per_vert: f32,
    pub quads_per_tile: i32,
    pub cover_map_input_size: i32,
    pub layering_map_input_size: i32,
}

impl Zon {
    /// Reads a ZON file, binary or v4 text
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic == MAGIC_V4 {
            return Self::read_v4(reader);
        }
        if magic != MAGIC {
            return Err(Error::InvalidMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let name_length = reader.read_u32_le()?;
        let model_count = reader.read_u32_le()?;
        let object_count = reader.read_u32_le()?;
        let region_count = reader.read_u32_le()?;
        let light_count = reader.read_u32_le()?;
        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let mut models = Vec::with_capacity(model_count as usize);
        for _ in 0..model_count {
            models.push(names.get_or_unknown(reader.read_i32_le()?));
        }

        let mut objects = Vec::with_capacity(object_count as usize);
        for i in 0..object_count {
            let model_index = reader.read_i32_le()?;
            if model_index < 0 || model_index as usize >= models.len() {
                return Err(Error::invalid_record(format!(
                    "object {i} model index {model_index} out of range ({})",
                    models.len()
                )));
            }
            let model_name = models[model_index as usize].clone();
            let instance_name = names.get_or_unknown(reader.read_i32_le()?);

            let y = reader.read_f32_le()?;
            let x = reader.read_f32_le()?;
            let z = reader.read_f32_le()?;
            let rotation = reader.read_vec3_le()?;
            let scale = reader.read_f32_le()?;

            let mut lits = Vec::new();
            if version >= 2 {
                let lit_count = reader.read_u32_le()?;
                lits.reserve(lit_count as usize);
                for _ in 0..lit_count {
                    lits.push([
                        reader.read_u8()?,
                        reader.read_u8()?,
                        reader.read_u8()?,
                        reader.read_u8()?,
                    ]);
                }
            }

            objects.push(ZonObject {
                model_name,
                instance_name,
                position: Vec3::new(x, y, z),
                rotation,
                scale,
                lits,
            });
        }

        let mut regions = Vec::with_capacity(region_count as usize);
        for _ in 0..region_count {
            regions.push(ZonRegion {
                name: names.get_or_unknown(reader.read_i32_le()?),
                center: reader.read_vec3_le()?,
                unknown: reader.read_vec3_le()?,
                extent: reader.read_vec3_le()?,
            });
        }

        let mut lights = Vec::with_capacity(light_count as usize);
        for _ in 0..light_count {
            lights.push(ZonLight {
                name: names.get_or_unknown(reader.read_i32_le()?),
                position: reader.read_vec3_le()?,
                color: reader.read_vec3_le()?,
                radius: reader.read_f32_le()?,
            });
        }

        Ok(Self {
            version,
            models,
            objects,
            regions,
            lights,
            v4_info: None,
        })
    }

    /// Writes a binary ZON file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if let Some(info) = &self.v4_info {
            return Self::write_v4(info, writer);
        }

        let mut names = NameTable::new();
        for model in &self.models {
            names.add(model);
        }
        for object in &self.objects {
            names.add(&object.instance_name);
        }
        for region in &self.regions {
            names.add(&region.name);
        }
        for light in &self.lights {
            names.add(&light.name);
        }

        writer.write_all(MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.models.len() as u32)?;
        writer.write_u32_le(self.objects.len() as u32)?;
        writer.write_u32_le(self.regions.len() as u32)?;
        writer.write_u32_le(self.lights.len() as u32)?;
        writer.write_all(names.data())?;

        for model in &self.models {
            writer.write_i32_le(names.offset_of(model).unwrap_or(0) as i32)?;
        }

        for object in &self.objects {
            let model_index = self
                .models
                .iter()
                .position(|m| *m == object.model_name)
                .ok_or_else(|| {
                    Error::invalid_record(format!(
                        "object references model '{}' not in the model list",
                        object.model_name
                    ))
                })?;
            writer.write_i32_le(model_index as i32)?;
            writer.write_i32_le(names.offset_of(&object.instance_name).unwrap_or(0) as i32)?;

            writer.write_f32_le(object.position.y)?;
            writer.write_f32_le(object.position.x)?;
            writer.write_f32_le(object.position.z)?;
            writer.write_vec3_le(object.rotation)?;
            writer.write_f32_le(object.scale)?;

            if self.version >= 2 {
                writer.write_u32_le(object.lits.len() as u32)?;
                for lit in &object.lits {
                    writer.write_all(lit)?;
                }
            }
        }

        for region in &self.regions {
            writer.write_i32_le(names.offset_of(&region.name).unwrap_or(0) as i32)?;
            writer.write_vec3_le(region.center)?;
            writer.write_vec3_le(region.unknown)?;
            writer.write_vec3_le(region.extent)?;
        }

        for light in &self.lights {
            writer.write_i32_le(names.offset_of(&light.name).unwrap_or(0) as i32)?;
            writer.write_vec3_le(light.position)?;
            writer.write_vec3_le(light.color)?;
            writer.write_f32_le(light.radius)?;
        }
        Ok(())
    }

    /// Reads the text v4 layout; the magic has already been consumed
    fn read_v4<R: Read>(reader: &mut R) -> Result<Self> {
        let mut info = V4Info::default();
        let buffered = BufReader::new(reader);
        for (line_number, line) in buffered.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            let fields: Vec<&str> = line.split(' ').collect();
            let key = fields.first().copied().unwrap_or("");

            let parse_err = |what: &str, cause: String| {
                Error::invalid_record(format!("line {}: {what}: {cause}", line_number + 1))
            };

            match key {
                "*NAME" => {
                    info.name = line.strip_prefix("*NAME ").unwrap_or("").to_string();
                }
                "*MINLNG" => {
                    if fields.len() < 4 {
                        return Err(parse_err("MINLNG", "not enough values".to_string()));
                    }
                    info.min_lng = fields[1]
                        .parse()
                        .map_err(|e: std::num::ParseIntError| parse_err("MINLNG", e.to_string()))?;
                    info.max_lng = fields[3]
                        .parse()
                        .map_err(|e: std::num::ParseIntError| parse_err("MAXLNG", e.to_string()))?;
                }
                "*MINLAT" => {
                    if fields.len() < 4 {
                        return Err(parse_err("MINLAT", "not enough values".to_string()));
                    }
                    info.min_lat = fields[1]
                        .parse()
                        .map_err(|e: std::num::ParseIntError| parse_err("MINLAT", e.to_string()))?;
                    info.max_lat = fields[3]
                        .parse()
                        .map_err(|e: std::num::ParseIntError| parse_err("MAXLAT", e.to_string()))?;
                }
                "*MIN_EXTENTS" => {
                    info.min_extents = parse_vec3(&fields[1..])
                        .map_err(|e| parse_err("MIN_EXTENTS", e))?;
                }
                "*MAX_EXTENTS" => {
                    info.max_extents = parse_vec3(&fields[1..])
                        .map_err(|e| parse_err("MAX_EXTENTS", e))?;
                }
                "*UNITSPERVERT" => {
                    info.units_per_vert = parse_field(&fields, 1)
                        .map_err(|e| parse_err("UNITSPERVERT", e))?;
                }
                "*QUADSPERTILE" => {
                    info.quads_per_tile = parse_field(&fields, 1)
                        .map_err(|e| parse_err("QUADSPERTILE", e))?;
                }
                "*COVERMAPINPUTSIZE" => {
                    info.cover_map_input_size = parse_field(&fields, 1)
                        .map_err(|e| parse_err("COVERMAPINPUTSIZE", e))?;
                }
                "*LAYERINGMAPINPUTSIZE" => {
                    info.layering_map_input_size = parse_field(&fields, 1)
                        .map_err(|e| parse_err("LAYERINGMAPINPUTSIZE", e))?;
                }
                _ => {}
            }
        }

        Ok(Self {
            version: 4,
            v4_info: Some(info),
            ..Self::default()
        })
    }

    fn write_v4<W: Write>(info: &V4Info, writer: &mut W) -> Result<()> {
        writer.write_all(MAGIC_V4.as_bytes())?;
        writeln!(writer, "*NAME {}", info.name)?;
        writeln!(writer, "*MINLNG {} *MAXLNG {}", info.min_lng, info.max_lng)?;
        writeln!(writer, "*MINLAT {} *MAXLAT {}", info.min_lat, info.max_lat)?;
        writeln!(
            writer,
            "*MIN_EXTENTS {} {} {}",
            info.min_extents.x, info.min_extents.y, info.min_extents.z
        )?;
        writeln!(
            writer,
            "*MAX_EXTENTS {} {} {}",
            info.max_extents.x, info.max_extents.y, info.max_extents.z
        )?;
        writeln!(writer, "*UNITSPERVERT {}", info.units_per_vert)?;
        writeln!(writer, "*QUADSPERTILE {}", info.quads_per_tile)?;
        writeln!(writer, "*COVERMAPINPUTSIZE {}", info.cover_map_input_size)?;
        writeln!(
            writer,
            "*LAYERINGMAPINPUTSIZE {}",
            info.layering_map_input_size
        )?;
        Ok(())
    }
}

fn parse_vec3(fields: &[&str]) -> std::result::Result<Vec3, String> {
    if fields.len() < 3 {
        return Err("not enough values".to_string());
    }
    let x: f32 = fields[0].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    let y: f32 = fields[1].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    let z: f32 = fields[2].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    Ok(Vec3::new(x, y, z))
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], index: usize) -> std::result::Result<T, String>
where
    T::Err: std::fmt::Display,
{
    fields
        .get(index)
        .ok_or_else(|| "missing value".to_string())?
        .parse()
        .map_err(|e: T::Err| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample() -> Zon {
        Zon {
            version: 2,
            models: vec!["hills.ter".to_string(), "tree01.mod".to_string()],
            objects: vec![ZonObject {
                model_name: "tree01.mod".to_string(),
                instance_name: "tree01_inst0".to_string(),
                position: Vec3::new(10.0, -4.5, 101.25),
                rotation: Vec3::new(0.0, 0.0, 1.5),
                scale: 1.0,
                lits: vec![[255, 200, 180, 255], [10, 10, 10, 255]],
            }],
            regions: vec![ZonRegion {
                name: "water_region".to_string(),
                center: Vec3::new(0.0, 0.0, -10.0),
                unknown: Vec3::ZERO,
                extent: Vec3::new(50.0, 50.0, 5.0),
            }],
            lights: vec![ZonLight {
                name: "torch0".to_string(),
                position: Vec3::new(1.0, 2.0, 3.0),
                color: Vec3::new(1.0, 0.6, 0.2),
                radius: 25.0,
            }],
            v4_info: None,
        }
    }

    #[test]
    fn binary_round_trip() {
        let zon = sample();
        let mut buf = Vec::new();
        zon.write(&mut buf).unwrap();
        let read_back = Zon::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, zon);
    }

    #[test]
    fn object_with_unknown_model_fails_encode() {
        let mut zon = sample();
        zon.objects[0].model_name = "missing.mod".to_string();
        let mut buf = Vec::new();
        assert!(zon.write(&mut buf).is_err());
    }

    #[test]
    fn out_of_range_model_index_fails_decode() {
        let zon = sample();
        let mut buf = Vec::new();
        zon.write(&mut buf).unwrap();

        // the first object record starts right after the two model refs;
        // patch its model index to an out-of-range value
        let name_length =
            u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
        let object_start = 28 + name_length + 2 * 4;
        buf[object_start..object_start + 4].copy_from_slice(&9i32.to_le_bytes());
        assert!(matches!(
            Zon::read(&mut Cursor::new(buf)),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn v4_text_round_trip() {
        let info = V4Info {
            name: "thundercrest".to_string(),
            min_lng: -1,
            max_lng: 1,
            min_lat: -2,
            max_lat: 2,
            min_extents: Vec3::new(-1000.0, -1000.0, -100.0),
            max_extents: Vec3::new(1000.0, 1000.0, 500.0),
            units_per_vert: 2.0,
            quads_per_tile: 16,
            cover_map_input_size: 256,
            layering_map_input_size: 1024,
        };
        let zon = Zon {
            version: 4,
            v4_info: Some(info.clone()),
            ..Zon::default()
        };
        let mut buf = Vec::new();
        zon.write(&mut buf).unwrap();
        assert_eq!(&buf[..4], b"EQTZ");

        let read_back = Zon::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.v4_info, Some(info));
    }
}
