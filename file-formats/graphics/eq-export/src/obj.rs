//! Wavefront OBJ/MTL text export.
//!
//! One `v`/`vt`/`vn` triplet per vertex in declaration order. Faces are
//! grouped by contiguous runs of the same material: `usemtl` is emitted
//! on every material change, not deduplicated globally, so a triangle
//! list A,A,B,A produces three `usemtl` lines. OBJ indices are 1-based.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use eq_eqg::model::{Material, Triangle, Vertex};

use crate::error::{Error, Result};
use crate::diffuse_texture;

/// Writes `<name>.obj` and `<name>.mtl` into `dir`.
pub fn export(
    dir: &Path,
    name: &str,
    vertices: &[Vertex],
    triangles: &[Triangle],
    materials: &[Material],
) -> Result<()> {
    let mut obj = BufWriter::new(File::create(dir.join(format!("{name}.obj")))?);
    write_obj(&mut obj, name, vertices, triangles)?;
    obj.flush()?;

    let mut mtl = BufWriter::new(File::create(dir.join(format!("{name}.mtl")))?);
    write_mtl(&mut mtl, materials)?;
    mtl.flush()?;
    Ok(())
}

/// Writes the OBJ geometry stream.
pub fn write_obj(
    w: &mut impl Write,
    name: &str,
    vertices: &[Vertex],
    triangles: &[Triangle],
) -> Result<()> {
    for triangle in triangles {
        for index in triangle.index {
            if index as usize >= vertices.len() {
                return Err(Error::VertexOutOfRange {
                    index,
                    count: vertices.len(),
                });
            }
        }
    }

    writeln!(w, "# exported by everquest-rs")?;
    writeln!(w)?;
    writeln!(w, "mtllib {name}.mtl")?;
    writeln!(w, "o {name}")?;
    for v in vertices {
        writeln!(
            w,
            "v {:.6} {:.6} {:.6}",
            v.position.x, v.position.y, v.position.z
        )?;
    }
    for v in vertices {
        writeln!(w, "vt {:.6} {:.6}", v.uv.x, v.uv.y)?;
    }
    for v in vertices {
        writeln!(
            w,
            "vn {:.6} {:.6} {:.6}",
            v.normal.x, v.normal.y, v.normal.z
        )?;
    }

    let mut last_material: Option<&str> = None;
    let mut group = 0usize;
    for triangle in triangles {
        if last_material != Some(triangle.material_name.as_str()) {
            last_material = Some(triangle.material_name.as_str());
            writeln!(w, "usemtl {}", triangle.material_name)?;
            writeln!(w, "s off")?;
            writeln!(w, "g piece{group}")?;
            group += 1;
        }
        let [a, b, c] = triangle.index.map(|i| i + 1);
        writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

/// Writes the MTL companion: one entry per material, with its diffuse
/// texture map when the material names one.
pub fn write_mtl(w: &mut impl Write, materials: &[Material]) -> Result<()> {
    writeln!(w, "# exported by everquest-rs")?;
    for material in materials {
        writeln!(w)?;
        writeln!(w, "newmtl {}", material.name)?;
        writeln!(w, "Ka 1.000000 1.000000 1.000000")?;
        writeln!(w, "Kd 1.000000 1.000000 1.000000")?;
        writeln!(w, "d 1.000000")?;
        writeln!(w, "illum 2")?;
        if let Some(texture) = diffuse_texture(material) {
            writeln!(w, "map_Kd {texture}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eq_eqg::model::{MaterialProperty, PropertyValue};
    use glam::{Vec2, Vec3};
    use pretty_assertions::assert_eq;

    fn quad_vertices() -> Vec<Vertex> {
        (0..4)
            .map(|i| Vertex {
                position: Vec3::new(i as f32, 0.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::new(i as f32, 0.0),
                ..Vertex::default()
            })
            .collect()
    }

    fn tri(material: &str) -> Triangle {
        Triangle {
            index: [0, 1, 2],
            material_name: material.into(),
            flags: 0,
        }
    }

    #[test]
    fn usemtl_emitted_per_contiguous_run() {
        let vertices = quad_vertices();
        let triangles = vec![tri("A"), tri("A"), tri("B"), tri("A")];
        let mut out = Vec::new();
        write_obj(&mut out, "test", &vertices, &triangles).unwrap();
        let text = String::from_utf8(out).unwrap();

        let usemtl: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("usemtl "))
            .collect();
        assert_eq!(usemtl, vec!["usemtl A", "usemtl B", "usemtl A"]);
        assert_eq!(text.lines().filter(|l| *l == "s off").count(), 3);
        assert!(text.contains("g piece2"));
    }

    #[test]
    fn face_indices_are_one_based() {
        let vertices = quad_vertices();
        let triangles = vec![Triangle {
            index: [0, 2, 3],
            material_name: "A".into(),
            flags: 0,
        }];
        let mut out = Vec::new();
        write_obj(&mut out, "test", &vertices, &triangles).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("f 1/1/1 3/3/3 4/4/4"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let vertices = quad_vertices();
        let triangles = vec![Triangle {
            index: [0, 1, 9],
            material_name: "A".into(),
            flags: 0,
        }];
        let mut out = Vec::new();
        let err = write_obj(&mut out, "test", &vertices, &triangles).unwrap_err();
        assert!(matches!(
            err,
            Error::VertexOutOfRange { index: 9, count: 4 }
        ));
    }

    #[test]
    fn mtl_lists_diffuse_maps() {
        let materials = vec![Material {
            id: 0,
            name: "STONE".into(),
            shader_name: "Opaque_MaxCB1.fx".into(),
            properties: vec![MaterialProperty {
                name: "e_TextureDiffuse0".into(),
                value: PropertyValue::Name("stone.dds".into()),
            }],
        }];
        let mut out = Vec::new();
        write_mtl(&mut out, &materials).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("newmtl STONE"));
        assert!(text.contains("map_Kd stone.dds"));
    }
}
