//! Exporters for EverQuest model data.
//!
//! Two output paths are supported:
//!
//! - [`obj`] writes Wavefront OBJ geometry with an MTL companion file.
//! - [`gltf`] builds a glTF 2.0 document with an external binary buffer
//!   and PNG images converted from the archive's DDS textures.
//!
//! Both take the decoded [`eq_eqg::model`] types as input, so anything
//! that produces [`Vertex`](eq_eqg::model::Vertex) and
//! [`Triangle`](eq_eqg::model::Triangle) lists can be exported.

mod error;
pub mod gltf;
pub mod obj;

pub use error::{Error, Result};

use eq_eqg::model::{Material, PropertyValue};

/// The diffuse texture filename of a material, if it has one.
///
/// Property names are matched case-insensitively; EQG files are not
/// consistent about `e_TextureDiffuse0` casing.
pub fn diffuse_texture(material: &Material) -> Option<&str> {
    texture_property(material, "e_texturediffuse0")
}

/// The normal-map texture filename of a material, if it has one.
pub fn normal_texture(material: &Material) -> Option<&str> {
    texture_property(material, "e_texturenormal0")
}

fn texture_property<'a>(material: &'a Material, name: &str) -> Option<&'a str> {
    material.properties.iter().find_map(|property| {
        match &property.value {
            PropertyValue::Name(value) if property.name.eq_ignore_ascii_case(name) => {
                Some(value.as_str())
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eq_eqg::model::MaterialProperty;

    #[test]
    fn texture_lookup_ignores_case() {
        let material = Material {
            properties: vec![MaterialProperty {
                name: "E_TEXTUREDIFFUSE0".into(),
                value: PropertyValue::Name("grass.dds".into()),
            }],
            ..Material::default()
        };
        assert_eq!(diffuse_texture(&material), Some("grass.dds"));
        assert_eq!(normal_texture(&material), None);
    }

    #[test]
    fn non_name_property_is_skipped() {
        let material = Material {
            properties: vec![MaterialProperty {
                name: "e_TextureDiffuse0".into(),
                value: PropertyValue::Float(1.0),
            }],
            ..Material::default()
        };
        assert_eq!(diffuse_texture(&material), None);
    }
}
