//! Entity graph decode/encode properties.

use eq_wld::raw::{self, Fragment, Wld};
use eq_wld::vwld::{
    AmbientLightInstance, Bitmap, BspTree, BspTreeNode, Light, LightInstance, Material,
    MaterialInstance, Mesh, PointLightInstance, Region, RegionInstance, Sprite, SpriteInstance,
    VWld,
};
use eq_wld::Error;
use glam::{Vec3, Vec4};
use pretty_assertions::assert_eq;

/// A reference may only point at an earlier fragment; a forward
/// reference fails naming the offending fragment.
#[test]
fn forward_reference_is_rejected() {
    let mut wld = Wld::default();
    let inst_ref = wld.names.add("FIRE_SPRITE_INST");
    let def_ref = wld.names.add("FIRE_SPRITE");
    wld.fragments = vec![
        Fragment::SimpleSprite(raw::SimpleSprite {
            name_ref: inst_ref,
            sprite_ref: 2,
            flags: 0,
        }),
        Fragment::SimpleSpriteDef(raw::SimpleSpriteDef {
            name_ref: def_ref,
            ..raw::SimpleSpriteDef::default()
        }),
    ];

    let err = VWld::decode(&wld).unwrap_err();
    match err {
        Error::DanglingRef {
            index,
            expected,
            target,
        } => {
            assert_eq!(index, 1);
            assert_eq!(expected, "SimpleSpriteDef");
            assert_eq!(target, 2);
        }
        other => panic!("expected dangling ref error, got {other:?}"),
    }
}

/// Encoding a sprite instance pulls in its definition chain exactly once,
/// in dependency order, and re-decoding reproduces the tags.
#[test]
fn encode_emits_dependency_closure() {
    let graph = VWld {
        bitmaps: vec![Bitmap {
            tag: "FIRE_BMINFO".into(),
            textures: vec!["fire.bmp".into()],
        }],
        sprites: vec![Sprite {
            tag: "FIRE_SPRITE".into(),
            bitmaps: vec!["FIRE_BMINFO".into()],
            ..Sprite::default()
        }],
        sprite_instances: vec![SpriteInstance {
            tag: "FIRE_SPRITE_INST".into(),
            flags: 0x50,
            sprite: "FIRE_SPRITE".into(),
        }],
        ..VWld::default()
    };

    let wld = graph.encode().unwrap();
    let kinds: Vec<&str> = wld.fragments.iter().map(|f| f.kind()).collect();
    assert_eq!(kinds, vec!["BmInfo", "SimpleSpriteDef", "SimpleSprite"]);

    let decoded = VWld::decode(&wld).unwrap();
    assert_eq!(decoded.sprite_instances[0].tag, "FIRE_SPRITE_INST");
    assert_eq!(decoded.sprite_instances[0].sprite, "FIRE_SPRITE");
    assert_eq!(decoded.sprites[0].bitmaps, vec!["FIRE_BMINFO".to_string()]);
}

/// A definition nothing references is never emitted.
#[test]
fn unreferenced_definition_is_dropped() {
    let graph = VWld {
        sprites: vec![
            Sprite {
                tag: "USED_SPRITE".into(),
                ..Sprite::default()
            },
            Sprite {
                tag: "ORPHAN_SPRITE".into(),
                ..Sprite::default()
            },
        ],
        sprite_instances: vec![SpriteInstance {
            tag: "USED_SPRITE_INST".into(),
            flags: 0,
            sprite: "USED_SPRITE".into(),
        }],
        ..VWld::default()
    };

    let wld = graph.encode().unwrap();
    let def_count = wld
        .fragments
        .iter()
        .filter(|f| matches!(f, Fragment::SimpleSpriteDef(_)))
        .count();
    assert_eq!(def_count, 1);
}

/// Two instances of the same definition share one emitted fragment.
#[test]
fn shared_definition_is_encoded_once() {
    let graph = VWld {
        sprites: vec![Sprite {
            tag: "GRASS_SPRITE".into(),
            ..Sprite::default()
        }],
        sprite_instances: vec![
            SpriteInstance {
                tag: "GRASS_A".into(),
                flags: 0,
                sprite: "GRASS_SPRITE".into(),
            },
            SpriteInstance {
                tag: "GRASS_B".into(),
                flags: 0,
                sprite: "GRASS_SPRITE".into(),
            },
        ],
        ..VWld::default()
    };

    let wld = graph.encode().unwrap();
    let def_count = wld
        .fragments
        .iter()
        .filter(|f| matches!(f, Fragment::SimpleSpriteDef(_)))
        .count();
    let inst_count = wld
        .fragments
        .iter()
        .filter(|f| matches!(f, Fragment::SimpleSprite(_)))
        .count();
    assert_eq!(def_count, 1);
    assert_eq!(inst_count, 2);
}

/// An instance naming a definition the graph does not carry fails with
/// the referrer and the missing tag.
#[test]
fn missing_definition_is_reported() {
    let graph = VWld {
        sprite_instances: vec![SpriteInstance {
            tag: "LOST_INST".into(),
            flags: 0,
            sprite: "NO_SUCH_SPRITE".into(),
        }],
        ..VWld::default()
    };

    let err = graph.encode().unwrap_err();
    match err {
        Error::MissingEntity {
            referrer,
            kind,
            tag,
        } => {
            assert_eq!(referrer, "LOST_INST");
            assert_eq!(kind, "Sprite");
            assert_eq!(tag, "NO_SUCH_SPRITE");
        }
        other => panic!("expected missing entity error, got {other:?}"),
    }
}

fn zone_graph() -> VWld {
    VWld {
        global_ambient_light: "DEFAULT_AMBIENT".into(),
        materials: vec![Material {
            tag: "STONE_MDF".into(),
            render_method: 0x80000001,
            brightness: 0.75,
            ..Material::default()
        }],
        material_instances: vec![MaterialInstance {
            tag: "QEYNOS_MP".into(),
            flags: 0,
            materials: vec!["STONE_MDF".into()],
        }],
        meshes: vec![Mesh {
            tag: "R1_DMSPRITEDEF".into(),
            material_instance: "QEYNOS_MP".into(),
            center: Vec3::new(10.0, -4.0, 2.0),
            scale: 5,
            vertices: vec![[0, 0, 0], [32, 0, 0], [0, 32, 0]],
            uvs: vec![[0.0, 0.0], [256.0, 0.0], [0.0, 256.0]],
            normals: vec![[0, 0, 127], [0, 0, 127], [0, 0, 127]],
            faces: vec![raw::MeshFace {
                flags: 0,
                index: [0, 1, 2],
            }],
            face_material_groups: vec![[1, 0]],
            ..Mesh::default()
        }],
        lights: vec![Light {
            tag: "ZONE_LIGHTDEF".into(),
            levels: vec![1.0],
            flags: 0x04,
            ..Light::default()
        }],
        light_instances: vec![LightInstance {
            tag: "ZONE_LIGHT".into(),
            light: "ZONE_LIGHTDEF".into(),
            flags: 0,
        }],
        point_light_instances: vec![PointLightInstance {
            tag: "TORCH1".into(),
            light_instance: "ZONE_LIGHT".into(),
            flags: 0,
            location: Vec3::new(5.0, 5.0, 1.0),
            radius: 25.0,
        }],
        ambient_light_instances: vec![AmbientLightInstance {
            tag: "ZONE_AMBIENT".into(),
            light_instance: "ZONE_LIGHT".into(),
            flags: 0,
            regions: vec!["R1_REGION".into(), "R2_REGION".into()],
        }],
        regions: vec![
            Region {
                tag: "R1_REGION".into(),
                flags: 0x100,
                mesh: "R1_DMSPRITEDEF".into(),
                ..Region::default()
            },
            Region {
                tag: "R2_REGION".into(),
                ..Region::default()
            },
        ],
        bsp_trees: vec![BspTree {
            tag: "ZONE_WORLDTREE".into(),
            nodes: vec![
                BspTreeNode {
                    normal: Vec4::new(1.0, 0.0, 0.0, -12.5),
                    region: String::new(),
                    front: 2,
                    back: 3,
                },
                BspTreeNode {
                    normal: Vec4::ZERO,
                    region: "R1_REGION".into(),
                    front: 0,
                    back: 0,
                },
                BspTreeNode {
                    normal: Vec4::ZERO,
                    region: "R2_REGION".into(),
                    front: 0,
                    back: 0,
                },
            ],
        }],
        region_instances: vec![RegionInstance {
            tag: "WT_ZONE".into(),
            flags: 0,
            regions: vec!["R2_REGION".into()],
            user_data: "WTN__01234000000000".into(),
        }],
        ..VWld::default()
    }
}

/// A zone graph survives encode, byte serialization and re-decode.
#[test]
fn zone_graph_round_trip() {
    let graph = zone_graph();

    let wld = graph.encode().unwrap();
    let mut buf = Vec::new();
    wld.write(&mut buf).unwrap();
    let reread = Wld::read(&mut &buf[..]).unwrap();
    let decoded = VWld::decode(&reread).unwrap();

    assert_eq!(decoded, graph);
}

/// Region ordinals in zones and the partition tree refer to regions in
/// stream order, independent of fragment indices.
#[test]
fn region_ordinals_resolve_to_tags() {
    let wld = zone_graph().encode().unwrap();

    let zone = wld
        .fragments
        .iter()
        .find_map(|f| match f {
            Fragment::Zone(z) => Some(z),
            _ => None,
        })
        .unwrap();
    assert_eq!(zone.regions, vec![1]);

    let tree = wld
        .fragments
        .iter()
        .find_map(|f| match f {
            Fragment::WorldTree(t) => Some(t),
            _ => None,
        })
        .unwrap();
    assert_eq!(tree.nodes[1].region_ref, 1);
    assert_eq!(tree.nodes[2].region_ref, 2);
}
