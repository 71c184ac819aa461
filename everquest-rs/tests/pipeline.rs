//! End-to-end archive pipeline tests

use std::io::Cursor;

use eq_eqg::{Ani, AniBone};
use eq_pfs::Archive;
use glam::Vec3;
use pretty_assertions::assert_eq;

#[test]
fn archive_carries_a_decodable_animation() {
    let ani = Ani {
        version: 0,
        is_strict: false,
        bones: vec![AniBone {
            name: "root".into(),
            frame_count: 1,
            delay: 100,
            translation: Vec3::new(0.0, 0.0, 1.5),
            ..AniBone::default()
        }],
    };
    let mut ani_data = Vec::new();
    ani.write(&mut ani_data).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chr.eqg");
    let mut archive = Archive::new();
    archive.add("c01walk.ani", ani_data);
    archive.save(&path).unwrap();

    let reopened = Archive::open(&path).unwrap();
    let decoded = Ani::read(&mut Cursor::new(reopened.file("c01walk.ani").unwrap())).unwrap();
    assert_eq!(decoded, ani);
    assert_eq!(decoded.bones[0].name, "root");
    assert_eq!(decoded.bones[0].delay, 100);
}
