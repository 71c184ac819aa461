//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use eq_eqg::model::{Material, MaterialProperty, PropertyValue, Triangle, Vertex};
use eq_eqg::{Ani, AniBone, Mod};
use glam::{Vec2, Vec3};

fn cli() -> Command {
    Command::cargo_bin("everquest-rs").unwrap()
}

#[test]
fn help_lists_subcommands() {
    cli().arg("--help").assert().success().stdout(
        predicate::str::contains("pfs")
            .and(predicate::str::contains("wld"))
            .and(predicate::str::contains("convert")),
    );
}

#[test]
fn completions_generate() {
    cli()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("everquest-rs"));
}

#[test]
fn missing_archive_exits_nonzero() {
    cli()
        .args(["pfs", "list", "no_such.eqg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open archive"));
}

#[test]
fn create_list_extract_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("hello.txt");
    fs::write(&input, b"hello world").unwrap();
    let archive = dir.path().join("test.eqg");

    cli()
        .args(["pfs", "create"])
        .arg(&archive)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files"));

    cli()
        .args(["pfs", "list"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello.txt"));

    let out = dir.path().join("out");
    cli()
        .args(["pfs", "extract"])
        .arg(&archive)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(fs::read(out.join("hello.txt")).unwrap(), b"hello world");
}

#[test]
fn eqg_info_reports_animation_bones() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("walk.ani");
    let ani = Ani {
        version: 1,
        is_strict: true,
        bones: vec![AniBone {
            name: "root".into(),
            delay: 100,
            ..AniBone::default()
        }],
    };
    let mut data = Vec::new();
    ani.write(&mut data).unwrap();
    fs::write(&path, data).unwrap();

    cli()
        .args(["eqg", "info"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ANI").and(predicate::str::contains("Bones: 1")));
}

#[test]
fn malformed_model_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.mod");
    fs::write(&path, b"NOPE").unwrap();

    cli()
        .args(["eqg", "info"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse MOD file"));
}

fn sample_mod() -> Mod {
    Mod {
        version: 1,
        materials: vec![Material {
            id: 0,
            name: "STONE".into(),
            shader_name: "Opaque_MaxCB1.fx".into(),
            properties: vec![MaterialProperty {
                name: "e_TextureDiffuse0".into(),
                value: PropertyValue::Name("stone.dds".into()),
            }],
        }],
        vertices: vec![
            Vertex {
                position: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::ZERO,
                ..Vertex::default()
            },
            Vertex {
                position: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::X,
                ..Vertex::default()
            },
            Vertex {
                position: Vec3::new(0.0, 1.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::Y,
                ..Vertex::default()
            },
        ],
        triangles: vec![Triangle {
            index: [0, 1, 2],
            material_name: "STONE".into(),
            flags: 0,
        }],
        bones: Vec::new(),
    }
}

#[test]
fn convert_writes_obj_and_mtl() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rock.mod");
    let mut data = Vec::new();
    sample_mod().write(&mut data).unwrap();
    fs::write(&path, data).unwrap();

    let out = dir.path().join("out");
    cli()
        .arg("convert")
        .arg(&path)
        .args(["--format", "obj", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 models"));

    let obj = fs::read_to_string(out.join("rock.obj")).unwrap();
    assert!(obj.contains("usemtl STONE"));
    let mtl = fs::read_to_string(out.join("rock.mtl")).unwrap();
    assert!(mtl.contains("newmtl STONE"));
}

#[test]
fn convert_writes_gltf_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rock.mod");
    let mut data = Vec::new();
    sample_mod().write(&mut data).unwrap();
    fs::write(&path, data).unwrap();

    let out = dir.path().join("out");
    cli()
        .arg("convert")
        .arg(&path)
        .args(["--format", "gltf", "--output"])
        .arg(&out)
        .assert()
        .success();

    let json = fs::read_to_string(out.join("rock.gltf")).unwrap();
    assert!(json.contains("\"version\": \"2.0\""));
    assert!(out.join("rock.bin").exists());
}
