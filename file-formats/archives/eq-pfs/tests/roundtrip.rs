//! Archive round-trip properties.

use std::io::Cursor;

use eq_pfs::Archive;
use proptest::prelude::*;

fn file_name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{3,12}\\.(mod|ter|zon|dds|txt)"
}

proptest! {
    #[test]
    fn read_write_read_preserves_contents(
        entries in proptest::collection::hash_map(
            file_name(),
            proptest::collection::vec(any::<u8>(), 0..20000),
            1..8,
        )
    ) {
        let mut archive = Archive::new();
        for (name, data) in &entries {
            archive.add(name.clone(), data.clone());
        }

        let mut buf = Cursor::new(Vec::new());
        archive.write(&mut buf).unwrap();
        buf.set_position(0);
        let read_back = Archive::read(&mut buf).unwrap();

        prop_assert_eq!(read_back.len(), entries.len());
        for (name, data) in &entries {
            prop_assert_eq!(read_back.file(name).unwrap(), data.as_slice());
        }
    }

    #[test]
    fn inflate_inverts_deflate(data in proptest::collection::vec(any::<u8>(), 0..30000)) {
        let packed = eq_pfs::deflate(&data).unwrap();
        let unpacked = eq_pfs::inflate(&mut packed.as_slice(), data.len()).unwrap();
        prop_assert_eq!(unpacked, data);
    }
}

#[test]
fn save_and_open_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.eqg");

    let mut archive = Archive::new();
    archive.add("box.mod", b"geometry".to_vec());
    archive.save(&path).unwrap();

    let read_back = Archive::open(&path).unwrap();
    assert_eq!(read_back.len(), 1);
    assert_eq!(read_back.file("box.mod").unwrap(), b"geometry");
}
