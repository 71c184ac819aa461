//! Name-table round-trip property.

use eq_eqg::NameTable;
use proptest::prelude::*;

proptest! {
    #[test]
    fn parse_inverts_build(
        names in proptest::collection::hash_set("[a-zA-Z0-9_.]{1,24}", 1..32)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut table = NameTable::new();
        let offsets: Vec<u32> = names.iter().map(|n| table.add(n)).collect();

        let parsed = NameTable::parse(table.data());
        for (name, offset) in names.iter().zip(offsets) {
            prop_assert_eq!(parsed.get(offset as i32).unwrap(), name.as_str());
        }
        prop_assert_eq!(parsed.len(), names.len());
    }

    #[test]
    fn duplicate_adds_do_not_grow_the_buffer(name in "[a-z]{1,16}") {
        let mut table = NameTable::new();
        let first = table.add(&name);
        let len = table.data().len();
        prop_assert_eq!(table.add(&name), first);
        prop_assert_eq!(table.data().len(), len);
    }
}
