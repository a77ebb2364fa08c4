#[cfg(test)]
mod tests {
    use super::super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Hero {
        name: String,
        hp: i32,
        alive: bool,
    }

    /// A value whose serialization always fails, to drive the skip path.
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("not encodable"))
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = RedoRecord::new(42, "UpdateProfile", 1000);
        assert_eq!(record.uid(), 42);
        assert_eq!(record.api(), "UpdateProfile");
        assert_eq!(record.ts(), 1000);
        assert!(record.changes().is_empty());
    }

    #[test]
    fn test_scalar_and_struct_values_round_trip() {
        let doc = encode_value(&"Alice").unwrap();
        assert_eq!(decode_value::<String>(&doc).unwrap(), "Alice");

        let doc = encode_value(&30i32).unwrap();
        assert_eq!(decode_value::<i32>(&doc).unwrap(), 30);

        let hero = Hero {
            name: "Kyla".to_string(),
            hp: 77,
            alive: true,
        };
        let doc = encode_value(&hero).unwrap();
        assert_eq!(decode_value::<Hero>(&doc).unwrap(), hero);
    }

    #[test]
    fn test_changes_keep_insertion_order() {
        let mut record = RedoRecord::new(7, "RenameUser", 2000);
        record.add_change("users", "name", &"Alice");
        record.add_change("users", "age", &30i32);

        let changes = record.changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].collection, "users");
        assert_eq!(changes[0].field, "name");
        assert_eq!(changes[0].decode::<String>().unwrap(), "Alice");
        assert_eq!(changes[1].field, "age");
        assert_eq!(changes[1].decode::<i32>().unwrap(), 30);
    }

    #[test]
    fn test_failed_value_encoding_leaves_record_untouched() {
        let mut record = RedoRecord::new(7, "RenameUser", 2000);
        record.add_change("users", "bad", &Unencodable);
        assert!(record.changes().is_empty());

        // The record stays usable after a refused change.
        record.add_change("users", "name", &"Bob");
        assert_eq!(record.changes().len(), 1);
        assert_eq!(record.changes()[0].field, "name");
    }

    #[test]
    fn test_envelope_uses_wire_field_names() {
        let mut record = RedoRecord::new(42, "UpdateProfile", 1000);
        record.add_change("users", "name", &"Alice");

        let pack = rmp_serde::to_vec_named(&record).unwrap();
        for key in [
            b"API".as_slice(),
            b"UID".as_slice(),
            b"TS".as_slice(),
            b"Changes".as_slice(),
            b"Collection".as_slice(),
            b"Field".as_slice(),
            b"Doc".as_slice(),
        ] {
            assert!(
                contains(&pack, key),
                "envelope is missing key {:?}",
                String::from_utf8_lossy(key)
            );
        }
    }

    #[test]
    fn test_envelope_round_trips_through_msgpack() {
        let mut record = RedoRecord::new(-3, "Purchase", u64::MAX);
        record.add_change("inventory", "items.0.count", &5i32);

        let pack = rmp_serde::to_vec_named(&record).unwrap();
        let back: RedoRecord = rmp_serde::from_slice(&pack).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.changes()[0].decode::<i32>().unwrap(), 5);
    }
}
