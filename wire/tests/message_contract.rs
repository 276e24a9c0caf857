use std::hash::{DefaultHasher, Hash, Hasher};

use proptest::prelude::*;
use wire::{
    BuildError, DecodeError, Enum, HashCache, Message, MessageBuilder, ProtoWriter,
    RECURSION_LIMIT, Repeated, UnknownFields, WireEnum, WireType,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
#[wire(name = "squareup.PhoneType")]
enum PhoneType {
    #[wire(value = 0)]
    Mobile,
    #[wire(value = 1)]
    Home,
    #[wire(value = 2, name = "WORK_PHONE")]
    Work,
}

#[derive(Clone, Debug, Message)]
#[wire(name = "squareup.PhoneNumber")]
struct PhoneNumber {
    #[wire(tag = 1, kind = "string", required)]
    number: Option<String>,
    #[wire(tag = 2, kind = "enum")]
    r#type: Option<PhoneType>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
    #[wire(hash_cache)]
    cached_hash: HashCache,
}

#[derive(Clone, Debug, Message)]
#[wire(name = "squareup.Person")]
struct Person {
    #[wire(tag = 1, kind = "string", required)]
    name: Option<String>,
    #[wire(tag = 2, kind = "int32", required)]
    id: Option<i32>,
    #[wire(tag = 3, kind = "string")]
    email: Option<String>,
    #[wire(tag = 4, kind = "message")]
    phones: Repeated<PhoneNumber>,
    #[wire(tag = 5, kind = "sint32", packed)]
    lucky_numbers: Repeated<i32>,
    #[wire(tag = 6, kind = "bytes")]
    avatar: Option<Vec<u8>>,
    #[wire(tag = 7, kind = "message")]
    best_friend: Option<Box<Person>>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
    #[wire(hash_cache)]
    cached_hash: HashCache,
}

/// Declares tags 1 to 3 only
#[derive(Clone, Debug, Message)]
#[wire(name = "test.Narrow")]
struct Narrow {
    #[wire(tag = 1, kind = "string")]
    a: Option<String>,
    #[wire(tag = 2, kind = "int64")]
    b: Option<i64>,
    #[wire(tag = 3, kind = "bool")]
    c: Option<bool>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
    #[wire(hash_cache)]
    cached_hash: HashCache,
}

/// A newer revision of `Narrow` that added tag 7
#[derive(Clone, Debug, Message)]
#[wire(name = "test.Narrow")]
struct Wide {
    #[wire(tag = 1, kind = "string")]
    a: Option<String>,
    #[wire(tag = 2, kind = "int64")]
    b: Option<i64>,
    #[wire(tag = 3, kind = "bool")]
    c: Option<bool>,
    #[wire(tag = 7, kind = "string")]
    d: Option<String>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
    #[wire(hash_cache)]
    cached_hash: HashCache,
}

/// No cached hash; recomputed on every call
#[derive(Clone, Debug, Message)]
#[wire(name = "test.Tags")]
struct Tags {
    #[wire(tag = 1, kind = "string")]
    values: Repeated<String>,
    #[wire(tag = 2, kind = "enum")]
    kinds: Repeated<PhoneType>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
}

/// Self-recursive with nothing required, so any nesting depth is valid
#[derive(Clone, Debug, Message)]
#[wire(name = "test.Node")]
struct Node {
    #[wire(tag = 1, kind = "message")]
    child: Option<Box<Node>>,
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
}

#[derive(Clone, Debug, Message)]
#[wire(name = "test.Empty")]
struct Empty {
    #[wire(unknown_fields)]
    unknown_fields: UnknownFields,
}

fn phone(number: &str, kind: PhoneType) -> PhoneNumber {
    PhoneNumber::builder()
        .number(number)
        .r#type(kind)
        .build()
        .unwrap()
}

fn alice() -> Person {
    Person::builder()
        .name("Alice")
        .id(1)
        .email("alice@example.com")
        .phones(vec![phone("555-0100", PhoneType::Home)])
        .lucky_numbers(vec![7, -3])
        .build()
        .unwrap()
}

// ============================================================================
// Construction and accessors
// ============================================================================

#[test]
fn test_builder_and_getters() {
    let person = alice();

    assert_eq!(person.name(), Some("Alice"));
    assert_eq!(person.id(), Some(1));
    assert_eq!(person.email(), Some("alice@example.com"));
    assert_eq!(person.phones().len(), 1);
    assert_eq!(person.phones()[0].r#type(), Some(PhoneType::Home));
    assert_eq!(person.lucky_numbers(), [7, -3]);
    assert_eq!(person.avatar(), None);
    assert!(person.best_friend().is_none());
    assert!(person.unknown_fields().is_empty());
    assert_eq!(Person::TYPE_NAME, "squareup.Person");
}

#[test]
fn test_constructor_matches_builder() {
    let built = Narrow::builder().a("x").b(2).build().unwrap();
    let constructed = Narrow::new(Some("x".to_string()), Some(2), None);

    assert_eq!(built, constructed);
    assert_eq!(built.hash_code(), constructed.hash_code());
}

#[test]
fn test_constructor_copies_slices() {
    let mut source = vec!["a".to_string(), "b".to_string()];
    let tags = Tags::new(source.as_slice(), Vec::new());
    source.push("c".to_string());

    assert_eq!(tags.values(), ["a", "b"]);
}

#[test]
fn test_with_unknown_fields_constructor() {
    let mut ledger = UnknownFields::new();
    ledger.add_varint(9, 1);
    let with = Narrow::with_unknown_fields(None, None, None, ledger);
    let without = Narrow::new(None, None, None);

    assert_eq!(with.unknown_fields().tags().collect::<Vec<_>>(), [9]);
    assert_ne!(with, without);
    assert_ne!(with.hash_code(), without.hash_code());
}

// ============================================================================
// Equality and hashing
// ============================================================================

#[test]
fn test_structural_equality() {
    assert_eq!(alice(), alice());
    assert_ne!(alice(), alice().to_builder().email("other").build().unwrap());
    assert_ne!(alice(), alice().to_builder().clear_email().build().unwrap());
}

#[test]
fn test_hash_formula() {
    assert_eq!(Empty::new().hash_code(), 0);

    // 0 * 37 + hash("a"), then an absent int64, then true
    let narrow = Narrow::new(Some("a".to_string()), None, Some(true));
    let expected = (97 * 37) * 37 + 1231;
    assert_eq!(narrow.hash_code(), expected);

    // Empty repeated fields contribute 1 each
    let tags = Tags::new(Vec::new(), Vec::new());
    assert_eq!(tags.hash_code(), 37 + 1);
}

#[test]
fn test_hash_is_stable_and_cached() {
    let person = alice();
    let first = person.hash_code();

    assert_eq!(person.hash_code(), first);
    assert_eq!(person.clone().hash_code(), first);
    assert_eq!(alice().hash_code(), first);
}

#[test]
fn test_std_hash_follows_hash_code() {
    fn std_hash(person: &Person) -> u64 {
        let mut hasher = DefaultHasher::new();
        person.hash(&mut hasher);
        hasher.finish()
    }

    assert_eq!(std_hash(&alice()), std_hash(&alice()));
    assert_ne!(
        std_hash(&alice()),
        std_hash(&alice().to_builder().id(2).build().unwrap())
    );
}

// ============================================================================
// Builder semantics
// ============================================================================

#[test]
fn test_builder_copy_round_trips() {
    let person = alice();
    assert_eq!(person.to_builder().build().unwrap(), person);
    assert_eq!(PersonBuilder::from(&person).build().unwrap(), person);
}

#[test]
fn test_builder_mutation_never_reaches_source() {
    let person = alice();
    let mut builder = person.to_builder();
    builder.lucky_numbers.push(99);
    builder.phones.clear();
    let changed = builder.build().unwrap();

    assert_eq!(person.lucky_numbers(), [7, -3]);
    assert_eq!(person.phones().len(), 1);
    assert_eq!(changed.lucky_numbers(), [7, -3, 99]);
}

#[test]
fn test_built_sequences_are_snapshots() {
    let mut builder = Tags::builder().values(vec!["a".to_string()]);
    let first = builder.clone().build().unwrap();
    builder.values.push("b".to_string());
    let second = builder.build().unwrap();

    assert_eq!(first.values(), ["a"]);
    assert_eq!(second.values(), ["a", "b"]);
}

#[test]
fn test_missing_required_fields_are_all_named() {
    let err = Person::builder().email("x").build().unwrap_err();

    assert_eq!(
        err,
        BuildError::MissingRequiredFields {
            message: "squareup.Person",
            fields: vec!["name", "id"],
        }
    );
}

#[test]
fn test_null_elements_are_rejected() {
    let err = Tags::builder()
        .try_values(vec![Some("a".to_string()), None])
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::NullElement {
            message: "test.Tags",
            field: "values",
        }
    );

    let ok = Tags::builder()
        .try_values(vec![Some("a".to_string())])
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(ok.values(), ["a"]);
}

#[test]
fn test_builder_carries_unknown_fields() {
    let mut builder = Narrow::builder();
    builder.unknown_fields_mut().add_varint(12, 5);
    let narrow = builder.build().unwrap();

    assert_eq!(narrow.unknown_fields().tags().collect::<Vec<_>>(), [12]);
    assert_eq!(narrow.to_builder().unknown_fields, *narrow.unknown_fields());
}

// ============================================================================
// Encoding and unknown fields
// ============================================================================

#[test]
fn test_encode_decode() {
    let person = alice()
        .to_builder()
        .avatar(vec![0u8, 1, 2])
        .best_friend(alice().to_builder().name("Bob").id(2).build().unwrap())
        .build()
        .unwrap();

    let decoded = Person::decode(&person.encode()).unwrap();

    assert_eq!(decoded, person);
    assert_eq!(decoded.best_friend().and_then(Person::name), Some("Bob"));
    assert_eq!(decoded.hash_code(), person.hash_code());
}

#[test]
fn test_unknown_tag_survives_round_trip() {
    let wide = Wide::new(
        Some("a".to_string()),
        Some(2),
        Some(true),
        Some("from the future".to_string()),
    );
    let bytes = wide.encode();

    let narrow = Narrow::decode(&bytes).unwrap();
    assert_eq!(narrow.a(), Some("a"));
    assert_eq!(narrow.unknown_fields().tags().collect::<Vec<_>>(), [7]);
    assert_eq!(narrow.encode(), bytes);

    let restored = Wide::decode(&narrow.encode()).unwrap();
    assert_eq!(restored.d(), Some("from the future"));
    assert_eq!(restored, wide);
}

#[test]
fn test_unknown_fields_affect_equality() {
    let plain = Narrow::new(Some("a".to_string()), None, None);
    let mut builder = plain.to_builder();
    builder.unknown_fields.add_varint(7, 1);
    let tagged = builder.build().unwrap();

    assert_ne!(plain, tagged);
}

#[test]
fn test_unknown_enum_value_is_preserved() {
    let mut writer = ProtoWriter::new();
    writer.write_key(1, WireType::LengthDelimited);
    writer.write_length_delimited(b"555");
    writer.write_key(2, WireType::Varint);
    writer.write_varint(9);
    let bytes = writer.into_bytes();

    let number = PhoneNumber::decode(&bytes).unwrap();

    assert_eq!(number.number(), Some("555"));
    assert_eq!(number.r#type(), None);
    assert!(number.unknown_fields().get(2).is_some());
    assert_eq!(number.encode(), bytes);
}

#[test]
fn test_packed_and_unpacked_repeated() {
    let person = alice();
    let bytes = person.encode();

    // tag 5, length-delimited, zigzag 7 = 14, zigzag -3 = 5
    assert!(bytes.windows(4).any(|window| window == [0x2a, 0x02, 0x0e, 0x05]));

    let mut writer = ProtoWriter::new();
    writer.write_key(1, WireType::LengthDelimited);
    writer.write_length_delimited(b"A");
    writer.write_key(2, WireType::Varint);
    writer.write_varint(1);
    for value in [14u64, 5] {
        writer.write_key(5, WireType::Varint);
        writer.write_varint(value);
    }
    let decoded = Person::decode(writer.as_bytes()).unwrap();
    assert_eq!(decoded.lucky_numbers(), [7, -3]);
}

#[test]
fn test_repeated_enums_split_unknown_values() {
    let mut writer = ProtoWriter::new();
    writer.write_key(2, WireType::LengthDelimited);
    writer.write_length_delimited(&[0x01, 0x05, 0x02]);
    let tags = Tags::decode(writer.as_bytes()).unwrap();

    assert_eq!(tags.kinds(), [PhoneType::Home, PhoneType::Work]);
    assert_eq!(tags.unknown_fields().get(2), Some([0x10, 0x05].as_slice()));
}

#[test]
fn test_repeated_enums_mix_packed_and_unpacked() {
    let mut writer = ProtoWriter::new();
    writer.write_key(2, WireType::LengthDelimited);
    writer.write_length_delimited(&[0x01, 0x05]);
    for value in [2u64, 9, 0] {
        writer.write_key(2, WireType::Varint);
        writer.write_varint(value);
    }
    let tags = Tags::decode(writer.as_bytes()).unwrap();

    assert_eq!(
        tags.kinds(),
        [PhoneType::Home, PhoneType::Work, PhoneType::Mobile]
    );
    assert_eq!(
        tags.unknown_fields().get(2),
        Some([0x10, 0x05, 0x10, 0x09].as_slice())
    );
    assert_eq!(tags.unknown_fields().len(), 1);
}

#[test]
fn test_unpacked_unknown_enum_survives_round_trip() {
    let mut writer = ProtoWriter::new();
    writer.write_key(2, WireType::Varint);
    writer.write_varint(1);
    writer.write_key(2, WireType::Varint);
    writer.write_varint(40);
    let tags = Tags::decode(writer.as_bytes()).unwrap();

    assert_eq!(tags.kinds(), [PhoneType::Home]);
    let restored = Tags::decode(&tags.encode()).unwrap();
    assert_eq!(restored, tags);
    assert_eq!(restored.unknown_fields().get(2), Some([0x10, 0x28].as_slice()));
}

/// `levels` messages wrapped inside a top-level `Node`
fn nested_nodes(levels: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for _ in 0..levels {
        let mut writer = ProtoWriter::new();
        writer.write_key(1, WireType::LengthDelimited);
        writer.write_length_delimited(&bytes);
        bytes = writer.into_bytes();
    }
    bytes
}

#[test]
fn test_nesting_up_to_the_limit_decodes() {
    let node = Node::decode(&nested_nodes(RECURSION_LIMIT as usize)).unwrap();

    let mut depth = 0;
    let mut current = &node;
    while let Some(child) = current.child() {
        depth += 1;
        current = child;
    }
    assert_eq!(depth, RECURSION_LIMIT);
}

#[test]
fn test_nesting_past_the_limit_is_an_error() {
    assert_eq!(
        Node::decode(&nested_nodes(RECURSION_LIMIT as usize + 1)).unwrap_err(),
        DecodeError::RecursionLimitExceeded {
            limit: RECURSION_LIMIT
        }
    );
    assert!(matches!(
        Node::decode(&nested_nodes(5_000)),
        Err(DecodeError::RecursionLimitExceeded { .. })
    ));
}

#[test]
fn test_decoding_missing_required_field_fails() {
    let err = Person::decode(&Narrow::new(Some("a".to_string()), None, None).encode()).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::Build(BuildError::MissingRequiredFields { ref fields, .. }) if fields == &["id"]
    ));
}

#[test]
fn test_wire_type_mismatch_is_kept_as_unknown() {
    // tag 2 is an int64 on Narrow; send it length-delimited
    let mut writer = ProtoWriter::new();
    writer.write_key(2, WireType::LengthDelimited);
    writer.write_length_delimited(b"oops");
    let narrow = Narrow::decode(writer.as_bytes()).unwrap();

    assert_eq!(narrow.b(), None);
    assert_eq!(narrow.encode(), writer.into_bytes());
}

#[test]
fn test_truncated_input_is_an_error() {
    let bytes = alice().encode();
    assert!(matches!(
        Person::decode(&bytes[..bytes.len() - 1]),
        Err(DecodeError::Truncated { .. })
    ));
}

// ============================================================================
// Enums and thread safety
// ============================================================================

#[test]
fn test_enum_values_and_names() {
    assert_eq!(PhoneType::Work.value(), 2);
    assert_eq!(PhoneType::from_value(1), Some(PhoneType::Home));
    assert_eq!(PhoneType::from_value(3), None);
    assert_eq!(PhoneType::Mobile.name(), "MOBILE");
    assert_eq!(PhoneType::Work.name(), "WORK_PHONE");
    assert_eq!(PhoneType::TYPE_NAME, "squareup.PhoneType");
}

#[test]
fn test_messages_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Person>();

    let person = std::sync::Arc::new(alice());
    let expected = person.hash_code();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let person = std::sync::Arc::clone(&person);
            std::thread::spawn(move || person.hash_code())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// ============================================================================
// Properties
// ============================================================================

fn arb_narrow() -> impl Strategy<Value = Narrow> {
    (
        proptest::option::of(".{0,8}"),
        proptest::option::of(any::<i64>()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(a, b, c)| Narrow::new(a, b, c))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_copy_law(narrow in arb_narrow()) {
        let copy = narrow.to_builder().build().unwrap();
        prop_assert_eq!(&copy, &narrow);
        prop_assert_eq!(copy.hash_code(), narrow.hash_code());
    }

    #[test]
    fn prop_equal_values_hash_equal(left in arb_narrow(), right in arb_narrow()) {
        if left == right {
            prop_assert_eq!(left.hash_code(), right.hash_code());
        }
        let decoded = Narrow::decode(&left.encode()).unwrap();
        prop_assert_eq!(decoded.hash_code(), left.hash_code());
    }
}
