use std::io::Read;
use std::str::FromStr;
use std::sync::LazyLock;

use byteorder::{LittleEndian, ReadBytesExt};
use serde_json::json;

use crate::{
    json::{
        JsonCodec, JsonDecodable, JsonDecoder, JsonDecoderOptions, JsonEncodable, JsonEncoder,
    },
    type_loader::{json_decode_to_enc, StaticTypeLoader, TypeLoaderInstance},
    Argument, ByteString, Context, ContextOwned, DataValue, DateTime, DiagnosticInfo, DynEncodable,
    EUInformation, EncodingResult, ExpandedMessageInfo, ExpandedNodeId, ExtensionObject,
    ExtensionObjectBody, Guid, LocalizedText, NodeId, QualifiedName, StatusCode, UAString, Variant,
    VariantScalarTypeId, XmlElement, Array,
};

use super::{ctx, decoder, object_to_value, to_string, to_value};

const TEST_NAMESPACE: &str = "urn:opcua-json:tests";

const MOTOR_STATUS: u32 = 5000;
const MOTOR_STATUS_JSON: u32 = 5001;
const MOTOR_STATUS_BINARY: u32 = 5002;

#[derive(Debug, Clone, PartialEq, Default)]
struct MotorStatus {
    rpm: i32,
}

impl JsonEncodable for MotorStatus {
    fn encode(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
        encoder.write_i32(Some("Rpm"), self.rpm)
    }
}

impl JsonDecodable for MotorStatus {
    fn decode(decoder: &mut JsonDecoder<'_>) -> EncodingResult<Self> {
        Ok(Self {
            rpm: decoder.read_i32(Some("Rpm"))?,
        })
    }
}

impl ExpandedMessageInfo for MotorStatus {
    fn full_json_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId {
            node_id: NodeId::new(0, MOTOR_STATUS_JSON),
            namespace_uri: TEST_NAMESPACE.into(),
            server_index: 0,
        }
    }

    fn full_data_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId {
            node_id: NodeId::new(0, MOTOR_STATUS),
            namespace_uri: TEST_NAMESPACE.into(),
            server_index: 0,
        }
    }
}

fn motor_status_from_binary(
    stream: &mut dyn Read,
    _ctx: &Context<'_>,
) -> EncodingResult<Box<dyn DynEncodable>> {
    let rpm = stream.read_i32::<LittleEndian>()?;
    Ok(Box::new(MotorStatus { rpm }))
}

static TEST_TYPES: LazyLock<TypeLoaderInstance> = LazyLock::new(|| {
    let mut instance = TypeLoaderInstance::new();
    instance.add_json_type(
        MOTOR_STATUS,
        MOTOR_STATUS_JSON,
        json_decode_to_enc::<MotorStatus>,
    );
    instance.add_binary_type(MOTOR_STATUS, MOTOR_STATUS_BINARY, motor_status_from_binary);
    instance
});

struct TestTypeLoader;

impl StaticTypeLoader for TestTypeLoader {
    fn instance() -> &'static TypeLoaderInstance {
        &TEST_TYPES
    }

    fn namespace() -> &'static str {
        TEST_NAMESPACE
    }
}

fn test_ctx() -> ContextOwned {
    let mut ctx = ctx();
    ctx.namespaces_mut().add(TEST_NAMESPACE);
    ctx.loaders_mut().add_type_loader(TestTypeLoader);
    ctx
}

#[test]
fn serialize_string() {
    let ctx = ctx();
    let json = to_string(&ctx, |e| e.write_string(None, &UAString::null())).unwrap();
    assert_eq!(json, "null");

    let json = to_string(&ctx, |e| e.write_string(None, &"Hello World!".into())).unwrap();
    assert_eq!(json, r#""Hello World!""#);

    let json = to_string(&ctx, |e| e.write_string(None, &"".into())).unwrap();
    assert_eq!(json, r#""""#);

    let mut d = decoder(&ctx, json!("Hello World!"));
    assert_eq!(d.read_string(None).unwrap().as_ref(), "Hello World!");
    let mut d = decoder(&ctx, json!(null));
    assert!(d.read_string(None).unwrap().is_null());
}

#[test]
fn scalar_field() {
    let ctx = ctx();
    let v = object_to_value(&ctx, |e| e.write_i32(Some("X"), 42)).unwrap();
    assert_eq!(v, json!({"X": 42}));

    let mut d = decoder(&ctx, json!({"X": 42}));
    assert_eq!(d.read_i32(Some("X")).unwrap(), 42);
}

#[test]
fn default_field_is_elided() {
    let ctx = ctx();
    let v = object_to_value(&ctx, |e| e.write_i32(Some("X"), 0)).unwrap();
    assert_eq!(v, json!({}));

    // Decoding the missing field yields the default again
    let mut d = decoder(&ctx, json!({}));
    assert_eq!(d.read_i32(Some("X")).unwrap(), 0);
    assert!(!d.read_bool(Some("X")).unwrap());
    assert!(d.read_string(Some("X")).unwrap().is_null());
    assert!(d.read_node_id(Some("X")).unwrap().is_null());
    assert!(d.read_variant(Some("X")).unwrap().is_empty());
}

#[test]
fn serialize_64_bit_integers() {
    let ctx = ctx();
    let json = to_string(&ctx, |e| e.write_u64(None, 9007199254740993)).unwrap();
    assert_eq!(json, r#""9007199254740993""#);
    let json = to_string(&ctx, |e| e.write_i64(None, -9007199254740993)).unwrap();
    assert_eq!(json, r#""-9007199254740993""#);

    // The decoder accepts both the string form and a plain number,
    // preserving the exact value either way.
    let mut d = decoder(&ctx, json!("9007199254740993"));
    assert_eq!(d.read_u64(None).unwrap(), 9007199254740993);
    let mut d = decoder(&ctx, json!(9007199254740993u64));
    assert_eq!(d.read_u64(None).unwrap(), 9007199254740993);
    let mut d = decoder(&ctx, json!("-42"));
    assert_eq!(d.read_i64(None).unwrap(), -42);
    let mut d = decoder(&ctx, json!(-42));
    assert_eq!(d.read_i64(None).unwrap(), -42);

    let mut d = decoder(&ctx, json!("twelve"));
    assert_eq!(
        d.read_u64(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );
}

#[test]
fn serialize_floats() {
    let ctx = ctx();
    let json = to_string(&ctx, |e| e.write_f64(None, 1.5)).unwrap();
    assert_eq!(json, "1.5");
    let json = to_string(&ctx, |e| e.write_f32(None, f32::INFINITY)).unwrap();
    assert_eq!(json, r#""Infinity""#);
    let json = to_string(&ctx, |e| e.write_f64(None, f64::NEG_INFINITY)).unwrap();
    assert_eq!(json, r#""-Infinity""#);
    let json = to_string(&ctx, |e| e.write_f64(None, f64::NAN)).unwrap();
    assert_eq!(json, r#""NaN""#);

    let mut d = decoder(&ctx, json!("Infinity"));
    assert_eq!(d.read_f64(None).unwrap(), f64::INFINITY);
    let mut d = decoder(&ctx, json!("NaN"));
    assert!(d.read_f32(None).unwrap().is_nan());
    let mut d = decoder(&ctx, json!(2.25));
    assert_eq!(d.read_f32(None).unwrap(), 2.25);
}

#[test]
fn serialize_date_time() {
    let ctx = ctx();
    let dt = DateTime::from_str("2024-02-20T19:45:03.5Z").unwrap();
    let json = to_string(&ctx, |e| e.write_date_time(None, &dt)).unwrap();
    assert_eq!(json, r#""2024-02-20T19:45:03.500Z""#);

    let mut d = decoder(&ctx, json!("2024-02-20T19:45:03.500Z"));
    assert_eq!(d.read_date_time(None).unwrap(), dt);

    // Out of range values clamp instead of failing
    let mut d = decoder(&ctx, json!("0001-01-01T00:00:00Z"));
    assert!(d.read_date_time(None).unwrap().is_null());

    let mut d = decoder(&ctx, json!("not a date"));
    assert!(d.read_date_time(None).is_err());
}

#[test]
fn serialize_guid() {
    let ctx = ctx();
    let g = Guid::from_str("f9e561f3-351c-47a2-b969-b8d6d7226fee").unwrap();
    let json = to_string(&ctx, |e| e.write_guid(None, &g)).unwrap();
    assert_eq!(json, r#""f9e561f3-351c-47a2-b969-b8d6d7226fee""#);

    let mut d = decoder(&ctx, json!("f9e561f3-351c-47a2-b969-b8d6d7226fee"));
    assert_eq!(d.read_guid(None).unwrap(), g);

    let mut d = decoder(&ctx, json!("{f9e561f3-351c-47a2"));
    assert!(d.read_guid(None).is_err());
}

#[test]
fn serialize_byte_string() {
    let ctx = ctx();
    let b = ByteString::from(b"hello world".as_slice());
    let json = to_string(&ctx, |e| e.write_byte_string(None, &b)).unwrap();
    assert_eq!(json, r#""aGVsbG8gd29ybGQ=""#);

    let mut d = decoder(&ctx, json!("aGVsbG8gd29ybGQ="));
    assert_eq!(d.read_byte_string(None).unwrap(), b);

    let mut d = decoder(&ctx, json!("$$$"));
    assert!(d.read_byte_string(None).is_err());
}

#[test]
fn serialize_node_id() {
    let ctx = ctx();
    let n = NodeId::new(0, 1u32);
    let v = to_value(&ctx, |e| e.write_node_id(None, &n)).unwrap();
    assert_eq!(v, json!({"Id": 1}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_node_id(None).unwrap(), n);

    let n = NodeId::new(2, "Demo.Static.Scalar.UInt32");
    let v = to_value(&ctx, |e| e.write_node_id(None, &n)).unwrap();
    assert_eq!(
        v,
        json!({"IdType": 1, "Id": "Demo.Static.Scalar.UInt32", "Namespace": 2})
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_node_id(None).unwrap(), n);

    let guid = "995a9546-cd91-4393-b1c8-a83851f88d6a";
    let n = NodeId::new(1, Guid::from_str(guid).unwrap());
    let v = to_value(&ctx, |e| e.write_node_id(None, &n)).unwrap();
    assert_eq!(v, json!({"IdType": 2, "Id": guid, "Namespace": 1}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_node_id(None).unwrap(), n);

    let bytestring = "aGVsbG8gd29ybGQ=";
    let n = NodeId::new(1, ByteString::from_base64(bytestring).unwrap());
    let v = to_value(&ctx, |e| e.write_node_id(None, &n)).unwrap();
    assert_eq!(v, json!({"IdType": 3, "Id": bytestring, "Namespace": 1}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_node_id(None).unwrap(), n);
}

#[test]
fn deserialize_node_id_errors() {
    let ctx = ctx();

    // Missing namespace is namespace 0
    let mut d = decoder(&ctx, json!({"IdType": 1, "Id": "XYZ"}));
    assert_eq!(d.read_node_id(None).unwrap(), NodeId::new(0, "XYZ"));

    for doc in [
        json!({"IdType": 5, "Id": "InvalidType", "Namespace": 1}),
        json!({"IdType": 1, "Namespace": 1}),
        json!({"IdType": 1, "Id": null, "Namespace": 1}),
        json!({"IdType": 1, "Id": true, "Namespace": 1}),
        json!({"IdType": 1, "Id": "", "Namespace": 1}),
        json!({"IdType": 2, "Id": null, "Namespace": 1}),
        json!({"IdType": 2, "Id": "1234", "Namespace": 1}),
        json!({"IdType": 3, "Id": null, "Namespace": 1}),
        json!({"IdType": 3, "Id": "", "Namespace": 1}),
        json!("i=13"),
    ] {
        let mut d = decoder(&ctx, doc.clone());
        let e = d.read_node_id(None).unwrap_err();
        assert_eq!(e.status(), StatusCode::BadEncodingError, "{doc}");
    }
}

#[test]
fn serialize_expanded_node_id() {
    let ctx = ctx();
    let n = ExpandedNodeId {
        node_id: NodeId::new(2, "Demo"),
        namespace_uri: UAString::null(),
        server_index: 5,
    };
    let v = to_value(&ctx, |e| e.write_expanded_node_id(None, &n)).unwrap();
    assert_eq!(
        v,
        json!({"IdType": 1, "Id": "Demo", "Namespace": 2, "ServerUri": 5})
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_expanded_node_id(None).unwrap(), n);

    // An explicit namespace URI takes the place of the index
    let n = ExpandedNodeId {
        node_id: NodeId::new(0, 85u32),
        namespace_uri: "urn:mynamespace".into(),
        server_index: 0,
    };
    let v = to_value(&ctx, |e| e.write_expanded_node_id(None, &n)).unwrap();
    assert_eq!(v, json!({"Id": 85, "Namespace": "urn:mynamespace"}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_expanded_node_id(None).unwrap(), n);

    // Any other JSON kind in Namespace is an error
    let mut d = decoder(&ctx, json!({"Id": 85, "Namespace": true}));
    assert_eq!(
        d.read_expanded_node_id(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );
}

#[test]
fn serialize_qualified_name() {
    let ctx = ctx();
    let qn = QualifiedName::new(2, "BrowseName");
    let v = to_value(&ctx, |e| e.write_qualified_name(None, &qn)).unwrap();
    assert_eq!(v, json!({"Name": "BrowseName", "Uri": 2}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_qualified_name(None).unwrap(), qn);

    let qn = QualifiedName::new(0, "Root");
    let v = to_value(&ctx, |e| e.write_qualified_name(None, &qn)).unwrap();
    assert_eq!(v, json!({"Name": "Root"}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_qualified_name(None).unwrap(), qn);
}

#[test]
fn serialize_localized_text() {
    let ctx = ctx();
    let lt = LocalizedText::new("en", "Hello");
    let v = to_value(&ctx, |e| e.write_localized_text(None, &lt)).unwrap();
    assert_eq!(v, json!({"Locale": "en", "Text": "Hello"}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_localized_text(None).unwrap(), lt);

    // The bare text of the non-reversible form is still accepted
    let mut d = decoder(&ctx, json!("Hello"));
    let lt = d.read_localized_text(None).unwrap();
    assert_eq!(lt.text.as_ref(), "Hello");
    assert!(lt.locale.is_null());
}

#[test]
fn serialize_status_code() {
    let ctx = ctx();
    let v = to_value(&ctx, |e| {
        e.write_status_code(None, StatusCode::BadUnexpectedError)
    })
    .unwrap();
    assert_eq!(v, json!(0x8001_0000u32));
    let mut d = decoder(&ctx, v);
    assert_eq!(
        d.read_status_code(None).unwrap(),
        StatusCode::BadUnexpectedError
    );

    let v = object_to_value(&ctx, |e| e.write_status_code(Some("S"), StatusCode::Good)).unwrap();
    assert_eq!(v, json!({}));
}

#[test]
fn serialize_enum() {
    use crate::{TimestampsToReturn, UaEnum};

    let ctx = ctx();
    let v = object_to_value(&ctx, |e| {
        e.write_enum(Some("TimestampsToReturn"), TimestampsToReturn::Both)
    })
    .unwrap();
    assert_eq!(v, json!({"TimestampsToReturn": 2}));

    let mut d = decoder(&ctx, json!({"TimestampsToReturn": 2}));
    assert_eq!(
        d.read_enum::<TimestampsToReturn>(Some("TimestampsToReturn"))
            .unwrap(),
        TimestampsToReturn::Both
    );

    // Unknown enumerant values fail rather than silently defaulting
    let mut d = decoder(&ctx, json!({"TimestampsToReturn": 9}));
    assert!(d
        .read_enum::<TimestampsToReturn>(Some("TimestampsToReturn"))
        .is_err());

    assert_eq!(TimestampsToReturn::from_str("Both_2").unwrap(), TimestampsToReturn::Both);
}

#[test]
fn serialize_data_value() {
    let ctx = ctx();
    let dv = DataValue {
        value: Some(Variant::from(100u16)),
        status: Some(StatusCode::BadUnexpectedError),
        source_timestamp: Some(DateTime::from_str("2024-02-20T19:45:03Z").unwrap()),
        source_picoseconds: Some(123),
        server_timestamp: Some(DateTime::from_str("2024-02-20T19:45:04Z").unwrap()),
        server_picoseconds: Some(456),
    };
    let v = to_value(&ctx, |e| e.write_data_value(None, &dv)).unwrap();
    assert_eq!(
        v,
        json!({
            "Value": {"Type": 5, "Body": 100},
            "Status": 0x8001_0000u32,
            "SourceTimestamp": "2024-02-20T19:45:03Z",
            "SourcePicoseconds": 123,
            "ServerTimestamp": "2024-02-20T19:45:04Z",
            "ServerPicoseconds": 456,
        })
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_data_value(None).unwrap(), dv);

    // Fields that were never present decode as absent
    let mut d = decoder(&ctx, json!({"Value": {"Type": 5, "Body": 100}}));
    let dv = d.read_data_value(None).unwrap();
    assert!(dv.status.is_none());
    assert!(dv.source_timestamp.is_none());
}

#[test]
fn serialize_diagnostic_info() {
    let ctx = ctx();
    let di = DiagnosticInfo {
        symbolic_id: Some(0),
        namespace_uri: Some(2),
        locale: None,
        localized_text: Some(3),
        additional_info: Some("extra".into()),
        inner_status_code: Some(StatusCode::BadUnexpectedError),
        inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
            symbolic_id: Some(4),
            ..Default::default()
        })),
    };
    let v = to_value(&ctx, |e| e.write_diagnostic_info(None, &di)).unwrap();
    assert_eq!(
        v,
        json!({
            "SymbolicId": 0,
            "NamespaceUri": 2,
            "LocalizedText": 3,
            "AdditionalInfo": "extra",
            "InnerStatusCode": 0x8001_0000u32,
            "InnerDiagnosticInfo": {"SymbolicId": 4},
        })
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_diagnostic_info(None).unwrap(), di);
}

#[test]
fn serialize_variant_scalars() {
    let ctx = ctx();
    let cases = [
        (Variant::from(true), json!({"Type": 1, "Body": true})),
        (Variant::from(-8i8), json!({"Type": 2, "Body": -8})),
        (Variant::from(255u8), json!({"Type": 3, "Body": 255})),
        (Variant::from(-30000i16), json!({"Type": 4, "Body": -30000})),
        (Variant::from(60000u16), json!({"Type": 5, "Body": 60000})),
        (Variant::from(42i32), json!({"Type": 6, "Body": 42})),
        (Variant::from(42u32), json!({"Type": 7, "Body": 42})),
        (Variant::from(42i64), json!({"Type": 8, "Body": "42"})),
        (
            Variant::from(9007199254740993u64),
            json!({"Type": 9, "Body": "9007199254740993"}),
        ),
        (Variant::from(1.5f32), json!({"Type": 10, "Body": 1.5})),
        (Variant::from(1.5f64), json!({"Type": 11, "Body": 1.5})),
        (Variant::from("Hello"), json!({"Type": 12, "Body": "Hello"})),
        (
            Variant::from(StatusCode::BadUnexpectedError),
            json!({"Type": 19, "Body": 0x8001_0000u32}),
        ),
        (
            Variant::from(NodeId::new(1, "X")),
            json!({"Type": 17, "Body": {"IdType": 1, "Id": "X", "Namespace": 1}}),
        ),
        (
            Variant::from(QualifiedName::new(0, "Q")),
            json!({"Type": 20, "Body": {"Name": "Q"}}),
        ),
        (
            Variant::from(LocalizedText::new("en", "L")),
            json!({"Type": 21, "Body": {"Locale": "en", "Text": "L"}}),
        ),
    ];
    for (variant, expected) in cases {
        let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
        assert_eq!(v, expected);
        let mut d = decoder(&ctx, v);
        assert_eq!(d.read_variant(None).unwrap(), variant, "{expected}");
    }

    // The null variant is a JSON null
    let json = to_string(&ctx, |e| e.write_variant(None, &Variant::Empty)).unwrap();
    assert_eq!(json, "null");
    let mut d = decoder(&ctx, json!(null));
    assert!(d.read_variant(None).unwrap().is_empty());
}

#[test]
fn serialize_variant_array() {
    let ctx = ctx();
    let variant = Variant::from(
        Array::from_values(VariantScalarTypeId::Int32, [1i32, 2, 3]).unwrap(),
    );
    let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
    assert_eq!(v, json!({"Type": 6, "Body": [1, 2, 3]}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_variant(None).unwrap(), variant);

    // Nullable element types may carry null elements
    let variant = Variant::from(
        Array::new(
            VariantScalarTypeId::String,
            vec![Variant::from("a"), Variant::String(UAString::null())],
        )
        .unwrap(),
    );
    let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
    assert_eq!(v, json!({"Type": 12, "Body": ["a", null]}));
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_variant(None).unwrap(), variant);

    // Arrays of variants hold full envelopes
    let variant = Variant::from(
        Array::new(
            VariantScalarTypeId::Variant,
            vec![
                Variant::Variant(Box::new(Variant::from(1i32))),
                Variant::Variant(Box::new(Variant::from("x"))),
            ],
        )
        .unwrap(),
    );
    let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
    assert_eq!(
        v,
        json!({"Type": 24, "Body": [{"Type": 6, "Body": 1}, {"Type": 12, "Body": "x"}]})
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_variant(None).unwrap(), variant);
}

#[test]
fn serialize_variant_matrix() {
    let ctx = ctx();
    let variant = Variant::from(
        Array::new_multi(
            VariantScalarTypeId::Int32,
            (1..=6).map(Variant::from).collect::<Vec<_>>(),
            vec![2, 3],
        )
        .unwrap(),
    );
    let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
    assert_eq!(
        v,
        json!({"Type": 6, "Body": [[1, 2, 3], [4, 5, 6]], "Dimensions": [2, 3]})
    );

    // Decoding reconstructs the same flat row-major layout
    let mut d = decoder(&ctx, v);
    let decoded = d.read_variant(None).unwrap();
    assert_eq!(decoded, variant);
    let Variant::Array(array) = decoded else {
        panic!("expected array");
    };
    assert_eq!(
        array.values,
        (1..=6).map(Variant::from).collect::<Vec<_>>()
    );
    assert_eq!(array.dimensions, Some(vec![2, 3]));
}

#[test]
fn deserialize_variant_shape_mismatch() {
    let ctx = ctx();
    for doc in [
        // Row too short
        json!({"Type": 6, "Body": [[1, 2, 3], [4, 5]], "Dimensions": [2, 3]}),
        // Wrong outer length
        json!({"Type": 6, "Body": [1, 2, 3, 4, 5, 6], "Dimensions": [2, 3]}),
        // Nests deeper than its dimensions
        json!({"Type": 6, "Body": [[[1], [2], [3]], [[4], [5], [6]]], "Dimensions": [2, 3]}),
        // Dimensions with a scalar body
        json!({"Type": 6, "Body": 1, "Dimensions": [2, 3]}),
        // Negative dimension
        json!({"Type": 6, "Body": [[1, 2, 3], [4, 5, 6]], "Dimensions": [-2, 3]}),
    ] {
        let mut d = decoder(&ctx, doc.clone());
        let e = d.read_variant(None).unwrap_err();
        assert_eq!(e.status(), StatusCode::BadEncodingError, "{doc}");
    }
}

#[test]
fn deserialize_variant_errors() {
    let ctx = ctx();
    let mut d = decoder(&ctx, json!({"Type": 6}));
    assert_eq!(
        d.read_variant(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );

    let mut d = decoder(&ctx, json!({"Type": 26, "Body": 1}));
    assert_eq!(
        d.read_variant(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );

    // Absent or zero type tag is the null variant
    let mut d = decoder(&ctx, json!({"Type": 0}));
    assert!(d.read_variant(None).unwrap().is_empty());

    // A null body with a type decodes as that type's default
    let mut d = decoder(&ctx, json!({"Type": 6, "Body": null}));
    assert_eq!(d.read_variant(None).unwrap(), Variant::from(0i32));
}

#[test]
fn field_order_does_not_matter() {
    let ctx = ctx();
    let docs: [&[u8]; 3] = [
        br#"{"Type":6,"Body":[[1,2,3],[4,5,6]],"Dimensions":[2,3]}"#,
        br#"{"Dimensions":[2,3],"Body":[[1,2,3],[4,5,6]],"Type":6}"#,
        br#"{"Body":[[1,2,3],[4,5,6]],"Type":6,"Dimensions":[2,3]}"#,
    ];
    let mut decoded = Vec::new();
    for doc in docs {
        let mut d = JsonDecoder::from_slice(doc, ctx.context(), Default::default()).unwrap();
        decoded.push(d.read_variant(None).unwrap());
    }
    assert_eq!(decoded[0], decoded[1]);
    assert_eq!(decoded[1], decoded[2]);
}

#[test]
fn serialize_arrays() {
    let ctx = ctx();
    let v = object_to_value(&ctx, |e| e.write_i32_array(Some("X"), Some(&[1, 2, 3]))).unwrap();
    assert_eq!(v, json!({"X": [1, 2, 3]}));

    // A null array is elided like any other named null
    let v = object_to_value(&ctx, |e| e.write_i32_array(Some("X"), None)).unwrap();
    assert_eq!(v, json!({}));

    // An empty array is not null
    let v = object_to_value(&ctx, |e| e.write_i32_array(Some("X"), Some(&[]))).unwrap();
    assert_eq!(v, json!({"X": []}));

    let mut d = decoder(&ctx, json!({"X": [1, 2, 3]}));
    assert_eq!(d.read_i32_array(Some("X")).unwrap(), Some(vec![1, 2, 3]));
    let mut d = decoder(&ctx, json!({}));
    assert_eq!(d.read_i32_array(Some("X")).unwrap(), None);
    let mut d = decoder(&ctx, json!({"X": {"oops": 1}}));
    assert!(d.read_i32_array(Some("X")).is_err());

    let strings = [UAString::from("a"), UAString::null()];
    let v = object_to_value(&ctx, |e| e.write_string_array(Some("X"), Some(&strings))).unwrap();
    assert_eq!(v, json!({"X": ["a", null]}));
    let mut d = decoder(&ctx, v);
    assert_eq!(
        d.read_string_array(Some("X")).unwrap(),
        Some(strings.to_vec())
    );
}

#[test]
fn serialize_encodable_message() {
    let ctx = ctx();
    let argument = Argument {
        name: "Input".into(),
        data_type: NodeId::new(0, 12u32),
        value_rank: -1,
        array_dimensions: None,
        description: LocalizedText::new("en", "the input"),
    };
    let v = to_value(&ctx, |e| e.encode_message(&argument)).unwrap();
    assert_eq!(
        v,
        json!({
            "Name": "Input",
            "DataType": {"Id": 12},
            "ValueRank": -1,
            "Description": {"Locale": "en", "Text": "the input"},
        })
    );
    let mut d = decoder(&ctx, v);
    assert_eq!(d.decode_message::<Argument>().unwrap(), argument);

    // A missing named structure decodes as the all-default instance
    let mut d = decoder(&ctx, json!({}));
    assert_eq!(
        d.read_encodable::<Argument>(Some("Missing")).unwrap(),
        Argument::default()
    );
}

#[test]
fn serialize_extension_object() {
    let ctx = ctx();
    let eo = ExtensionObject::from_message(EUInformation {
        namespace_uri: "http://www.opcfoundation.org/UA/units/un/cefact".into(),
        unit_id: 4408652,
        display_name: LocalizedText::new("en", "°C"),
        description: LocalizedText::new("en", "degree Celsius"),
    });
    let v = to_value(&ctx, |e| e.write_extension_object(None, &eo)).unwrap();
    assert_eq!(
        v,
        json!({
            "TypeId": {"Id": crate::ids::EU_INFORMATION_ENCODING_DEFAULT_JSON},
            "Body": {
                "NamespaceUri": "http://www.opcfoundation.org/UA/units/un/cefact",
                "UnitId": 4408652,
                "DisplayName": {"Locale": "en", "Text": "°C"},
                "Description": {"Locale": "en", "Text": "degree Celsius"},
            }
        })
    );
    let mut d = decoder(&ctx, v);
    let decoded = d.read_extension_object(None).unwrap();
    assert_eq!(decoded, eo);
    assert_eq!(decoded.body_as::<EUInformation>().unwrap().unit_id, 4408652);

    // Inside a variant
    let variant = Variant::from(eo.clone());
    let v = to_value(&ctx, |e| e.write_variant(None, &variant)).unwrap();
    let mut d = decoder(&ctx, v);
    assert_eq!(d.read_variant(None).unwrap(), variant);
}

#[test]
fn extension_object_custom_loader() {
    let full_ctx = test_ctx();
    let eo = ExtensionObject::from_message(MotorStatus { rpm: 1500 });
    let v = to_value(&full_ctx, |e| e.write_extension_object(None, &eo)).unwrap();
    assert_eq!(
        v,
        json!({
            "TypeId": {"Id": MOTOR_STATUS_JSON, "Namespace": 1},
            "Body": {"Rpm": 1500},
        })
    );
    let mut d = decoder(&full_ctx, v);
    let decoded = d.read_extension_object(None).unwrap();
    assert_eq!(decoded.body_as::<MotorStatus>().unwrap().rpm, 1500);

    // Without the namespace in the context the type id cannot be written
    let bare = ctx();
    let e = to_value(&bare, |e| e.write_extension_object(None, &eo)).unwrap_err();
    assert_eq!(e.status(), StatusCode::BadEncodingError);
}

#[test]
fn extension_object_binary_body() {
    let ctx = test_ctx();
    let eo = ExtensionObject::new(
        ExpandedNodeId::new(NodeId::new(1, MOTOR_STATUS_BINARY)),
        ExtensionObjectBody::ByteString(ByteString::from(1500i32.to_le_bytes())),
    );
    let v = to_value(&ctx, |e| e.write_extension_object(None, &eo)).unwrap();
    assert_eq!(
        v,
        json!({
            "TypeId": {"Id": MOTOR_STATUS_BINARY, "Namespace": 1},
            "Encoding": 1,
            "Body": "3AUAAA==",
        })
    );

    // The base64 body is handed to the binary decode hook
    let mut d = decoder(&ctx, v);
    let decoded = d.read_extension_object(None).unwrap();
    assert_eq!(decoded.body_as::<MotorStatus>().unwrap().rpm, 1500);
}

#[test]
fn extension_object_xml_body() {
    let ctx = test_ctx();
    let eo = ExtensionObject::new(
        ExpandedNodeId::new(NodeId::new(1, MOTOR_STATUS)),
        ExtensionObjectBody::Xml(XmlElement::from("<MotorStatus><Rpm>900</Rpm></MotorStatus>")),
    );
    let v = to_value(&ctx, |e| e.write_extension_object(None, &eo)).unwrap();
    assert_eq!(
        v,
        json!({
            "TypeId": {"Id": MOTOR_STATUS, "Namespace": 1},
            "Encoding": 2,
            "Body": "<MotorStatus><Rpm>900</Rpm></MotorStatus>",
        })
    );

    // Without an XML hook the fragment is preserved untyped
    let mut d = decoder(&ctx, v.clone());
    assert_eq!(d.read_extension_object(None).unwrap(), eo);

    // With one, the body comes back typed
    let options = JsonDecoderOptions {
        xml_loader: Some(std::sync::Arc::new(|_ctx, _id, _xml| {
            Ok(Box::new(MotorStatus { rpm: 900 }))
        })),
    };
    let mut d = JsonDecoder::new(v, ctx.context(), options);
    let decoded = d.read_extension_object(None).unwrap();
    assert_eq!(decoded.body_as::<MotorStatus>().unwrap().rpm, 900);
}

#[test]
fn extension_object_errors() {
    let ctx = ctx();

    // Unknown type id
    let mut d = decoder(&ctx, json!({"TypeId": {"Id": 99999}, "Body": {}}));
    assert_eq!(
        d.read_extension_object(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );

    // Invalid encoding tag
    let mut d = decoder(&ctx, json!({"TypeId": {"Id": 1}, "Encoding": 3, "Body": "x"}));
    assert_eq!(
        d.read_extension_object(None).unwrap_err().status(),
        StatusCode::BadEncodingError
    );

    // A missing body is a null body, the type id is preserved
    let mut d = decoder(
        &ctx,
        json!({"TypeId": {"Id": crate::ids::EU_INFORMATION_ENCODING_DEFAULT_JSON}}),
    );
    let decoded = d.read_extension_object(None).unwrap();
    assert!(decoded.body.is_none());
    assert!(!decoded.type_id.is_null());

    // Encoding an object with a body but no type fails
    let eo = ExtensionObject::new(
        ExpandedNodeId::null(),
        ExtensionObjectBody::ByteString(ByteString::from(b"x".as_slice())),
    );
    let e = to_value(&ctx, |e| e.write_extension_object(None, &eo)).unwrap_err();
    assert_eq!(e.status(), StatusCode::BadEncodingError);
}

#[test]
fn codec_provider() {
    let codec = JsonCodec::new(ctx());
    let argument = Argument {
        name: "Output".into(),
        data_type: NodeId::new(0, 6u32),
        value_rank: 1,
        array_dimensions: Some(vec![4]),
        description: LocalizedText::new("en", "the output"),
    };
    let data = codec.encode_message_to_vec(&argument).unwrap();
    assert_eq!(codec.decode_message::<Argument>(&data).unwrap(), argument);

    // Chunked input decodes the same as contiguous input
    let (head, tail) = data.split_at(data.len() / 2);
    let mut d = codec.decoder_from_chunks(&[head, tail]).unwrap();
    assert_eq!(d.decode_message::<Argument>().unwrap(), argument);

    let mut stream = data.as_slice();
    let mut d = codec.decoder_from_stream(&mut stream).unwrap();
    assert_eq!(d.decode_message::<Argument>().unwrap(), argument);
}

#[test]
fn indented_output() {
    let ctx = ctx();
    let json = super::write_with(
        &ctx,
        crate::json::JsonEncoderOptions {
            reversible: true,
            indented: true,
        },
        |e| e.write_variant(None, &Variant::from(1i32)),
    )
    .unwrap();
    assert!(json.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, json!({"Type": 6, "Body": 1}));
}
