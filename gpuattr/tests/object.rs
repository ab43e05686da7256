extern crate gpuattr;

use gpuattr::dialect::gpu::CompilationFormat;
use gpuattr::dialect::gpu::ObjectAttr;
use gpuattr::dialect::TargetAttr;
use gpuattr::ir::Attr;
use gpuattr::ir::AttributeRegistry;
use gpuattr::ir::IntegerAttr;
use gpuattr::ir::IntegerType;
use gpuattr::ir::PropertyMap;
use gpuattr::ir::PropertyValue;
use gpuattr::parser::MAX_NESTING_DEPTH;
use gpuattr::tester::Tester;
use gpuattr::AttrError;
use gpuattr::Span;
use indoc::indoc;
use std::panic::Location;
use std::sync::Arc;

const OBJECT: &[u8] = b"BC\xc0\xde5\x14\x00\x00\x05\x00\x00\x00b\x0c0$MY\xbef";

fn nvvm() -> Arc<TargetAttr> {
    Arc::new(TargetAttr::nvvm())
}

fn o2() -> PropertyMap {
    let value = IntegerAttr::new(IntegerType::I32, 2);
    PropertyMap::get([("O", value.into())]).unwrap()
}

#[test]
fn object_with_properties() {
    Tester::init_tracing();
    let object = ObjectAttr::get(nvvm(), CompilationFormat::Fatbin, OBJECT, Some(o2()));
    let attr = Attr::from(object.clone());
    let printed = Tester::round_trip(&attr);
    assert!(printed.contains(r#""BC\C0\DE5\14\00\00\05\00\00\00b\0C0$MY\BEf""#));
    assert!(printed.contains("properties = {O = 2 : i32}"));
    assert_eq!(
        printed,
        r#"#gpu.object<#nvvm.target, properties = {O = 2 : i32}, "BC\C0\DE5\14\00\00\05\00\00\00b\0C0$MY\BEf">"#
    );
    assert_eq!(object.object(), OBJECT);
}

#[test]
fn object_without_properties() {
    Tester::init_tracing();
    let object = ObjectAttr::get(nvvm(), CompilationFormat::Fatbin, OBJECT, None);
    let printed = Tester::round_trip(&object.into());
    assert!(!printed.contains("properties = "));
    assert_eq!(
        printed,
        r#"#gpu.object<#nvvm.target, "BC\C0\DE5\14\00\00\05\00\00\00b\0C0$MY\BEf">"#
    );
}

#[test]
fn assembly_text_escapes_only_newlines() {
    Tester::init_tracing();
    let ptx = b"//\n// Generated by LLVM NVPTX Back-End\n//\n\n.version 6.0\n.target sm_50";
    let object = ObjectAttr::get(nvvm(), CompilationFormat::Fatbin, ptx.to_vec(), None);
    let printed = Tester::round_trip(&object.clone().into());
    let expected = r#"#gpu.object<#nvvm.target, "//\0A// Generated by LLVM NVPTX Back-End\0A//\0A\0A.version 6.0\0A.target sm_50">"#;
    assert_eq!(printed, expected);
    assert_eq!(object.object(), ptx);
}

#[test]
fn empty_properties_are_not_absent_properties() {
    Tester::init_tracing();
    let with_empty = ObjectAttr::get(nvvm(), CompilationFormat::Fatbin, OBJECT, Some(PropertyMap::empty()));
    let without = ObjectAttr::get(nvvm(), CompilationFormat::Fatbin, OBJECT, None);
    assert_ne!(with_empty, without);

    let printed = Tester::round_trip(&with_empty.into());
    assert!(printed.starts_with("#gpu.object<#nvvm.target, properties = {}, "));
    let (attr, _) = Tester::parse(&printed);
    let object = attr.as_object().unwrap();
    assert!(object.has_properties());
    assert!(object.properties().unwrap().is_empty());

    let printed = Tester::round_trip(&without.into());
    assert!(!printed.contains("properties"));
    let (attr, _) = Tester::parse(&printed);
    assert!(!attr.as_object().unwrap().has_properties());
}

#[test]
fn every_byte_value_round_trips() {
    Tester::init_tracing();
    let all = (0..=255u8).collect::<Vec<u8>>();
    for format in CompilationFormat::ALL {
        for bytes in [vec![], vec![0; 8], vec![0xFF; 8], all.clone()] {
            let object = ObjectAttr::get(nvvm(), format, bytes.clone(), None);
            Tester::round_trip(&object.into());
        }
    }
}

#[test]
fn payload_without_printable_bytes() {
    let bytes = vec![0x00, 0x7F, 0x80, 0xFF, 0x0A, 0x1B];
    let object = ObjectAttr::get(nvvm(), CompilationFormat::Binary, bytes.clone(), None);
    let printed = Tester::round_trip(&object.clone().into());
    assert_eq!(printed, r#"#gpu.object<#nvvm.target, bin = "\00\7F\80\FF\0A\1B">"#);
    assert_eq!(object.object(), bytes.as_slice());
}

#[test]
fn parse_is_independent_of_formatting() {
    Tester::init_tracing();
    let src = indoc! {r#"
    #gpu.object<
      #rocdl.target< chip = "gfx90a" , O = 2 >,
      properties = {
        O = 3 : i32,
        "fast math" = true
      },
      isa = "s_endpgm\0a"
    >
    "#};
    let (attr, actual) = Tester::parse(src);
    let expected = indoc! {r#"
    #gpu.object<#rocdl.target<chip = "gfx90a">, properties = {O = 3 : i32, "fast math" = true}, isa = "s_endpgm\0A">
    "#};
    Tester::check_lines_exact(&actual, expected, Location::caller());

    let target = Arc::new(TargetAttr::rocdl().with_chip("gfx90a"));
    let properties = PropertyMap::get([
        ("O", IntegerAttr::new(IntegerType::I32, 3).into()),
        ("fast math", true.into()),
    ])
    .unwrap();
    let built = ObjectAttr::get(target, CompilationFormat::Assembly, "s_endpgm\n", Some(properties));
    assert_eq!(attr, Attr::from(built.clone()));
    let registry = AttributeRegistry::default();
    assert_eq!(registry.print(&built.into()).unwrap(), actual);
}

#[test]
fn syntax_errors() {
    Tester::init_tracing();
    let cases = [
        r#"#gpu.object<#nvvm.target, "ab""#,
        r#"#gpu.object<#nvvm.target "ab">"#,
        r#"#gpu.object<#nvvm.target,, "ab">"#,
        r#"#gpu.object<#nvvm.target, "ab",>"#,
        r#"#gpu.object<#nvvm.target, "ab", kernels = {}>"#,
        r#"#gpu.object<#nvvm.target, properties = {}>"#,
        r#"#gpu.object<#nvvm.target, properties = {} "ab">"#,
        r#"#gpu.object<#unknown.target, "ab">"#,
        r#"#gpu.object<"ab">"#,
        r#"#gpu.object<#nvvm.target, bin "ab">"#,
        r#"#gpu.object<#nvvm.target, "ab">>"#,
    ];
    for src in cases {
        let err = Tester::parse_err(src);
        assert!(matches!(err, AttrError::SyntaxError { .. }), "{src}: {err}");
    }
}

#[test]
fn nested_errors_keep_their_kind() {
    Tester::init_tracing();
    let err = Tester::parse_err(r#"#gpu.object<#nvvm.target, "\ZZ">"#);
    assert!(matches!(err, AttrError::MalformedLiteral { .. }), "{err}");
    let err = Tester::parse_err(r#"#gpu.object<#nvvm.target, properties = {a = 1,}, "">"#);
    assert!(matches!(err, AttrError::MalformedProperties { .. }), "{err}");
    let err = Tester::parse_err(r#"#gpu.object<#nvvm.target, properties = {a = 1, a = 2}, "">"#);
    assert!(matches!(err, AttrError::DuplicateKey { .. }), "{err}");
    let err = Tester::parse_err(r#"#gpu.objects<#nvvm.target, "">"#);
    assert!(matches!(err, AttrError::UnknownAttributeKind { .. }), "{err}");
}

#[test]
fn targets_are_shared() {
    let registry = AttributeRegistry::default();
    let a = registry.parse(r#"#gpu.object<#nvvm.target<O = 3>, "a">"#).unwrap();
    let b = registry.parse(r#"#gpu.object<#nvvm.target<O = 3>, bin = "b">"#).unwrap();
    let a = a.as_object().unwrap();
    let b = b.as_object().unwrap();
    assert!(Arc::ptr_eq(a.target(), b.target()));
    assert_eq!(registry.interned_targets(), 1);
}

fn nested_flags(depth: usize) -> String {
    format!("#nvvm.target<flags = {}1{}>", "{a = ".repeat(depth), "}".repeat(depth))
}

#[test]
fn deep_nesting_is_an_error() {
    let registry = AttributeRegistry::default();
    let attr = registry.parse(&nested_flags(100)).unwrap();
    let mut map = attr.as_target().unwrap().flags().unwrap();
    for _ in 1..100 {
        map = match map.lookup("a") {
            Some(PropertyValue::Dictionary(inner)) => inner,
            other => panic!("expected a dictionary, but got {other:?}"),
        };
    }

    // The target is the first open level; the map that would exceed the
    // limit starts at `21 + 5 * (MAX_NESTING_DEPTH - 1)`.
    let start = 21 + 5 * (MAX_NESTING_DEPTH - 1);
    let err = registry.parse(&nested_flags(100_000)).unwrap_err();
    assert_eq!(
        err,
        AttrError::properties(Span::new(start, start + 1), "properties nested too deeply")
    );

    let src = format!(
        r#"#gpu.object<#nvvm.target, properties = {}1{}, "">"#,
        "{a = #nvvm.target<flags = ".repeat(10_000),
        "}>".repeat(10_000)
    );
    let err = registry.parse(&src).unwrap_err();
    assert!(err.to_string().contains("nested too deeply"), "{err}");
}
