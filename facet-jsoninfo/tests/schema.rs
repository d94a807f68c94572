mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use facet_jsoninfo::{Field, Opaque, Registry, SlotError, describe_struct, shape_of};

#[allow(dead_code)]
struct Item {
    sku: String,
}

describe_struct!(Item {
    Field::new("sku", shape_of::<String>),
});

#[derive(Debug, PartialEq)]
struct ObjectSchema {
    required: Vec<&'static str>,
}

#[test]
fn schema_round_trips() {
    common::setup();
    let registry = Registry::new();
    let info = registry.type_info::<Item>();
    assert!(info.schema().is_none());
    assert_eq!(info.schema_as::<ObjectSchema>(), Ok(None));

    info.set_schema(Arc::new(ObjectSchema {
        required: vec!["sku"],
    }));

    let schema = info.schema_as::<ObjectSchema>().unwrap().unwrap();
    assert_eq!(schema.required, ["sku"]);
}

#[test]
fn last_write_wins() {
    common::setup();
    let registry = Registry::new();
    let info = registry.type_info::<Item>();

    info.set_schema(Arc::new(1u32));
    info.set_schema(Arc::new(2u32));
    assert_eq!(*info.schema_as::<u32>().unwrap().unwrap(), 2);
}

#[test]
fn wrong_type_is_an_error() {
    common::setup();
    let registry = Registry::new();
    let info = registry.type_info::<Item>();
    info.set_schema(Arc::new("not a schema"));

    let err = info.schema_as::<ObjectSchema>().unwrap_err();
    assert!(matches!(err, SlotError::TypeMismatch { .. }));
    assert!(err.to_string().contains("ObjectSchema"));

    // the untyped view still works
    assert!(info.schema().unwrap().is::<&'static str>());
}

#[test]
fn schema_or_init_computes_once() {
    common::setup();
    let registry = Registry::new();
    let info = registry.type_info::<Item>();
    let calls = AtomicUsize::new(0);

    let build = || -> Opaque {
        calls.fetch_add(1, Ordering::SeqCst);
        Arc::new(ObjectSchema { required: vec![] })
    };

    let first = info.schema_or_init(build);
    let second = info.schema_or_init(build);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn schema_and_extensions_are_independent() {
    common::setup();
    let registry = Registry::new();
    let info = registry.type_info::<Item>();

    info.add_extension(Arc::new(7u8));
    assert!(info.schema().is_none());

    info.set_schema(Arc::new(8u8));
    assert_eq!(info.extensions().len(), 1);
    assert_eq!(*info.schema_as::<u8>().unwrap().unwrap(), 8);
}
