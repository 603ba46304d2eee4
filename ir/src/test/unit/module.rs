use kiln_dtype::DType;

use crate::{AffineMap, Attribute, InsertionPoint, Module, OpKind, OperationState, Type};

fn constant(module: &mut Module, value: i64, ip: InsertionPoint) -> crate::OpId {
    let state = OperationState::new(OpKind::Constant)
        .result(DType::int32())
        .attr("value", Attribute::Int { value, ty: DType::int32() });
    module.create(state, ip)
}

#[test]
fn test_create_appends_in_order() {
    let mut module = Module::new();
    let ip = InsertionPoint::at_end(module.body());
    let a = constant(&mut module, 1, ip);
    let b = constant(&mut module, 2, ip);
    assert_eq!(module.block(module.body()).ops, vec![a, b]);
    assert_eq!(module.len(), 2);
}

#[test]
fn test_create_before() {
    let mut module = Module::new();
    let body = module.body();
    let a = constant(&mut module, 1, InsertionPoint::at_end(body));
    let b = constant(&mut module, 2, InsertionPoint::before(body, a));
    assert_eq!(module.block(body).ops, vec![b, a]);
}

#[test]
fn test_regions_and_values() {
    let mut module = Module::new();
    let state = OperationState::new(OpKind::AffineFor)
        .attr("lower_bound", Attribute::AffineMap(AffineMap::constant(0)))
        .attr("upper_bound", Attribute::AffineMap(AffineMap::constant(8)))
        .attr("step", Attribute::i64(1))
        .region([Type::Scalar(DType::Index)]);
    let for_op = module.create(state, InsertionPoint::at_end(module.body()));

    let body = module.region(for_op, 0).unwrap();
    let iv = module.block_arg(body, 0).unwrap();
    assert_eq!(module.value_type(iv), &Type::Scalar(DType::Index));
    assert_eq!(module.block(body).parent, Some(for_op));
    assert_eq!(module.block_arg(body, 1), None);

    let inner = constant(&mut module, 3, InsertionPoint::at_end(body));
    assert_eq!(module.enclosing(body, OpKind::AffineFor), Some(for_op));
    assert_eq!(module.op(inner).parent, body);
    assert!(module.result(for_op).is_none());
    assert!(module.result(inner).is_some());
}

#[test]
fn test_printer() {
    let mut module = Module::new();
    let body = module.body();
    let alloc = module.create(
        OperationState::new(OpKind::Alloc)
            .result(Type::memref([4, 8], DType::Float32))
            .attr("name", Attribute::str("A")),
        InsertionPoint::at_end(body),
    );
    assert_eq!(module.value_type(module.result(alloc).unwrap()).to_string(), "memref<4x8xf32>");
    constant(&mut module, 7, InsertionPoint::at_end(body));

    let text = module.to_string();
    assert!(text.starts_with("module {"), "{text}");
    assert!(text.contains(r#"%0 = memref.alloc() {name = "A"} : () -> memref<4x8xf32>"#), "{text}");
    assert!(text.contains("%1 = arith.constant() {value = 7 : i32} : () -> i32"), "{text}");
}

#[test]
fn test_function_lookup() {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("kernel")).region([]),
        InsertionPoint::at_end(module.body()),
    );
    assert_eq!(module.function("kernel"), Some(func));
    assert_eq!(module.function("missing"), None);
}
