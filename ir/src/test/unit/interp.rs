use kiln_dtype::DType;

use crate::interp::{self, Buffer, Scalar};
use crate::{
    AffineExpr, AffineMap, Attribute, CmpIPredicate, Error, InsertionPoint, Module, OpKind, OperationState, Type,
};

/// `@sum(A: memref<10xT>, out: memref<1xT>)`: `out[0] += A[i]` for `i` in `[0, 10)`.
fn sum_module(dtype: DType, add: OpKind) -> Module {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func)
            .attr("sym_name", Attribute::str("sum"))
            .region([Type::memref([10], dtype), Type::memref([1], dtype)]),
        InsertionPoint::at_end(module.body()),
    );
    let entry = module.region(func, 0).unwrap();
    let (a, out) = (module.block_arg(entry, 0).unwrap(), module.block_arg(entry, 1).unwrap());

    let for_op = module.create(
        OperationState::new(OpKind::AffineFor)
            .attr("lower_bound", Attribute::AffineMap(AffineMap::constant(0)))
            .attr("upper_bound", Attribute::AffineMap(AffineMap::constant(10)))
            .attr("step", Attribute::i64(1))
            .region([Type::Scalar(DType::Index)]),
        InsertionPoint::at_end(entry),
    );
    let body = module.region(for_op, 0).unwrap();
    let ip = InsertionPoint::at_end(body);
    let i = module.block_arg(body, 0).unwrap();

    let load = |module: &mut Module, operands: Vec<_>, map: AffineMap| {
        let op = module.create(
            OperationState::new(OpKind::AffineLoad)
                .operands(operands)
                .result(dtype)
                .attr("map", Attribute::AffineMap(map)),
            ip,
        );
        module.result(op).unwrap()
    };
    let x = load(&mut module, vec![a, i], AffineMap::identity(1));
    let acc = load(&mut module, vec![out], AffineMap::constant(0));
    let sum = module.create(OperationState::new(add).operands([x, acc]).result(dtype), ip);
    let sum = module.result(sum).unwrap();
    module.create(
        OperationState::new(OpKind::AffineStore)
            .operands([sum, out])
            .attr("map", Attribute::AffineMap(AffineMap::constant(0))),
        ip,
    );
    module.create(OperationState::new(OpKind::AffineYield), ip);
    module.create(OperationState::new(OpKind::Return), InsertionPoint::at_end(entry));
    module
}

#[test]
fn test_sum_loop_int() {
    let module = sum_module(DType::int32(), OpKind::AddI);
    let mut args = [Buffer::from_ints([10], DType::int32(), 1..=10), Buffer::zeros([1], DType::int32())];
    interp::call(&module, "sum", &mut args).unwrap();
    assert_eq!(args[1].to_i64(), vec![55]);
}

#[test]
fn test_sum_loop_wraps_to_width() {
    let module = sum_module(DType::int(8), OpKind::AddI);
    let mut args = [Buffer::from_ints([10], DType::int(8), [100; 10]), Buffer::zeros([1], DType::int(8))];
    interp::call(&module, "sum", &mut args).unwrap();
    assert_eq!(args[1].to_i64(), vec![(1000i64 as i8) as i64]);
}

#[test]
fn test_sum_loop_fixed() {
    let fixed = DType::fixed(16, 8);
    let module = sum_module(fixed, OpKind::AddFixed);
    let values = (0..10).map(|i| i as f64 * 0.5);
    let mut args = [Buffer::from_floats([10], fixed, values), Buffer::zeros([1], fixed)];
    interp::call(&module, "sum", &mut args).unwrap();
    assert_eq!(args[1].to_f64(), vec![22.5]);
}

#[test]
fn test_unknown_function() {
    let module = Module::new();
    let err = interp::call(&module, "nope", &mut []).unwrap_err();
    assert_eq!(err, Error::UnknownFunction { name: "nope".into() });
}

#[test]
fn test_argument_mismatch() {
    let module = sum_module(DType::int32(), OpKind::AddI);
    let mut args = [Buffer::zeros([10], DType::int32())];
    let err = interp::call(&module, "sum", &mut args).unwrap_err();
    assert!(matches!(err, Error::ArgumentMismatch { expected: 2, actual: 1, .. }));
}

#[test]
fn test_out_of_bounds_load() {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("oob")).region([Type::memref([4], DType::int32())]),
        InsertionPoint::at_end(module.body()),
    );
    let entry = module.region(func, 0).unwrap();
    let a = module.block_arg(entry, 0).unwrap();
    let map = AffineMap::new(0, 0, [AffineExpr::constant(4)]);
    module.create(
        OperationState::new(OpKind::AffineLoad).operands([a]).result(DType::int32()).attr("map", Attribute::AffineMap(map)),
        InsertionPoint::at_end(entry),
    );

    let mut args = [Buffer::zeros([4], DType::int32())];
    let err = interp::call(&module, "oob", &mut args).unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { .. }));
}

#[test]
fn test_loop_body_value_not_visible_after_loop() {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("leak")).region([Type::memref([4], DType::int32())]),
        InsertionPoint::at_end(module.body()),
    );
    let entry = module.region(func, 0).unwrap();
    let a = module.block_arg(entry, 0).unwrap();
    let for_op = module.create(
        OperationState::new(OpKind::AffineFor)
            .attr("lower_bound", Attribute::AffineMap(AffineMap::constant(0)))
            .attr("upper_bound", Attribute::AffineMap(AffineMap::constant(4)))
            .attr("step", Attribute::i64(1))
            .region([Type::Scalar(DType::Index)]),
        InsertionPoint::at_end(entry),
    );
    let body = module.region(for_op, 0).unwrap();
    let i = module.block_arg(body, 0).unwrap();
    let load = module.create(
        OperationState::new(OpKind::AffineLoad)
            .operands([a, i])
            .result(DType::int32())
            .attr("map", Attribute::AffineMap(AffineMap::identity(1))),
        InsertionPoint::at_end(body),
    );
    let x = module.result(load).unwrap();
    module.create(OperationState::new(OpKind::AffineYield), InsertionPoint::at_end(body));
    module.create(
        OperationState::new(OpKind::AffineStore)
            .operands([x, a])
            .attr("map", Attribute::AffineMap(AffineMap::constant(0))),
        InsertionPoint::at_end(entry),
    );
    module.create(OperationState::new(OpKind::Return), InsertionPoint::at_end(entry));

    let mut args = [Buffer::from_ints([4], DType::int32(), [1, 2, 3, 4])];
    let err = interp::call(&module, "leak", &mut args).unwrap_err();
    assert_eq!(err, Error::UndefinedValue { value: x });
}

/// `@f() -> (r)` evaluating one binary operation on two constants.
fn eval_binary(kind: OpKind, dtype: DType, lhs: Attribute, rhs: Attribute, attrs: &[(&'static str, Attribute)], result: DType) -> crate::Result<Scalar> {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("f")).region([]),
        InsertionPoint::at_end(module.body()),
    );
    let ip = InsertionPoint::at_end(module.region(func, 0).unwrap());
    let mut operands = Vec::new();
    for value in [lhs, rhs] {
        let c = module.create(OperationState::new(OpKind::Constant).result(dtype).attr("value", value), ip);
        operands.push(module.result(c).unwrap());
    }
    let mut state = OperationState::new(kind).operands(operands).result(result);
    for (name, attr) in attrs {
        state = state.attr(*name, attr.clone());
    }
    let op = module.create(state, ip);
    let value = module.result(op).unwrap();
    module.create(OperationState::new(OpKind::Return).operands([value]), ip);
    Ok(interp::call(&module, "f", &mut [])?[0])
}

fn int(value: i64, ty: DType) -> Attribute {
    Attribute::Int { value, ty }
}

#[test]
fn test_signed_vs_unsigned_division() {
    let i8_ = DType::int(8);
    let u8_ = DType::uint(8);
    assert_eq!(eval_binary(OpKind::DivSI, i8_, int(-7, i8_), int(2, i8_), &[], i8_).unwrap(), Scalar::Int(-3));
    assert_eq!(eval_binary(OpKind::FloorDivSI, i8_, int(-7, i8_), int(2, i8_), &[], i8_).unwrap(), Scalar::Int(-4));
    assert_eq!(eval_binary(OpKind::RemSI, i8_, int(-7, i8_), int(2, i8_), &[], i8_).unwrap(), Scalar::Int(-1));
    assert_eq!(eval_binary(OpKind::DivUI, u8_, int(250, u8_), int(2, u8_), &[], u8_).unwrap(), Scalar::Int(125));
    assert_eq!(eval_binary(OpKind::MinUI, u8_, int(250, u8_), int(2, u8_), &[], u8_).unwrap(), Scalar::Int(2));
}

#[test]
fn test_division_by_zero() {
    let i32_ = DType::int32();
    let err = eval_binary(OpKind::DivSI, i32_, int(1, i32_), int(0, i32_), &[], i32_).unwrap_err();
    assert!(matches!(err, Error::DivisionByZero { .. }));
}

#[test]
fn test_compare_predicates() {
    let i32_ = DType::int32();
    let slt = [("predicate", Attribute::i64(CmpIPredicate::Slt.code()))];
    let ult = [("predicate", Attribute::i64(CmpIPredicate::Ult.code()))];
    let b = DType::bool_();
    assert_eq!(eval_binary(OpKind::CmpI, i32_, int(-1, i32_), int(1, i32_), &slt, b).unwrap(), Scalar::Int(1));
    // -1 is the largest unsigned 32-bit value.
    assert_eq!(eval_binary(OpKind::CmpI, i32_, int(-1, i32_), int(1, i32_), &ult, b).unwrap(), Scalar::Int(0));
}

#[test]
fn test_fixed_multiply() {
    let fixed = DType::fixed(16, 8);
    // 1.5 * 2.25 = 3.375, raw values scaled by 256.
    let product = eval_binary(OpKind::MulFixed, fixed, int(384, fixed), int(576, fixed), &[], fixed).unwrap();
    assert_eq!(product, Scalar::Int(864));
    assert_eq!(product.to_f64(fixed), 3.375);
}

#[test]
fn test_float32_rounding() {
    let f32_ = DType::Float32;
    let a = Attribute::Float { value: 0.1, ty: f32_ };
    let b = Attribute::Float { value: 0.2, ty: f32_ };
    let sum = eval_binary(OpKind::AddF, f32_, a, b, &[], f32_).unwrap();
    assert_eq!(sum, Scalar::Float((0.1f32 + 0.2f32) as f64));
}
