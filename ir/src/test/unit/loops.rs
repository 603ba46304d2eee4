use kiln_dtype::DType;

use crate::{AffineMap, Attribute, BlockId, InsertionPoint, Module, OpId, OpKind, OperationState, Type};

fn add_loop(module: &mut Module, block: BlockId, name: &str) -> (OpId, BlockId) {
    let state = OperationState::new(OpKind::AffineFor)
        .attr("lower_bound", Attribute::AffineMap(AffineMap::constant(0)))
        .attr("upper_bound", Attribute::AffineMap(AffineMap::constant(4)))
        .attr("step", Attribute::i64(1))
        .attr("loop_name", Attribute::str(name))
        .region([Type::Scalar(DType::Index)]);
    let op = module.create(state, InsertionPoint::at_end(block));
    let body = module.region(op, 0).unwrap();
    module.create(OperationState::new(OpKind::AffineYield), InsertionPoint::at_end(body));
    (op, body)
}

#[test]
fn test_perfect_band() {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("f")).region([]),
        InsertionPoint::at_end(module.body()),
    );
    let body = module.region(func, 0).unwrap();

    let (i, i_body) = add_loop(&mut module, body, "i");
    let (j, j_body) = add_loop(&mut module, i_body, "j");
    let (k, _) = add_loop(&mut module, j_body, "k");
    // A second outermost loop starts a new band.
    let (x, _) = add_loop(&mut module, body, "x");

    let nests = module.loop_nests(func);
    assert_eq!(nests.len(), 2);
    let names: Vec<_> = nests[0].iter().map(|l| l.name.as_deref().unwrap()).collect();
    assert_eq!(names, ["i", "j", "k"]);
    assert_eq!(nests[0].iter().map(|l| l.op).collect::<Vec<_>>(), vec![i, j, k]);
    assert_eq!(nests[1][0].op, x);
}

#[test]
fn test_imperfect_band_stops() {
    let mut module = Module::new();
    let func = module.create(
        OperationState::new(OpKind::Func).attr("sym_name", Attribute::str("f")).region([]),
        InsertionPoint::at_end(module.body()),
    );
    let body = module.region(func, 0).unwrap();
    let (_, i_body) = add_loop(&mut module, body, "i");
    add_loop(&mut module, i_body, "j");
    add_loop(&mut module, i_body, "k");

    let nests = module.loop_nests(func);
    assert_eq!(nests.len(), 1);
    assert_eq!(nests[0].len(), 1);
}
