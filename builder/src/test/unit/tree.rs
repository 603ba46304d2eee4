use crate::test::helpers::{at, deferred};
use crate::{DType, Tensor, render_tree};

#[test]
fn test_render_reduction() {
    let mut ctx = deferred();
    let a = Tensor::placeholder("A", [10], DType::int32());
    let k = ctx.reduce_axis(0, 10, "k");
    let x = ctx.load(&a, &[at(&k)]).unwrap();
    let total = ctx.sum(x, &[k.clone()]).unwrap();

    let text = render_tree(&total).unwrap();
    assert!(text.starts_with(&format!("[{}] REDUCE(sum, axes=[\"k\"]) : int32", total.id())));
    assert!(text.contains("LOAD(A) : int32"));
    assert!(text.contains("IV('k', 0..10) : index"));
}

#[test]
fn test_shared_node_printed_once() {
    let mut ctx = deferred();
    let x = ctx.int_const(3, DType::int32()).unwrap();
    let y = ctx.mul(&x, &x).unwrap();

    let text = render_tree(&y).unwrap();
    assert!(text.contains(&format!("[{}] MUL : int32", y.id())));
    assert_eq!(text.matches("CONST(3)").count(), 1);
    assert!(text.contains(&format!("[{}] → (see above)", x.id())));
}

#[test]
fn test_render_compare_and_store() {
    let mut ctx = deferred();
    let a = Tensor::placeholder("A", [1], DType::Float32);
    let x = ctx.scalar(&a).unwrap();
    let positive = ctx.gt(&x, 0.0).unwrap();
    let y = ctx.select(positive, &x, 0.0).unwrap();
    let store = ctx.set_scalar(&a, y).unwrap();

    let text = render_tree(&store).unwrap();
    assert!(text.starts_with(&format!("[{}] STORE(A)", store.id())));
    assert!(text.contains("SELECT : float32"));
    assert!(text.contains("CMP(gt) : int1"));
}
