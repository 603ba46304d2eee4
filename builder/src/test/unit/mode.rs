use crate::test::helpers::{at, deferred, in_place};
use crate::{BuildMode, BuilderContext, DType, Expr, Tensor};

#[test]
fn test_default_is_deferred() {
    assert_eq!(BuildMode::default(), BuildMode::Deferred);
    assert!(BuildMode::InPlace.is_in_place());
    assert_eq!(BuildMode::InPlace.to_string(), "InPlace");
}

#[test]
fn test_deferred_records_only() {
    let mut ctx = deferred();
    let x = ctx.int_const(1, DType::int32()).unwrap();
    let y = ctx.add(&x, 2).unwrap();
    assert!(!x.is_built());
    assert!(!y.is_built());
    assert!(ctx.module().is_empty());

    ctx.build(&y).unwrap();
    assert!(x.is_built());
    assert_eq!(ctx.module().len(), 3);
}

#[test]
fn test_in_place_materializes_on_construction() {
    let mut ctx = in_place();
    let x = ctx.int_const(1, DType::int32()).unwrap();
    assert!(x.is_built());
    let y = ctx.add(&x, 2).unwrap();
    assert!(y.is_built());
    assert_eq!(ctx.module().len(), 3);

    // Building again is a no-op.
    ctx.build(&y).unwrap();
    assert_eq!(ctx.module().len(), 3);
}

#[test]
fn test_in_place_defers_reduction_axes() {
    let a = Tensor::placeholder("A", [4], DType::int32());
    let mut ctx = in_place();
    ctx.function("kernel", &[a.clone()], |ctx| {
        let k = ctx.reduce_axis(0, 4, "k");
        let x = ctx.load(&a, &[at(&k)])?;
        assert!(!x.is_built());
        let total = ctx.sum(&x, &[k])?;
        assert!(!total.is_built());

        ctx.build(&total)?;
        assert!(total.is_built());
        Ok(Some(total))
    })
    .unwrap();
}

#[test]
fn test_in_place_defers_unbound_tensors() {
    let a = Tensor::placeholder("A", [4], DType::int32());
    let mut ctx = in_place();
    let x = ctx.load(&a, &[0.into()]).unwrap();
    assert!(!x.is_built());

    let b = ctx.alloc("B", [4], DType::int32()).unwrap();
    let y = ctx.load(&b, &[0.into()]).unwrap();
    assert!(y.is_built());
}

#[test]
fn test_in_place_inside_loop() {
    let a = Tensor::placeholder("A", [4], DType::int32());
    let mut ctx = in_place();
    ctx.function("kernel", &[a.clone()], |ctx| {
        ctx.affine_for()
            .lower(0)
            .upper(4)
            .body(|ctx: &mut BuilderContext, i: &Expr| {
                let x = ctx.load(&a, &[at(i)])?;
                assert!(x.is_built());
                let store = ctx.store(x, &a, &[at(i)])?;
                assert!(store.is_built());
                Ok(())
            })
            .call()?;
        Ok(None)
    })
    .unwrap();
}
