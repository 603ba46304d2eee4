use kiln_ir::InsertionPoint;

use crate::test::helpers::deferred;
use crate::{Error, InsertionStack};

#[test]
fn test_save_get_restore() {
    let ctx = deferred();
    let body = ctx.module().body();
    let mut stack = InsertionStack::new();
    assert_eq!(stack.get(), Err(Error::EmptyStack));

    stack.save(InsertionPoint::at_end(body));
    assert_eq!(stack.get(), Ok(InsertionPoint::at_end(body)));
    assert_eq!(stack.depth(), 1);

    assert_eq!(stack.restore(), Ok(InsertionPoint::at_end(body)));
    assert!(stack.is_empty());
    assert_eq!(stack.restore(), Err(Error::EmptyStack));
}

#[test]
fn test_clear() {
    let ctx = deferred();
    let mut stack = InsertionStack::new();
    for _ in 0..3 {
        stack.save(InsertionPoint::at_end(ctx.module().body()));
    }
    stack.clear();
    assert_eq!(stack.depth(), 0);
    assert_eq!(stack.get(), Err(Error::EmptyStack));
}

#[test]
fn test_context_starts_at_module_body() {
    let ctx = deferred();
    assert_eq!(ctx.insertion_point(), Ok(InsertionPoint::at_end(ctx.module().body())));
    assert_eq!(ctx.stack().depth(), 1);
}

#[test]
fn test_empty_stack_reported_on_build() {
    let mut ctx = deferred();
    ctx.stack_mut().clear();
    let c = ctx.int_const(1, crate::DType::int32()).unwrap();
    assert_eq!(ctx.build(&c), Err(Error::EmptyStack));
    assert!(ctx.module().is_empty());
}

#[test]
fn test_scoped_truncates_on_error() {
    let mut ctx = deferred();
    let body = ctx.module().body();
    let result: crate::Result<()> = ctx.scoped(|ctx| {
        ctx.stack_mut().save(InsertionPoint::at_end(body));
        ctx.stack_mut().save(InsertionPoint::at_end(body));
        Err(Error::EmptyStack)
    });
    assert!(result.is_err());
    assert_eq!(ctx.stack().depth(), 1);
}

#[test]
fn test_with_insertion_point_pops_on_success() {
    let mut ctx = deferred();
    let body = ctx.module().body();
    let depth = ctx
        .with_insertion_point(InsertionPoint::at_end(body), |ctx| Ok(ctx.stack().depth()))
        .unwrap();
    assert_eq!(depth, 2);
    assert_eq!(ctx.stack().depth(), 1);
}
