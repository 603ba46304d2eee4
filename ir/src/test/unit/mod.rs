mod interp;
mod loops;
mod module;
mod predicate;
