mod insertion;
mod mode;
mod tree;
