pub mod assembler;
pub mod sequence;
