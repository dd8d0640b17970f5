pub mod classify;
pub mod replay;
pub mod synth;
pub mod validate;
