pub mod analysis;
pub mod diagnostic;
pub mod fix;
pub mod fix_state;
pub mod knowledge;
pub mod resolution;
pub mod suggestion;
pub mod text;
