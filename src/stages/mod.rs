mod attempt;
pub mod stage0_chunk;
pub mod stage1_extract;
pub mod stage2_categorize;
pub mod stage3_analyze;
pub mod stage4_render;

pub use stage0_chunk::*;
pub use stage1_extract::*;
pub use stage2_categorize::*;
pub use stage3_analyze::*;
pub use stage4_render::*;
