pub mod stage0_punctuate;
pub mod stage1_segment;
pub mod stage2_tag;
pub mod stage3_metrics;
pub mod stage4_assemble;

pub use stage0_punctuate::*;
pub use stage1_segment::*;
pub use stage2_tag::*;
pub use stage3_metrics::*;
pub use stage4_assemble::*;
