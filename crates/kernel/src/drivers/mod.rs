//! Peripheral drivers: block device, chained-buffer DMA, coprocessor
//! (spec §4.8-§4.10).

pub mod block;
pub mod cma;
pub mod coproc;

pub use block::BlockDriver;
pub use cma::ChainedBuffer;
pub use coproc::CoprocDriver;
