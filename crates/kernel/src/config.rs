//! Compile-time constants describing the mesh hardware this kernel is built
//! for. The mapping loader checks the image header against these before
//! trusting anything else in it.

/// Bits of cluster X coordinate encoded in a physical/global address.
pub const X_WIDTH: u32 = 4;
/// Bits of cluster Y coordinate encoded in a physical/global address.
pub const Y_WIDTH: u32 = 4;
/// Bits of local processor index within a cluster.
pub const P_WIDTH: u32 = 4;

/// Maximum clusters along X (`2^X_WIDTH`).
pub const MAX_X: usize = 1 << X_WIDTH;
/// Maximum clusters along Y (`2^Y_WIDTH`).
pub const MAX_Y: usize = 1 << Y_WIDTH;
/// Maximum processors per cluster (`2^P_WIDTH`).
pub const MAX_P: usize = 1 << P_WIDTH;

/// Bits of big-page-index (`BPPI`) in a physical page number.
pub const BPPI_WIDTH: u32 = 11;
/// Bits of small-page-index (`SPPI`) within a big page.
pub const SPPI_WIDTH: u32 = 9;

/// Small page size, 4 KiB.
pub const SMALL_PAGE_SIZE: usize = 1 << (SPPI_WIDTH + 3);
/// Big page size, 2 MiB (`SMALL_PAGE_SIZE * 2^SPPI_WIDTH`).
pub const BIG_PAGE_SIZE: usize = SMALL_PAGE_SIZE << SPPI_WIDTH;

/// Entries in an L1 page table.
pub const L1_ENTRIES: usize = 2048;
/// Entries in an L2 page table.
pub const L2_ENTRIES: usize = 512;

/// Writable interrupt inputs ("mailboxes") per processor.
pub const IRQ_PER_PROC: usize = 32;

/// Cache-line size a DMA-capable peripheral's buffer must be aligned to.
pub const CACHE_LINE_SIZE: usize = 64;
/// Bytes per block-device sector.
pub const SECTOR_SIZE: usize = 512;
/// Command-list slots on the multi-channel block controller variant.
pub const BLOCK_MC_SLOTS: usize = 32;
