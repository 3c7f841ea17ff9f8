#![no_std]
#![no_main]
#![allow(clippy::missing_safety_doc)]

use tessera_kernel::boot::{BootRole, phase0_validate, phase1_build_tables};
use tessera_kernel::mapping::{
    AccessMode, Cluster, ClusterId, MappingImageHeader, Pseg, PsegId, PsegKind, Vseg, VsegKind, Vspace, VspaceId,
};
use tessera_kernel::mem::alloc::PhysAllocator;
use tessera_kernel::{console, logging, mem, platform};

/// The bring-up mapping: one cluster, one identity-mapped kernel vspace.
/// A real deployment links in a mapping image built by the off-target
/// placement tool (spec §3/§4.1); this is the smallest one that exercises
/// every boot phase standalone.
const CLUSTERS: [Cluster; 1] =
    [Cluster { x: 0, y: 0, pseg_offset: 0, pseg_count: 1, proc_offset: 0, proc_count: 1, periph_offset: 0, periph_count: 0 }];
const PSEGS: [Pseg; 1] = [Pseg { cluster: ClusterId::from_index(0), kind: PsegKind::Ram, base: 0, size: 0x0100_0000 }];
const VSPACES: [Vspace; 1] = [Vspace { id: VspaceId::from_index(0) }];
const VSEGS: [Vseg; 1] = [Vseg {
    vspace: VspaceId::from_index(0),
    base: 0,
    size: 0x0100_0000,
    pseg: PsegId::from_index(0),
    mode: AccessMode::RWX,
    kind: VsegKind::Data,
    identity: true,
    big: false,
    local: true,
    global: false,
}];

fn boot_header() -> MappingImageHeader {
    MappingImageHeader {
        signature: 0x4D45_5348,
        mesh_x: 1,
        mesh_y: 1,
        cluster_count: CLUSTERS.len(),
        pseg_count: PSEGS.len(),
        vspace_count: VSPACES.len(),
        vseg_count: VSEGS.len(),
        task_count: 0,
        peripheral_count: 0,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn kernel_main() -> ! {
    unsafe {
        platform::disable_interrupts();
    }

    unsafe {
        mem::heap::init_heap();
    }

    logging::init();
    console::set_current_cluster(ClusterId::from_index(0));

    log::info!("booting single-cluster bring-up image");

    let image = phase0_validate(boot_header(), &CLUSTERS, &PSEGS, &VSPACES, &VSEGS, &[], &[])
        .expect("malformed mapping image");

    let mut allocator = PhysAllocator::new(ClusterId::from_index(0), 0, 0, 256, 512);
    let tables = phase1_build_tables(&image, BootRole::DesignatedHome, ClusterId::from_index(0), &mut allocator)
        .expect("page table build failed");

    log::info!("built {} page table(s) for {} vspace(s)", tables.len(), image.vspaces().len());

    console::mark_boot_complete();
    log::info!("mesh kernel ready");

    loop {
        platform::tick();
        core::hint::spin_loop();
    }
}
