//! Phase-barrier boot sequencer. Every processor in the mesh runs the same
//! phases in lockstep, synchronized by a [`Barrier`] between each one, so
//! no processor ever observes a page table or mailbox routing that another
//! processor is still mid-build on (spec §4.11).

extern crate alloc;

use alloc::vec::Vec;

use crate::error::KernelError;
use crate::mapping::{ClusterId, MappingImage};
use crate::mem::alloc::PhysAllocator;
use crate::mem::paging::{L1Table, PageFlushAll, build_page_table};
use crate::sync::Barrier;

/// A processor's role in the boot sequence: exactly one processor per
/// cluster is its "home" (responsible for that cluster's bring-up work),
/// exactly one cluster's home is additionally the mesh's designated home,
/// and every other processor is a follower that only waits at barriers
/// until scheduling begins (spec §9's "give each an explicit owner type").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BootRole {
    DesignatedHome,
    ClusterHome,
    Follower,
}

/// Validates the mapping image. Run by every processor identically; a
/// failure here is fatal before any other boot work starts.
pub fn phase0_validate<'a>(
    header: crate::mapping::MappingImageHeader,
    clusters: &'a [crate::mapping::Cluster],
    psegs: &'a [crate::mapping::Pseg],
    vspaces: &'a [crate::mapping::Vspace],
    vsegs: &'a [crate::mapping::Vseg],
    tasks: &'a [crate::mapping::Task],
    peripherals: &'a [crate::mapping::Peripheral],
) -> Result<MappingImage<'a>, KernelError> {
    Ok(MappingImage::new(header, clusters, psegs, vspaces, vsegs, tasks, peripherals)?)
}

/// Builds every vspace's page table. Only the cluster home for each vspace
/// does the work; followers just wait at the barrier that follows. A mode
/// conflict here is promoted straight to a fatal halt (spec §8 scenario 5:
/// no cluster ever observes a partially built table).
pub fn phase1_build_tables(
    image: &MappingImage<'_>,
    role: BootRole,
    home_cluster: ClusterId,
    allocator: &mut PhysAllocator,
) -> Result<Vec<L1Table>, KernelError> {
    if role == BootRole::Follower {
        return Ok(Vec::new());
    }

    let mut tables = Vec::new();
    for vspace in image.vspaces() {
        let table = build_page_table(image, vspace, home_cluster, allocator)?;
        tables.push(table);
    }

    // Every entry above was inserted into a table no core has started
    // walking yet; flush once for the whole batch rather than per entry.
    PageFlushAll::new().flush();

    Ok(tables)
}

/// Runs `phases` in order, waiting on `barrier` after each one. Used by
/// every processor's boot entry point with the same phase list, so a slow
/// cluster never lets a fast one start scheduling early.
pub fn run_phases<E>(barrier: &Barrier, phases: &[&dyn Fn() -> Result<(), E>]) -> Result<(), E> {
    for phase in phases {
        phase()?;
        barrier.wait();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{AccessMode, Cluster, ClusterId, MappingImageHeader, Pseg, PsegId, PsegKind, VsegKind, VspaceId, Vseg};

    #[test]
    fn phase0_rejects_a_malformed_image() {
        let header = MappingImageHeader {
            signature: 0,
            mesh_x: 1,
            mesh_y: 1,
            cluster_count: 0,
            pseg_count: 0,
            vspace_count: 0,
            vseg_count: 0,
            task_count: 0,
            peripheral_count: 0,
        };
        assert!(phase0_validate(header, &[], &[], &[], &[], &[], &[]).is_err());
    }

    #[test]
    fn phase1_builds_one_table_per_vspace_for_a_cluster_home() {
        let clusters = [Cluster { x: 0, y: 0, pseg_offset: 0, pseg_count: 1, proc_offset: 0, proc_count: 1, periph_offset: 0, periph_count: 0 }];
        let psegs = [Pseg { cluster: ClusterId::from_index(0), kind: PsegKind::Ram, base: 0, size: 0x10000 }];
        let vspaces = [Vspace { id: VspaceId::from_index(0) }];
        let vsegs = [Vseg {
            vspace: VspaceId::from_index(0),
            base: 0,
            size: 0x1000,
            pseg: PsegId::from_index(0),
            mode: AccessMode::RW,
            kind: VsegKind::Data,
            identity: false,
            big: false,
            local: true,
            global: false,
        }];
        let header = MappingImageHeader {
            signature: 0x4D45_5348,
            mesh_x: 1,
            mesh_y: 1,
            cluster_count: 1,
            pseg_count: 1,
            vspace_count: 1,
            vseg_count: 1,
            task_count: 0,
            peripheral_count: 0,
        };
        let image = phase0_validate(header, &clusters, &psegs, &vspaces, &vsegs, &[], &[]).unwrap();
        let mut allocator = PhysAllocator::new(ClusterId::from_index(0), 0, 0, 64, 512);
        let tables =
            phase1_build_tables(&image, BootRole::ClusterHome, ClusterId::from_index(0), &mut allocator).unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn phase1_is_a_no_op_for_followers() {
        let header = MappingImageHeader {
            signature: 0x4D45_5348,
            mesh_x: 1,
            mesh_y: 1,
            cluster_count: 0,
            pseg_count: 0,
            vspace_count: 0,
            vseg_count: 0,
            task_count: 0,
            peripheral_count: 0,
        };
        let image = phase0_validate(header, &[], &[], &[], &[], &[], &[]).unwrap();
        let mut allocator = PhysAllocator::new(crate::mapping::ClusterId::from_index(0), 0, 0, 1, 1);
        let tables =
            phase1_build_tables(&image, BootRole::Follower, ClusterId::from_index(0), &mut allocator).unwrap();
        assert!(tables.is_empty());
    }
}
