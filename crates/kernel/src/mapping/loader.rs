//! Validates and exposes a mapping image as borrowed slices over its
//! backing byte buffer. No copies, per spec §4.1: the image is produced
//! off-target and trusted only after the checks below pass.

use crate::config::{MAX_X, MAX_Y};
use crate::error::MappingError;

use super::{Cluster, Peripheral, Pseg, Task, Vseg, Vspace};

const SIGNATURE: u32 = 0x4D45_5348; // "MESH"

/// Fixed-size header at the start of a mapping image.
#[derive(Clone, Copy, Debug)]
pub struct MappingImageHeader {
    pub signature: u32,
    pub mesh_x: u32,
    pub mesh_y: u32,
    pub cluster_count: usize,
    pub pseg_count: usize,
    pub vspace_count: usize,
    pub vseg_count: usize,
    pub task_count: usize,
    pub peripheral_count: usize,
}

/// A validated mapping image, borrowing its backing tables.
pub struct MappingImage<'a> {
    header: MappingImageHeader,
    clusters: &'a [Cluster],
    psegs: &'a [Pseg],
    vspaces: &'a [Vspace],
    vsegs: &'a [Vseg],
    tasks: &'a [Task],
    peripherals: &'a [Peripheral],
}

impl<'a> MappingImage<'a> {
    /// Validates header and all cross-table index references before
    /// returning a usable image. Fails closed: any bad reference is a
    /// `MappingError`, never a silent clamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        header: MappingImageHeader,
        clusters: &'a [Cluster],
        psegs: &'a [Pseg],
        vspaces: &'a [Vspace],
        vsegs: &'a [Vseg],
        tasks: &'a [Task],
        peripherals: &'a [Peripheral],
    ) -> Result<Self, MappingError> {
        if header.signature != SIGNATURE {
            return Err(MappingError::BadSignature);
        }
        if header.mesh_x as usize > MAX_X || header.mesh_y as usize > MAX_Y {
            return Err(MappingError::MeshTooLarge {
                x: header.mesh_x as usize,
                y: header.mesh_y as usize,
            });
        }

        let check = |index: usize, len: usize| -> Result<(), MappingError> {
            if index >= len {
                Err(MappingError::IndexOutOfRange { index, len })
            } else {
                Ok(())
            }
        };

        for pseg in psegs {
            check(pseg.cluster.index(), clusters.len())?;
        }
        for vseg in vsegs {
            check(vseg.vspace.index(), vspaces.len())?;
            check(vseg.pseg.index(), psegs.len())?;
        }
        let total_procs: usize = clusters.iter().map(|c| c.proc_count).sum();
        for task in tasks {
            check(task.vspace.index(), vspaces.len())?;
            check(task.stack_vseg.index(), vsegs.len())?;
            check(task.proc.index(), total_procs)?;
        }
        for periph in peripherals {
            check(periph.cluster.index(), clusters.len())?;
        }
        for cluster in clusters {
            check(cluster.pseg_offset + cluster.pseg_count, psegs.len() + 1)?;
            check(cluster.periph_offset + cluster.periph_count, peripherals.len() + 1)?;
        }

        Ok(Self { header, clusters, psegs, vspaces, vsegs, tasks, peripherals })
    }

    pub const fn header(&self) -> MappingImageHeader {
        self.header
    }

    pub fn clusters(&self) -> &'a [Cluster] {
        self.clusters
    }

    pub fn psegs(&self) -> &'a [Pseg] {
        self.psegs
    }

    pub fn vspaces(&self) -> &'a [Vspace] {
        self.vspaces
    }

    pub fn vsegs(&self) -> &'a [Vseg] {
        self.vsegs
    }

    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    pub fn peripherals(&self) -> &'a [Peripheral] {
        self.peripherals
    }

    /// All vsegs belonging to one vspace, in image order.
    pub fn vsegs_of(&self, vspace: super::VspaceId) -> impl Iterator<Item = &'a Vseg> {
        self.vsegs.iter().filter(move |v| v.vspace == vspace)
    }
}
