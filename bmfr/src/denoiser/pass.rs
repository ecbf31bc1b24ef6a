use std::marker::PhantomData;
use std::mem;

use bytemuck::Pod;
use glam::UVec2;
use log::{debug, trace};

use crate::{Command, CommandEncoder};

/// Compute pass executed on the CPU.
///
/// Running a pass records its dispatch (together with the push-constant block)
/// into the encoder and then invokes the kernel, which is expected to cover
/// all of the pass's work-items.
#[derive(Debug)]
pub struct DenoiserComputePass<P> {
    label: String,
    workgroup_size: UVec2,
    _params: PhantomData<P>,
}

impl<P> DenoiserComputePass<P>
where
    P: Pod,
{
    pub fn new(label: impl ToString, workgroup_size: UVec2) -> Self {
        let label = label.to_string();

        debug!("Initializing pass: {} ({:?})", label, workgroup_size);

        Self {
            label,
            workgroup_size,
            _params: PhantomData,
        }
    }

    pub fn label(&self) -> String {
        format!("bmfr_{}_pass", self.label)
    }

    /// Number of workgroups needed to cover given number of work-items.
    pub fn workgroups(&self, work_items: UVec2) -> UVec2 {
        (work_items + self.workgroup_size - 1) / self.workgroup_size
    }

    pub fn run<R>(
        &self,
        encoder: &mut CommandEncoder,
        work_items: UVec2,
        params: P,
        kernel: impl FnOnce(&P) -> R,
    ) -> R {
        let groups = self.workgroups(work_items);

        let params_bytes = if mem::size_of::<P>() > 0 {
            bytemuck::bytes_of(&params).to_vec()
        } else {
            Vec::new()
        };

        trace!(
            "Dispatching {}: work_items={:?}, groups={:?}",
            self.label,
            work_items,
            groups
        );

        encoder.push(Command::Dispatch {
            label: self.label(),
            groups: groups.extend(1),
            params: params_bytes,
        });

        kernel(&params)
    }
}
