use fxhash::FxHashMap;
use glam::UVec2;

use crate::gpu::Frame;
use crate::{Access, Barrier, Command, CommandEncoder};

/// Tracks the last access of every resource touched by the denoiser, so that
/// correct barriers can be emitted between stages.
#[derive(Debug, Default)]
pub struct ResourceStates {
    states: FxHashMap<String, Access>,
}

impl ResourceStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: &str) -> Access {
        self.states.get(resource).copied().unwrap_or_default()
    }

    /// Records a barrier transitioning given resource into `access`.
    ///
    /// Redundant read-after-read barriers are skipped.
    pub fn barrier(
        &mut self,
        encoder: &mut CommandEncoder,
        resource: &str,
        access: Access,
    ) {
        let src = self.get(resource);

        if src == access && !access.writes() {
            return;
        }

        encoder.push(Command::Barrier(Barrier {
            resource: resource.to_owned(),
            src,
            dst: access,
        }));

        self.states.insert(resource.to_owned(), access);
    }
}

/// Per-frame information provided by the host.
#[derive(Debug)]
pub struct FrameContext<'a> {
    pub frame: Frame,
    pub size: UVec2,
    pub states: &'a mut ResourceStates,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        frame: Frame,
        size: UVec2,
        states: &'a mut ResourceStates,
    ) -> Self {
        Self {
            frame,
            size,
            states,
        }
    }
}
