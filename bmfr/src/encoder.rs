use glam::UVec3;

/// Single recorded operation.
///
/// Denoiser's stages execute eagerly, but every operation is also recorded so
/// that the host can inspect (or replay) the exact sequence of dispatches,
/// barriers and copies issued within a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Barrier(Barrier),

    Dispatch {
        label: String,
        groups: UVec3,

        /// Push-constant block the kernel got invoked with
        params: Vec<u8>,
    },

    Copy {
        src: String,
        dst: String,
    },

    Timestamp {
        label: &'static str,
    },
}

/// Transition of a resource between two accesses.
///
/// Barriers always cover every layer of the resource, so a double-buffered
/// image gets both of its layers synchronized, whichever one is active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Barrier {
    pub resource: String,
    pub src: Access,
    pub dst: Access,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Access {
    #[default]
    None,
    Read,
    Write,
    ReadWrite,
    TransferSrc,
    TransferDst,
}

impl Access {
    pub fn writes(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite | Self::TransferDst)
    }
}

#[derive(Debug, Default)]
pub struct CommandEncoder {
    commands: Vec<Command>,
}

impl CommandEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        log::trace!("Recording: {:?}", command);

        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn finish(self) -> Vec<Command> {
        self.commands
    }

    /// Returns labels of all recorded dispatches, in order.
    pub fn dispatches(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|command| match command {
            Command::Dispatch { label, .. } => Some(label.as_str()),
            _ => None,
        })
    }

    /// Returns all recorded barriers, in order.
    pub fn barriers(&self) -> impl Iterator<Item = &Barrier> + '_ {
        self.commands.iter().filter_map(|command| match command {
            Command::Barrier(barrier) => Some(barrier),
            _ => None,
        })
    }

    /// Returns labels of all recorded timestamps, in order.
    pub fn timestamps(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().filter_map(|command| match command {
            Command::Timestamp { label } => Some(*label),
            _ => None,
        })
    }
}
