use crossbeam_channel::Sender;
use vigil_core::models::StoredEntry;

/// Work items for the writer thread. Maintenance travels through the same
/// queue as appends, so it is serialized with them.
#[derive(Debug)]
pub enum WriteCommand {
    Append(StoredEntry),
    /// Seal the active segment unconditionally.
    Rotate,
    /// Seal the active segment if it exceeds its size or age bound.
    CheckRotation,
    Compact,
    Retention,
    FlushDegraded,
    /// Answered once every command queued before it has been handled.
    Barrier(Sender<()>),
    Shutdown,
}

impl WriteCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WriteCommand::Append(_) => "append",
            WriteCommand::Rotate => "rotate",
            WriteCommand::CheckRotation => "check_rotation",
            WriteCommand::Compact => "compact",
            WriteCommand::Retention => "retention",
            WriteCommand::FlushDegraded => "flush_degraded",
            WriteCommand::Barrier(_) => "barrier",
            WriteCommand::Shutdown => "shutdown",
        }
    }

    pub fn is_append(&self) -> bool {
        matches!(self, WriteCommand::Append(_))
    }
}
