use nix::unistd::Pid;
use tracing::debug;

/// What the table remembers about a background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    cmd: String,
    pgid: Option<Pid>,
}

impl JobEntry {
    pub fn new(cmd: &str) -> Self {
        JobEntry {
            cmd: cmd.to_string(),
            pgid: None,
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn pgid(&self) -> Option<Pid> {
        self.pgid
    }
}

/// Fixed set of slots numbered from 1. Slot 0 is never handed out.
///
/// Entries stay until [`JobTable::remove`] is called; nothing in the pipeline
/// code frees a slot when its job ends.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<JobEntry>>,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        JobTable {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `entry` in the lowest free slot and returns its number.
    pub fn register(&mut self, entry: JobEntry) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        debug!("JOB_TABLE: slot {} <- '{}'", index + 1, entry.cmd);
        self.slots[index] = Some(entry);
        Some(index + 1)
    }

    pub fn set_pgid(&mut self, slot: usize, pgid: Option<Pid>) {
        if let Some(entry) = self.slot_mut(slot) {
            entry.pgid = pgid;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&JobEntry> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .and_then(Option::as_ref)
    }

    pub fn remove(&mut self, slot: usize) -> Option<JobEntry> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .and_then(Option::take)
    }

    fn slot_mut(&mut self, slot: usize) -> Option<&mut JobEntry> {
        slot.checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .and_then(Option::as_mut)
    }
}
