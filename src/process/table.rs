/*!
 * Process Table
 * Arena of live processes keyed by pid, plus the ordered list of roots
 */

use super::process::Process;
use crate::core::types::Pid;
use ahash::AHashMap;

#[derive(Default)]
pub(crate) struct ProcessTable {
    processes: AHashMap<Pid, Process>,
    roots: Vec<Pid>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process under its parent, or as a root.
    ///
    /// A parent that is no longer registered leaves the process as a root.
    /// Returns whether the requested parent was found.
    pub fn insert(&mut self, mut process: Process) -> bool {
        let pid = process.pid();
        let attached = match process.parent() {
            Some(parent) => match self.processes.get_mut(&parent) {
                Some(parent) => {
                    parent.add_child(pid);
                    true
                }
                None => false,
            },
            None => true,
        };

        if !attached {
            process = process.orphaned();
        }
        if process.parent().is_none() {
            self.roots.push(pid);
        }
        self.processes.insert(pid, process);
        attached
    }

    #[inline]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn roots(&self) -> &[Pid] {
        &self.roots
    }

    pub fn pids(&self) -> impl Iterator<Item = &Pid> {
        self.processes.keys()
    }

    /// Unlink `pid` from its parent's children or from the roots
    pub fn detach(&mut self, pid: Pid) {
        let parent = self.processes.get(&pid).and_then(Process::parent);
        match parent.and_then(|parent| self.processes.get_mut(&parent)) {
            Some(parent) => parent.remove_child(pid),
            None => self.roots.retain(|&root| root != pid),
        }
    }

    /// Deregister `pid` and all of its descendants.
    ///
    /// Every process in the subtree is out of the table before this returns.
    /// The result is in post-order: descendants before their ancestors, the
    /// subtree root last.
    pub fn remove_subtree(&mut self, pid: Pid) -> Vec<Process> {
        let mut removed = Vec::new();
        // (pid, children already expanded)
        let mut stack = vec![(pid, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                if let Some(process) = self.processes.remove(&current) {
                    removed.push(process);
                }
                continue;
            }

            let children = match self.processes.get(&current) {
                Some(process) => process.children().to_vec(),
                None => continue,
            };
            stack.push((current, true));
            // Reverse so the first child is finalized first
            stack.extend(children.into_iter().rev().map(|child| (child, false)));
        }

        removed
    }
}
