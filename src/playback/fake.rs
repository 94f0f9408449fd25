//! Scripted audio backend that records every call it receives.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::audio::{AudioBackend, AudioResource, OutputError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Created(usize),
    SetSource(usize, PathBuf),
    Prepared(usize),
    Started(usize),
    Paused(usize),
    Resumed(usize),
    Seek(usize, Duration),
    Read(usize),
    Released(usize),
}

#[derive(Debug, Default)]
pub struct Script {
    pub calls: Vec<Call>,
    next_id: usize,
    alive: HashSet<usize>,
    pub max_alive: usize,
    pub unplayable: HashSet<PathBuf>,
    pub finished: HashSet<usize>,
    pub fail_release: bool,
    /// Resource ids whose start, pause and resume fail.
    pub fail_transport: HashSet<usize>,
    pub fail_seek: bool,
    pub duration: Option<Duration>,
}

impl Script {
    pub fn alive(&self) -> usize {
        self.alive.len()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Id of the most recently created resource.
    pub fn last_id(&self) -> Option<usize> {
        self.next_id.checked_sub(1)
    }

    /// Every read must come from a resource that was not yet released.
    pub fn reads_after_release(&self) -> Vec<usize> {
        let mut released = HashSet::new();
        let mut bad = Vec::new();
        for call in &self.calls {
            match call {
                Call::Released(id) => {
                    released.insert(*id);
                }
                Call::Read(id) | Call::Seek(id, _) | Call::Paused(id) | Call::Resumed(id)
                    if released.contains(id) =>
                {
                    bad.push(*id);
                }
                _ => {}
            }
        }
        bad
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub script: Rc<RefCell<Script>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        let backend = Self::default();
        backend.script.borrow_mut().duration = Some(duration);
        backend
    }

    pub fn mark_unplayable(&self, path: &str) {
        self.script.borrow_mut().unplayable.insert(PathBuf::from(path));
    }

    /// Make start, pause and resume on the newest resource fail.
    pub fn break_last(&self) {
        let mut s = self.script.borrow_mut();
        if let Some(id) = s.last_id() {
            s.fail_transport.insert(id);
        }
    }

    /// Make the next resource created fail to start.
    pub fn break_next(&self) {
        let mut s = self.script.borrow_mut();
        let id = s.next_id;
        s.fail_transport.insert(id);
    }

    pub fn finish_last(&self) {
        let mut s = self.script.borrow_mut();
        if let Some(id) = s.last_id() {
            s.finished.insert(id);
        }
    }
}

impl AudioBackend for FakeBackend {
    type Resource = FakeResource;

    fn create(&mut self) -> FakeResource {
        let mut s = self.script.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        s.alive.insert(id);
        s.max_alive = s.max_alive.max(s.alive.len());
        s.calls.push(Call::Created(id));
        FakeResource {
            id,
            script: self.script.clone(),
            path: None,
            position: Duration::ZERO,
        }
    }
}

pub struct FakeResource {
    id: usize,
    script: Rc<RefCell<Script>>,
    path: Option<PathBuf>,
    position: Duration,
}

impl FakeResource {
    fn record(&self, call: Call) {
        self.script.borrow_mut().calls.push(call);
    }

    fn transport(&self, call: Call) -> Result<(), OutputError> {
        self.record(call);
        if self.script.borrow().fail_transport.contains(&self.id) {
            Err(OutputError::NotPrepared)
        } else {
            Ok(())
        }
    }
}

impl AudioResource for FakeResource {
    fn set_source(&mut self, path: &Path) -> Result<(), OutputError> {
        self.record(Call::SetSource(self.id, path.to_path_buf()));
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), OutputError> {
        let path = self.path.clone().ok_or(OutputError::NoSource)?;
        if self.script.borrow().unplayable.contains(&path) {
            return Err(OutputError::Open {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }
        self.record(Call::Prepared(self.id));
        Ok(())
    }

    fn start(&mut self) -> Result<(), OutputError> {
        self.transport(Call::Started(self.id))
    }

    fn pause(&mut self) -> Result<(), OutputError> {
        self.transport(Call::Paused(self.id))
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        self.transport(Call::Resumed(self.id))
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), OutputError> {
        self.record(Call::Seek(self.id, position));
        if self.script.borrow().fail_seek {
            return Err(OutputError::NotPrepared);
        }
        self.position = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.record(Call::Read(self.id));
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.script.borrow().duration
    }

    fn is_finished(&self) -> bool {
        self.script.borrow().finished.contains(&self.id)
    }

    fn release(self) -> Result<(), OutputError> {
        let mut s = self.script.borrow_mut();
        s.alive.remove(&self.id);
        s.calls.push(Call::Released(self.id));
        if s.fail_release {
            Err(OutputError::NotPrepared)
        } else {
            Ok(())
        }
    }
}
