use super::{
    entry, AttributeMap, DirectoryClient, DirectoryConnector, DirectoryError,
    RESULT_ALREADY_EXISTS, RESULT_NO_SUCH_OBJECT,
};
use crate::workflows::provisioning::CandidateRecord;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Entry = BTreeMap<String, Vec<String>>;

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    create_failures: HashMap<String, DirectoryError>,
    delete_failures: HashMap<String, DirectoryError>,
    operations: usize,
}

/// Directory kept in process memory.
///
/// Clones share the same entries, so a clone handed out through
/// [`DirectoryConnector::open`] observes and mutates the original. Failures
/// for specific DNs can be scripted to exercise rejection paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<State>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every create at `dn` fail with `error`.
    pub fn fail_create(&self, dn: impl Into<String>, error: DirectoryError) {
        self.lock().create_failures.insert(dn.into(), error);
    }

    /// Makes every delete at `dn` fail with `error`.
    pub fn fail_delete(&self, dn: impl Into<String>, error: DirectoryError) {
        self.lock().delete_failures.insert(dn.into(), error);
    }

    /// Inserts an entry directly, bypassing create checks.
    pub fn insert_entry(&self, dn: impl Into<String>, attributes: &[(&str, &str)]) {
        let entry = attributes
            .iter()
            .map(|(name, value)| (name.to_string(), vec![value.to_string()]))
            .collect();
        self.lock().entries.insert(dn.into(), entry);
    }

    pub fn contains(&self, dn: &str) -> bool {
        self.lock().entries.contains_key(dn)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of directory calls served so far.
    pub fn operation_count(&self) -> usize {
        self.lock().operations
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        state.operations += 1;
        state
    }
}

fn parent_of(dn: &str) -> Option<&str> {
    let mut escaped = false;
    for (index, ch) in dn.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => return Some(&dn[index + 1..]),
            _ => escaped = false,
        }
    }
    None
}

impl DirectoryClient for InMemoryDirectory {
    fn exists(&mut self, dn: &str) -> bool {
        self.begin().entries.contains_key(dn)
    }

    fn create(&mut self, record: &CandidateRecord, dn: &str) -> Result<(), DirectoryError> {
        let mut state = self.begin();
        if let Some(error) = state.create_failures.get(dn) {
            return Err(error.clone());
        }
        if state.entries.contains_key(dn) {
            return Err(DirectoryError::rejected(RESULT_ALREADY_EXISTS));
        }

        let entry = entry::user_attributes(record)
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect();
        state.entries.insert(dn.to_string(), entry);
        Ok(())
    }

    fn delete(&mut self, dn: &str) -> Result<(), DirectoryError> {
        let mut state = self.begin();
        if let Some(error) = state.delete_failures.get(dn) {
            return Err(error.clone());
        }
        match state.entries.remove(dn) {
            Some(_) => Ok(()),
            None => Err(DirectoryError::rejected(RESULT_NO_SUCH_OBJECT)),
        }
    }

    fn list_children(&mut self, base: &str) -> Result<Vec<String>, DirectoryError> {
        let state = self.begin();
        Ok(state
            .entries
            .keys()
            .filter(|dn| parent_of(dn) == Some(base))
            .cloned()
            .collect())
    }

    fn fetch_attributes(
        &mut self,
        dn: &str,
        names: &[&str],
    ) -> Result<Option<AttributeMap>, DirectoryError> {
        let state = self.begin();
        Ok(state.entries.get(dn).map(|entry| {
            entry
                .iter()
                .filter(|(name, _)| names.iter().any(|wanted| wanted.eq_ignore_ascii_case(name)))
                .filter_map(|(name, values)| {
                    values.first().map(|value| (name.clone(), value.clone()))
                })
                .collect()
        }))
    }
}

impl DirectoryConnector for InMemoryDirectory {
    fn open(&self) -> Result<Box<dyn DirectoryClient + Send>, DirectoryError> {
        Ok(Box::new(self.clone()))
    }
}
