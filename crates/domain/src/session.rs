use crate::{AccountRef, ParentRecordRef, StagedFile};

/// Page-scoped state shared by the stager, validator and pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    parent: Option<ParentRecordRef>,
    account: Option<AccountRef>,
    staged_file: Option<StagedFile>,
}

impl SessionState {
    /// Creates an unpopulated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identifiers resolved on page load.
    pub fn populate(&mut self, parent: ParentRecordRef, account: Option<AccountRef>) {
        self.parent = Some(parent);
        self.account = account;
    }

    /// Replaces the staged file as a whole.
    pub fn stage_file(&mut self, file: StagedFile) {
        self.staged_file = Some(file);
    }

    /// Drops the staged file, returning whether one was present.
    pub fn clear_staged_file(&mut self) -> bool {
        self.staged_file.take().is_some()
    }

    /// Returns the parent record reference.
    #[must_use]
    pub fn parent(&self) -> Option<&ParentRecordRef> {
        self.parent.as_ref()
    }

    /// Returns the linked account reference.
    #[must_use]
    pub fn account(&self) -> Option<&AccountRef> {
        self.account.as_ref()
    }

    /// Returns the staged file.
    #[must_use]
    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.staged_file.as_ref()
    }
}
