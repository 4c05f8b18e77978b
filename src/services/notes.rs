//! Notes: private annotations on books

use validator::Validate;

use crate::{
    access::{ensure, stamp_owner, Action, Caller, Resource},
    error::AppResult,
    models::note::{CreateNote, Note, NoteQuery, UpdateNote},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotesService {
    repository: Repository,
}

impl NotesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// The caller's own notes
    pub async fn list(&self, caller: Caller, query: &NoteQuery) -> AppResult<Vec<Note>> {
        let user_id = caller.require_user()?;
        self.repository.notes.list_for_user(user_id, query.book_id).await
    }

    pub async fn get(&self, caller: Caller, id: i64) -> AppResult<Note> {
        let note = self.repository.notes.get_by_id(id).await?;
        ensure(caller, &Resource::Note { owner: note.user_id }, Action::Read)?;
        Ok(note)
    }

    pub async fn create(&self, caller: Caller, data: CreateNote) -> AppResult<Note> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;

        let note = self.repository.notes.create(&data).await?;
        tracing::info!(note_id = note.id, book_id = note.book_id, "Note created");
        Ok(note)
    }

    pub async fn update(&self, caller: Caller, id: i64, data: UpdateNote) -> AppResult<Note> {
        let note = self.repository.notes.get_by_id(id).await?;
        ensure(caller, &Resource::Note { owner: note.user_id }, Action::Update)?;
        data.validate()?;
        self.repository.notes.update(id, &data).await
    }

    pub async fn delete(&self, caller: Caller, id: i64) -> AppResult<()> {
        let note = self.repository.notes.get_by_id(id).await?;
        ensure(caller, &Resource::Note { owner: note.user_id }, Action::Delete)?;
        self.repository.notes.delete(id).await
    }
}
