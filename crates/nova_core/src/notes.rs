use crate::clock::{Clock, IdSource, format_timestamp};
use crate::error::AppError;
use crate::model::Note;
use crate::storage::{KeyValueStore, Storage, keys};

#[derive(Debug, Default, Clone)]
pub struct NotesStore {
    notes: Vec<Note>,
    ids: IdSource,
}

impl NotesStore {
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        let notes: Vec<Note> = storage.load(keys::NOTES, Vec::new());
        let ids = IdSource::seeded(notes.iter().map(|note| note.id));
        Self { notes, ids }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Appends a note; blank text is ignored.
    pub fn add<S: KeyValueStore, C: Clock + ?Sized>(
        &mut self,
        storage: &mut Storage<S>,
        clock: &C,
        text: &str,
    ) -> Result<Option<Note>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let now = clock.now();
        let note = Note {
            id: self.ids.next_id(now),
            text: trimmed.to_string(),
            created_at: format_timestamp(now)?,
        };
        self.notes.push(note.clone());
        storage.save(keys::NOTES, &self.notes);

        Ok(Some(note))
    }

    pub fn delete<S: KeyValueStore>(&mut self, storage: &mut Storage<S>, id: i64) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        let removed = self.notes.remove(index);
        storage.save(keys::NOTES, &self.notes);
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::NotesStore;
    use crate::clock::testing::SteppingClock;
    use crate::clock::{FixedClock, unix_millis};
    use crate::storage::{KeyValueStore, MemoryStore, Storage, keys};
    use time::format_description::well_known::Rfc3339;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    #[test]
    fn add_and_delete_persist() {
        let clock = FixedClock::new(datetime!(2026-10-16 12:00 UTC));
        let mut storage = Storage::new(MemoryStore::new());
        let mut notes = NotesStore::load(&storage);

        let first = notes.add(&mut storage, &clock, " call mom ").unwrap().unwrap();
        clock.advance(Duration::seconds(1));
        let second = notes.add(&mut storage, &clock, "water plants").unwrap().unwrap();
        assert_eq!(first.text, "call mom");
        assert_eq!(second.created_at, "2026-10-16T12:00:01Z");

        let removed = notes.delete(&mut storage, first.id).unwrap();
        assert_eq!(removed, first);

        let reloaded = NotesStore::load(&storage);
        assert_eq!(reloaded.notes(), &[second]);
    }

    #[test]
    fn id_matches_created_at() {
        let clock = SteppingClock::new(datetime!(2026-10-16 12:00 UTC));
        let mut storage = Storage::new(MemoryStore::new());
        let mut notes = NotesStore::load(&storage);

        let note = notes.add(&mut storage, &clock, "x").unwrap().unwrap();

        let created = OffsetDateTime::parse(&note.created_at, &Rfc3339).unwrap();
        assert_eq!(unix_millis(created), note.id);
    }

    #[test]
    fn blank_notes_are_ignored() {
        let clock = FixedClock::new(datetime!(2026-10-16 12:00 UTC));
        let mut storage = Storage::new(MemoryStore::new());
        let mut notes = NotesStore::load(&storage);

        assert!(notes.add(&mut storage, &clock, "\t ").unwrap().is_none());
        assert!(storage.backend().get(keys::NOTES).unwrap().is_none());
    }

    #[test]
    fn deleting_unknown_note_changes_nothing() {
        let mut storage = Storage::new(MemoryStore::new());
        let mut notes = NotesStore::load(&storage);

        assert!(notes.delete(&mut storage, 99).is_none());
        assert!(storage.backend().get(keys::NOTES).unwrap().is_none());
    }

    #[test]
    fn malformed_notes_load_as_empty() {
        let storage = Storage::new(MemoryStore::new().with_entry(keys::NOTES, "nope"));
        assert!(NotesStore::load(&storage).notes().is_empty());
    }
}
