use std::path::{Path, PathBuf};

use crate::error::{LooperError, Result};
use crate::pipeline::controls::TrackControls;
use crate::pipeline::player::{PlayerBackend, PlayerHandle};

#[derive(Debug)]
pub struct Track {
    pub source: PathBuf,
    pub player: PlayerHandle,
    pub controls: TrackControls,
}

// skipped sources are not in the store, so the next snapshot drops them too
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: Vec<(PathBuf, LooperError)>,
}

/// Ordered tracks. Source and player live in the same record, so they cannot
/// drift out of step.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn add<B: PlayerBackend + ?Sized>(&mut self, source: &Path, backend: &mut B) -> Result<usize> {
        let player = PlayerHandle::bind(backend, source)?;
        self.tracks.push(Track {
            source: source.to_path_buf(),
            player,
            controls: TrackControls::default(),
        });
        log::info!("track {} added: {}", self.tracks.len() - 1, source.display());
        Ok(self.tracks.len() - 1)
    }

    /// Releases and removes the track at `index`; later tracks shift down.
    ///
    /// # Panics
    /// If `index` is out of range. Callers driven by user input check first.
    pub fn remove_at<B: PlayerBackend + ?Sized>(&mut self, index: usize, backend: &mut B) {
        assert!(index < self.tracks.len(), "remove_at({index}) with {} tracks", self.tracks.len());
        let mut track = self.tracks.remove(index);
        track.player.release(backend);
        log::info!("track {index} removed: {}", track.source.display());
    }

    // a failed bind leaves the store empty
    pub fn replace_all_releasing_old<B: PlayerBackend + ?Sized>(
        &mut self,
        new_source: &Path,
        backend: &mut B,
    ) -> Result<usize> {
        self.release_all(backend);
        self.tracks.clear();
        self.add(new_source, backend)
    }

    pub fn restore_from<B, I, P>(&mut self, sources: I, backend: &mut B) -> RestoreReport
    where
        B: PlayerBackend + ?Sized,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.release_all(backend);
        self.tracks.clear();

        let mut report = RestoreReport::default();
        for source in sources {
            let source = source.as_ref();
            match self.add(source, backend) {
                Ok(_) => report.restored += 1,
                Err(e) => {
                    log::warn!("skipping saved track {}: {e}", source.display());
                    report.skipped.push((source.to_path_buf(), e));
                }
            }
        }
        report
    }

    pub fn snapshot_sources(&self) -> Vec<PathBuf> {
        self.tracks.iter().map(|t| t.source.clone()).collect()
    }

    // teardown; the entries stay
    pub fn release_all<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B) {
        for track in &mut self.tracks {
            track.player.release(backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::player::PlayerState;
    use crate::pipeline::test_fixture::FakeBackend;

    fn store_with(names: &[&str], backend: &mut FakeBackend) -> TrackStore {
        let mut store = TrackStore::new();
        for n in names {
            store.add(Path::new(n), backend).unwrap();
        }
        store
    }

    fn sources(store: &TrackStore) -> Vec<String> {
        store
            .snapshot_sources()
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    #[test]
    fn add_returns_index_and_binds_once() {
        let mut backend = FakeBackend::default();
        let mut store = TrackStore::new();
        assert_eq!(store.add(Path::new("a.wav"), &mut backend).unwrap(), 0);
        assert_eq!(store.add(Path::new("b.wav"), &mut backend).unwrap(), 1);
        assert_eq!(backend.bound.len(), 2);
        assert_eq!(store.get(1).unwrap().player.state(), PlayerState::Paused);
    }

    #[test]
    fn failed_add_leaves_store_untouched() {
        let mut backend = FakeBackend::failing(&["broken.mp3"]);
        let mut store = store_with(&["a.wav"], &mut backend);
        let err = store.add(Path::new("broken.mp3"), &mut backend).unwrap_err();
        assert!(matches!(err, LooperError::PlayerBind { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_at_shifts_later_tracks_down() {
        let mut backend = FakeBackend::default();
        let mut store = store_with(&["a.wav", "b.wav", "c.wav"], &mut backend);
        let c_id = store.get(2).unwrap().player.id();
        let b_id = store.get(1).unwrap().player.id();

        store.remove_at(1, &mut backend);

        assert_eq!(sources(&store), vec!["a.wav", "c.wav"]);
        assert_eq!(store.get(1).unwrap().player.id(), c_id);
        assert_eq!(backend.released(), vec![b_id]);
    }

    #[test]
    fn source_and_player_stay_paired_through_adds_and_removes() {
        let mut backend = FakeBackend::default();
        let mut store = TrackStore::new();
        let ops: &[(bool, usize)] = &[(true, 0), (true, 0), (true, 0), (false, 1), (true, 0), (false, 0), (false, 1)];
        let mut n = 0;
        for &(is_add, idx) in ops {
            if is_add {
                store.add(Path::new(&format!("t{n}.wav")), &mut backend).unwrap();
                n += 1;
            } else {
                store.remove_at(idx, &mut backend);
            }
            for track in store.iter() {
                let (path, id) = backend.bound.iter().find(|(_, id)| *id == track.player.id()).unwrap();
                assert_eq!(path, &track.source);
                assert_eq!(*id, track.player.id());
            }
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    #[should_panic]
    fn remove_at_out_of_range_panics() {
        let mut backend = FakeBackend::default();
        let mut store = store_with(&["a.wav"], &mut backend);
        store.remove_at(1, &mut backend);
    }

    #[test]
    fn replace_all_leaves_exactly_one_live_player() {
        let mut backend = FakeBackend::default();
        let mut store = store_with(&["a.wav", "b.wav", "c.wav"], &mut backend);
        let old: Vec<_> = store.iter().map(|t| t.player.id()).collect();

        let idx = store.replace_all_releasing_old(Path::new("import.mp3"), &mut backend).unwrap();

        assert_eq!(idx, 0);
        assert_eq!(sources(&store), vec!["import.mp3"]);
        assert!(!store.get(0).unwrap().player.is_released());
        let mut released = backend.released();
        released.sort_by_key(|id| id.0);
        assert_eq!(released, old);
    }

    #[test]
    fn replace_all_on_empty_store() {
        let mut backend = FakeBackend::default();
        let mut store = TrackStore::new();
        store.replace_all_releasing_old(Path::new("import.mp3"), &mut backend).unwrap();
        assert_eq!(store.len(), 1);
        assert!(backend.released().is_empty());
    }

    #[test]
    fn replace_all_with_unbindable_source_empties_store() {
        let mut backend = FakeBackend::failing(&["broken.mp3"]);
        let mut store = store_with(&["a.wav", "b.wav"], &mut backend);

        let err = store.replace_all_releasing_old(Path::new("broken.mp3"), &mut backend).unwrap_err();

        assert!(matches!(err, LooperError::PlayerBind { .. }));
        assert_eq!(store.len(), 0);
        assert!(store.snapshot_sources().is_empty());
        assert_eq!(backend.released().len(), 2);
    }

    #[test]
    fn restore_keeps_order() {
        let mut backend = FakeBackend::default();
        let mut store = store_with(&["old.wav"], &mut backend);
        let saved = ["x.wav", "y.wav", "z.wav"];

        let report = store.restore_from(saved, &mut backend);

        assert_eq!(report.restored, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(sources(&store), saved);
    }

    #[test]
    fn restore_skips_and_reports_unbindable_sources() {
        let mut backend = FakeBackend::failing(&["y.wav"]);
        let mut store = TrackStore::new();

        let report = store.restore_from(["x.wav", "y.wav", "z.wav"], &mut backend);

        assert_eq!(report.restored, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, PathBuf::from("y.wav"));
        assert_eq!(sources(&store), vec!["x.wav", "z.wav"]);
        assert_eq!(store.len(), store.snapshot_sources().len());
    }

    #[test]
    fn release_all_keeps_entries() {
        let mut backend = FakeBackend::default();
        let mut store = store_with(&["a.wav", "b.wav"], &mut backend);
        store.release_all(&mut backend);
        store.release_all(&mut backend);
        assert_eq!(store.len(), 2);
        assert_eq!(backend.released().len(), 2);
        assert!(store.iter().all(|t| t.player.is_released()));
    }
}
