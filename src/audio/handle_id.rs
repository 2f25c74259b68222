use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

// atomic so ids stay unique whichever thread asks
pub fn next_handle_id() -> HandleId {
    HandleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
