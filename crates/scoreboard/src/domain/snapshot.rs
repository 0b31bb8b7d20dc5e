use log::debug;

/// Proof that a fetch was started against a particular generation of a snapshot.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Locally held copy of remote data.
///
/// Every fetch gets a [`Ticket`] from [`Snapshot::begin`]; its response is only
/// applied while no newer fetch, local write, or clear happened in between.
/// Responses that lose the race are dropped.
#[derive(Debug)]
pub struct Snapshot<T> {
    value: T,
    generation: u64,
    loaded: bool,
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            generation: 0,
            loaded: false,
        }
    }
}

impl<T: Default> Snapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// A response has been applied since the last clear
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        Ticket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Replace the value wholesale if the ticket is still current
    pub fn apply(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(&ticket) {
            debug!(
                "dropping stale response (ticket {}, current {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.value = value;
        self.loaded = true;
        true
    }

    /// A failed fetch leaves nothing behind, if it is still current
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(&ticket) {
            debug!(
                "dropping stale failure (ticket {}, current {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.value = T::default();
        self.loaded = false;
        true
    }

    /// Any fetch in flight is dropped when it lands
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.invalidate();
        self.value = T::default();
        self.loaded = false;
    }

    /// Local write; it wins over every fetch issued before it
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        self.invalidate();
        f(&mut self.value);
    }

    /// Local edit that leaves fetches in flight valid; their answer replaces it
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
    }
}

/// Flag flipped only to force dependent data to be fetched again.
///
/// Counts flips so two flips between fetches still read as a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshToggle {
    flips: u64,
}

impl RefreshToggle {
    pub fn flip(&mut self) {
        self.flips += 1;
    }

    pub fn get(&self) -> bool {
        self.flips % 2 == 1
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let mut snapshot: Snapshot<Vec<u32>> = Snapshot::new();
        let first = snapshot.begin();
        let second = snapshot.begin();

        assert!(snapshot.apply(second, vec![2]));
        assert!(!snapshot.apply(first, vec![1]));
        assert_eq!(snapshot.get(), &vec![2]);
    }

    #[test]
    fn test_clear_drops_in_flight_response() {
        let mut snapshot: Snapshot<Vec<u32>> = Snapshot::new();
        let ticket = snapshot.begin();
        snapshot.clear();

        assert!(!snapshot.apply(ticket, vec![1]));
        assert!(snapshot.get().is_empty());
        assert!(!snapshot.is_loaded());
    }

    #[test]
    fn test_local_write_beats_earlier_fetch() {
        let mut snapshot: Snapshot<Vec<u32>> = Snapshot::new();
        let ticket = snapshot.begin();
        snapshot.update(|v| v.push(9));

        assert!(!snapshot.apply(ticket, vec![]));
        assert_eq!(snapshot.get(), &vec![9]);
    }

    #[test]
    fn test_fail_resets_only_when_current() {
        let mut snapshot: Snapshot<Vec<u32>> = Snapshot::new();
        let ticket = snapshot.begin();
        assert!(snapshot.apply(ticket, vec![1, 2]));

        let stale = snapshot.begin();
        let fresh = snapshot.begin();
        assert!(!snapshot.fail(stale));
        assert_eq!(snapshot.get().len(), 2);
        assert!(snapshot.fail(fresh));
        assert!(snapshot.get().is_empty());
    }

    #[test]
    fn test_refresh_toggle() {
        let mut toggle = RefreshToggle::default();
        assert!(!toggle.get());
        toggle.flip();
        assert!(toggle.get());
        toggle.flip();
        assert!(!toggle.get());
        assert_ne!(toggle, RefreshToggle::default());
    }
}
