use spyglass_codec::WireCursor;
use spyglass_registry::PacketKind;
use spyglass_types::{ConnectionPhase, Direction, ProtocolVersion};

/// Observer priority levels (dispatched in order: Lowest first, Monitor
/// last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Lowest = 0,
    Low = 1,
    Normal = 2,
    High = 3,
    Highest = 4,
    Monitor = 5,
}

/// An intercepted message as presented to observers: its resolved identity
/// plus the payload bytes after the id prefix.
#[derive(Debug)]
pub struct PacketRecord {
    pub kind: PacketKind,
    pub direction: Direction,
    pub phase: ConnectionPhase,
    pub version: ProtocolVersion,
    pub id: i32,
    pub payload: WireCursor,
}

/// What an observer wants done with the message it was shown.
pub enum Verdict {
    Continue,
    /// Replace the payload; later observers and the downstream pipeline see
    /// the new bytes.
    Mutated(WireCursor),
    /// Drop the message; the engine emits nothing for this input.
    Cancelled,
}

/// Invoked synchronously on the processing path of the message's direction.
pub trait PacketObserver: Send {
    fn on_packet(&mut self, record: &PacketRecord) -> Verdict;
}

/// Adapter turning a closure into an observer.
pub struct FnObserver<F>(pub F);

impl<F> PacketObserver for FnObserver<F>
where
    F: FnMut(&PacketRecord) -> Verdict + Send,
{
    fn on_packet(&mut self, record: &PacketRecord) -> Verdict {
        (self.0)(record)
    }
}

struct ObserverEntry {
    id: u64,
    priority: Priority,
    observer: Box<dyn PacketObserver>,
}

pub(crate) enum DispatchOutcome {
    Forward { mutated: bool },
    Cancelled,
}

/// The registered observers, kept sorted by priority.
#[derive(Default)]
pub struct ObserverSet {
    entries: Vec<ObserverEntry>,
    next_id: u64,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Register an observer. Returns an id usable with
    /// [`remove`](Self::remove).
    pub fn register(&mut self, priority: Priority, observer: Box<dyn PacketObserver>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ObserverEntry {
            id,
            priority,
            observer,
        });
        self.entries.sort_by_key(|e| e.priority);
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Show `record` to every observer in priority order. A mutation is
    /// applied to the record before the next observer runs; cancellation
    /// short-circuits.
    pub(crate) fn dispatch(&mut self, record: &mut PacketRecord) -> DispatchOutcome {
        let mut mutated = false;
        for entry in &mut self.entries {
            match entry.observer.on_packet(record) {
                Verdict::Continue => {}
                Verdict::Mutated(payload) => {
                    record.payload = payload;
                    mutated = true;
                }
                Verdict::Cancelled => return DispatchOutcome::Cancelled,
            }
        }
        DispatchOutcome::Forward { mutated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PacketRecord {
        PacketRecord {
            kind: PacketKind::KeepAliveServerbound,
            direction: Direction::Inbound,
            phase: ConnectionPhase::Play,
            version: ProtocolVersion::V1_16,
            id: 0x10,
            payload: WireCursor::from_slice(&[0, 0, 0, 1]),
        }
    }

    #[test]
    fn test_priority_dispatch_order() {
        let mut set = ObserverSet::new();
        let order = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        for (label, priority) in [
            ("normal", Priority::Normal),
            ("monitor", Priority::Monitor),
            ("lowest", Priority::Lowest),
        ] {
            let order = order.clone();
            set.register(
                priority,
                Box::new(FnObserver(move |_: &PacketRecord| {
                    order.lock().unwrap().push(label);
                    Verdict::Continue
                })),
            );
        }

        set.dispatch(&mut record());
        assert_eq!(*order.lock().unwrap(), vec!["lowest", "normal", "monitor"]);
    }

    #[test]
    fn test_mutation_visible_to_later_observers() {
        let mut set = ObserverSet::new();
        set.register(
            Priority::Low,
            Box::new(FnObserver(|_: &PacketRecord| {
                Verdict::Mutated(WireCursor::from_slice(&[42]))
            })),
        );
        set.register(
            Priority::High,
            Box::new(FnObserver(|record: &PacketRecord| {
                assert_eq!(record.payload.as_slice(), &[42]);
                Verdict::Continue
            })),
        );
        let mut rec = record();
        let outcome = set.dispatch(&mut rec);
        assert!(matches!(outcome, DispatchOutcome::Forward { mutated: true }));
        assert_eq!(rec.payload.as_slice(), &[42]);
    }

    #[test]
    fn test_cancellation_short_circuits() {
        let mut set = ObserverSet::new();
        set.register(
            Priority::Normal,
            Box::new(FnObserver(|_: &PacketRecord| Verdict::Cancelled)),
        );
        set.register(
            Priority::Monitor,
            Box::new(FnObserver(|_: &PacketRecord| -> Verdict {
                panic!("must not run after cancellation")
            })),
        );
        assert!(matches!(
            set.dispatch(&mut record()),
            DispatchOutcome::Cancelled
        ));
    }

    #[test]
    fn test_remove_observer() {
        let mut set = ObserverSet::new();
        let id = set.register(
            Priority::Normal,
            Box::new(FnObserver(|_: &PacketRecord| Verdict::Cancelled)),
        );
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }
}
