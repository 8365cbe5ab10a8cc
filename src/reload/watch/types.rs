/// What happened to the watched file within one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }

    /// Map a raw notify event kind. Access and metadata-only events are noise.
    pub(super) fn from_event(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    /// Fold a later event into the pending one.
    ///
    /// - Removed -> Created/Modified: restored, take the new kind
    /// - Modified -> Removed: deleted, upgrade to Removed
    /// - Created -> Removed: appeared then vanished, nothing to report
    /// - otherwise: first event wins
    pub(super) fn merge(existing: Self, next: Self) -> Option<Self> {
        match (existing, next) {
            (Self::Removed, Self::Created | Self::Modified) => Some(next),
            (Self::Modified, Self::Removed) => Some(Self::Removed),
            (Self::Created, Self::Removed) => None,
            _ => Some(existing),
        }
    }
}
