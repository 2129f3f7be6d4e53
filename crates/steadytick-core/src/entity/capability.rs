use super::entity::BoxedEntity;
use crate::collections::SortedQueuedList;
use crate::error::TickResult;

/// Stable tag an entity declares for lookups.
///
/// Lookups go through these tags rather than runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Presents a frame once per loop iteration. Exactly one is required to run.
    Renderer,
    /// Collects loop diagnostics.
    Diagnostics,
    /// Owns process logging setup.
    Logging,
    /// Application-defined capability.
    Custom(&'static str),
}

/// The presentation collaborator invoked once per loop iteration.
pub trait Renderer {
    fn render_frame(&mut self, tick: u64) -> TickResult<()>;
}

/* ============================
   Container lookups over committed entities
   ============================ */

impl SortedQueuedList<BoxedEntity> {
    /// Index of the first committed entity declaring `cap`.
    pub fn position_capable(&self, cap: Capability) -> Option<usize> {
        self.iter().position(|e| e.capabilities().contains(&cap))
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.position_capable(cap).is_some()
    }

    pub fn find_capable(&self, cap: Capability) -> Option<&BoxedEntity> {
        self.position_capable(cap).and_then(|i| self.get(i))
    }

    pub fn find_all_capable(&self, cap: Capability) -> impl Iterator<Item = &BoxedEntity> + '_ {
        self.iter().filter(move |e| e.capabilities().contains(&cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    struct Tagged {
        id: &'static str,
        order: i32,
        caps: &'static [Capability],
    }

    impl Entity for Tagged {
        fn id(&self) -> &str {
            self.id
        }

        fn order(&self) -> i32 {
            self.order
        }

        fn capabilities(&self) -> &[Capability] {
            self.caps
        }
    }

    #[test]
    fn capability_lookups_follow_commit_order() {
        let mut list: SortedQueuedList<BoxedEntity> = SortedQueuedList::default();
        list.queue_add(Box::new(Tagged { id: "hud", order: 5, caps: &[Capability::Renderer] }));
        list.queue_add(Box::new(Tagged {
            id: "debug",
            order: -1,
            caps: &[Capability::Diagnostics, Capability::Custom("overlay")],
        }));
        list.queue_add(Box::new(Tagged { id: "main", order: 1, caps: &[Capability::Renderer] }));

        assert!(!list.has_capability(Capability::Renderer));
        list.commit();

        assert_eq!(list.find_capable(Capability::Renderer).map(|e| e.id()), Some("main"));
        assert_eq!(list.position_capable(Capability::Custom("overlay")), Some(0));
        assert!(!list.has_capability(Capability::Logging));

        let renderers: Vec<&str> = list
            .find_all_capable(Capability::Renderer)
            .map(|e| e.id())
            .collect();
        assert_eq!(renderers, vec!["main", "hud"]);
    }
}
