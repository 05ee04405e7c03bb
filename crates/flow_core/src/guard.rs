/// First-write-wins latch: the first `fire_once` runs its action, every later
/// call is a silent no-op.
#[derive(Debug, Default)]
pub struct TransitionGuard {
    committed: bool,
}

impl TransitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn fire_once<R>(&mut self, action: impl FnOnce() -> R) -> Option<R> {
        if self.committed {
            return None;
        }
        self.committed = true;
        Some(action())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_action_runs() {
        let mut guard = TransitionGuard::new();
        let mut runs = Vec::new();

        assert_eq!(guard.fire_once(|| runs.push("timer")), Some(()));
        assert_eq!(guard.fire_once(|| runs.push("manual")), None);
        assert_eq!(guard.fire_once(|| runs.push("duplicate")), None);

        assert!(guard.is_committed());
        assert_eq!(runs, vec!["timer"]);
    }

    #[test]
    fn returns_action_result() {
        let mut guard = TransitionGuard::new();
        assert_eq!(guard.fire_once(|| 7), Some(7));
    }
}
