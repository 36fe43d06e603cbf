/// Identifies one run of a [`TickTask`]. Tokens from a cancelled or restarted
/// run never match again, so a late resumption through them is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskToken {
    generation: u64,
}

/// Slot for one per-entity loop that the engine resumes once per tick.
///
/// Starting a new run cancels the running one and hands its state back so the
/// owner can release whatever that run spawned in the same tick.
#[derive(Debug)]
pub struct TickTask<T> {
    generation: u64,
    running: Option<T>,
}

impl<T> Default for TickTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickTask<T> {
    pub fn new() -> Self {
        TickTask {
            generation: 0,
            running: None,
        }
    }

    pub fn start(&mut self, state: T) -> (TaskToken, Option<T>) {
        let previous = self.cancel();

        self.running = Some(state);

        (self.current_token(), previous)
    }

    pub fn cancel(&mut self) -> Option<T> {
        let previous = self.running.take();

        if previous.is_some() {
            self.generation += 1;
        }

        previous
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn token(&self) -> Option<TaskToken> {
        self.running.as_ref().map(|_| self.current_token())
    }

    pub fn is_current(&self, token: TaskToken) -> bool {
        self.running.is_some() && token.generation == self.generation
    }

    pub fn get(&self) -> Option<&T> {
        self.running.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.running.as_mut()
    }

    /// Access the running state only if `token` belongs to the current run.
    pub fn resume(&mut self, token: TaskToken) -> Option<&mut T> {
        if token.generation == self.generation {
            self.running.as_mut()
        } else {
            None
        }
    }

    fn current_token(&self) -> TaskToken {
        TaskToken {
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_returns_previous_state() {
        let mut task = TickTask::new();

        let (_, previous) = task.start(1);
        assert_eq!(previous, None);

        let (_, previous) = task.start(2);
        assert_eq!(previous, Some(1));
        assert_eq!(task.get(), Some(&2));
    }

    #[test]
    fn test_cancel_invalidates_token() {
        let mut task = TickTask::new();

        let (token, _) = task.start("orbit");
        assert!(task.is_current(token));

        assert_eq!(task.cancel(), Some("orbit"));
        assert!(!task.is_current(token));
        assert!(task.resume(token).is_none());
        assert!(!task.is_running());
    }

    #[test]
    fn test_restart_makes_old_token_stale() {
        let mut task = TickTask::new();

        let (old, _) = task.start(0.0f32);
        let (new, _) = task.start(5.0f32);

        assert!(task.resume(old).is_none());

        *task.resume(new).unwrap() += 1.0;
        assert_eq!(task.get(), Some(&6.0));
    }

    #[test]
    fn test_cancel_on_idle_task_is_noop() {
        let mut task: TickTask<u8> = TickTask::new();

        assert_eq!(task.cancel(), None);
        assert_eq!(task.token(), None);
    }
}
