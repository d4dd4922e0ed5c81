//! The visible list of open tasks, with locally held progress.

use crate::task::Task;

#[derive(Debug, Default, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks.into_iter().filter(|t| !t.is_completed()).collect(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Optimistic local write. Returns false if the task isn't on the board.
    pub fn set_progress(&mut self, id: &str, percent: u8) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.set_progress(percent.into());
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    #[test]
    fn completed_tasks_never_appear() {
        let board = TaskBoard::new(vec![
            Task::new("a", "open"),
            Task::new("b", "done").with_status(TaskStatus::Completed),
        ]);
        assert_eq!(board.len(), 1);
        assert!(board.get("b").is_none());
    }

    #[test]
    fn progress_and_removal() {
        let mut board = TaskBoard::new(vec![Task::new("a", "open")]);
        assert!(board.set_progress("a", 40));
        assert_eq!(board.get("a").unwrap().progress, 40);
        assert!(!board.set_progress("zzz", 10));

        assert_eq!(board.remove("a").unwrap().id, "a");
        assert!(board.is_empty());
        assert!(board.remove("a").is_none());
    }
}
