use crate::page::ElementId;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerAction {
    ResetPurchaseButton(ElementId),
    ResetModalAddButton(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameAction {
    RecomputeFade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) action: TimerAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameTask {
    pub(crate) id: i64,
    pub(crate) action: FrameAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct Scheduler {
    now_ms: i64,
    task_queue: Vec<ScheduledTask>,
    frame_queue: Vec<FrameTask>,
    next_timer_id: i64,
    next_frame_id: i64,
    next_task_order: i64,
    step_limit: usize,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            now_ms: 0,
            task_queue: Vec::new(),
            frame_queue: Vec::new(),
            next_timer_id: 1,
            next_frame_id: 1,
            next_task_order: 0,
            step_limit: 10_000,
        }
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn advance_clock_to(&mut self, target_ms: i64) {
        self.now_ms = target_ms;
    }

    pub(crate) fn advance_clock_by(&mut self, delta_ms: i64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }

    pub(crate) fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub(crate) fn set_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::PageState(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.step_limit = max_steps;
        Ok(())
    }

    pub(crate) fn set_timeout(&mut self, action: TimerAction, delay_ms: i64) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            action,
        });
        id
    }

    pub(crate) fn clear_timeout(&mut self, timer_id: i64) -> bool {
        if let Some(pos) = self.task_queue.iter().position(|task| task.id == timer_id) {
            self.task_queue.remove(pos);
            return true;
        }
        false
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        cleared
    }

    pub(crate) fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn task_count(&self) -> usize {
        self.task_queue.len()
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        let mut best: Option<(usize, i64, i64)> = None;
        for (idx, task) in self.task_queue.iter().enumerate() {
            if let Some(limit) = due_limit {
                if task.due_at > limit {
                    continue;
                }
            }
            match best {
                Some((_, due_at, order)) if (task.due_at, task.order) >= (due_at, order) => {}
                _ => best = Some((idx, task.due_at, task.order)),
            }
        }
        best.map(|(idx, _, _)| idx)
    }

    pub(crate) fn pop_next(&mut self, due_limit: Option<i64>) -> Option<ScheduledTask> {
        let idx = self.next_task_index(due_limit)?;
        Some(self.task_queue.remove(idx))
    }

    pub(crate) fn request_frame(&mut self, action: FrameAction) -> i64 {
        let id = self.next_frame_id;
        self.next_frame_id += 1;
        self.frame_queue.push(FrameTask { id, action });
        id
    }

    pub(crate) fn cancel_frame(&mut self, frame_id: i64) -> bool {
        if let Some(pos) = self.frame_queue.iter().position(|task| task.id == frame_id) {
            self.frame_queue.remove(pos);
            return true;
        }
        false
    }

    pub(crate) fn pop_frame(&mut self) -> Option<FrameTask> {
        if self.frame_queue.is_empty() {
            None
        } else {
            Some(self.frame_queue.remove(0))
        }
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.frame_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_pop_by_due_time_then_registration_order() {
        let mut scheduler = Scheduler::new();
        let slow = scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), 10);
        let fast_a = scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(2)), 5);
        let fast_b = scheduler.set_timeout(TimerAction::ResetModalAddButton(ElementId(3)), 5);

        assert_eq!(scheduler.pop_next(None).map(|t| t.id), Some(fast_a));
        assert_eq!(scheduler.pop_next(None).map(|t| t.id), Some(fast_b));
        assert_eq!(scheduler.pop_next(None).map(|t| t.id), Some(slow));
        assert_eq!(scheduler.pop_next(None), None);
    }

    #[test]
    fn due_limit_filters_future_timers() {
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), 2000);
        assert_eq!(scheduler.pop_next(Some(1999)), None);
        assert!(scheduler.pop_next(Some(2000)).is_some());
    }

    #[test]
    fn negative_delay_is_clamped_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_clock_by(50);
        scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), -10);
        let timers = scheduler.pending_timers();
        assert_eq!(timers[0].due_at, 50);
    }

    #[test]
    fn due_at_saturates_near_i64_max() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_clock_to(i64::MAX);
        scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), 1);
        assert_eq!(scheduler.pending_timers()[0].due_at, i64::MAX);
    }

    #[test]
    fn clear_timeout_removes_only_the_named_timer() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), 5);
        let drop = scheduler.set_timeout(TimerAction::ResetModalAddButton(ElementId(2)), 5);
        assert!(scheduler.clear_timeout(drop));
        assert!(!scheduler.clear_timeout(drop));
        assert_eq!(scheduler.task_count(), 1);
        assert_eq!(scheduler.pending_timers()[0].id, keep);
    }

    #[test]
    fn pending_timers_is_a_sorted_snapshot() {
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(1)), 10);
        scheduler.set_timeout(TimerAction::ResetPurchaseButton(ElementId(2)), 0);
        let timers = scheduler.pending_timers();
        assert_eq!(timers.len(), 2);
        assert!(timers[0].due_at <= timers[1].due_at);
        assert_eq!(scheduler.task_count(), 2);
    }

    #[test]
    fn frames_run_in_request_order_and_cancel_by_id() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.request_frame(FrameAction::RecomputeFade);
        let second = scheduler.request_frame(FrameAction::RecomputeFade);
        assert!(scheduler.cancel_frame(first));
        assert!(!scheduler.cancel_frame(first));
        assert_eq!(scheduler.pop_frame().map(|f| f.id), Some(second));
        assert_eq!(scheduler.pop_frame(), None);
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn step_limit_rejects_zero() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.set_step_limit(0).is_err());
        assert!(scheduler.set_step_limit(1).is_ok());
        assert_eq!(scheduler.step_limit(), 1);
    }
}
