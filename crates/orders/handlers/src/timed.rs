use orders_core::{CompletionInstance, EntityId, OrderContext, RequestId, Tick};

/// One activation that finishes at a fixed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedJob {
    pub entity: EntityId,
    pub id: RequestId,
    pub target: Option<EntityId>,
    pub due: Tick,
}

/// Bookkeeping shared by handlers whose work simply takes time.
#[derive(Clone, Debug, Default)]
pub struct TimedWork {
    jobs: Vec<TimedJob>,
}

impl TimedWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a job finishing `steps` simulation steps from now.
    pub fn start(
        &mut self,
        ctx: &OrderContext<'_>,
        entity: EntityId,
        id: RequestId,
        target: Option<EntityId>,
        steps: u64,
    ) {
        let span = steps.saturating_mul(ctx.env().time().tick_size());
        self.jobs.push(TimedJob {
            entity,
            id,
            target,
            due: ctx.now() + span,
        });
    }

    /// Forgets the job, if any. Returns whether one was running.
    pub fn cancel(&mut self, entity: EntityId, id: RequestId) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|job| !(job.entity == entity && job.id == id));
        self.jobs.len() != before
    }

    /// Moves every job matching `pred` out, reporting it as failed.
    pub fn fail_where(
        &mut self,
        mut pred: impl FnMut(&TimedJob) -> bool,
        completions: &mut Vec<CompletionInstance>,
    ) {
        self.jobs.retain(|job| {
            if pred(job) {
                completions.push(CompletionInstance::failed(job.entity, job.id));
                false
            } else {
                true
            }
        });
    }

    /// Reports every job due at or before `now` as completed.
    pub fn drain_due(&mut self, now: Tick, completions: &mut Vec<CompletionInstance>) {
        self.jobs.retain(|job| {
            if job.due <= now {
                completions.push(CompletionInstance::completed(job.entity, job.id));
                false
            } else {
                true
            }
        });
    }

    pub fn jobs(&self) -> &[TimedJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
