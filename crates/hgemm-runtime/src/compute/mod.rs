mod compute_task;
mod scheduler;
mod worker;

pub(crate) use scheduler::Scheduler;
