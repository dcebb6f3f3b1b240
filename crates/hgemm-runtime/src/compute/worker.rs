use std::sync::mpsc;
use std::thread;

use super::compute_task::ComputeTask;

#[derive(Debug)]
pub struct Worker {
    tx: mpsc::Sender<ComputeTask>,
}

impl Worker {
    pub fn new(thread_id: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let inner_worker = InnerWorker { thread_id, rx };
        thread::spawn(move || inner_worker.work());
        Self { tx }
    }

    /// Send a task to the worker thread, giving it back if the thread is gone.
    pub fn send_task(&self, compute_task: ComputeTask) -> Result<(), ComputeTask> {
        self.tx.send(compute_task).map_err(|err| err.0)
    }
}

struct InnerWorker {
    thread_id: usize,
    rx: mpsc::Receiver<ComputeTask>,
}

impl InnerWorker {
    fn work(self) {
        log::trace!("Worker {} started", self.thread_id);
        // Ends when the scheduler drops the sender.
        for compute_task in self.rx.iter() {
            compute_task.compute();
        }
        log::trace!("Worker {} stopped", self.thread_id);
    }
}
