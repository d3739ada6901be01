use std::sync::mpsc::{self, Receiver, Sender};

use crate::engine::llm_client::GenerationClient;
use crate::engine::protocol::{GenerationDispatch, GenerationDone, GenerationJob, Ticket};

/// Runs generation calls off the UI thread. Completions are drained with
/// [`GenerationWorker::poll`] on the UI tick, so all session mutation stays
/// on one thread.
pub struct GenerationWorker {
    job_tx: Sender<GenerationJob>,
    done_rx: Receiver<GenerationDone>,
}

impl GenerationWorker {
    pub fn spawn<C>(client: C) -> Self
    where
        C: GenerationClient + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        std::thread::spawn(move || {
            run(client, job_rx, done_tx);
        });

        Self { job_tx, done_rx }
    }

    pub fn poll(&self) -> Option<GenerationDone> {
        self.done_rx.try_recv().ok()
    }
}

impl GenerationDispatch for GenerationWorker {
    fn dispatch(&mut self, ticket: Ticket, prompt: String) {
        if self.job_tx.send(GenerationJob { ticket, prompt }).is_err() {
            log::error!("generation worker is gone; dropping request {ticket:?}");
        }
    }
}

fn run<C: GenerationClient>(client: C, rx: Receiver<GenerationJob>, tx: Sender<GenerationDone>) {
    while let Ok(job) = rx.recv() {
        log::debug!("generating for {:?}:\n{}", job.ticket, job.prompt);

        let result = client.generate(&job.prompt);
        match &result {
            Ok(raw) => log::debug!("raw reply for {:?}: {}", job.ticket, raw),
            Err(e) => log::warn!("generation for {:?} failed: {}", job.ticket, e),
        }

        if tx.send(GenerationDone { ticket: job.ticket, result }).is_err() {
            break;
        }
    }
}
