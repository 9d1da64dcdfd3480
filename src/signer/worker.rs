//! Background signing worker.
//!
//! Front ends submit requests here instead of running the pipeline on their
//! own task. A single worker task runs the jobs strictly one after another
//! in submission order, so two runs never race on the same intermediate
//! file, and the front end stays free to render progress while a tool runs.

use super::error::{Error, Result};
use super::pipeline::{PipelineOutcome, SigningPipeline};
use super::request::SigningRequest;
use super::runner::{CommandRunner, LineSink};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

struct Job {
    request: SigningRequest,
    progress: LineSink,
    reply: oneshot::Sender<PipelineOutcome>,
}

/// A submitted signing run.
pub struct SigningJob {
    /// Log lines as the run produces them; closes when the run ends
    pub progress: mpsc::UnboundedReceiver<String>,
    outcome: oneshot::Receiver<PipelineOutcome>,
}

impl SigningJob {
    /// Waits for the run to finish.
    ///
    /// Lines still buffered in [`progress`](Self::progress) remain readable
    /// afterwards.
    pub async fn outcome(&mut self) -> Result<PipelineOutcome> {
        (&mut self.outcome).await.map_err(|_| Error::WorkerStopped)
    }
}

/// Handle to the worker task.
///
/// Dropping the handle lets already queued jobs finish, then the task exits.
pub struct SigningWorker {
    jobs: mpsc::UnboundedSender<Job>,
    task: JoinHandle<()>,
}

impl SigningWorker {
    /// Spawns the worker task on the current tokio runtime.
    pub fn spawn<R>(pipeline: SigningPipeline<R>) -> Self
    where
        R: CommandRunner + 'static,
    {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        let task = tokio::spawn(async move {
            log::debug!("Signing worker started");
            while let Some(job) = queue.recv().await {
                let outcome = pipeline
                    .run_with_progress(&job.request, &job.progress)
                    .await;
                // Closes the progress channel before the outcome is delivered.
                drop(job.progress);
                if job.reply.send(outcome).is_err() {
                    log::debug!("Signing job abandoned by its submitter");
                }
            }
            log::debug!("Signing worker stopped");
        });

        Self { jobs, task }
    }

    /// Queues a request.
    pub fn submit(&self, request: SigningRequest) -> Result<SigningJob> {
        let (progress_tx, progress) = mpsc::unbounded_channel();
        let (reply, outcome) = oneshot::channel();

        self.jobs
            .send(Job {
                request,
                progress: LineSink::channel(progress_tx),
                reply,
            })
            .map_err(|_| Error::WorkerStopped)?;

        Ok(SigningJob { progress, outcome })
    }

    /// Stops accepting jobs and waits for queued ones to finish.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.jobs);
        self.task
            .await
            .map_err(|e| Error::GenericError(format!("Signing worker task panicked: {}", e)))
    }
}
