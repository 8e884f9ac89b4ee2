/// Seam to the external job tracker. Updates are fire-and-forget and never
/// rolled back; a sink that fails to deliver keeps that to itself.
pub trait ProgressSink {
    fn report(&self, job_id: &str, percentage: u8);
}

/// Sink that records progress in the log stream.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, job_id: &str, percentage: u8) {
        log::info!("Job {job_id}: {percentage}% complete");
    }
}
