// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asynchronous editing session.
//
// Transforms are CPU-bound, so they run on tokio's blocking pool while the
// caller's task stays free. The controller sits behind an async mutex: an
// edit holds the lock for its whole run, so edits are applied one at a
// time in the order they asked for the lock, and each one starts from the
// result of the previous one.
//
// Text detection runs as a separate job that does not hold the lock. It can
// be cancelled, and its result is checked against the controller revision
// before being stored.

use std::sync::Arc;

use retusche_core::error::{Result, RetuscheError};
use retusche_core::{OcrResult, Point};
use retusche_imaging::{FontLookup, SystemFonts, TextDetector};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::EditorController;

/// How a detection job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// Lines found, in image coordinates.
    Found(Vec<OcrResult>),
    /// The detector ran and saw no text.
    NothingFound,
    /// The detector errored; the message is suitable for display.
    Failed(String),
    Cancelled,
    /// Lines were found but the image changed in the meantime.
    Stale,
}

/// Cancels a [`DetectionJob`]. Cloneable; cancelling a finished job does
/// nothing.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// A running detection over the selection.
#[derive(Debug)]
pub struct DetectionJob {
    origin: Point,
    revision: u64,
    cancel: CancelHandle,
    handle: JoinHandle<DetectionOutcome>,
}

impl DetectionJob {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Controller revision the job was started against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wait for the job. Results are translated from region to image
    /// coordinates.
    pub async fn wait(self) -> DetectionOutcome {
        let DetectionJob {
            origin,
            cancel,
            handle,
            ..
        } = self;
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(err) => DetectionOutcome::Failed(format!("detection task failed: {err}")),
        };
        drop(cancel);
        match outcome {
            DetectionOutcome::Found(results) => DetectionOutcome::Found(
                results
                    .into_iter()
                    .map(|r| OcrResult {
                        bbox: r.bbox.offset(origin.x, origin.y),
                        ..r
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Shared handle to one editor. Clones refer to the same controller.
pub struct EditSession<L = SystemFonts> {
    controller: Arc<Mutex<EditorController<L>>>,
    detector: Arc<dyn TextDetector>,
}

impl<L> Clone for EditSession<L> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            detector: Arc::clone(&self.detector),
        }
    }
}

impl<L: FontLookup + 'static> EditSession<L> {
    pub fn new(controller: EditorController<L>, detector: Arc<dyn TextDetector>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            detector,
        }
    }

    /// Run `edit` against the controller on the blocking pool.
    pub async fn apply<T, F>(&self, edit: F) -> Result<T>
    where
        F: FnOnce(&mut EditorController<L>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = Arc::clone(&self.controller).lock_owned().await;
        tokio::task::spawn_blocking(move || edit(&mut guard))
            .await
            .map_err(|err| RetuscheError::Worker(err.to_string()))?
    }

    /// Read controller state without leaving the current task.
    pub async fn read<T>(&self, f: impl FnOnce(&EditorController<L>) -> T) -> T {
        let guard = self.controller.lock().await;
        f(&guard)
    }

    /// Start detecting text in the current selection.
    pub async fn start_detection(&self) -> Result<DetectionJob> {
        if !self.detector.is_available() {
            return Err(RetuscheError::DetectorUnavailable(
                "no text detection engine is configured".into(),
            ));
        }
        let request = self.controller.lock().await.detection_request()?;
        let origin = request.origin();
        let revision = request.revision;
        debug!(rect = %request.rect, revision, "Starting text detection");

        let (tx, mut rx) = watch::channel(false);
        let detector = Arc::clone(&self.detector);
        let region = request.region;
        let handle = tokio::spawn(async move {
            let work = tokio::task::spawn_blocking(move || detector.detect(&region));
            tokio::select! {
                biased;
                Ok(_) = rx.wait_for(|cancelled| *cancelled) => DetectionOutcome::Cancelled,
                joined = work => match joined {
                    Ok(Ok(results)) if results.is_empty() => DetectionOutcome::NothingFound,
                    Ok(Ok(results)) => DetectionOutcome::Found(results),
                    Ok(Err(err)) => DetectionOutcome::Failed(err.to_string()),
                    Err(err) => DetectionOutcome::Failed(format!("detection worker failed: {err}")),
                },
            }
        });

        Ok(DetectionJob {
            origin,
            revision,
            cancel: CancelHandle { tx: Arc::new(tx) },
            handle,
        })
    }

    /// Wait for `job` and store what it found. Found results for an image
    /// that has since changed are reported as [`DetectionOutcome::Stale`].
    pub async fn finish_detection(&self, job: DetectionJob) -> DetectionOutcome {
        let revision = job.revision();
        match job.wait().await {
            DetectionOutcome::Found(results) => {
                let mut controller = self.controller.lock().await;
                if controller.accept_detection(revision, results.clone()) {
                    info!(count = results.len(), "Detection results stored");
                    DetectionOutcome::Found(results)
                } else {
                    DetectionOutcome::Stale
                }
            }
            other => {
                if let DetectionOutcome::Failed(message) = &other {
                    warn!(%message, "Text detection failed");
                }
                other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use retusche_core::{EditorConfig, FillMode, Rect, Rgb, TextBox};
    use retusche_imaging::{Image, UnavailableDetector};

    use crate::controller::tests::{NoFonts, controller_with};

    /// Reports one line at a fixed region position, optionally after a delay.
    struct FixedDetector {
        delay: Duration,
        lines: Vec<OcrResult>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedDetector {
        fn finding(lines: Vec<OcrResult>) -> Self {
            Self {
                delay: Duration::ZERO,
                lines,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextDetector for FixedDetector {
        fn is_available(&self) -> bool {
            true
        }

        fn detect(&self, _image: &Image) -> Result<Vec<OcrResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            if self.fail {
                return Err(RetuscheError::DetectionFailed("model crashed".into()));
            }
            Ok(self.lines.clone())
        }
    }

    fn session_with(detector: FixedDetector) -> EditSession<NoFonts> {
        let c = controller_with(Image::filled(100, 100, Rgb::WHITE));
        EditSession::new(c, Arc::new(detector))
    }

    fn region_line() -> OcrResult {
        OcrResult::new("Hello", TextBox::from_rect(Rect::new(2, 3, 30, 13)), 1.0)
    }

    #[tokio::test]
    async fn edits_apply_in_order_and_undo() {
        let session = session_with(FixedDetector::finding(vec![]));
        let a = session.clone();
        let b = session.clone();
        let first = tokio::spawn(async move {
            a.apply(|c| c.fill_region(Rect::new(0, 0, 50, 50), FillMode::Color(Rgb::BLACK))).await
        });
        let first_done = first.await.unwrap().unwrap();
        let second = b
            .apply(|c| c.fill_region(Rect::new(50, 50, 100, 100), FillMode::Color(Rgb::BLACK)))
            .await
            .unwrap();
        assert!(first_done && second);

        let (len, corner, far) = session
            .read(|c| {
                let img = c.image().unwrap();
                (c.history().len(), img.pixel(10, 10), img.pixel(90, 90))
            })
            .await;
        assert_eq!(len, 3);
        assert_eq!((corner, far), (Rgb::BLACK, Rgb::BLACK), "second edit saw the first");

        assert!(session.apply(|c| c.undo()).await.unwrap());
        let far = session.read(|c| c.image().unwrap().pixel(90, 90)).await;
        assert_eq!(far, Rgb::WHITE);
    }

    #[tokio::test]
    async fn concurrent_edits_never_lose_an_update() {
        let session = session_with(FixedDetector::finding(vec![]));
        let mut tasks = Vec::new();
        for i in 0..8 {
            let s = session.clone();
            tasks.push(tokio::spawn(async move {
                let x = i * 10;
                s.apply(move |c| c.fill_region(Rect::new(x, 0, x + 10, 10), FillMode::Color(Rgb::BLACK)))
                    .await
            }));
        }
        for t in tasks {
            assert!(t.await.unwrap().unwrap());
        }
        let black = session
            .read(|c| (0..80).filter(|&x| c.image().unwrap().pixel(x, 5) == Rgb::BLACK).count())
            .await;
        assert_eq!(black, 80);
    }

    #[tokio::test]
    async fn errors_from_edits_propagate() {
        let session = session_with(FixedDetector::finding(vec![]));
        let err = session.apply(|c| c.strip_delete_selection()).await.unwrap_err();
        assert!(matches!(err, RetuscheError::NoSelection));
    }

    #[tokio::test]
    async fn detection_results_land_in_image_coordinates() {
        let session = session_with(FixedDetector::finding(vec![region_line()]));
        session
            .apply(|c| {
                c.selection_mut().set(Rect::new(40, 50, 90, 80));
                Ok(())
            })
            .await
            .unwrap();

        let job = session.start_detection().await.unwrap();
        let outcome = session.finish_detection(job).await;
        let expected = TextBox::from_rect(Rect::new(42, 53, 70, 63));
        match outcome {
            DetectionOutcome::Found(lines) => assert_eq!(lines[0].bbox, expected),
            other => panic!("expected Found, got {other:?}"),
        }
        let stored = session.read(|c| c.detected().to_vec()).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].bbox, expected);
    }

    #[tokio::test]
    async fn empty_and_failed_detection_are_distinct() {
        let session = session_with(FixedDetector::finding(vec![]));
        session.apply(|c| Ok(c.selection_mut().set(Rect::new(0, 0, 50, 50)))).await.unwrap();
        let job = session.start_detection().await.unwrap();
        assert_eq!(session.finish_detection(job).await, DetectionOutcome::NothingFound);

        let failing = FixedDetector {
            fail: true,
            ..FixedDetector::finding(vec![])
        };
        let session = session_with(failing);
        session.apply(|c| Ok(c.selection_mut().set(Rect::new(0, 0, 50, 50)))).await.unwrap();
        let job = session.start_detection().await.unwrap();
        match session.finish_detection(job).await {
            DetectionOutcome::Failed(msg) => assert!(msg.contains("model crashed"), "{msg}"),
            other => panic!("expected Failed, got {other:?}"),
        }
        let image_intact = session.read(|c| c.history().len() == 1).await;
        assert!(image_intact);
    }

    #[tokio::test]
    async fn cancelled_job_reports_cancelled_once() {
        let slow = FixedDetector {
            delay: Duration::from_millis(300),
            ..FixedDetector::finding(vec![region_line()])
        };
        let session = session_with(slow);
        session.apply(|c| Ok(c.selection_mut().set(Rect::new(0, 0, 50, 50)))).await.unwrap();

        let job = session.start_detection().await.unwrap();
        let cancel = job.cancel_handle();
        cancel.cancel();
        cancel.cancel();
        assert_eq!(session.finish_detection(job).await, DetectionOutcome::Cancelled);
        assert!(session.read(|c| c.detected().is_empty()).await);
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_no_op() {
        let session = session_with(FixedDetector::finding(vec![region_line()]));
        session.apply(|c| Ok(c.selection_mut().set(Rect::new(0, 0, 50, 50)))).await.unwrap();
        let job = session.start_detection().await.unwrap();
        let cancel = job.cancel_handle();
        let outcome = session.finish_detection(job).await;
        cancel.cancel();
        assert!(matches!(outcome, DetectionOutcome::Found(_)));
        assert_eq!(session.read(|c| c.detected().len()).await, 1);
    }

    #[tokio::test]
    async fn edit_during_detection_makes_results_stale() {
        let slow = FixedDetector {
            delay: Duration::from_millis(100),
            ..FixedDetector::finding(vec![region_line()])
        };
        let session = session_with(slow);
        session.apply(|c| Ok(c.selection_mut().set(Rect::new(0, 0, 50, 50)))).await.unwrap();
        let job = session.start_detection().await.unwrap();
        session
            .apply(|c| c.fill_region(Rect::new(60, 60, 90, 90), FillMode::Color(Rgb::BLACK)))
            .await
            .unwrap();
        assert_eq!(session.finish_detection(job).await, DetectionOutcome::Stale);
        assert!(session.read(|c| c.detected().is_empty()).await);
    }

    #[tokio::test]
    async fn unavailable_detector_is_reported_before_any_work() {
        let mut c = EditorController::with_fonts(EditorConfig::default(), NoFonts);
        c.load(Image::filled(20, 20, Rgb::WHITE));
        let session = EditSession::new(c, Arc::new(UnavailableDetector::default()));
        let err = session.start_detection().await.unwrap_err();
        assert!(matches!(err, RetuscheError::DetectorUnavailable(_)));
    }
}
