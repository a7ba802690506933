mod settings;

use log::{debug, error, info, warn};
use posecam_base::{init_file_logger, init_stdout_logger, log_fatal};
use posecam_camera::{CameraConfig, FrameSource, SyntheticCamera};
use posecam_infer::{PoseEstimator, create_estimator};
use posecam_scheduler::{FrameScheduler, ResultSink, SchedulerConfig};
use settings::Settings;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    match &settings.log_dir {
        Some(dir) => init_file_logger(dir)?,
        None => init_stdout_logger(),
    }

    let camera_config = CameraConfig::default();
    let scheduler_config = settings.scheduler_config(camera_config.inference_resolution());

    let estimator = match create_estimator(&settings.estimator_config()) {
        Ok(estimator) => estimator,
        Err(e) => log_fatal!("failed to create pose estimator: {e}"),
    };

    match settings.camera_device.clone() {
        #[cfg(feature = "v4l2")]
        Some(device) => {
            let camera = posecam_camera::V4l2Camera::new(camera_config.with_device(device))?;
            run(camera, estimator, &scheduler_config, settings.frames).await
        }
        #[cfg(not(feature = "v4l2"))]
        Some(device) => {
            warn!("{device} ignored: built without the `v4l2` feature, using the synthetic camera");
            let camera = SyntheticCamera::from_config(&camera_config);
            run(camera, estimator, &scheduler_config, settings.frames).await
        }
        None => {
            let camera = SyntheticCamera::from_config(&camera_config);
            run(camera, estimator, &scheduler_config, settings.frames).await
        }
    }
}

async fn run<S, E>(
    source: S,
    estimator: E,
    config: &SchedulerConfig,
    frames: Option<u64>,
) -> Result<(), Box<dyn Error>>
where
    S: FrameSource + 'static,
    E: PoseEstimator + 'static,
{
    let inference = source.resolution();
    info!(
        "inference {}x{}, display {}x{} at {} Hz",
        inference.width,
        inference.height,
        config.display().width,
        config.display().height,
        config.refresh_hz()
    );

    let sink = ResultSink::new(config.transform_for(inference));
    let mut results = sink.subscribe();

    let mut scheduler = FrameScheduler::new();
    scheduler.start(source, estimator, config.ticker(), sink)?;

    // Stands in for the preview overlay: consumes each result read-only.
    let mut renderer = tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let result = results.borrow_and_update().clone();
            match result.keypoints.iter().find(|k| k.name == "nose") {
                Some(nose) => debug!(
                    "result {}: {} keypoints, nose at ({:.1}, {:.1})",
                    result.revision,
                    result.keypoints.len(),
                    nose.x,
                    nose.y
                ),
                None => debug!("result {}: {} keypoints", result.revision, result.keypoints.len()),
            }
            if frames.is_some_and(|limit| result.revision >= limit) {
                info!("reached {} results", result.revision);
                break;
            }
        }
    });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("interrupted"),
            Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
        },
        _ = &mut renderer => {}
    }
    renderer.abort();

    match scheduler.stop().await {
        Ok(summary) => {
            info!(
                "done: {} iterations, {} published, {} estimator failures",
                summary.iterations, summary.published, summary.estimator_failures
            );
            Ok(())
        }
        Err(e) => {
            error!("frame loop failed: {e}");
            Err(e.into())
        }
    }
}
