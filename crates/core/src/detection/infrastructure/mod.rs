pub mod detector_worker;
pub mod replay_detector;
