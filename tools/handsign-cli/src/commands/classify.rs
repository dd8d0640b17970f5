//! Show how a single direction is classified.

use glam::DVec3;

use handsign_common::config::AppConfig;
use handsign_model::frame::ReferenceFrame;
use handsign_model::hand::HandSide;
use handsign_model::orientation::AxisPair;
use handsign_recognition::classifier::{angle_between_deg, AngleThresholds, OrientationClassifier};
use handsign_recognition::motion::MotionTracker;
use handsign_recognition::pose::PoseSampler;

pub fn run(config: &AppConfig, direction: DVec3, hand: HandSide, palm: bool) -> anyhow::Result<()> {
    let thresholds = AngleThresholds::from_settings(&config.recognition)?;
    let classifier = OrientationClassifier::new(thresholds);
    let frame = ReferenceFrame::WORLD;

    let labels = if palm {
        PoseSampler::new(hand, classifier).sample(direction, &frame)
    } else {
        // Zero threshold: any non-zero displacement is classified.
        let mut tracker = MotionTracker::new(hand, 0.0, classifier);
        tracker.engage(DVec3::ZERO);
        tracker.sample(direction, &frame)
    };

    println!(
        "Direction ({:.3}, {:.3}, {:.3}) as {} hand {}",
        direction.x,
        direction.y,
        direction.z,
        hand,
        if palm { "lateral axis" } else { "motion" }
    );
    println!(
        "  Dead zone: {:.1}..={:.1} degrees",
        thresholds.low_deg, thresholds.high_deg
    );
    for pair in AxisPair::ALL {
        println!(
            "  {:?} axis: {:.1} degrees",
            pair,
            angle_between_deg(direction, frame.axis(pair))
        );
    }
    println!("Labels: {labels}");

    Ok(())
}
