use rand::seq::IndexedRandom;
use rand::Rng;
use smart_traffic_monitor::communication::{FeedError, SnapshotPublisher};
use smart_traffic_monitor::config::MonitorConfig;
use smart_traffic_monitor::models::{LaneId, LANE_CONFIGS};
use smart_traffic_monitor::shared_data::TrafficSnapshot;
use std::{thread, time::Duration};

fn random_snapshot<R: Rng>(rng: &mut R) -> TrafficSnapshot {
    let mut snapshot = TrafficSnapshot::default();
    for lane in LANE_CONFIGS.iter() {
        snapshot
            .lane_vehicle_counts
            .insert(lane.id.key(), rng.random_range(0..=8));
    }
    // Emergency vehicles only show up on lanes that have traffic.
    let busy: Vec<LaneId> = LANE_CONFIGS
        .iter()
        .map(|lane| lane.id)
        .filter(|&id| snapshot.count_for(id) > 0)
        .collect();
    if rng.random_bool(0.15) {
        if let Some(lane) = busy.choose(rng) {
            snapshot.emergency_lane.push(lane.get() as i64);
        }
    }
    // Vehicles waiting inside the box are not on any lane.
    snapshot.vehicle_count =
        snapshot.lane_vehicle_counts.values().sum::<i64>() + rng.random_range(0..=2);
    snapshot
}

fn run(config: &MonitorConfig, ticks: Option<u64>) -> Result<(), FeedError> {
    let publisher = SnapshotPublisher::open(&config.amqp_url, &config.channel)?;
    let mut rng = rand::rng();
    let mut published = 0u64;
    while ticks.map_or(true, |limit| published < limit) {
        if rng.random_bool(0.05) {
            publisher.publish(None)?;
            log::info!("Published empty traffic message");
        } else {
            let snapshot = random_snapshot(&mut rng);
            publisher.publish(Some(&snapshot))?;
            log::info!("Published {:?}", snapshot);
        }
        published += 1;
        thread::sleep(Duration::from_secs(1));
    }
    publisher.close()
}

fn main() {
    env_logger::init();
    let config = MonitorConfig::from_env();
    let ticks = std::env::args().nth(1).and_then(|arg| arg.parse::<u64>().ok());
    println!("Starting traffic feed simulator on '{}'...", config.channel);
    if let Err(e) = run(&config, ticks) {
        eprintln!("Simulator error: {}", e);
    }
}
