use smart_traffic_monitor::communication::AmqpFeed;
use smart_traffic_monitor::config::MonitorConfig;
use smart_traffic_monitor::models::LANE_CONFIGS;
use smart_traffic_monitor::monitoring::{FeedView, Reconciler};
use smart_traffic_monitor::render::{render_png_file, render_svg_file};
use smart_traffic_monitor::scene::{build_scene, TrafficSummary};
use tokio::sync::watch;

fn render_view(view: &FeedView, config: &MonitorConfig) {
    let scene = build_scene(&view.snapshot, &LANE_CONFIGS, config.canvas());
    if let Err(e) = render_svg_file(&scene, &config.svg_path) {
        eprintln!("Error writing {}: {}", config.svg_path.display(), e);
    }
    if let Some(png_path) = &config.png_path {
        if let Err(e) = render_png_file(&scene, png_path) {
            eprintln!("Error writing {}: {}", png_path.display(), e);
        }
    }
    println!("{}", TrafficSummary::from_view(view, &LANE_CONFIGS));
}

// Redraws on every view change; ends when the reconciler is dropped.
async fn render_loop(mut views: watch::Receiver<FeedView>, config: MonitorConfig) {
    loop {
        let view = views.borrow_and_update().clone();
        render_view(&view, &config);
        if views.changed().await.is_err() {
            break;
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let config = MonitorConfig::from_env();
    println!(
        "Starting traffic monitor on '{}' ({})...",
        config.channel, config.amqp_url
    );

    let mut reconciler = Reconciler::new(AmqpFeed::new(config.amqp_url.clone()), config.channel.clone());
    let renderer = tokio::spawn(render_loop(reconciler.subscribe_view(), config.clone()));

    // Subscribing waits on the broker handshake.
    match tokio::task::block_in_place(|| reconciler.start()) {
        Ok(()) => {
            tokio::select! {
                _ = reconciler.run() => log::info!("Traffic feed closed"),
                _ = tokio::signal::ctrl_c() => log::info!("Interrupted, shutting down"),
            }
        }
        Err(e) => eprintln!("Monitor error: {}", e),
    }

    tokio::task::block_in_place(|| reconciler.stop());
    drop(reconciler);
    if let Err(e) = renderer.await {
        eprintln!("Render task failed: {}", e);
    }
}
