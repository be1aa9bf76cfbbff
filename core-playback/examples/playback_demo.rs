//! # Playback Coordinator Usage Example
//!
//! This example demonstrates the full playback flow: queueing episodes,
//! driving the coordinator, and watching the observer channels, all against
//! the simulated desktop engine.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use bridge_desktop::{SimulatedEngine, TracingMediaSession};
use core_playback::{PlayableItem, PlaybackCoordinator};
use core_runtime::config::CoreConfig;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎵 Core Playback - Coordinator Demo\n");

    // Two short "episodes" so the demo finishes quickly
    let engine = Arc::new(
        SimulatedEngine::builder()
            .with_source_duration("https://cdn.example.com/ep1.mp3", Duration::from_secs(2))
            .with_source_duration("https://cdn.example.com/ep2.mp3", Duration::from_secs(2))
            .build(),
    );
    let session = Arc::new(TracingMediaSession::new());

    let config = CoreConfig::builder()
        .player_engine(engine.clone())
        .media_session(session.clone())
        .elapsed_interval(Duration::from_millis(100))
        .build()?;
    let coordinator = PlaybackCoordinator::new(config);

    // Watch state transitions and lifecycle events in the background
    let mut states = coordinator.state_changes();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            println!("   state -> {}", *states.borrow());
        }
    });
    let mut events = coordinator.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("   event -> {}", event.description());
        }
    });

    // Queue a second episode, then start the first
    println!("📋 Queueing episode 2, playing episode 1...");
    let ep1 = PlayableItem::new(
        "Episode 1: Getting Started",
        "The Example Show",
        "https://cdn.example.com/ep1.mp3",
    );
    let ep2 = PlayableItem::new(
        "Episode 2: Going Deeper",
        "The Example Show",
        "https://cdn.example.com/ep2.mp3",
    );
    coordinator.enqueue(ep2).await?;
    coordinator.play(ep1).await?;

    // Let it play a bit, exercise pause/resume
    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("\n⏸️  Pausing...");
    coordinator.pause().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("▶️  Resuming...");
    coordinator.resume().await?;

    // Absolute seek near the end of the episode
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("⏩ Seeking to 1.5s...");
    coordinator.seek_to(Duration::from_millis(1500)).await?;

    // Simulate a phone call mid-playback
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("\n📞 Simulating an interruption...");
    engine.begin_interruption();
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("📞 Interruption over, system advises resume...");
    engine.end_interruption(true);

    // Wait for auto-advance into episode 2 and then for the queue to drain
    println!("\n🎧 Waiting for the queue to play out...");
    tokio::time::sleep(Duration::from_secs(5)).await;

    if let Some(info) = session.last_published() {
        println!(
            "\n📺 Last now-playing snapshot: {} by {}",
            info.title, info.author
        );
    }

    println!("\n⏹️  Shutting down...");
    coordinator.shutdown().await?;

    println!("🎉 Demo completed successfully!");
    Ok(())
}
