//! HFT Ledger Performance Test Suite
//!
//! Runs performance tests followed by a basic trading demo showing
//! order placement, matching, and trade execution.

use engine::{Clock, InstrumentRegistry, Matcher, OrderId};
use std::sync::Arc;


fn new_matcher() -> Matcher {
    Matcher::new(Arc::new(InstrumentRegistry::new()), Arc::new(Clock::new()))
}

/// Main entry point - runs performance tests and demo.
fn main() {
    tracing_subscriber::fmt::init();
    println!("=== HFT Ledger Performance Lab ===");

    // Run comprehensive performance tests
    latency_test::run_latency_tests();
    latency_test::run_throughput_test();

    // Run 1-minute sustained throughput test
    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test_1min();

    // Show basic order book functionality
    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

/// Demonstrates basic order book functionality with trade execution.
fn run_basic_demo() {
    let m = new_matcher();

    println!("HFT Ledger - Order Book Demo");

    println!("Submitting ask order: 100 @ 15000");
    let (_ask, events) = m.submit_sell(OrderId(1), "AAPL", 15000, 100);
    println!("  events: {events:?}");

    println!("Submitting bid order: 50 @ 14950");
    let (_bid, events) = m.submit_buy(OrderId(2), "AAPL", 14950, 50);
    println!("  events: {events:?}");

    // Crossing bid that will execute against the resting ask
    println!("Submitting crossing bid: 75 @ 15000");
    let (_crossing, events) = m.submit_buy(OrderId(3), "AAPL", 15000, 75);

    let fills = events.iter().filter(|e| matches!(e, engine::Event::Executed { .. })).count();
    println!("Trades executed: {fills}");
    for event in &events {
        if let engine::Event::Executed { count, price, .. } = event {
            println!("  Trade: {count} shares @ {price} ticks");
        }
    }
}
