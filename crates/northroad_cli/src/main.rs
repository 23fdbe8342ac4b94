//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `northroad_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("northroad_core ping={}", northroad_core::ping());
    println!("northroad_core version={}", northroad_core::core_version());
}
