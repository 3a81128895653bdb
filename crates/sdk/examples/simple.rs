//! Simple SDK Example
//!
//! Demonstrates basic usage of the Keyq SDK.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    KEYQ_BACKEND=memory cargo run --package keyq-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package keyq-sdk --example simple
//!    ```

use keyq_sdk::{KeyqClient, Payload};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Keyq SDK - Simple Example");
    println!("=========================\n");

    let client = KeyqClient::connect("http://127.0.0.1:9527").await?;
    let health = client.health().await?;
    println!("Connected to keyq {} ({})\n", health.version, health.status);

    // A master queue seeded in one call
    client
        .import(
            "example-master",
            true,
            vec![Payload::from("first"), Payload::from("second")],
        )
        .await?;

    // A plain queue fed one payload at a time
    client.add_queue("example-plain", false).await?;
    client.push("example-plain", "plain-1").await?;

    let head = client.front().await?;
    println!(
        "front -> {}: {}",
        head.key,
        String::from_utf8_lossy(head.value.as_bytes())
    );

    let popped = client.pop("example-plain").await?;
    println!(
        "pop   -> {}: {}",
        popped.key,
        String::from_utf8_lossy(popped.value.as_bytes())
    );

    // Whatever is left goes back to the caller and the queue disappears
    let exported = client.export("example-master").await?;
    println!("export -> {} payload(s) left", exported.values.len());
    client.export("example-plain").await?;

    Ok(())
}
