//! Drives a running server through a full battle session.

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};

const DEFAULT_BASE: &str = "http://localhost:5001";
const MAX_SWIPES: u64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    let base = std::env::var("BATTLE_URL").unwrap_or_else(|_| DEFAULT_BASE.to_string());
    let latitude = std::env::var("LATITUDE").unwrap_or_else(|_| "40.4237".to_string());
    let longitude = std::env::var("LONGITUDE").unwrap_or_else(|_| "-86.9212".to_string());

    let client = reqwest::Client::new();
    let session_id = format!("tester-{}", std::process::id());

    let opening: Value = client
        .get(format!("{base}/api/nearby-restaurants"))
        .query(&[
            ("session_id", session_id.as_str()),
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("radius", "1500"),
        ])
        .send()
        .await
        .context("opening request failed")?
        .error_for_status()?
        .json()
        .await?;

    let pair = opening["restaurants"]
        .as_array()
        .context("missing restaurants array")?;
    if pair.is_empty() {
        bail!("no restaurants returned for {latitude},{longitude}");
    }

    println!("Opening pair:");
    for restaurant in pair {
        println!("  {} - {}", restaurant["name"], restaurant["vicinity"]);
    }

    let pb = ProgressBar::new(MAX_SWIPES);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let mut swipes = 0u64;
    loop {
        let next: Value = client
            .post(format!("{base}/api/next-restaurant"))
            .json(&json!({ "session_id": session_id }))
            .send()
            .await
            .context("next-restaurant request failed")?
            .error_for_status()?
            .json()
            .await?;

        swipes += 1;
        pb.set_message(format!("{}", next["restaurant"]["name"]));
        pb.inc(1);

        let remaining = next["remaining_count"]
            .as_u64()
            .context("missing remaining_count")?;
        if remaining == 0 || swipes >= MAX_SWIPES {
            break;
        }
    }

    pb.finish_with_message("Done");
    println!("Swiped through {swipes} restaurants");

    for _ in 0..2 {
        let reset: Value = client
            .post(format!("{base}/api/reset-session"))
            .json(&json!({ "session_id": session_id }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if reset["success"] != json!(true) {
            bail!("reset failed: {reset}");
        }
    }
    println!("Session reset");

    Ok(())
}
