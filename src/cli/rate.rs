use super::ui;
use crate::core::resolver::{RateOrigin, RateResolver, ResolutionResult, ResolverSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};

pub async fn run(resolver: &RateResolver) -> Result<()> {
    let pb = ui::new_spinner("Resolving exchange rate...");
    let result = resolver.resolve().await;
    pb.finish_and_clear();

    println!(
        "{}",
        display_resolution(&result, resolver.settings(), Utc::now())
    );
    Ok(())
}

pub async fn clear(resolver: &RateResolver) -> Result<()> {
    resolver
        .clear()
        .await
        .context("Failed to clear cached rate")?;
    let settings = resolver.settings();
    println!("Cleared cached {}/{} rate", settings.from, settings.to);
    Ok(())
}

pub fn display_resolution(
    result: &ResolutionResult,
    settings: &ResolverSettings,
    now: DateTime<Utc>,
) -> String {
    let pair = format!("{} → {}", settings.from, settings.to);
    let value = ui::style_text(&format!("{:.4}", result.value), ui::StyleType::TotalValue);

    let provenance = match (result.origin, result.age(now)) {
        (RateOrigin::Fresh, _) => ui::style_text("fresh", ui::StyleType::Subtle),
        (RateOrigin::Cache, Some(age)) if age < settings.ttl => {
            ui::style_text(&format!("cached {} ago", describe_age(age)), ui::StyleType::Subtle)
        }
        (RateOrigin::Cache, age) => ui::style_text(
            &format!(
                "stale, cached {} ago",
                age.map_or_else(|| "?".to_string(), describe_age)
            ),
            ui::StyleType::Warning,
        ),
        (RateOrigin::Fallback, _) => {
            ui::style_text("fallback, no rate available", ui::StyleType::Error)
        }
    };

    format!(
        "{}: {value} ({provenance})",
        ui::style_text(&pair, ui::StyleType::TotalLabel)
    )
}

fn describe_age(age: TimeDelta) -> String {
    if age.num_days() > 0 {
        format!("{}d", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h", age.num_hours())
    } else {
        format!("{}m", age.num_minutes().max(0))
    }
}
