use std::collections::BTreeMap;
use std::env;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use supabase::{Order, SupabaseClient, SupabaseURL};

#[derive(Debug, Deserialize)]
struct ChargeRow {
    semaine_debut: Option<NaiveDate>,
    unite_ressource: f64,
}

/// Prints the total charge booked per week, heaviest weeks first.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./supabase/.env.local").ok();
    let url = SupabaseURL::from_env().context("SUPABASE_URL must be set")?;
    let key = env::var("SUPABASE_ANON_KEY")?;

    let mut client = SupabaseClient::new(url, key);
    // Reads as a signed-in user when row level security hides rows from the anon role.
    if let Ok(token) = env::var("SUPABASE_ACCESS_TOKEN") {
        client = client.with_access_token(token);
    }
    let charges: Vec<ChargeRow> = client
        .from("charges")
        .columns("semaine_debut,unite_ressource")
        .order(Order::asc("semaine_debut"))
        .select()
        .await?;

    let mut per_week: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut unscheduled = 0usize;
    for charge in charges {
        match charge.semaine_debut {
            Some(date) => {
                let monday = date
                    - chrono::Days::new(date.weekday().num_days_from_monday() as u64);
                *per_week.entry(monday).or_default() += charge.unite_ressource;
            }
            None => unscheduled += 1,
        }
    }

    let mut weeks: Vec<_> = per_week.into_iter().collect();
    weeks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (monday, total) in weeks {
        println!(
            "S{:02} {} | {:>6.1} j",
            monday.iso_week().week(),
            monday.format("%Y-%m-%d"),
            total
        );
    }
    println!("{} unscheduled charge(s)", unscheduled);

    Ok(())
}
