use std::sync::Arc;

use sojourn::config::SojournConfig;
use sojourn::core::filter::TripFilter;
use sojourn::core::weather::WeatherCondition;
use sojourn::store::FileStore;
use sojourn::store::profile::ProfileStore;
use sojourn::store::trips::TripStore;
use sojourn::weather::WeatherClient;

#[tokio::main]
async fn main() {
    let config = SojournConfig::load(&SojournConfig::default_path());

    if let Err(e) = sojourn::logging::init_journal("sojourn-trip-check", config.debug_logging) {
        eprintln!("Journal logging unavailable: {}", e);
    }

    let args: Vec<String> = std::env::args().collect();
    let with_weather = args.iter().any(|a| a == "--weather");
    let query = args
        .iter()
        .position(|a| a == "--search")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_default();

    println!("=== SoJourn local data ===\n");
    println!("Data directory: {}", config.data_directory.display());

    if let Err(e) = config.ensure_directories() {
        log::error!("Failed to create data directory: {}", e);
        println!("Cannot create {}: {}", config.data_directory.display(), e);
        return;
    }

    let kv = Arc::new(FileStore::new(&config.data_directory));
    let trips = TripStore::load(kv.clone());
    let profile = ProfileStore::load(kv);

    if profile.is_signed_in() {
        println!("Signed in as: {}", profile.profile().email);
    } else {
        println!("Not signed in");
    }
    println!("Trips stored: {}\n", trips.len());

    for filter in TripFilter::ALL {
        let matching = trips.filtered(filter, &query);
        println!("--- {} ({}) ---", filter.title(), matching.len());
        for trip in matching {
            println!(
                "  [{}] {} - {} ({} to {}, {} activities)",
                trip.status.as_str(),
                trip.title,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.activities.len()
            );
        }
    }

    if !with_weather {
        println!("\n=== Done ===");
        return;
    }

    let target = trips
        .filtered(TripFilter::Upcoming, "")
        .into_iter()
        .find_map(|t| t.first_location().map(|at| (t, at)));
    let Some((trip, at)) = target else {
        println!("\nNo upcoming trip has an activity location; skipping weather.");
        return;
    };

    println!("\n--- Weather: {} ({}) ---", trip.title, config.weather_base_url);
    let client = match WeatherClient::from_config(&config, profile.auth_token()) {
        Ok(c) => c,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };

    match client.forecast(at, trip.start_date, trip.end_date).await {
        Ok(forecast) => {
            println!("  {} day(s) for {}", forecast.days.len(), forecast.location.name);
            for day in &forecast.days {
                let condition: WeatherCondition = day.condition();
                println!(
                    "    {}  {:>5.1} / {:>5.1}  {} ({})",
                    day.date,
                    day.temperature.min,
                    day.temperature.max,
                    condition.display_name(),
                    condition.icon_name()
                );
            }
            if let Some(note) = forecast.note {
                println!("  Note: {}", note);
            }
        }
        Err(e) => println!("  {}", e.user_message()),
    }

    println!("\n=== Done ===");
}
