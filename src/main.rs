use std::env;

use sunplot::{Coordinates, EngineConfig, annual_summary};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);

    let latitude: f64 = args.next().as_deref().unwrap_or("45.5152").parse()?;
    let longitude: f64 = args.next().as_deref().unwrap_or("-122.6784").parse()?;
    let year: i32 = args.next().as_deref().unwrap_or("2024").parse()?;

    let config = match args.next() {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    println!(
        "Computing annual sun hours for {:.4}, {:.4} in {}...",
        latitude, longitude, year
    );

    let coords = Coordinates::new(latitude, longitude)?;
    let summary = annual_summary(&coords, year, &config)?;

    println!(
        "Days evaluated: {}, midnight sun: {}, polar night: {}",
        summary.daily_data.len(),
        summary.days_of_midnight_sun,
        summary.days_of_polar_night
    );
    println!("  Min: {:.2} h/day", summary.min_sun_hours);
    println!("  Max: {:.2} h/day", summary.max_sun_hours);
    println!("  Mean: {:.2} h/day", summary.average_sun_hours);
    println!(
        "  First 10 days: {:?}",
        summary
            .daily_data
            .iter()
            .take(10)
            .map(|d| d.sun_hours)
            .collect::<Vec<f64>>()
    );

    Ok(())
}
