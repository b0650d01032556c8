use daybrief::weather::client::WeatherClient;
use daybrief::weather::DEFAULT_RAIN_THRESHOLD_PCT;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let api_key = match std::env::var("WEATHER_API_KEY") {
        Ok(k) => k,
        Err(_) => {
            eprintln!("Set WEATHER_API_KEY environment variable");
            return;
        }
    };

    let base_url = std::env::var("WEATHER_API_URL")
        .unwrap_or_else(|_| "https://weather.googleapis.com/v1".to_string());

    // Optional coordinates; defaults to San Francisco
    let args: Vec<String> = std::env::args().collect();
    let lat: f64 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(37.7749);
    let lon: f64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(-122.4194);

    println!("\n{}", "=".repeat(60));
    println!("Testing weather insights");
    println!("Base URL: {}", base_url);
    println!("Coordinates: {}, {}", lat, lon);
    println!("{}", "=".repeat(60));

    let client = WeatherClient::new(&base_url, &api_key);

    match client
        .fetch_insights(lat, lon, DEFAULT_RAIN_THRESHOLD_PCT)
        .await
    {
        Ok(insights) => {
            println!("✓ Success!");
            match serde_json::to_string_pretty(&insights) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("  (failed to render: {})", e),
            }
        }
        Err(e) => {
            println!("✗ Failed: {}", e);
        }
    }
}
