use daybrief::news;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let search_url = std::env::var("NEWS_SEARCH_URL")
        .unwrap_or_else(|_| "https://news.google.com/rss/search".to_string());

    let interests = vec!["technology", "space exploration", "cycling"];

    let client = match news::feed_client(10) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to build client: {}", e);
            return;
        }
    };

    for interest in interests {
        println!("\n{}", "=".repeat(60));
        println!("Testing interest: {}", interest);
        println!("{}", "=".repeat(60));

        match news::fetch_interest_news(&client, &search_url, interest, 3).await {
            Ok(records) => {
                println!("✓ Success! {} candidates", records.len());
                for (i, record) in records.iter().enumerate() {
                    println!("  {}. {:?}", i + 1, record.headline());
                    println!("     id: {}", record.id);
                    println!(
                        "     url: {}",
                        record
                            .fields
                            .get("url")
                            .and_then(|v| v.as_str())
                            .unwrap_or("none")
                    );
                }
            }
            Err(e) => {
                println!("✗ Failed: {}", e);
            }
        }
    }
}
