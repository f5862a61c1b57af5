//! Stream a GraphQL subscription over HTTP and print every event.
//!
//! ```text
//! cargo run --example stream_subscription -- http://localhost:4000/graphql "subscription { count }"
//! ```

use graphql_multipart::protocol::ProtocolSpec;
use graphql_multipart::{GraphQLClient, GraphQLRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "http://localhost:4000/graphql".to_string());
    let query = args
        .next()
        .unwrap_or_else(|| "subscription { count }".to_string());

    let client = GraphQLClient::new();
    let mut stream = client
        .execute(&url, &GraphQLRequest::new(query), &ProtocolSpec::SUBSCRIPTION)
        .await?;

    while let Some(result) = stream.next().await {
        match result {
            Ok(payload) => println!("{}", String::from_utf8_lossy(&payload)),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
