use library_api::infra::{config, logging};
use library_api::storage::{open_store, OpenMode};
use library_api::{LibraryClient, LibraryService, PaginationRequest};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--remote]\n\
         \n\
         Reads env vars:\n\
           DATABASE_URL or LIBRARY_FIXTURE_PATH (store), LIBRARY_API_BIND\n\
         With --remote also calls a running server:\n\
           LIBRARY_API_URL, LIBRARY_API_TIMEOUT_SECS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let check_remote = args.iter().any(|a| a == "--remote");

    // Force-read config (nice error messages if invalid)
    let bind = config::bind_addr()?;
    let store_config = config::StoreConfig::from_env()?;

    println!("> Preflight:");
    println!("  LIBRARY_API_BIND={}", bind);
    println!("  store={}", store_config.describe());

    let store = open_store(&store_config, OpenMode::Inspect).await?;
    store
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("{} store is not reachable: {}", store.backend_name(), e))?;
    println!("  Store reachable ({}).", store.backend_name());

    let service = LibraryService::new(store);
    let first = service.list_library_nodes(&PaginationRequest::default()).await?;
    println!(
        "  Library has content: {} node(s) on page 1, {} page(s) total.",
        first.library_nodes.len(),
        first.pagination.pages_total
    );

    if check_remote {
        let client_config = config::ClientConfig::from_env()?;
        let client = LibraryClient::new(&client_config)?;
        println!("  Remote endpoint: {}", client.endpoint());
        let remote = client
            .get_library_nodes(PaginationRequest::new(1, 1))
            .await
            .map_err(|e| anyhow::anyhow!("remote call failed: {}", e))?;
        println!("  Remote answered: {} page(s) total.", remote.pagination.pages_total);
    }

    println!("> Preflight OK.");
    Ok(())
}
