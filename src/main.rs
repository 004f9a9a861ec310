use cardex::cli::{Cli, Command};
use cardex::config::{parse_interval, Config};
use cardex::extract::gameprices::SceDocument;
use cardex::extract::inventory::{self, InventoryPages};
use cardex::net::{Fetcher, HttpFetcher};
use cardex::serve::{self, AppState};
use cardex::store::Store;
use cardex::util::format_price;
use cardex::{cycle, logging, report, schedule};
use clap::Parser;

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn open_store(config: &Config) -> Store {
    Store::open(config.db_path.as_deref()).unwrap_or_else(|e| fail(format!("Error opening database: {e}")))
}

fn http_fetcher() -> HttpFetcher {
    HttpFetcher::new().unwrap_or_else(|e| fail(format!("Error creating http client: {e}")))
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::from_cli(&cli).unwrap_or_else(|e| fail(format!("Error loading config: {e}")));

    match cli.command {
        Command::Update(args) => {
            if let Some(url) = args.url {
                config.source_url = url;
            }

            let fetcher = http_fetcher();
            let mut store = open_store(&config);

            match cycle::run(&config, &fetcher, &mut store) {
                Ok(cycle_report) => {
                    report::print_outcome(&cycle_report.outcome, &cycle_report.diagnostics, args.json, config.verbose);
                }
                Err(e) => fail(format!("Error saving snapshot: {e}")),
            }
        }
        Command::Watch(args) => {
            if let Some(interval) = &args.interval {
                config.interval = parse_interval(interval).unwrap_or_else(|e| fail(e));
            }

            let fetcher = http_fetcher();
            let summary = schedule::watch(&config, &fetcher, args.cycles, std::thread::sleep);

            if config.verbose {
                eprintln!(
                    "{} cycles, {} updates, {} failures",
                    summary.cycles, summary.updates, summary.failures
                );
            }
        }
        Command::Report(args) => {
            let store = open_store(&config);

            match store.load(&config.label) {
                Ok(Some(record)) => report::print_record(&record, args.json),
                Ok(None) => fail(format!(
                    "No snapshot stored for '{}'. Run 'cardex update' to create one.",
                    config.label
                )),
                Err(e) => fail(format!("Error loading snapshot: {e}")),
            }
        }
        Command::Lookup(args) => {
            let url = args.url.unwrap_or(config.source_url);
            let body = http_fetcher()
                .get(&url)
                .unwrap_or_else(|e| fail(format!("Error fetching {url}: {e}")));

            let doc = SceDocument::parse(&body);
            let app_id = doc.app_id(&args.game).unwrap_or("-");
            let price = doc
                .price(&args.game)
                .map(|entry| format_price(entry.price))
                .unwrap_or_else(|| "-".to_string());

            println!("{}\tapp {app_id}\tprice {price}", args.game);
        }
        Command::Inventory(args) => {
            let prices = match open_store(&config).load(&config.label) {
                Ok(record) => record.map(|r| r.current).unwrap_or_default(),
                Err(e) => fail(format!("Error loading snapshot: {e}")),
            };

            let fetcher = http_fetcher();
            let url = config.inventory_url_for(&args.steam_id);
            let mut pages = InventoryPages::new(&fetcher, url, config.page_size);
            if let Some(cursor) = args.resume {
                pages = pages.resume(cursor);
            }

            let mut items = Vec::new();
            for page in pages.by_ref() {
                tracing::debug!(items = page.len(), "inventory page");
                items.extend(page);
            }

            let holdings = inventory::holdings(&items, &prices);
            if args.json {
                println!("{}", report::json::render(&holdings));
            } else {
                print!("{}", report::table::render_holdings(&holdings));
            }

            if let Some(cursor) = pages.cursor() {
                eprintln!("stopped early, resume with --resume {cursor}");
            }
        }
        Command::Serve(args) => {
            let addr = args.addr.unwrap_or(config.serve_addr);
            let state = AppState {
                db_path: config.db_path,
                label: config.label,
            };

            let runtime = tokio::runtime::Runtime::new()
                .unwrap_or_else(|e| fail(format!("Error starting runtime: {e}")));

            if let Err(e) = runtime.block_on(serve::serve(&addr, state)) {
                fail(format!("Error serving on {addr}: {e}"));
            }
        }
    }
}
