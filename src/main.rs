use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "groq_chat=info";

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    // A missing .env is normal; the sidebar still takes the key at runtime.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // The renderer may already have installed a subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() {
    load_dotenv();
    init_tracing();
    tracing::info!("starting groq-chat");
    dioxus::launch(groq_chat::ui::App);
}
