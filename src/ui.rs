use crate::ai::GroqBackend;
use crate::config::AppConfig;
use crate::driver::CompletionDriver;
use crate::session::ChatSession;
use crate::views::{ChatView, SettingsSidebar};
use dioxus::prelude::*;

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[component]
pub fn App() -> Element {
    let app_config = use_hook(AppConfig::from_env);
    let settings = use_signal(|| app_config.generation.clone());
    let session = use_signal(ChatSession::new);
    let sending = use_signal(|| false);
    use_context_provider(|| {
        CompletionDriver::new(GroqBackend::new(app_config.base_url.clone()))
    });

    rsx! {
        document::Title { "Groq Chatbot" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        div { class: "layout",
            SettingsSidebar { settings, session, sending }
            ChatView { session, settings, sending }
        }
    }
}
