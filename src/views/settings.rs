use crate::config::{
    Credential, GenerationConfig, MAX_MAX_TOKENS, MAX_TEMPERATURE, MAX_TOKENS_STEP,
    MIN_MAX_TOKENS, MIN_TEMPERATURE, ModelId, TEMPERATURE_STEP,
};
use crate::session::ChatSession;
use dioxus::prelude::*;

const GROQ_CONSOLE_URL: &str = "https://console.groq.com/";

#[component]
pub fn SettingsSidebar(
    settings: Signal<GenerationConfig>,
    session: Signal<ChatSession>,
    sending: Signal<bool>,
) -> Element {
    let mut settings = settings;
    let mut session = session;
    let current = settings();
    let api_key = current.credential.as_str().to_string();
    let temperature = format!("{:.1}", current.temperature);
    let max_tokens = current.max_tokens.to_string();

    rsx! {
        aside { class: "sidebar",
            h2 { class: "section-title", "Settings" }

            div { class: "settings-section",
                label { class: "field-label", r#for: "api-key", "Enter your Groq API Key:" }
                input {
                    id: "api-key",
                    r#type: "password",
                    autocomplete: "off",
                    value: "{api_key}",
                    oninput: move |ev| settings.with_mut(|s| s.credential = Credential::new(ev.value())),
                }
            }

            div { class: "settings-section",
                label { class: "field-label", r#for: "model", "Select Model:" }
                select {
                    id: "model",
                    onchange: move |ev| {
                        match ev.value().parse::<ModelId>() {
                            Ok(model) => settings.with_mut(|s| s.model = model),
                            Err(err) => tracing::warn!(%err, "model selection ignored"),
                        }
                    },
                    for model in ModelId::ALL {
                        option {
                            value: model.as_str(),
                            selected: model == current.model,
                            "{model}"
                        }
                    }
                }
            }

            div { class: "settings-section",
                label { class: "field-label", r#for: "temperature", "Temperature: {temperature}" }
                input {
                    id: "temperature",
                    r#type: "range",
                    min: "{MIN_TEMPERATURE}",
                    max: "{MAX_TEMPERATURE}",
                    step: "{TEMPERATURE_STEP}",
                    value: "{temperature}",
                    oninput: move |ev| {
                        if let Ok(value) = ev.value().parse::<f32>() {
                            settings.with_mut(|s| s.set_temperature(value));
                        }
                    },
                }
            }

            div { class: "settings-section",
                label { class: "field-label", r#for: "max-tokens", "Max Tokens: {max_tokens}" }
                input {
                    id: "max-tokens",
                    r#type: "range",
                    min: "{MIN_MAX_TOKENS}",
                    max: "{MAX_MAX_TOKENS}",
                    step: "{MAX_TOKENS_STEP}",
                    value: "{max_tokens}",
                    oninput: move |ev| {
                        if let Ok(value) = ev.value().parse::<u32>() {
                            settings.with_mut(|s| s.set_max_tokens(value));
                        }
                    },
                }
            }

            button {
                class: "btn btn-ghost",
                r#type: "button",
                disabled: sending(),
                onclick: move |_| session.with_mut(ChatSession::clear),
                "Clear Chat History"
            }

            hr {}
            UsageNotes {}
        }
    }
}

#[component]
fn UsageNotes() -> Element {
    rsx! {
        div { class: "usage-notes",
            h3 { "How to use:" }
            ol {
                li {
                    "Get your API key from "
                    a { href: GROQ_CONSOLE_URL, target: "_blank", rel: "noopener", "Groq Console" }
                }
                li { "Enter your API key above" }
                li { "Select your preferred model" }
                li { "Start chatting!" }
            }
            h3 { "Features:" }
            ul {
                li { "Real-time streaming responses" }
                li { "Multiple model options" }
                li { "Adjustable temperature & tokens" }
                li { "Chat history" }
            }
        }
    }
}
