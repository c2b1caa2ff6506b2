use crate::config::GenerationConfig;
use crate::driver::CompletionDriver;
use crate::error::ChatError;
use crate::session::ChatSession;
use crate::types::Role;
use crate::views::shared::markdown_to_html;
use dioxus::events::Key;
use dioxus::prelude::*;

#[component]
pub fn ChatView(
    session: Signal<ChatSession>,
    settings: Signal<GenerationConfig>,
    sending: Signal<bool>,
) -> Element {
    let driver = use_context::<CompletionDriver>();
    let driver = use_signal(move || driver);
    let mut input = use_signal(String::new);
    // Text of the reply being streamed, cursor included.
    let partial = use_signal(|| Option::<String>::None);
    let notice = use_signal(|| Option::<String>::None);

    let mut send_message = {
        let mut session = session;
        let mut sending = sending;
        let mut partial = partial;
        let mut notice = notice;
        let mut input_signal = input;
        move |text: String| {
            if sending() {
                return;
            }

            let config = settings();
            let pending = match session.with_mut(|s| s.begin_turn(&text, &config)) {
                Ok(pending) => pending,
                Err(ChatError::EmptyPrompt) => return,
                Err(err) => {
                    notice.set(Some(err.to_string()));
                    return;
                }
            };

            notice.set(None);
            input_signal.set(String::new());
            sending.set(true);
            partial.set(Some(String::new()));

            let driver = driver();
            spawn(async move {
                let resolved = pending
                    .resolve(&driver, |update| partial.set(Some(update.display_text())))
                    .await;
                let outcome = session.with_mut(|s| s.finish_turn(resolved));
                if let Some(err) = outcome.and_then(|outcome| outcome.error) {
                    notice.set(Some(format!("Error: {err}")));
                }
                partial.set(None);
                sending.set(false);
            });
        }
    };

    let turns: Vec<(Role, String)> = session
        .read()
        .transcript()
        .iter()
        .map(|turn| (turn.role(), turn.content().to_string()))
        .collect();
    let in_flight = partial();

    rsx! {
        main { class: "main-container",
            h1 { class: "title", "🤖 Groq AI Chatbot" }
            div { class: "chat-wrap",
                div { id: "chat-list", class: "chat-list",
                    for (i, (role, content)) in turns.into_iter().enumerate() {
                        MessageBubble { key: "{i}", role, content }
                    }
                    if let Some(content) = in_flight {
                        MessageBubble { role: Role::Assistant, content }
                    }
                }
            }

            if let Some(message) = notice() {
                div { class: "error-banner", "{message}" }
            }

            form { class: "composer no-divider",
                div { class: "composer-inner",
                    div { class: "hstack", style: "gap: 0.5rem; width: 100%; align-items: flex-end;",
                        textarea {
                            rows: "1", placeholder: "What would you like to know?",
                            value: "{input}", oninput: move |ev| input.set(ev.value()),
                            onkeydown: move |ev| {
                                if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                    ev.prevent_default();
                                    let text = input();
                                    send_message(text);
                                }
                            },
                            disabled: sending(), autofocus: true,
                        }
                        button {
                            class: "btn btn-primary", r#type: "button",
                            disabled: sending() || input().trim().is_empty(),
                            onclick: move |_| {
                                let text = input();
                                send_message(text);
                            },
                            "Send"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn MessageBubble(role: Role, content: String) -> Element {
    let class = role.as_str();
    let avatar = match role {
        Role::User => "🧑",
        Role::Assistant => "🤖",
    };
    let content_html = markdown_to_html(&content);

    rsx! {
        div { class: "message-row {class}",
            div { class: "avatar {class}", "{avatar}" }
            div { class: "bubble {class}",
                if content.is_empty() {
                    div { class: "shimmer-text", "Processing…" }
                } else {
                    div { class: "md", dangerous_inner_html: "{content_html}" }
                }
            }
        }
    }
}
