//! Chat Page

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::api::{self, ChatMessage};
use crate::components::{ChatEntry, MessageBubble, replay};

#[component]
pub fn ChatPage() -> impl IntoView {
    let query = use_query_map();
    let initial = query.with_untracked(|q| q.get("q").map(|s| s.to_string()).unwrap_or_default());

    let (entries, set_entries) = signal(Vec::<ChatEntry>::new());
    let (input, set_input) = signal(initial);
    let (loading, set_loading) = signal(false);
    let (next_id, set_next_id) = signal(0usize);

    let push = move |message: ChatMessage, tools: Vec<String>, error: bool| {
        let id = next_id.get_untracked();
        set_next_id.set(id + 1);
        set_entries.update(|list| {
            list.push(ChatEntry {
                id,
                message,
                tools,
                error,
            });
        });
    };

    let send = move || {
        let text = input.get_untracked().trim().to_string();
        if text.is_empty() || loading.get_untracked() {
            return;
        }

        push(ChatMessage::user(text), Vec::new(), false);
        set_input.set(String::new());
        set_loading.set(true);

        let history = entries.with_untracked(|list| replay(list));
        leptos::task::spawn_local(async move {
            match api::send_chat(&history).await {
                Ok(reply) => push(reply.message, reply.tools_used.unwrap_or_default(), false),
                Err(e) => push(
                    ChatMessage {
                        role: "assistant".into(),
                        content: e,
                    },
                    Vec::new(),
                    true,
                ),
            }
            set_loading.set(false);
        });
    };

    let clear = move |_| {
        set_entries.set(Vec::new());
        set_input.set(String::new());
    };

    view! {
        <div class="chat">
            <aside class="sidebar">
                <h2>"🔬 Research Chat"</h2>
                <p>"The whole conversation is sent with every question."</p>
                <button class="btn" on:click=clear disabled=move || loading.get()>
                    "Clear conversation"
                </button>
                <a href="/ui" class="btn">"Home"</a>
            </aside>

            <main class="chat-main">
                <div class="messages">
                    <For
                        each=move || entries.get()
                        key=|entry| entry.id
                        children=move |entry| view! { <MessageBubble entry=entry /> }
                    />
                    <Show when=move || loading.get()>
                        <div class="message loading">"Researching..."</div>
                    </Show>
                </div>

                <div class="input-area">
                    <textarea
                        placeholder="Ask your scientific question..."
                        prop:value=move || input.get()
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                    />
                    <button on:click=move |_| send() disabled=move || loading.get()>
                        {move || if loading.get() { "..." } else { "Send" }}
                    </button>
                </div>
            </main>
        </div>
    }
}
