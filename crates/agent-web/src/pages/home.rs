//! Home Page

use leptos::prelude::*;

const TOOLS: [(&str, &str); 4] = [
    ("🌐 Web Search", "Up-to-date information, news and recent events via DuckDuckGo."),
    ("📚 Wikipedia", "Encyclopedic background on concepts, people and history."),
    ("🔬 ArXiv", "Academic papers and recent scientific literature."),
    ("🧮 Scientific Calculator", "Trigonometric, logarithmic and exponential calculations."),
];

const EXAMPLES: [&str; 4] = [
    "What are the latest advances in artificial intelligence according to ArXiv?",
    "Explain the theory of relativity and its practical applications",
    "What is the current state of research on CRISPR gene editing?",
    "Calculate sqrt(2) * pi and explain what it represents",
];

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"🔬 Scientific Research Agent"</h1>
                <p class="tagline">"Evidence-based answers backed by search, encyclopedias and papers"</p>
                <div class="cta">
                    <a href="/ui/chat" class="btn btn-primary">"Start Researching"</a>
                </div>
            </header>

            <section class="features">
                {TOOLS
                    .iter()
                    .map(|(name, blurb)| view! {
                        <div class="feature">
                            <h3>{*name}</h3>
                            <p>{*blurb}</p>
                        </div>
                    })
                    .collect_view()}
            </section>

            <section class="examples">
                <h2>"Try asking"</h2>
                <ul>
                    {EXAMPLES
                        .iter()
                        .map(|q| {
                            let href = format!("/ui/chat?q={}", urlencoding::encode(q));
                            view! { <li><a href=href>{*q}</a></li> }
                        })
                        .collect_view()}
                </ul>
            </section>
        </div>
    }
}
